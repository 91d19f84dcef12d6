use std::collections::HashSet;
use std::io;

use super::Console;
use crate::error::{ConsoleError, ConsoleResult};
use crate::style::CursorInfo;
use crate::units::{Position, Rect, ScreenBufferInfo, Size};

/// An in-memory console that behaves like a Windows console screen buffer.
///
/// The window must always fit inside the buffer, and the buffer can't be
/// made smaller than the window, so resizing has to happen in the same order
/// it would on a real console. Useful for tests and headless runs.
#[derive(Debug, Clone)]
pub struct MemoryConsole {
    valid: bool,

    title: String,

    buffer_size: Size,
    window: Rect,
    largest: Size,

    font_size: Size,
    attribute: u16,

    cursor: Position,
    cursor_info: CursorInfo,

    fullscreen_hints: usize,
    failing: HashSet<&'static str>,
}

impl Default for MemoryConsole {
    fn default() -> Self {
        Self {
            valid: true,

            title: String::new(),

            buffer_size: Size::new(80, 25),
            window: Rect::from_size(Size::new(80, 25)),
            largest: Size::new(200, 60),

            font_size: Size::new(8, 16),
            attribute: 0x07,

            cursor: Position::new(0, 0),
            cursor_info: CursorInfo::default(),

            fullscreen_hints: 0,
            failing: HashSet::new(),
        }
    }
}

impl MemoryConsole {
    /// A console whose handle is invalid, as in a process with no console
    /// attached.
    pub fn detached() -> Self {
        Self {
            valid: false,
            ..Self::default()
        }
    }

    /// Sets both the buffer and the window to `size`.
    #[must_use]
    pub fn with_window_size(mut self, size: Size) -> Self {
        self.buffer_size = size;
        self.window = Rect::from_size(size);
        self.cursor = self.cursor.min(Position::new(size.x - 1, size.y - 1));
        self
    }

    #[must_use]
    pub fn with_largest_window_size(mut self, size: Size) -> Self {
        self.largest = size;
        self
    }

    #[must_use]
    pub fn with_font_size(mut self, size: Size) -> Self {
        self.font_size = size;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Makes every later call to the named primitive fail.
    pub fn fail_on(&mut self, call: &'static str) {
        self.failing.insert(call);
    }

    pub fn clear_failures(&mut self) {
        self.failing.clear();
    }

    /// Invalidates the handle, as if the console had been closed.
    pub fn detach(&mut self) {
        self.valid = false;
    }

    pub fn buffer_size(&self) -> Size {
        self.buffer_size
    }

    pub fn attribute(&self) -> u16 {
        self.attribute
    }

    pub fn fullscreen_hints(&self) -> usize {
        self.fullscreen_hints
    }

    fn check(&self, call: &'static str) -> ConsoleResult<()> {
        if !self.valid {
            return Err(ConsoleError::platform(
                call,
                io::Error::from(io::ErrorKind::NotConnected),
            ));
        }

        if self.failing.contains(call) {
            return Err(ConsoleError::platform(
                call,
                io::Error::new(io::ErrorKind::Other, "injected failure"),
            ));
        }

        Ok(())
    }
}

fn invalid(call: &'static str) -> ConsoleError {
    ConsoleError::platform(call, io::Error::from(io::ErrorKind::InvalidInput))
}

impl Console for MemoryConsole {
    fn open() -> Self {
        Self::default()
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn title(&self) -> ConsoleResult<String> {
        self.check("title")?;
        Ok(self.title.clone())
    }

    fn set_title(&mut self, title: &str) -> ConsoleResult<()> {
        self.check("set_title")?;
        self.title = title.to_owned();
        Ok(())
    }

    fn screen_buffer_info(&self) -> ConsoleResult<ScreenBufferInfo> {
        self.check("screen_buffer_info")?;
        Ok(ScreenBufferInfo {
            buffer_size: self.buffer_size,
            window: self.window,
            cursor: self.cursor,
        })
    }

    fn largest_window_size(&self) -> ConsoleResult<Size> {
        self.check("largest_window_size")?;
        Ok(self.largest)
    }

    fn set_buffer_size(&mut self, size: Size) -> ConsoleResult<()> {
        self.check("set_buffer_size")?;

        let window = self.window;
        let fits_window = size.x > window.right && size.y > window.bottom;
        if size.lt(Size::splat(1)).either() || !fits_window {
            return Err(invalid("set_buffer_size"));
        }

        self.buffer_size = size;
        self.cursor = self.cursor.min(Position::new(size.x - 1, size.y - 1));
        Ok(())
    }

    fn set_window_rect(&mut self, rect: Rect) -> ConsoleResult<()> {
        self.check("set_window_rect")?;

        let size = rect.size();
        let in_buffer = rect.left >= 0
            && rect.top >= 0
            && rect.right < self.buffer_size.x
            && rect.bottom < self.buffer_size.y;

        if size.lt(Size::splat(1)).either() || size.gt(self.largest).either() || !in_buffer {
            return Err(invalid("set_window_rect"));
        }

        self.window = rect;
        Ok(())
    }

    fn font_size(&self) -> ConsoleResult<Size> {
        self.check("font_size")?;
        Ok(self.font_size)
    }

    fn set_font_size(&mut self, size: Size) -> ConsoleResult<()> {
        self.check("set_font_size")?;

        if size.lt(Size::splat(1)).either() {
            return Err(invalid("set_font_size"));
        }

        self.font_size = size;
        Ok(())
    }

    fn set_text_attribute(&mut self, attribute: u16) -> ConsoleResult<()> {
        self.check("set_text_attribute")?;
        self.attribute = attribute;
        Ok(())
    }

    fn set_cursor_position(&mut self, pos: Position) -> ConsoleResult<()> {
        self.check("set_cursor_position")?;

        if pos.lt(Position::splat(0)).either() || pos.ge(self.buffer_size).either() {
            return Err(invalid("set_cursor_position"));
        }

        self.cursor = pos;
        Ok(())
    }

    fn cursor_info(&self) -> ConsoleResult<CursorInfo> {
        self.check("cursor_info")?;
        Ok(self.cursor_info)
    }

    fn set_cursor_info(&mut self, info: CursorInfo) -> ConsoleResult<()> {
        self.check("set_cursor_info")?;

        if !(1..=100).contains(&info.size) {
            return Err(invalid("set_cursor_info"));
        }

        self.cursor_info = info;
        Ok(())
    }

    fn send_fullscreen_hint(&mut self) -> ConsoleResult<bool> {
        self.check("send_fullscreen_hint")?;
        self.fullscreen_hints += 1;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryConsole;
    use crate::platform::Console;
    use crate::units::{Rect, Size};

    #[test]
    fn buffer_cannot_shrink_below_window() {
        let mut console = MemoryConsole::default().with_window_size(Size::new(80, 25));

        assert!(console.set_buffer_size(Size::new(40, 25)).is_err());

        console.set_window_rect(Rect::from_size(Size::new(40, 20))).unwrap();
        console.set_buffer_size(Size::new(40, 20)).unwrap();

        let info = console.screen_buffer_info().unwrap();
        assert_eq!(info.buffer_size, Size::new(40, 20));
        assert_eq!(info.window_size(), Size::new(40, 20));
    }

    #[test]
    fn window_must_fit_buffer() {
        let mut console = MemoryConsole::default().with_window_size(Size::new(80, 25));

        assert!(console.set_window_rect(Rect::from_size(Size::new(100, 25))).is_err());
    }

    #[test]
    fn injected_failure() {
        let mut console = MemoryConsole::default();
        console.fail_on("set_title");

        assert!(console.set_title("nope").is_err());

        console.clear_failures();
        console.set_title("yes").unwrap();
        assert_eq!(console.title().unwrap(), "yes");
    }
}
