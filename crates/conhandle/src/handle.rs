use std::thread;
use std::time::Duration;

use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, ConsoleResult};
use crate::platform::{Console, PlatformConsole};
use crate::style::{Color, CursorInfo, FontColor};
use crate::units::{Position, Rect, Size};

/// Presentation controls for one console.
///
/// Construct it once at startup and pass it to whatever needs the console.
/// Every operation checks the console handle first and fails with
/// [`ConsoleError::HandleInvalid`] if it's unusable, so a process without a
/// console gets errors rather than crashes.
///
/// The fullscreen flag, the saved window size and the font color are
/// remembered by the handle, not read back from the console: they reflect
/// the last value set through this handle and won't notice changes made
/// elsewhere (the user resizing the window, say).
pub struct ConsoleHandle<C: Console = PlatformConsole> {
    console: C,
    config: ConsoleConfig,

    fullscreen: bool,
    saved_window_size: Size,
    font_color: FontColor,
}

impl ConsoleHandle {
    /// Opens the console attached to this process.
    pub fn open() -> Self {
        Self::new(PlatformConsole::open())
    }
}

impl<C: Console> ConsoleHandle<C> {
    pub fn new(console: C) -> Self {
        Self::with_config(console, ConsoleConfig::default())
    }

    pub fn with_config(console: C, config: ConsoleConfig) -> Self {
        if !console.is_valid() {
            log::warn!("no usable console attached");
        }

        Self {
            console,
            config,

            fullscreen: false,
            saved_window_size: Size::default(),
            font_color: FontColor::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    #[inline]
    pub fn backend(&self) -> &C {
        &self.console
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn into_inner(self) -> C {
        self.console
    }

    fn guard(&self) -> ConsoleResult<()> {
        match self.console.is_valid() {
            true => Ok(()),
            false => Err(ConsoleError::HandleInvalid),
        }
    }

    pub fn set_title(&mut self, title: &str) -> ConsoleResult<()> {
        self.guard()?;

        log::debug!("setting title to {title:?}");
        self.console.set_title(title)
    }

    pub fn try_title(&self) -> ConsoleResult<String> {
        self.guard()?;

        let mut title = self.console.title()?;
        truncate_at_boundary(&mut title, self.config.title_capacity);
        Ok(title)
    }

    /// The window title, or an empty string if it can't be read.
    pub fn title(&self) -> String {
        self.try_title().unwrap_or_else(|err| {
            log::debug!("couldn't read title: {err}");
            String::new()
        })
    }

    /// Resizes the window and its buffer to `size` cells.
    ///
    /// Not transactional: the buffer may end up resized even if resizing the
    /// window then fails.
    pub fn set_window_size(&mut self, size: Size) -> ConsoleResult<()> {
        self.guard()?;

        if size.lt(Size::splat(1)).either() {
            return Err(ConsoleError::InvalidSize(size));
        }

        let largest = self.console.largest_window_size()?;
        if size.gt(largest).either() {
            return Err(ConsoleError::TooLarge {
                requested: size,
                largest,
            });
        }

        log::debug!("resizing window to {}x{}", size.x, size.y);

        // The window always has to fit in the buffer, so shrink it first if
        // the buffer is about to get smaller than it.
        let window = self.console.window_size()?;
        if window.gt(size).either() {
            self.console.set_window_rect(Rect::from_size(window.min(size)))?;
        }

        self.console.set_buffer_size(size)?;
        self.console.set_window_rect(Rect::from_size(size))
    }

    pub fn window_size(&self) -> ConsoleResult<Size> {
        self.guard()?;
        self.console.window_size()
    }

    /// The largest window the console could show with the current font and
    /// display.
    pub fn largest_window_size(&self) -> ConsoleResult<Size> {
        self.guard()?;
        self.console.largest_window_size()
    }

    /// Switches between the largest possible window and the size the window
    /// had before, and asks the window system to toggle fullscreen as well.
    ///
    /// Returns after the configured settle delay, so the new geometry can be
    /// read straight away. A failed resize doesn't stop the toggle: the flag
    /// still flips and the hint is still sent. A failed hint is only logged.
    pub fn toggle_fullscreen(&mut self) -> ConsoleResult<()> {
        self.guard()?;

        let resized = if self.fullscreen {
            self.set_window_size(self.saved_window_size)
        } else {
            self.saved_window_size = self.console.window_size()?;
            let largest = self.console.largest_window_size()?;
            self.set_window_size(largest)
        };

        if let Err(err) = resized {
            log::warn!("fullscreen toggle couldn't resize the window: {err}");
        }

        self.fullscreen = !self.fullscreen;
        log::debug!("fullscreen is now {}", self.fullscreen);

        match self.console.send_fullscreen_hint() {
            Ok(true) if !self.config.fullscreen_settle.is_zero() => {
                thread::sleep(self.config.fullscreen_settle);
            }
            Ok(_) => {}
            Err(err) => log::warn!("couldn't send fullscreen hint: {err}"),
        }

        Ok(())
    }

    #[inline]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn set_font_size(&mut self, size: Size) -> ConsoleResult<()> {
        self.guard()?;

        log::debug!("setting font size to {}x{}", size.x, size.y);
        self.console.set_font_size(size)
    }

    pub fn font_size(&self) -> ConsoleResult<Size> {
        self.guard()?;
        self.console.font_size()
    }

    /// Sets the text colors used for output from now on.
    ///
    /// The color is remembered even if the console rejects it.
    pub fn set_font_color(&mut self, fg: Color, bg: Color) -> ConsoleResult<()> {
        self.guard()?;

        let color = FontColor::new(fg, bg);
        self.font_color = color;

        self.console.set_text_attribute(color.attribute())
    }

    /// The last color set through this handle. Black on black if none was.
    #[inline]
    pub fn font_color(&self) -> FontColor {
        self.font_color
    }

    pub fn set_cursor_position(&mut self, pos: Position) -> ConsoleResult<()> {
        self.guard()?;
        self.console.set_cursor_position(pos)
    }

    pub fn cursor_position(&self) -> ConsoleResult<Position> {
        self.guard()?;
        self.console.cursor_position()
    }

    pub fn show_cursor(&mut self, visible: bool) -> ConsoleResult<()> {
        self.guard()?;

        self.console.set_cursor_info(CursorInfo {
            size: self.config.cursor_size,
            visible,
        })
    }

    pub fn try_is_cursor_visible(&self) -> ConsoleResult<bool> {
        self.guard()?;
        Ok(self.console.cursor_info()?.visible)
    }

    /// Whether the cursor is shown. `false` if that can't be determined.
    pub fn is_cursor_visible(&self) -> bool {
        self.try_is_cursor_visible().unwrap_or(false)
    }

    /// Blocks the calling thread.
    pub fn wait(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

fn truncate_at_boundary(s: &mut String, max_len: usize) {
    if s.len() <= max_len {
        return;
    }

    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }

    s.truncate(end);
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::ConsoleHandle;
    use crate::config::ConsoleConfig;
    use crate::error::ConsoleError;
    use crate::platform::memory::MemoryConsole;
    use crate::style::{Color, FontColor};
    use crate::units::{Position, Size};

    fn handle(console: MemoryConsole) -> ConsoleHandle<MemoryConsole> {
        let config = ConsoleConfig {
            fullscreen_settle: Duration::ZERO,
            ..ConsoleConfig::default()
        };

        ConsoleHandle::with_config(console, config)
    }

    fn standard() -> ConsoleHandle<MemoryConsole> {
        handle(
            MemoryConsole::default()
                .with_window_size(Size::new(80, 25))
                .with_largest_window_size(Size::new(200, 60)),
        )
    }

    #[test]
    fn window_size_never_exceeds_request() {
        let mut con = standard();

        for size in [[80, 25], [40, 10], [200, 60], [1, 1], [120, 30], [80, 25]] {
            let size = Size::from(size);

            con.set_window_size(size).unwrap();

            let actual = con.window_size().unwrap();
            assert!(actual.le(size).both(), "{actual:?} > {size:?}");
            assert_eq!(con.backend().buffer_size(), size);
        }
    }

    #[test]
    fn oversized_window_is_rejected() {
        let mut con = standard();

        let err = con.set_window_size(Size::new(201, 30)).unwrap_err();
        assert!(matches!(
            err,
            ConsoleError::TooLarge { largest, .. } if largest == Size::new(200, 60)
        ));

        assert!(con.set_window_size(Size::new(100, 61)).is_err());

        assert_eq!(con.window_size().unwrap(), Size::new(80, 25));
        assert_eq!(con.backend().buffer_size(), Size::new(80, 25));
    }

    #[test]
    fn empty_window_is_rejected() {
        let mut con = standard();

        assert!(matches!(
            con.set_window_size(Size::new(0, 10)),
            Err(ConsoleError::InvalidSize(_))
        ));
        assert!(con.set_window_size(Size::new(10, -1)).is_err());
    }

    #[test]
    fn resize_is_best_effort() {
        let mut con = standard();
        con.backend_mut().fail_on("set_window_rect");

        let err = con.set_window_size(Size::new(100, 30)).unwrap_err();
        assert!(matches!(
            err,
            ConsoleError::PlatformCallFailed {
                call: "set_window_rect",
                ..
            }
        ));

        // The buffer grew even though the window didn't.
        assert_eq!(con.backend().buffer_size(), Size::new(100, 30));
        assert_eq!(con.window_size().unwrap(), Size::new(80, 25));
    }

    #[test]
    fn color_grid() {
        let mut con = standard();

        for bg in Color::ALL {
            for fg in Color::ALL {
                con.set_font_color(fg, bg).unwrap();

                let expected = ((bg.index() as u16) << 4) | fg.index() as u16;
                let packed: (Color, Color, u16) = con.font_color().into();
                assert_eq!(packed, (fg, bg, expected));
                assert_eq!(con.backend().attribute(), expected);
            }
        }

        assert_eq!(con.font_color().attribute(), 0xff);
    }

    #[test]
    fn font_color_defaults_to_zero() {
        let con = standard();

        let packed: (Color, Color, u16) = con.font_color().into();
        assert_eq!(packed, (Color::Black, Color::Black, 0));
    }

    #[test]
    fn font_color_is_cached_even_if_rejected() {
        let mut con = standard();
        con.backend_mut().fail_on("set_text_attribute");

        assert!(con.set_font_color(Color::Red, Color::White).is_err());
        assert_eq!(con.font_color(), FontColor::new(Color::Red, Color::White));
        assert_eq!(con.backend().attribute(), 0x07);
    }

    #[test]
    fn show_cursor_is_idempotent() {
        let mut con = standard();

        con.show_cursor(true).unwrap();
        con.show_cursor(true).unwrap();
        assert!(con.is_cursor_visible());

        con.show_cursor(false).unwrap();
        con.show_cursor(false).unwrap();
        assert!(!con.is_cursor_visible());
        assert!(!con.try_is_cursor_visible().unwrap());
    }

    #[test]
    fn unreadable_cursor_counts_as_hidden() {
        let mut con = standard();
        con.show_cursor(true).unwrap();
        con.backend_mut().fail_on("cursor_info");

        assert!(!con.is_cursor_visible());
        assert!(matches!(
            con.try_is_cursor_visible(),
            Err(ConsoleError::PlatformCallFailed {
                call: "cursor_info",
                ..
            })
        ));
    }

    #[test]
    fn fullscreen_toggle_is_symmetric() {
        let mut con = standard();
        let before = con.window_size().unwrap();

        con.toggle_fullscreen().unwrap();
        assert!(con.is_fullscreen());
        assert_eq!(con.window_size().unwrap(), Size::new(200, 60));

        con.toggle_fullscreen().unwrap();
        assert!(!con.is_fullscreen());
        assert_eq!(con.window_size().unwrap(), before);

        assert_eq!(con.backend().fullscreen_hints(), 2);
    }

    #[test]
    fn fullscreen_flag_flips_when_resize_fails() {
        let mut con = standard();
        con.backend_mut().fail_on("set_buffer_size");

        con.toggle_fullscreen().unwrap();

        assert!(con.is_fullscreen());
        assert_eq!(con.window_size().unwrap(), Size::new(80, 25));
        assert_eq!(con.backend().fullscreen_hints(), 1);
    }

    #[test]
    fn fullscreen_survives_failed_hint() {
        let mut con = standard();
        con.backend_mut().fail_on("send_fullscreen_hint");

        con.toggle_fullscreen().unwrap();
        assert!(con.is_fullscreen());
        assert_eq!(con.window_size().unwrap(), Size::new(200, 60));

        con.toggle_fullscreen().unwrap();
        assert!(!con.is_fullscreen());
        assert_eq!(con.window_size().unwrap(), Size::new(80, 25));

        assert_eq!(con.backend().fullscreen_hints(), 0);
    }

    #[test]
    fn fullscreen_waits_for_settle_delay() {
        let config = ConsoleConfig {
            fullscreen_settle: Duration::from_millis(20),
            ..ConsoleConfig::default()
        };
        let mut con = ConsoleHandle::with_config(MemoryConsole::default(), config);

        let start = Instant::now();
        con.toggle_fullscreen().unwrap();

        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn cursor_position_reads_back() {
        let mut con = standard();

        con.set_cursor_position(Position::new(12, 7)).unwrap();
        assert_eq!(con.cursor_position().unwrap(), Position::new(12, 7));

        assert!(con.set_cursor_position(Position::new(80, 0)).is_err());
        assert_eq!(con.cursor_position().unwrap(), Position::new(12, 7));
    }

    #[test]
    fn font_size() {
        let mut con = standard();

        con.set_font_size(Size::new(12, 16)).unwrap();
        assert_eq!(con.font_size().unwrap(), Size::new(12, 16));

        con.backend_mut().fail_on("font_size");
        assert!(matches!(
            con.font_size(),
            Err(ConsoleError::PlatformCallFailed {
                call: "font_size",
                ..
            })
        ));
    }

    #[test]
    fn title() {
        let mut con = standard();
        assert_eq!(con.title(), "");

        con.set_title("Hello World").unwrap();
        assert_eq!(con.title(), "Hello World");

        con.backend_mut().fail_on("title");
        assert_eq!(con.title(), "");
        assert!(con.try_title().is_err());
    }

    #[test]
    fn long_title_is_truncated_on_char_boundary() {
        let config = ConsoleConfig {
            title_capacity: 4,
            ..ConsoleConfig::default()
        };
        let con = ConsoleHandle::with_config(MemoryConsole::default().with_title("abcé"), config);

        // 'é' takes two bytes and would straddle the limit.
        assert_eq!(con.title(), "abc");
    }

    #[test]
    fn detached_console_fails_everywhere() {
        let mut con = handle(MemoryConsole::detached());

        let invalid = |res: Result<_, ConsoleError>| matches!(res, Err(ConsoleError::HandleInvalid));

        assert!(invalid(con.set_title("x").map(|_| ())));
        assert!(invalid(con.try_title().map(|_| ())));
        assert_eq!(con.title(), "");
        assert!(invalid(con.set_window_size(Size::new(10, 10)).map(|_| ())));
        assert!(invalid(con.window_size().map(|_| ())));
        assert!(invalid(con.largest_window_size().map(|_| ())));
        assert!(invalid(con.toggle_fullscreen().map(|_| ())));
        assert!(!con.is_fullscreen());
        assert!(invalid(con.set_font_size(Size::new(8, 8)).map(|_| ())));
        assert!(invalid(con.font_size().map(|_| ())));
        assert!(invalid(con.set_font_color(Color::Red, Color::Black).map(|_| ())));
        assert_eq!(con.font_color(), FontColor::default());
        assert!(invalid(con.set_cursor_position(Position::new(0, 0)).map(|_| ())));
        assert!(invalid(con.cursor_position().map(|_| ())));
        assert!(invalid(con.show_cursor(true).map(|_| ())));
        assert!(!con.is_cursor_visible());

        assert_eq!(con.backend().fullscreen_hints(), 0);
        con.wait(Duration::from_millis(1));
    }

    #[test]
    fn console_lost_mid_process() {
        let mut con = standard();
        con.set_title("before").unwrap();

        con.backend_mut().detach();

        assert!(matches!(con.set_title("after"), Err(ConsoleError::HandleInvalid)));
        assert_eq!(con.title(), "");
    }

    #[test]
    fn wait_blocks() {
        let con = standard();

        let start = Instant::now();
        con.wait(Duration::from_millis(15));
        assert!(start.elapsed() >= Duration::from_millis(15));
    }
}
