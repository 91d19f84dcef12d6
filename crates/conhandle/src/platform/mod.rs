use crate::error::ConsoleResult;
use crate::style::CursorInfo;
use crate::units::{Position, Rect, ScreenBufferInfo, Size};

#[cfg(unix)]
mod ansi;
pub mod memory;
#[cfg(unix)]
mod reply;

#[cfg(unix)]
pub mod unix;

#[cfg(windows)]
pub mod windows;

#[cfg(unix)]
pub type PlatformConsole = unix::UnixConsole;

#[cfg(windows)]
pub type PlatformConsole = windows::WindowsConsole;

/// The primitives a console backend provides.
///
/// Each method maps to a single call on the underlying console. Backends
/// don't need to check [`Console::is_valid`] themselves; the facade does that
/// before calling in.
pub trait Console: Sized {
    /// Opens the console attached to the current process.
    fn open() -> Self;

    fn is_valid(&self) -> bool;

    fn title(&self) -> ConsoleResult<String>;
    fn set_title(&mut self, title: &str) -> ConsoleResult<()>;

    fn screen_buffer_info(&self) -> ConsoleResult<ScreenBufferInfo>;
    fn largest_window_size(&self) -> ConsoleResult<Size>;

    fn window_size(&self) -> ConsoleResult<Size> {
        Ok(self.screen_buffer_info()?.window_size())
    }

    fn cursor_position(&self) -> ConsoleResult<Position> {
        Ok(self.screen_buffer_info()?.cursor)
    }

    fn set_buffer_size(&mut self, size: Size) -> ConsoleResult<()>;
    fn set_window_rect(&mut self, rect: Rect) -> ConsoleResult<()>;

    fn font_size(&self) -> ConsoleResult<Size>;
    fn set_font_size(&mut self, size: Size) -> ConsoleResult<()>;

    fn set_text_attribute(&mut self, attribute: u16) -> ConsoleResult<()>;

    fn set_cursor_position(&mut self, pos: Position) -> ConsoleResult<()>;

    fn cursor_info(&self) -> ConsoleResult<CursorInfo>;
    fn set_cursor_info(&mut self, info: CursorInfo) -> ConsoleResult<()>;

    /// Asks the window system to toggle fullscreen, if the backend has a way
    /// to. Returns whether a request was sent. The request is not awaited.
    fn send_fullscreen_hint(&mut self) -> ConsoleResult<bool> {
        Ok(false)
    }
}
