use std::time::Duration;

/// Tunables for [`ConsoleHandle`](crate::ConsoleHandle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Percentage of a cell the cursor fills when shown, 1 to 100.
    pub cursor_size: u32,

    /// How long `toggle_fullscreen` sleeps after sending the fullscreen hint.
    /// The window system handles the hint asynchronously and gives no
    /// completion signal, so geometry read before this has passed may still
    /// be the old one.
    pub fullscreen_settle: Duration,

    /// Titles longer than this many bytes are cut off when read.
    pub title_capacity: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            cursor_size: 100,
            fullscreen_settle: Duration::from_millis(50),
            title_capacity: 1024,
        }
    }
}
