//! Query and change how the process's text console looks: title, window and
//! font size, colors, cursor and fullscreen.
//!
//! ```no_run
//! use conhandle::{Color, ConsoleHandle, Size};
//!
//! let mut console = ConsoleHandle::open();
//!
//! console.set_title("Hello World")?;
//! console.set_font_color(Color::LightGreen, Color::Black)?;
//! console.set_window_size(Size::new(100, 30))?;
//! # Ok::<(), conhandle::ConsoleError>(())
//! ```

mod config;
mod error;
mod handle;
pub mod platform;
pub mod style;
pub mod units;

pub use config::ConsoleConfig;
pub use error::{ConsoleError, ConsoleResult};
pub use handle::ConsoleHandle;
pub use platform::{Console, PlatformConsole};
pub use style::{Color, CursorInfo, FontColor};
pub use units::{Position, Rect, Size};
