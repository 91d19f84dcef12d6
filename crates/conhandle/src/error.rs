use std::io;

use crate::units::Size;

#[derive(thiserror::Error, Debug)]
pub enum ConsoleError {
    #[error("console handle is invalid")]
    HandleInvalid,

    #[error("{call} failed: {source}")]
    PlatformCallFailed {
        call: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("requested size {}x{} exceeds largest window size {}x{}", .requested.x, .requested.y, .largest.x, .largest.y)]
    TooLarge { requested: Size, largest: Size },

    #[error("invalid size {}x{}", .0.x, .0.y)]
    InvalidSize(Size),

    #[error("{0} is not supported by this console")]
    Unsupported(&'static str),
}

impl ConsoleError {
    pub fn platform(call: &'static str, source: io::Error) -> Self {
        Self::PlatformCallFailed { call, source }
    }

    /// Wraps the calling thread's last OS error.
    pub fn last_os_error(call: &'static str) -> Self {
        Self::platform(call, io::Error::last_os_error())
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;
