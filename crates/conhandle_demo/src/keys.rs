//! Non-blocking single key reads for the demo loop.

pub const ESC: u8 = 0x1b;

#[cfg(unix)]
mod sys {
    use std::time::Duration;
    use std::{io, mem};

    use libc::{termios as Termios, STDIN_FILENO};

    /// Turns off line buffering and echo on stdin until dropped, so single
    /// key presses can be read as they happen. Output processing is left
    /// alone.
    pub struct Keys {
        termios_prev: Termios,
    }

    impl Keys {
        pub fn new() -> io::Result<Self> {
            unsafe {
                let mut termios: Termios = mem::zeroed();
                if libc::tcgetattr(STDIN_FILENO, &mut termios) == -1 {
                    return Err(io::Error::last_os_error());
                }

                let termios_prev = termios;

                termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN);
                termios.c_iflag &= !(libc::IXON | libc::ICRNL);

                if libc::tcsetattr(STDIN_FILENO, libc::TCSAFLUSH, &termios) == -1 {
                    return Err(io::Error::last_os_error());
                }

                Ok(Self { termios_prev })
            }
        }

        pub fn poll(&self, timeout: Duration) -> io::Result<Option<u8>> {
            let mut pollfd = libc::pollfd {
                fd: STDIN_FILENO,
                events: libc::POLLIN,
                revents: 0,
            };

            let timeout_ms = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);

            match unsafe { libc::poll(&mut pollfd, 1, timeout_ms) } {
                -1 => {
                    let err = io::Error::last_os_error();
                    match err.kind() {
                        io::ErrorKind::Interrupted => Ok(None),
                        _ => Err(err),
                    }
                }

                0 => Ok(None),

                _ => {
                    let mut c = 0u8;
                    match unsafe { libc::read(STDIN_FILENO, (&mut c as *mut u8).cast(), 1) } {
                        1 => Ok(Some(c)),
                        0 => Err(io::Error::from(io::ErrorKind::UnexpectedEof)),
                        _ => Err(io::Error::last_os_error()),
                    }
                }
            }
        }
    }

    impl Drop for Keys {
        fn drop(&mut self) {
            let _ = unsafe { libc::tcsetattr(STDIN_FILENO, libc::TCSAFLUSH, &self.termios_prev) };
        }
    }
}

#[cfg(windows)]
mod sys {
    use std::ffi::c_int;
    use std::io;
    use std::thread;
    use std::time::Duration;

    extern "C" {
        fn _kbhit() -> c_int;
        fn _getch() -> c_int;
    }

    /// Reads keys from the console through the C runtime, which already
    /// delivers them unbuffered and unechoed.
    pub struct Keys;

    impl Keys {
        pub fn new() -> io::Result<Self> {
            Ok(Self)
        }

        pub fn poll(&self, timeout: Duration) -> io::Result<Option<u8>> {
            if unsafe { _kbhit() } != 0 {
                return Ok(Some(unsafe { _getch() } as u8));
            }

            thread::sleep(timeout);
            Ok(None)
        }
    }
}

pub use sys::Keys;
