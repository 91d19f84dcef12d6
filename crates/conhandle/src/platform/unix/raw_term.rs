use std::fs::File;
use std::io::Write;
use std::mem::ManuallyDrop;
use std::os::fd::{FromRawFd, RawFd};
use std::time::Instant;
use std::{io, mem};

use libc::{termios as Termios, winsize as Winsize, STDIN_FILENO, STDOUT_FILENO};

use crate::units::Size;

macro_rules! cvt {
    ($res:expr) => {{
        match $res {
            -1 => Err(io::Error::last_os_error()),
            res => Ok(res),
        }
    }};
}

unsafe fn get_termios(fd: RawFd) -> io::Result<Termios> {
    unsafe {
        let mut termios: Termios = mem::zeroed();
        cvt!(libc::tcgetattr(fd, &mut termios))?;
        Ok(termios)
    }
}

unsafe fn set_termios(fd: RawFd, termios: &Termios) -> io::Result<()> {
    cvt!(unsafe { libc::tcsetattr(fd, libc::TCSANOW, termios) })?;
    Ok(())
}

pub fn is_terminal(fd: RawFd) -> bool {
    unsafe { libc::isatty(fd) == 1 }
}

pub fn get_size(fd: RawFd) -> io::Result<Size> {
    let mut size: Winsize = unsafe { mem::zeroed() };
    cvt!(unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) })?;

    let clamp = |n: u16| i16::try_from(n).unwrap_or(i16::MAX);
    Ok(Size::new(clamp(size.ws_col), clamp(size.ws_row)))
}

/// Puts stdin into raw mode so that terminal replies can be read byte by
/// byte without being echoed. The previous mode is restored on drop.
pub struct RawMode {
    termios_prev: Termios,
}

impl RawMode {
    pub fn enter() -> io::Result<Self> {
        unsafe {
            let mut termios = get_termios(STDIN_FILENO)?;
            let termios_prev = termios;

            libc::cfmakeraw(&mut termios);
            set_termios(STDIN_FILENO, &termios)?;

            Ok(Self { termios_prev })
        }
    }

    /// Reads whatever stdin has available into `buf`, waiting until
    /// `deadline` at most. Returns `false` if nothing arrived in time.
    pub fn read_until(&self, buf: &mut Vec<u8>, deadline: Instant) -> io::Result<bool> {
        let timeout = deadline.saturating_duration_since(Instant::now());
        let timeout_ms = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);

        let mut pollfd = libc::pollfd {
            fd: STDIN_FILENO,
            events: libc::POLLIN,
            revents: 0,
        };

        let ready = loop {
            match cvt!(unsafe { libc::poll(&mut pollfd, 1, timeout_ms) }) {
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                res => break res?,
            }
        };

        if ready == 0 {
            return Ok(false);
        }

        let mut chunk = [0u8; 64];
        let n = cvt!(unsafe {
            libc::read(STDIN_FILENO, chunk.as_mut_ptr().cast(), chunk.len()) as libc::c_int
        })?;

        buf.extend_from_slice(&chunk[..n as usize]);
        Ok(n > 0)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = unsafe { set_termios(STDIN_FILENO, &self.termios_prev) };
    }
}

pub struct RawStdout;

impl Write for RawStdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        get_stdout().write(buf)
    }

    fn write_vectored(&mut self, bufs: &[io::IoSlice]) -> io::Result<usize> {
        get_stdout().write_vectored(bufs)
    }

    fn flush(&mut self) -> io::Result<()> {
        get_stdout().flush()
    }
}

fn get_stdout() -> ManuallyDrop<File> {
    ManuallyDrop::new(unsafe { File::from_raw_fd(STDOUT_FILENO) })
}
