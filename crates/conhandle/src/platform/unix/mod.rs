use std::io;
use std::time::{Duration, Instant};

use libc::STDOUT_FILENO;

use self::raw_term::{RawMode, RawStdout};
use super::ansi::AnsiWriter;
use super::reply::{self, CsiReply, Parse};
use super::Console;
use crate::error::{ConsoleError, ConsoleResult};
use crate::style::{CursorInfo, FontColor};
use crate::units::{Position, Rect, ScreenBufferInfo, Size};

mod raw_term;

const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_millis(100);

/// DECTCEM, the cursor visibility mode.
const CURSOR_VISIBLE_MODE: u16 = 25;

/// A terminal driven with xterm control sequences on stdout.
///
/// Terminals have no separate screen buffer, so the buffer always has the
/// size of the window. Queries are answered by the terminal on stdin; stdin
/// is switched into raw mode only while waiting for a reply.
pub struct UnixConsole {
    title: Option<String>,
    cursor_size: u32,
    reply_timeout: Duration,
}

impl UnixConsole {
    /// How long to wait for the terminal to answer a query.
    #[must_use]
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    fn send(
        &self,
        call: &'static str,
        f: impl FnOnce(&mut AnsiWriter<RawStdout>),
    ) -> ConsoleResult<()> {
        let mut ansi = AnsiWriter::new(RawStdout);
        f(&mut ansi);
        ansi.flush().map_err(|err| ConsoleError::platform(call, err))
    }

    fn query<T>(
        &self,
        call: &'static str,
        request: impl FnOnce(&mut AnsiWriter<RawStdout>),
        parse: impl Fn(&CsiReply) -> Option<T>,
    ) -> ConsoleResult<T> {
        let raw = RawMode::enter().map_err(|err| ConsoleError::platform(call, err))?;

        self.send(call, request)?;

        let deadline = Instant::now() + self.reply_timeout;
        let mut buf = Vec::new();

        loop {
            if let Some(value) = take_reply(call, &mut buf, &parse) {
                return Ok(value);
            }

            let got_input = raw
                .read_until(&mut buf, deadline)
                .map_err(|err| ConsoleError::platform(call, err))?;

            if !got_input {
                return Err(ConsoleError::platform(
                    call,
                    io::Error::from(io::ErrorKind::TimedOut),
                ));
            }
        }
    }
}

/// Takes the first reply `parse` accepts out of `buf`. Replies to something
/// else are dropped on the way, and so are bytes that can't be part of a
/// reply. An unfinished reply is left in place for the next read to complete.
fn take_reply<T>(
    call: &str,
    buf: &mut Vec<u8>,
    parse: impl Fn(&CsiReply) -> Option<T>,
) -> Option<T> {
    loop {
        match reply::parse_csi(buf) {
            (Parse::Complete(end), Some(found)) => {
                buf.drain(..end);

                if let Some(value) = parse(&found) {
                    return Some(value);
                }

                log::debug!("{call}: ignoring unrelated reply {found:?}");
            }

            (Parse::Missing, _) => {
                // A trailing ESC may still become the start of a reply.
                let keep = usize::from(buf.last() == Some(&reply::ESC));
                let end = buf.len() - keep;
                buf.drain(..end);

                return None;
            }

            _ => return None,
        }
    }
}

impl Console for UnixConsole {
    fn open() -> Self {
        Self {
            title: None,
            cursor_size: 100,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }

    fn is_valid(&self) -> bool {
        raw_term::is_terminal(STDOUT_FILENO)
    }

    fn title(&self) -> ConsoleResult<String> {
        // Terminals that still answer title reports are rare, and it's
        // disabled by default where supported.
        self.title.clone().ok_or(ConsoleError::Unsupported("title"))
    }

    fn set_title(&mut self, title: &str) -> ConsoleResult<()> {
        self.send("set_title", |ansi| ansi.set_title(title))?;
        self.title = Some(title.to_owned());
        Ok(())
    }

    fn screen_buffer_info(&self) -> ConsoleResult<ScreenBufferInfo> {
        let size = self.window_size()?;

        Ok(ScreenBufferInfo {
            buffer_size: size,
            window: Rect::from_size(size),
            cursor: self.cursor_position()?,
        })
    }

    fn window_size(&self) -> ConsoleResult<Size> {
        raw_term::get_size(STDOUT_FILENO).map_err(|err| ConsoleError::platform("window_size", err))
    }

    fn cursor_position(&self) -> ConsoleResult<Position> {
        let (x, y) = self.query(
            "cursor_position",
            |ansi| ansi.request_cursor_pos(),
            reply::cursor_position,
        )?;

        Ok(Position::new(x, y))
    }

    fn largest_window_size(&self) -> ConsoleResult<Size> {
        let (width, height) = self.query(
            "largest_window_size",
            |ansi| ansi.request_screen_size(),
            |msg| reply::window_report(msg, 9),
        )?;

        Ok(Size::new(width, height))
    }

    fn set_buffer_size(&mut self, _size: Size) -> ConsoleResult<()> {
        // The buffer follows the window.
        Ok(())
    }

    fn set_window_rect(&mut self, rect: Rect) -> ConsoleResult<()> {
        self.send("set_window_rect", |ansi| ansi.resize(rect.size()))
    }

    fn font_size(&self) -> ConsoleResult<Size> {
        let (width, height) = self.query(
            "font_size",
            |ansi| ansi.request_cell_size(),
            |msg| reply::window_report(msg, 6),
        )?;

        Ok(Size::new(width, height))
    }

    fn set_font_size(&mut self, _size: Size) -> ConsoleResult<()> {
        Err(ConsoleError::Unsupported("set_font_size"))
    }

    fn set_text_attribute(&mut self, attribute: u16) -> ConsoleResult<()> {
        let color = FontColor::from_attribute(attribute);
        self.send("set_text_attribute", |ansi| ansi.set_colors(color))
    }

    fn set_cursor_position(&mut self, pos: Position) -> ConsoleResult<()> {
        self.send("set_cursor_position", |ansi| ansi.set_cursor_pos(pos))
    }

    fn cursor_info(&self) -> ConsoleResult<CursorInfo> {
        let visible = self.query(
            "cursor_info",
            |ansi| ansi.request_cursor_vis(),
            |msg| reply::private_mode(msg, CURSOR_VISIBLE_MODE),
        )?;

        Ok(CursorInfo {
            size: self.cursor_size,
            visible,
        })
    }

    fn set_cursor_info(&mut self, info: CursorInfo) -> ConsoleResult<()> {
        self.send("set_cursor_info", |ansi| ansi.set_cursor_vis(info.visible))?;
        self.cursor_size = info.size;
        Ok(())
    }

    fn send_fullscreen_hint(&mut self) -> ConsoleResult<bool> {
        self.send("send_fullscreen_hint", |ansi| ansi.toggle_fullscreen())?;
        Ok(true)
    }
}

impl Drop for UnixConsole {
    fn drop(&mut self) {
        if !self.is_valid() {
            return;
        }

        // Leave the terminal usable for the shell.
        let _ = self.send("drop", |ansi| {
            ansi.reset_style();
            ansi.set_cursor_vis(true);
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::platform::reply::{self, cursor_position};
    use super::take_reply;

    fn take(buf: &mut Vec<u8>) -> Option<(i16, i16)> {
        take_reply("test", buf, cursor_position)
    }

    #[test]
    fn unrelated_reply_is_dropped() {
        let mut buf = b"\x1b[?25;1$y\x1b[12;40R\x1b[3;3R".to_vec();

        assert_eq!(take(&mut buf), Some((39, 11)));
        assert_eq!(buf, b"\x1b[3;3R");
    }

    #[test]
    fn key_presses_before_reply() {
        let mut buf = b"jk\x1b[3;4R".to_vec();

        assert_eq!(take(&mut buf), Some((3, 2)));
        assert!(buf.is_empty());
    }

    #[test]
    fn malformed_prefix_before_reply() {
        let mut buf = b"\x1b[\x1b[12;40R".to_vec();

        assert_eq!(take(&mut buf), Some((39, 11)));
        assert!(buf.is_empty());
    }

    #[test]
    fn split_reply_waits_for_rest() {
        let mut buf = b"x\x1b[12;4".to_vec();
        assert_eq!(take(&mut buf), None);

        buf.extend_from_slice(b"0R");
        assert_eq!(take(&mut buf), Some((39, 11)));
    }

    #[test]
    fn noise_is_discarded() {
        let mut buf = b"hello\x1b".to_vec();

        assert_eq!(take(&mut buf), None);
        assert_eq!(buf, [reply::ESC]);

        let mut buf = b"\x1b[?25;1$y".to_vec();
        assert_eq!(take(&mut buf), None);
        assert!(buf.is_empty());
    }
}
