use std::fmt::Write as _;
use std::io::{self, Write};

use crate::style::FontColor;
use crate::units::{Position, Size};

const CSI: &str = "\x1b[";
const OSC: &str = "\x1b]";
const BEL: char = '\x07';

/// Buffers xterm control sequences and writes them out on flush.
pub struct AnsiWriter<W: Write> {
    buf: String,
    writer: W,
}

impl<W: Write> AnsiWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            buf: String::new(),
            writer,
        }
    }

    #[cfg(test)]
    pub fn inner(&self) -> &W {
        &self.writer
    }

    #[inline]
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.write_all(self.buf.as_bytes())?;
        self.buf.clear();

        self.writer.flush()
    }

    #[inline]
    pub fn set_title(&mut self, title: &str) {
        // Control characters would terminate the OSC early.
        let title: String = title.chars().filter(|c| !c.is_control()).collect();
        write!(self.buf, "{OSC}0;{title}{BEL}").unwrap();
    }

    /// Resizes the text area, in cells.
    #[inline]
    pub fn resize(&mut self, size: Size) {
        write!(self.buf, "{CSI}8;{};{}t", size.y, size.x).unwrap();
    }

    #[inline]
    pub fn toggle_fullscreen(&mut self) {
        write!(self.buf, "{CSI}10;2t").unwrap();
    }

    #[inline]
    pub fn set_cursor_pos(&mut self, pos: Position) {
        let row = pos.y.saturating_add(1);
        let col = pos.x.saturating_add(1);

        write!(self.buf, "{CSI}{row};{col}H").unwrap();
    }

    #[inline]
    pub fn set_cursor_vis(&mut self, vis: bool) {
        match vis {
            true => write!(self.buf, "{CSI}?25h").unwrap(),
            false => write!(self.buf, "{CSI}?25l").unwrap(),
        }
    }

    #[inline]
    pub fn set_colors(&mut self, color: FontColor) {
        write!(self.buf, "{CSI}{};{}m", color.fg.ansi_fg(), color.bg.ansi_bg()).unwrap();
    }

    #[inline]
    pub fn reset_style(&mut self) {
        write!(self.buf, "{CSI}0m").unwrap();
    }

    /// DSR: the terminal answers with `CSI row ; col R`.
    #[inline]
    pub fn request_cursor_pos(&mut self) {
        write!(self.buf, "{CSI}6n").unwrap();
    }

    /// The terminal answers with `CSI 9 ; rows ; cols t`.
    #[inline]
    pub fn request_screen_size(&mut self) {
        write!(self.buf, "{CSI}19t").unwrap();
    }

    /// The terminal answers with `CSI 6 ; height ; width t`, in pixels.
    #[inline]
    pub fn request_cell_size(&mut self) {
        write!(self.buf, "{CSI}16t").unwrap();
    }

    /// DECRQM for DECTCEM: the terminal answers with `CSI ? 25 ; Ps $ y`.
    #[inline]
    pub fn request_cursor_vis(&mut self) {
        write!(self.buf, "{CSI}?25$p").unwrap();
    }
}
