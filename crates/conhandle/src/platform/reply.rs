//! Parsing of the control sequences a terminal sends back in answer to a
//! query.

pub const ESC: u8 = 0x1b;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsiReply {
    /// A private-parameter marker such as `?`, if present.
    pub private: Option<u8>,
    pub params: Vec<u16>,
    pub intermediate: Option<u8>,
    pub final_byte: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parse {
    /// A full sequence was found, ending at this byte offset.
    Complete(usize),
    /// A sequence has started but hasn't ended yet.
    Incomplete,
    /// No sequence start in the input.
    Missing,
}

/// Finds the first CSI sequence in `input`. Bytes before it (stray key
/// presses, say) are skipped, and so is any sequence that turns out to be
/// malformed: the search picks up again at the byte that broke it.
pub fn parse_csi(input: &[u8]) -> (Parse, Option<CsiReply>) {
    let mut from = 0;

    loop {
        let Some(start) = input[from..]
            .windows(2)
            .position(|w| w == [ESC, b'['])
            .map(|pos| from + pos)
        else {
            return (Parse::Missing, None);
        };

        match parse_csi_at(input, start + 2) {
            Ok(parsed) => return parsed,
            Err(bad) => from = bad,
        }
    }
}

/// Parses the body of a sequence starting at `i`, just past its `ESC [`.
/// Fails with the offset of the first byte that can't be part of it.
fn parse_csi_at(input: &[u8], mut i: usize) -> Result<(Parse, Option<CsiReply>), usize> {
    let private = match input.get(i) {
        Some(&b @ (b'<'..=b'?')) => {
            i += 1;
            Some(b)
        }
        Some(_) => None,
        None => return Ok((Parse::Incomplete, None)),
    };

    let mut params = Vec::new();
    let mut current: Option<u16> = None;
    let mut intermediate = None;

    while let Some(&b) = input.get(i) {
        match b {
            b'0'..=b'9' => {
                let digit = (b - b'0') as u16;
                current = Some(current.unwrap_or(0).saturating_mul(10).saturating_add(digit));
            }

            b';' => params.push(current.take().unwrap_or(0)),

            0x20..=0x2f => intermediate = Some(b),

            0x40..=0x7e => {
                if let Some(n) = current {
                    params.push(n);
                }

                let reply = CsiReply {
                    private,
                    params,
                    intermediate,
                    final_byte: b,
                };

                return Ok((Parse::Complete(i + 1), Some(reply)));
            }

            _ => return Err(i),
        }

        i += 1;
    }

    Ok((Parse::Incomplete, None))
}

/// `CSI row ; col R`, converted to a zero-based `(x, y)`.
pub fn cursor_position(reply: &CsiReply) -> Option<(i16, i16)> {
    match (reply.final_byte, reply.private, reply.params.as_slice()) {
        (b'R', None, &[row, col]) => Some((to_zero_based(col)?, to_zero_based(row)?)),
        _ => None,
    }
}

/// `CSI code ; height ; width t`, as sent for window reports. Returns
/// `(width, height)`.
pub fn window_report(reply: &CsiReply, code: u16) -> Option<(i16, i16)> {
    match (reply.final_byte, reply.private, reply.params.as_slice()) {
        (b't', None, &[c, height, width]) if c == code => {
            Some((i16::try_from(width).ok()?, i16::try_from(height).ok()?))
        }
        _ => None,
    }
}

/// `CSI ? mode ; Ps $ y`. Returns whether the mode is set, or `None` if the
/// terminal doesn't know the mode.
pub fn private_mode(reply: &CsiReply, mode: u16) -> Option<bool> {
    match (
        reply.final_byte,
        reply.private,
        reply.intermediate,
        reply.params.as_slice(),
    ) {
        (b'y', Some(b'?'), Some(b'$'), &[m, state]) if m == mode => match state {
            1 | 3 => Some(true),
            2 | 4 => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn to_zero_based(n: u16) -> Option<i16> {
    i16::try_from(n.saturating_sub(1)).ok()
}

#[cfg(test)]
mod tests {
    use super::{cursor_position, parse_csi, private_mode, window_report, Parse};

    #[test]
    fn cursor_report() {
        let (parse, reply) = parse_csi(b"\x1b[12;40R");
        assert_eq!(parse, Parse::Complete(8));
        assert_eq!(cursor_position(&reply.unwrap()), Some((39, 11)));
    }

    #[test]
    fn skips_leading_noise() {
        let (parse, reply) = parse_csi(b"abc\x1b[9;50;200t");
        assert_eq!(parse, Parse::Complete(14));

        let reply = reply.unwrap();
        assert_eq!(window_report(&reply, 9), Some((200, 50)));
        assert_eq!(window_report(&reply, 6), None);
    }

    #[test]
    fn incomplete() {
        assert_eq!(parse_csi(b"\x1b[12;4").0, Parse::Incomplete);
        assert_eq!(parse_csi(b"\x1b[").0, Parse::Incomplete);
        assert_eq!(parse_csi(b"\x1b").0, Parse::Missing);
        assert_eq!(parse_csi(b"hello").0, Parse::Missing);
    }

    #[test]
    fn malformed_sequence_is_skipped() {
        let (parse, reply) = parse_csi(b"\x1b[\x1b[12;40R");
        assert_eq!(parse, Parse::Complete(10));
        assert_eq!(cursor_position(&reply.unwrap()), Some((39, 11)));

        let (parse, reply) = parse_csi(b"\x1b[1\n\x1b[?25;2$y");
        assert_eq!(parse, Parse::Complete(13));
        assert_eq!(private_mode(&reply.unwrap(), 25), Some(false));

        assert_eq!(parse_csi(b"\x1b[1\nabc").0, Parse::Missing);
        assert_eq!(parse_csi(b"\x1b[1\x1b[3").0, Parse::Incomplete);
    }

    #[test]
    fn mode_report() {
        let (_, reply) = parse_csi(b"\x1b[?25;1$y");
        assert_eq!(private_mode(&reply.unwrap(), 25), Some(true));

        let (_, reply) = parse_csi(b"\x1b[?25;2$y");
        assert_eq!(private_mode(&reply.unwrap(), 25), Some(false));

        let (_, reply) = parse_csi(b"\x1b[?25;0$y");
        assert_eq!(private_mode(&reply.unwrap(), 25), None);
    }

    #[test]
    fn wrong_reply_kind() {
        let (_, reply) = parse_csi(b"\x1b[?25;1$y");
        assert_eq!(cursor_position(&reply.unwrap()), None);
    }
}
