//! ATCL encoder/decoder.
//!
//! # Command format
//!
//! ```text
//! !<opcode><args>;
//! ```
//!
//! - `opcode`: four ASCII letters grouped by subsystem (e.g. `CGra`, `RStr`).
//! - `args`: free-form ASCII, possibly empty.
//! - The one exception is ENTER, a single raw `0xB1` byte that wakes the
//!   command interpreter.
//!
//! # Reply format
//!
//! A reply is one of:
//!
//! - a lone ACK (`0x8F`) or NACK (`0xA5`) byte, with no terminator;
//! - a `;`-terminated ASCII payload, optionally ending in a `%` progress
//!   marker that carries no information;
//! - a `;`-terminated frame whose first byte is one of the async codes
//!   `0x9A`..=`0x9F`.
//!
//! Everything here is pure. [`decode_frame`] looks at a byte buffer and
//! reports whether it holds a complete frame, the same shape as the text
//! decoders elsewhere in the workspace.

use bytes::{BufMut, BytesMut};

/// Handshake byte that puts the controller into ATCL command mode.
pub const ENTER: u8 = 0xB1;
/// Command accepted, nothing to report.
pub const ACK: u8 = 0x8F;
/// Command rejected.
pub const NACK: u8 = 0xA5;
pub const ASYNC_STATUS: u8 = 0x9A;
pub const ASYNC_WARNING: u8 = 0x9B;
pub const ASYNC_ALERT: u8 = 0x9C;
pub const ASYNC_INTERNAL_ERROR: u8 = 0x9D;
/// Sent both asynchronously and in place of a reply to a malformed command.
pub const SYNTAX_ERROR: u8 = 0x9E;
pub const ASYNC_IDLE: u8 = 0x9F;

/// First byte of every command except ENTER.
pub const COMMAND_START: u8 = b'!';
/// Terminates commands and payload replies.
pub const TERMINATOR: u8 = b';';
/// Trailing progress marker on some payloads, e.g. `35%;`.
pub const PROGRESS_MARKER: char = '%';

/// Largest frame accepted before the receive buffer is declared overrun.
pub const MAX_FRAME: usize = 256;

/// Kind of unsolicited notice the controller pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Status,
    Warning,
    Alert,
    InternalError,
    Idle,
}

impl NoticeKind {
    /// Map a leading byte to a notice kind. The syntax-error byte is not a
    /// notice; it is surfaced to the caller.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            ASYNC_STATUS => Some(NoticeKind::Status),
            ASYNC_WARNING => Some(NoticeKind::Warning),
            ASYNC_ALERT => Some(NoticeKind::Alert),
            ASYNC_INTERNAL_ERROR => Some(NoticeKind::InternalError),
            ASYNC_IDLE => Some(NoticeKind::Idle),
            _ => None,
        }
    }
}

/// One classified frame off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Ack,
    Nack,
    /// An unsolicited notice. Never the answer to a command.
    Notice { kind: NoticeKind, text: String },
    SyntaxError(String),
    /// Payload text with `;` and any trailing `%` removed.
    Payload(String),
}

/// Result of attempting to decode one frame from a byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeResult {
    /// A complete frame was decoded.
    Frame {
        frame: Frame,
        /// Number of bytes consumed from the input buffer.
        consumed: usize,
    },

    /// The buffer does not yet contain a complete frame. More data is needed.
    Incomplete,

    /// The buffer holds more than `max_frame` bytes without a terminator.
    /// Carries the offending length.
    Overflow(usize),
}

/// Encode a command as `!<opcode><args>;`.
///
/// ```
/// use atcs_atcl::protocol::encode_command;
///
/// assert_eq!(encode_command("CStr", "12:30:00.0"), b"!CStr12:30:00.0;");
/// assert_eq!(encode_command("AGak", ""), b"!AGak;");
/// ```
pub fn encode_command(opcode: &str, args: &str) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(2 + opcode.len() + args.len());
    buf.put_u8(COMMAND_START);
    buf.put_slice(opcode.as_bytes());
    buf.put_slice(args.as_bytes());
    buf.put_u8(TERMINATOR);
    buf.to_vec()
}

/// The ENTER handshake command.
pub fn encode_enter() -> Vec<u8> {
    vec![ENTER]
}

/// Decode one frame from the front of `buf`.
///
/// ACK and NACK are only recognised as the first byte of a frame; inside a
/// payload they are ordinary data.
pub fn decode_frame(buf: &[u8], max_frame: usize) -> DecodeResult {
    let Some(&first) = buf.first() else {
        return DecodeResult::Incomplete;
    };

    match first {
        ACK => {
            return DecodeResult::Frame {
                frame: Frame::Ack,
                consumed: 1,
            };
        }
        NACK => {
            return DecodeResult::Frame {
                frame: Frame::Nack,
                consumed: 1,
            };
        }
        _ => {}
    }

    let term_pos = match buf.iter().position(|&b| b == TERMINATOR) {
        Some(pos) => pos,
        None if buf.len() > max_frame => return DecodeResult::Overflow(buf.len()),
        None => return DecodeResult::Incomplete,
    };

    let consumed = term_pos + 1;
    if consumed > max_frame {
        return DecodeResult::Overflow(consumed);
    }
    let body = &buf[..term_pos];

    let frame = if let Some(kind) = NoticeKind::from_byte(first) {
        Frame::Notice {
            kind,
            text: text_of(&body[1..]),
        }
    } else if first == SYNTAX_ERROR {
        Frame::SyntaxError(text_of(&body[1..]))
    } else {
        let text = text_of(body);
        let text = text.strip_suffix(PROGRESS_MARKER).unwrap_or(&text);
        Frame::Payload(text.to_string())
    };

    DecodeResult::Frame { frame, consumed }
}

fn text_of(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Render raw bytes for logs: printable ASCII as-is, anything else as `<XX>`.
pub fn describe(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if b.is_ascii_graphic() || b == b' ' {
            out.push(b as char);
        } else {
            out.push_str(&format!("<{b:02X}>"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // encode
    // -----------------------------------------------------------------------

    #[test]
    fn encode_with_args() {
        assert_eq!(encode_command("RStr", "Sidereal"), b"!RStrSidereal;");
        assert_eq!(encode_command("CStd", "-12:30:00"), b"!CStd-12:30:00;");
    }

    #[test]
    fn encode_enter_is_single_byte() {
        assert_eq!(encode_enter(), vec![0xB1]);
    }

    // -----------------------------------------------------------------------
    // decode_frame
    // -----------------------------------------------------------------------

    #[test]
    fn decode_empty_incomplete() {
        assert_eq!(decode_frame(b"", MAX_FRAME), DecodeResult::Incomplete);
    }

    #[test]
    fn decode_ack_and_nack() {
        assert_eq!(
            decode_frame(&[ACK, b'x'], MAX_FRAME),
            DecodeResult::Frame {
                frame: Frame::Ack,
                consumed: 1
            }
        );
        assert_eq!(
            decode_frame(&[NACK], MAX_FRAME),
            DecodeResult::Frame {
                frame: Frame::Nack,
                consumed: 1
            }
        );
    }

    #[test]
    fn decode_payload_strips_terminator() {
        assert_eq!(
            decode_frame(b"Complete;", MAX_FRAME),
            DecodeResult::Frame {
                frame: Frame::Payload("Complete".into()),
                consumed: 9
            }
        );
    }

    #[test]
    fn decode_payload_strips_progress_marker() {
        assert_eq!(
            decode_frame(b"35%;", MAX_FRAME),
            DecodeResult::Frame {
                frame: Frame::Payload("35".into()),
                consumed: 4
            }
        );
    }

    #[test]
    fn decode_payload_without_terminator_incomplete() {
        assert_eq!(decode_frame(b"12:30:0", MAX_FRAME), DecodeResult::Incomplete);
    }

    #[test]
    fn decode_empty_payload() {
        assert_eq!(
            decode_frame(b";", MAX_FRAME),
            DecodeResult::Frame {
                frame: Frame::Payload(String::new()),
                consumed: 1
            }
        );
    }

    #[test]
    fn decode_notice() {
        let mut buf = vec![ASYNC_STATUS];
        buf.extend_from_slice(b"ignore;35%;");
        assert_eq!(
            decode_frame(&buf, MAX_FRAME),
            DecodeResult::Frame {
                frame: Frame::Notice {
                    kind: NoticeKind::Status,
                    text: "ignore".into()
                },
                consumed: 8
            }
        );
    }

    #[test]
    fn decode_each_notice_kind() {
        for (b, kind) in [
            (ASYNC_STATUS, NoticeKind::Status),
            (ASYNC_WARNING, NoticeKind::Warning),
            (ASYNC_ALERT, NoticeKind::Alert),
            (ASYNC_INTERNAL_ERROR, NoticeKind::InternalError),
            (ASYNC_IDLE, NoticeKind::Idle),
        ] {
            match decode_frame(&[b, b'x', b';'], MAX_FRAME) {
                DecodeResult::Frame {
                    frame: Frame::Notice { kind: k, .. },
                    ..
                } => assert_eq!(k, kind),
                other => panic!("expected notice for {b:02X}, got {other:?}"),
            }
        }
    }

    #[test]
    fn decode_syntax_error() {
        let mut buf = vec![SYNTAX_ERROR];
        buf.extend_from_slice(b"Unknown command;");
        assert_eq!(
            decode_frame(&buf, MAX_FRAME),
            DecodeResult::Frame {
                frame: Frame::SyntaxError("Unknown command".into()),
                consumed: 17
            }
        );
    }

    #[test]
    fn decode_ack_inside_payload_is_data() {
        let buf = [b'A', ACK, b'B', b';'];
        match decode_frame(&buf, MAX_FRAME) {
            DecodeResult::Frame {
                frame: Frame::Payload(_),
                consumed,
            } => assert_eq!(consumed, 4),
            other => panic!("expected payload, got {other:?}"),
        }
    }

    #[test]
    fn decode_overflow_without_terminator() {
        let buf = vec![b'A'; 300];
        assert_eq!(decode_frame(&buf, MAX_FRAME), DecodeResult::Overflow(300));
    }

    #[test]
    fn decode_overflow_long_terminated_frame() {
        let mut buf = vec![b'A'; 20];
        buf.push(b';');
        assert_eq!(decode_frame(&buf, 16), DecodeResult::Overflow(21));
    }

    #[test]
    fn decode_exactly_max_frame_ok() {
        let mut buf = vec![b'A'; 15];
        buf.push(b';');
        assert!(matches!(
            decode_frame(&buf, 16),
            DecodeResult::Frame { consumed: 16, .. }
        ));
    }

    #[test]
    fn describe_bytes() {
        assert_eq!(describe(&[ENTER]), "<B1>");
        assert_eq!(describe(b"!AGak;"), "!AGak;");
    }
}
