//! Newline-delimited framing for the stdio transport.
//!
//! Lines are collected as raw bytes and decoded once complete, so a
//! multi-byte character split across two reads of the underlying buffer is
//! never mistaken for bad input.

use std::io::{self, BufRead};

/// One unit read off the input stream.
#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
    /// A complete line without its `\n` (or `\r\n`) terminator.
    Line(String),
    /// A line longer than the limit. Its bytes were consumed and dropped.
    Oversized { len: usize },
    /// A line that is not valid UTF-8.
    NotUtf8 { valid_up_to: usize },
    /// The stream is exhausted.
    Eof,
}

/// Read the next line of at most `max_bytes` (terminator included).
///
/// `buf` is scratch space reused between calls. A final line without a
/// terminator is still returned as a [`Frame::Line`].
pub fn read_frame(
    reader: &mut impl BufRead,
    buf: &mut Vec<u8>,
    max_bytes: usize,
) -> io::Result<Frame> {
    buf.clear();
    let mut len = 0usize;
    let mut started = false;

    loop {
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            break;
        }
        started = true;

        let (take, terminated) = match available.iter().position(|&b| b == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (available.len(), false),
        };
        len += take;
        if len <= max_bytes {
            buf.extend_from_slice(&available[..take]);
        }
        reader.consume(take);
        if terminated {
            break;
        }
    }

    if !started {
        return Ok(Frame::Eof);
    }
    if len > max_bytes {
        buf.clear();
        return Ok(Frame::Oversized { len });
    }

    let bytes: &[u8] = buf;
    let line = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    match std::str::from_utf8(line) {
        Ok(text) => Ok(Frame::Line(text.to_owned())),
        Err(e) => Ok(Frame::NotUtf8 {
            valid_up_to: e.valid_up_to(),
        }),
    }
}
