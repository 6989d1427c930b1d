//! Plain-text decoding.
//!
//! Input files are normalized to a `String`: a UTF-8 BOM is dropped, UTF-16
//! is recognized by its BOM, and anything else is read as UTF-8 with invalid
//! sequences replaced by U+FFFD. Output is always written as UTF-8.

use tracing::warn;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Decode raw file bytes into text.
pub fn decode_text(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    if let Some(rest) = bytes.strip_prefix(UTF16LE_BOM) {
        return decode_utf16(rest, u16::from_le_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(UTF16BE_BOM) {
        return decode_utf16(rest, u16::from_be_bytes);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(e) => {
            warn!(valid_up_to = e.valid_up_to(), "input is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let pairs = bytes.chunks_exact(2);
    let dangling = !pairs.remainder().is_empty();

    let mut text: String = char::decode_utf16(pairs.map(|pair| unit([pair[0], pair[1]])))
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    if dangling {
        warn!("UTF-16 input has an odd trailing byte");
        text.push(char::REPLACEMENT_CHARACTER);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_utf8() {
        assert_eq!(decode_text("héllo".as_bytes()), "héllo");
    }

    #[test]
    fn test_utf8_bom_stripped() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFabc"), "abc");
    }

    #[test]
    fn test_utf16_le_and_be() {
        assert_eq!(decode_text(&[0xFF, 0xFE, b'h', 0, b'i', 0]), "hi");
        assert_eq!(decode_text(&[0xFE, 0xFF, 0, b'h', 0, b'i']), "hi");
    }

    #[test]
    fn test_utf16_odd_trailing_byte_is_replaced() {
        assert_eq!(decode_text(&[0xFF, 0xFE, b'h', 0, b'i']), "h\u{FFFD}");
        assert_eq!(decode_text(&[0xFE, 0xFF, 0, b'h', 0]), "h\u{FFFD}");
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        assert_eq!(decode_text(b"a\xFFb"), "a\u{FFFD}b");
    }
}
