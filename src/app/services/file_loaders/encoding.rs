//! Text decoding and line splitting
//!
//! Instrument software writes text in a handful of legacy encodings. PMD files
//! come from DOS-era programs and use code page 437; JR6 files are plain ASCII.
//! Everything else is read as UTF-8, falling back to ISO-8859-1 for files that
//! are not valid UTF-8.

use codepage_437::{CP437_CONTROL, FromCp437};

/// Character encoding used to decode a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// IBM PC code page 437
    Cp437,
    /// 7-bit ASCII; other bytes become U+FFFD
    Ascii,
    /// UTF-8, or ISO-8859-1 if the bytes are not valid UTF-8
    Default,
}

/// Decode raw file contents to text
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> String {
    match encoding {
        TextEncoding::Cp437 => String::from_cp437(bytes.to_vec(), &CP437_CONTROL),
        TextEncoding::Ascii => bytes
            .iter()
            .map(|&b| {
                if b < 0x80 {
                    char::from(b)
                } else {
                    char::REPLACEMENT_CHARACTER
                }
            })
            .collect(),
        TextEncoding::Default => match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
        },
    }
}

/// Split text into lines, accepting `\n`, `\r\n` and bare `\r` terminators.
///
/// A terminator at the very end does not produce a trailing empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Substring by character positions, clamped to the string length
pub fn char_slice(s: &str, start: usize, end: Option<usize>) -> String {
    let chars = s.chars().skip(start);
    match end {
        Some(end) => chars.take(end.saturating_sub(start)).collect(),
        None => chars.collect(),
    }
}
