//! Conversions between raw bytes and the three textual encodings.
//!
//! Bytes map to characters one to one using ISO-8859-1 (the byte value is the
//! code point), so every byte sequence has a character form and every string
//! made of characters up to U+00FF has a byte form. Characters above U+00FF
//! are rejected with [`TermError::InvalidEncoding`] instead of being truncated.
//!
//! Decoding binary or hexadecimal text strips all whitespace first. A final
//! incomplete group is right-padded with zeros (`0` bits for binary, one `0`
//! nibble for hexadecimal). The padding is lossy when the input length is not
//! a multiple of the group size: `"0100001"` decodes to the same byte as
//! `"01000010"`.

use crate::domain::error::{TermError, TermResult};
use serde::{Deserialize, Serialize};

/// Digits per binary group
pub const BIN_GROUP: usize = 8;
/// Digits per hexadecimal group
pub const HEX_GROUP: usize = 2;

/// How pending text maps to bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingMode {
    #[default]
    Character,
    Binary,
    Hexadecimal,
}

impl EncodingMode {
    pub const ALL: [EncodingMode; 3] = [
        EncodingMode::Character,
        EncodingMode::Binary,
        EncodingMode::Hexadecimal,
    ];

    /// Group width for digit modes, `None` for character mode
    pub fn group_size(&self) -> Option<usize> {
        match self {
            EncodingMode::Character => None,
            EncodingMode::Binary => Some(BIN_GROUP),
            EncodingMode::Hexadecimal => Some(HEX_GROUP),
        }
    }

    /// Whether `c` may appear in pending text of this mode
    pub fn accepts(&self, c: char) -> bool {
        match self {
            EncodingMode::Character => true,
            EncodingMode::Binary => c == '0' || c == '1',
            EncodingMode::Hexadecimal => c.is_ascii_hexdigit(),
        }
    }

    pub fn next(&self) -> Self {
        match self {
            EncodingMode::Character => EncodingMode::Binary,
            EncodingMode::Binary => EncodingMode::Hexadecimal,
            EncodingMode::Hexadecimal => EncodingMode::Character,
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            EncodingMode::Character => "CHR",
            EncodingMode::Binary => "BIN",
            EncodingMode::Hexadecimal => "HEX",
        }
    }
}

impl std::fmt::Display for EncodingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodingMode::Character => write!(f, "Character"),
            EncodingMode::Binary => write!(f, "Binary"),
            EncodingMode::Hexadecimal => write!(f, "Hexadecimal"),
        }
    }
}

/// Remove every whitespace character
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Character text to bytes, one byte per character
pub fn chars_to_bytes(text: &str) -> TermResult<Vec<u8>> {
    text.chars()
        .map(|c| {
            u8::try_from(u32::from(c)).map_err(|_| {
                TermError::InvalidEncoding(format!(
                    "character {:?} (U+{:04X}) does not fit in a single byte",
                    c,
                    u32::from(c)
                ))
            })
        })
        .collect()
}

/// Bytes to character text, one character per byte
pub fn bytes_to_chars(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Bytes to space separated 8-digit binary groups
pub fn bytes_to_bin(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:08b}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Bytes to space separated upper-case 2-digit hex groups
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Binary digit text to bytes, zero-padding the last group
pub fn bin_to_bytes(bin: &str) -> TermResult<Vec<u8>> {
    let mut digits = strip_whitespace(bin);

    if let Some(bad) = digits.chars().find(|c| *c != '0' && *c != '1') {
        return Err(TermError::InvalidEncoding(format!(
            "{:?} is not a binary digit",
            bad
        )));
    }

    let rest = digits.len() % BIN_GROUP;
    if rest != 0 {
        digits.extend(std::iter::repeat('0').take(BIN_GROUP - rest));
    }

    Ok(digits
        .as_bytes()
        .chunks(BIN_GROUP)
        .map(|group| {
            group
                .iter()
                .fold(0u8, |acc, digit| (acc << 1) | (digit - b'0'))
        })
        .collect())
}

/// Hexadecimal digit text to bytes, zero-padding an odd trailing nibble
pub fn hex_to_bytes(hex: &str) -> TermResult<Vec<u8>> {
    let mut digits = strip_whitespace(hex);

    if digits.len() % HEX_GROUP != 0 {
        digits.push('0');
    }

    hex::decode(&digits)
        .map_err(|e| TermError::InvalidEncoding(format!("invalid hexadecimal text: {}", e)))
}

pub fn char_to_bin(text: &str) -> TermResult<String> {
    Ok(bytes_to_bin(&chars_to_bytes(text)?))
}

pub fn char_to_hex(text: &str) -> TermResult<String> {
    Ok(bytes_to_hex(&chars_to_bytes(text)?))
}

pub fn bin_to_char(bin: &str) -> TermResult<String> {
    Ok(bytes_to_chars(&bin_to_bytes(bin)?))
}

pub fn bin_to_hex(bin: &str) -> TermResult<String> {
    Ok(bytes_to_hex(&bin_to_bytes(bin)?))
}

pub fn hex_to_char(hex: &str) -> TermResult<String> {
    Ok(bytes_to_chars(&hex_to_bytes(hex)?))
}

pub fn hex_to_bin(hex: &str) -> TermResult<String> {
    Ok(bytes_to_bin(&hex_to_bytes(hex)?))
}

/// Text of the given mode to raw bytes
pub fn decode(mode: EncodingMode, text: &str) -> TermResult<Vec<u8>> {
    match mode {
        EncodingMode::Character => chars_to_bytes(text),
        EncodingMode::Binary => bin_to_bytes(text),
        EncodingMode::Hexadecimal => hex_to_bytes(text),
    }
}

/// Raw bytes to the text of the given mode
pub fn encode(mode: EncodingMode, bytes: &[u8]) -> String {
    match mode {
        EncodingMode::Character => bytes_to_chars(bytes),
        EncodingMode::Binary => bytes_to_bin(bytes),
        EncodingMode::Hexadecimal => bytes_to_hex(bytes),
    }
}

/// Re-express `text` from one mode in another.
pub fn transcode(from: EncodingMode, to: EncodingMode, text: &str) -> TermResult<String> {
    use EncodingMode::*;

    match (from, to) {
        (Character, Binary) => char_to_bin(text),
        (Character, Hexadecimal) => char_to_hex(text),
        (Binary, Character) => bin_to_char(text),
        (Binary, Hexadecimal) => bin_to_hex(text),
        (Hexadecimal, Character) => hex_to_char(text),
        (Hexadecimal, Binary) => hex_to_bin(text),
        (Character, Character) | (Binary, Binary) | (Hexadecimal, Hexadecimal) => {
            Ok(text.to_string())
        }
    }
}
