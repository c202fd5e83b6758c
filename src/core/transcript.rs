//! Chronological transcript of everything sent and received on the line.

use crate::core::codec;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Origin of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Sent,
    Received,
    /// Diagnostic text reported on the receive side
    Error,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Sent => write!(f, "sent"),
            Direction::Received => write!(f, "received"),
            Direction::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub timestamp: SystemTime,
    pub direction: Direction,
    pub text: String,
}

/// Columns shown by [`Transcript::hex_dump`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexDumpOptions {
    #[serde(default = "default_true")]
    pub offset: bool,
    #[serde(default)]
    pub binary: bool,
    #[serde(default = "default_true")]
    pub plain_text: bool,
    #[serde(default = "default_bytes_per_row")]
    pub bytes_per_row: usize,
}

fn default_true() -> bool {
    true
}

fn default_bytes_per_row() -> usize {
    16
}

impl Default for HexDumpOptions {
    fn default() -> Self {
        Self {
            offset: true,
            binary: false,
            plain_text: true,
            bytes_per_row: default_bytes_per_row(),
        }
    }
}

/// Append-only session buffer.
///
/// `content` is the single growing blob; `entries` keeps the same text split
/// per append with its direction.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    content: String,
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text` and return the full transcript
    pub fn append(&mut self, direction: Direction, text: &str) -> &str {
        self.content.push_str(text);
        self.entries.push(TranscriptEntry {
            timestamp: SystemTime::now(),
            direction,
            text: text.to_string(),
        });
        &self.content
    }

    pub fn reset(&mut self) {
        self.content.clear();
        self.entries.clear();
    }

    pub fn snapshot(&self) -> String {
        self.content.clone()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Transcript as raw bytes, one byte per character.
    /// Error diagnostics may hold wider characters; those become `?`.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.content
            .chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect()
    }

    pub fn hex_dump(&self, options: &HexDumpOptions) -> Vec<String> {
        hex_dump(&self.to_bytes(), options)
    }
}

/// Render `bytes` as hex dump rows
pub fn hex_dump(bytes: &[u8], options: &HexDumpOptions) -> Vec<String> {
    let width = options.bytes_per_row.max(1);

    bytes
        .chunks(width)
        .enumerate()
        .map(|(row, chunk)| {
            let mut columns = Vec::with_capacity(4);

            if options.offset {
                columns.push(format!("{:08X}", row * width));
            }

            let hex = codec::bytes_to_hex(chunk);
            columns.push(format!("{:<w$}", hex, w = width * 3 - 1));

            if options.binary {
                let bin = codec::bytes_to_bin(chunk);
                columns.push(format!("{:<w$}", bin, w = width * 9 - 1));
            }

            if options.plain_text {
                let plain: String = chunk
                    .iter()
                    .map(|&b| {
                        if b.is_ascii_graphic() || b == b' ' {
                            char::from(b)
                        } else {
                            '.'
                        }
                    })
                    .collect();
                columns.push(plain);
            }

            columns.join("  ").trim_end().to_string()
        })
        .collect()
}
