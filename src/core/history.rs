//! Deduplicated history of sent payloads, used for resend.

use crate::core::codec::{self, EncodingMode};
use crate::domain::error::{TermError, TermResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A previously sent payload
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Encoding mode active when it was sent
    pub mode: EncodingMode,
    /// Decoded character form of the payload, without line break
    pub text: String,
}

impl HistoryEntry {
    pub fn new(mode: EncodingMode, text: impl Into<String>) -> Self {
        Self {
            mode,
            text: text.into(),
        }
    }

    /// The entry as shown in its own encoding mode.
    /// Character entries are shown without tabs, spaces or line breaks.
    pub fn display(&self) -> String {
        match self.mode {
            EncodingMode::Character => self
                .text
                .chars()
                .filter(|c| !matches!(c, '\t' | ' ' | '\r' | '\n'))
                .collect(),
            mode => codec::chars_to_bytes(&self.text)
                .map(|bytes| codec::encode(mode, &bytes))
                .unwrap_or_default(),
        }
    }

    /// Raw bytes put on the wire when the entry is resent
    pub fn payload(&self) -> TermResult<Vec<u8>> {
        codec::chars_to_bytes(&self.text)
    }
}

/// Ordered resend history.
///
/// No two entries share `(mode, text)`. The cursor is `-1` when nothing is
/// selected and otherwise a valid index. When `limit` is non-zero the oldest
/// entry is evicted once the history is full.
#[derive(Debug, Clone)]
pub struct ResendHistory {
    entries: Vec<HistoryEntry>,
    cursor: isize,
    limit: usize,
}

impl ResendHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: -1,
            limit,
        }
    }

    /// Append `(mode, text)` unless an identical entry exists.
    /// Returns whether an entry was added.
    pub fn try_append(&mut self, mode: EncodingMode, text: impl Into<String>) -> bool {
        let entry = HistoryEntry::new(mode, text);

        if self.entries.contains(&entry) {
            debug!("History already holds {:?}", entry);
            return false;
        }

        if self.limit > 0 && self.entries.len() >= self.limit {
            self.entries.remove(0);
        }

        self.entries.push(entry);
        self.cursor = self.entries.len() as isize - 1;
        true
    }

    pub fn get(&self, index: usize) -> TermResult<&HistoryEntry> {
        self.entries.get(index).ok_or(TermError::IndexOutOfRange {
            index: index as isize,
            len: self.entries.len(),
        })
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn set_cursor(&mut self, index: isize) -> TermResult<()> {
        if index < -1 || index >= self.entries.len() as isize {
            return Err(TermError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        self.cursor = index;
        Ok(())
    }

    /// Entry under the cursor
    pub fn selected(&self) -> Option<&HistoryEntry> {
        usize::try_from(self.cursor)
            .ok()
            .and_then(|index| self.entries.get(index))
    }

    pub fn select_previous(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        } else if !self.entries.is_empty() {
            self.cursor = 0;
        }
    }

    pub fn select_next(&mut self) {
        if self.cursor + 1 < self.entries.len() as isize {
            self.cursor += 1;
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for ResendHistory {
    fn default() -> Self {
        Self::new(0)
    }
}
