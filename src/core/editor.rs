//! Pending outbound text, kept well-formed for the active encoding mode.

use crate::core::codec::{self, EncodingMode};
use tracing::debug;

/// Separator inserted between digit groups
pub const GROUP_SEPARATOR: char = ' ';

/// Editing operation on the pending text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

/// Result of feeding one key to the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Accepted,
    /// Character not allowed in the active mode; text unchanged
    Rejected(char),
}

impl InputOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, InputOutcome::Rejected(_))
    }
}

/// Result of switching the encoding mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSwitch {
    Unchanged,
    Transcoded,
    /// Old text did not decode under the new direction
    Cleared,
}

/// Input line editor.
///
/// In binary and hexadecimal mode the caret is tracked as "number of digits to
/// its left", so it never rests inside a separator and typing across a group
/// boundary skips the inserted space.
#[derive(Debug, Clone)]
pub struct InputEditor {
    content: String,
    /// Caret position in characters
    cursor_position: usize,
    mode: EncodingMode,
}

impl InputEditor {
    pub fn new(mode: EncodingMode) -> Self {
        Self {
            content: String::new(),
            cursor_position: 0,
            mode,
        }
    }

    pub fn apply(&mut self, key: EditKey) -> InputOutcome {
        match key {
            EditKey::Char(c) => return self.insert_char(c),
            EditKey::Backspace => self.delete_char(),
            EditKey::Delete => self.delete_char_forward(),
            EditKey::Left => self.move_cursor_left(),
            EditKey::Right => self.move_cursor_right(),
            EditKey::Home => self.move_to_start(),
            EditKey::End => self.move_to_end(),
        }
        InputOutcome::Accepted
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    pub fn mode(&self) -> EncodingMode {
        self.mode
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor_position = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    /// Take the pending text, leaving the editor empty
    pub fn take(&mut self) -> String {
        self.cursor_position = 0;
        std::mem::take(&mut self.content)
    }

    pub fn insert_char(&mut self, c: char) -> InputOutcome {
        let Some(group) = self.mode.group_size() else {
            let index = self.byte_index(self.cursor_position);
            self.content.insert(index, c);
            self.cursor_position += 1;
            return InputOutcome::Accepted;
        };

        if !self.mode.accepts(c) {
            debug!("Rejected {:?} in {} mode", c, self.mode);
            return InputOutcome::Rejected(c);
        }

        let before = self.digits_before_cursor();
        let mut digits = self.digits();
        digits.insert(before, c.to_ascii_uppercase());
        self.regroup(&digits, before + 1, group);
        InputOutcome::Accepted
    }

    /// Insert each character of `text`; returns the rejected characters in order.
    /// Whitespace is skipped in the grouped modes.
    pub fn insert_str(&mut self, text: &str) -> Vec<char> {
        let grouped = self.mode.group_size().is_some();
        text.chars()
            .filter(|c| !(grouped && c.is_whitespace()))
            .filter_map(|c| match self.insert_char(c) {
                InputOutcome::Rejected(c) => Some(c),
                InputOutcome::Accepted => None,
            })
            .collect()
    }

    /// Switch mode, transcoding the pending text to the same bytes in the new mode
    pub fn set_mode(&mut self, mode: EncodingMode) -> ModeSwitch {
        if mode == self.mode {
            return ModeSwitch::Unchanged;
        }

        let previous = self.mode;
        self.mode = mode;

        match codec::transcode(previous, mode, &self.content) {
            Ok(text) => {
                self.content = text;
                self.cursor_position = self.len();
                ModeSwitch::Transcoded
            }
            Err(e) => {
                debug!("Pending text cleared on switch {} -> {}: {}", previous, mode, e);
                self.clear();
                ModeSwitch::Cleared
            }
        }
    }

    fn delete_char(&mut self) {
        match self.mode.group_size() {
            None => {
                if self.cursor_position > 0 {
                    self.cursor_position -= 1;
                    let index = self.byte_index(self.cursor_position);
                    self.content.remove(index);
                }
            }
            Some(group) => {
                let before = self.digits_before_cursor();
                if before > 0 {
                    let mut digits = self.digits();
                    digits.remove(before - 1);
                    self.regroup(&digits, before - 1, group);
                }
            }
        }
    }

    fn delete_char_forward(&mut self) {
        match self.mode.group_size() {
            None => {
                if self.cursor_position < self.len() {
                    let index = self.byte_index(self.cursor_position);
                    self.content.remove(index);
                }
            }
            Some(group) => {
                let before = self.digits_before_cursor();
                let mut digits = self.digits();
                if before < digits.len() {
                    digits.remove(before);
                    self.regroup(&digits, before, group);
                }
            }
        }
    }

    fn move_cursor_left(&mut self) {
        match self.mode.group_size() {
            None => self.cursor_position = self.cursor_position.saturating_sub(1),
            Some(group) => {
                let before = self.digits_before_cursor();
                self.cursor_position = caret_after(before.saturating_sub(1), group);
            }
        }
    }

    fn move_cursor_right(&mut self) {
        match self.mode.group_size() {
            None => {
                if self.cursor_position < self.len() {
                    self.cursor_position += 1;
                }
            }
            Some(group) => {
                let before = self.digits_before_cursor();
                let total = self.digits().len();
                self.cursor_position = caret_after((before + 1).min(total), group);
            }
        }
    }

    fn move_to_start(&mut self) {
        self.cursor_position = 0;
    }

    fn move_to_end(&mut self) {
        self.cursor_position = self.len();
    }

    fn digits(&self) -> String {
        self.content.chars().filter(|c| !c.is_whitespace()).collect()
    }

    fn digits_before_cursor(&self) -> usize {
        self.content
            .chars()
            .take(self.cursor_position)
            .filter(|c| !c.is_whitespace())
            .count()
    }

    fn regroup(&mut self, digits: &str, digits_before_caret: usize, group: usize) {
        self.content = group_digits(digits, group);
        self.cursor_position = caret_after(digits_before_caret, group);
    }

    fn byte_index(&self, char_position: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_position)
            .map(|(index, _)| index)
            .unwrap_or(self.content.len())
    }
}

impl Default for InputEditor {
    fn default() -> Self {
        Self::new(EncodingMode::default())
    }
}

impl std::fmt::Display for InputEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

/// Split `digits` into groups of `group` joined by single separators
pub fn group_digits(digits: &str, group: usize) -> String {
    let mut output = String::with_capacity(digits.len() + digits.len() / group.max(1));
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && i % group == 0 {
            output.push(GROUP_SEPARATOR);
        }
        output.push(c);
    }
    output
}

/// Caret index in grouped text with `digits` digits to its left
fn caret_after(digits: usize, group: usize) -> usize {
    if digits == 0 {
        0
    } else {
        digits + (digits - 1) / group
    }
}
