use crate::core::editor::EditKey;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Map a terminal key press onto an editor operation
pub fn edit_key(key: &KeyEvent) -> Option<EditKey> {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            Some(EditKey::Char(c))
        }
        KeyCode::Backspace => Some(EditKey::Backspace),
        KeyCode::Delete => Some(EditKey::Delete),
        KeyCode::Left => Some(EditKey::Left),
        KeyCode::Right => Some(EditKey::Right),
        KeyCode::Home => Some(EditKey::Home),
        KeyCode::End => Some(EditKey::End),
        _ => None,
    }
}
