use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::editor::EditKey;

use super::{
    input::edit_key,
    state::{AppState, Focus},
};

const PAGE_LINES: usize = 10;

/// Action requested by a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    ToggleHelp,
    CycleEncoding,
    CycleLineBreak,
    CycleViewMode,
    ToggleConnection,
    ClearTranscript,
    ToggleFocus,
    Submit,
    ResendSelected,
    HistoryPrevious,
    HistoryNext,
    ScrollUp(usize),
    ScrollDown(usize),
    ToggleHexOffset,
    ToggleHexBinary,
    ToggleHexPlainText,
    Edit(EditKey),
}

pub struct EventHandler;

impl EventHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent, state: &AppState) -> Option<AppAction> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppAction::Quit);
        }

        // Help popup swallows everything except its own toggles
        if state.show_help {
            return match key.code {
                KeyCode::F(1) | KeyCode::Esc => Some(AppAction::ToggleHelp),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Esc => Some(AppAction::Quit),
            KeyCode::F(1) => Some(AppAction::ToggleHelp),
            KeyCode::F(2) => Some(AppAction::CycleEncoding),
            KeyCode::F(3) => Some(AppAction::CycleLineBreak),
            KeyCode::F(4) => Some(AppAction::CycleViewMode),
            KeyCode::F(5) => Some(AppAction::ToggleConnection),
            KeyCode::F(6) => Some(AppAction::ClearTranscript),
            KeyCode::F(7) => Some(AppAction::ToggleHexOffset),
            KeyCode::F(8) => Some(AppAction::ToggleHexBinary),
            KeyCode::F(9) => Some(AppAction::ToggleHexPlainText),
            KeyCode::Tab | KeyCode::BackTab => Some(AppAction::ToggleFocus),
            KeyCode::PageUp => Some(AppAction::ScrollUp(PAGE_LINES)),
            KeyCode::PageDown => Some(AppAction::ScrollDown(PAGE_LINES)),
            _ => match state.focus {
                Focus::Input => self.handle_input_focus(key),
                Focus::History => self.handle_history_focus(key),
            },
        }
    }

    fn handle_input_focus(&self, key: KeyEvent) -> Option<AppAction> {
        match key.code {
            KeyCode::Enter => Some(AppAction::Submit),
            KeyCode::Up => Some(AppAction::ScrollUp(1)),
            KeyCode::Down => Some(AppAction::ScrollDown(1)),
            _ => edit_key(&key).map(AppAction::Edit),
        }
    }

    fn handle_history_focus(&self, key: KeyEvent) -> Option<AppAction> {
        match key.code {
            KeyCode::Enter => Some(AppAction::ResendSelected),
            KeyCode::Up | KeyCode::Char('k') => Some(AppAction::HistoryPrevious),
            KeyCode::Down | KeyCode::Char('j') => Some(AppAction::HistoryNext),
            _ => None,
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transcript::HexDumpOptions;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_function_keys() {
        let handler = EventHandler::new();
        let state = AppState::new(HexDumpOptions::default());

        assert_eq!(handler.handle_key_event(press(KeyCode::F(2)), &state), Some(AppAction::CycleEncoding));
        assert_eq!(handler.handle_key_event(press(KeyCode::F(5)), &state), Some(AppAction::ToggleConnection));
        assert_eq!(handler.handle_key_event(press(KeyCode::Esc), &state), Some(AppAction::Quit));
    }

    #[test]
    fn test_enter_depends_on_focus() {
        let handler = EventHandler::new();
        let mut state = AppState::new(HexDumpOptions::default());

        assert_eq!(handler.handle_key_event(press(KeyCode::Enter), &state), Some(AppAction::Submit));
        state.toggle_focus();
        assert_eq!(
            handler.handle_key_event(press(KeyCode::Enter), &state),
            Some(AppAction::ResendSelected)
        );
        assert_eq!(
            handler.handle_key_event(press(KeyCode::Char('a')), &state),
            None
        );
    }

    #[test]
    fn test_typing_goes_to_editor() {
        let handler = EventHandler::new();
        let state = AppState::new(HexDumpOptions::default());
        assert_eq!(
            handler.handle_key_event(press(KeyCode::Char('x')), &state),
            Some(AppAction::Edit(EditKey::Char('x')))
        );
    }

    #[test]
    fn test_help_popup_swallows_keys() {
        let handler = EventHandler::new();
        let mut state = AppState::new(HexDumpOptions::default());
        state.toggle_help();

        assert_eq!(handler.handle_key_event(press(KeyCode::Char('x')), &state), None);
        assert_eq!(handler.handle_key_event(press(KeyCode::Esc), &state), Some(AppAction::ToggleHelp));

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handler.handle_key_event(ctrl_c, &state), Some(AppAction::Quit));
    }
}
