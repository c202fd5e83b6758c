use crate::core::codec::EncodingMode;
use crate::core::session::{LineSignals, SessionEvent};
use crate::core::transcript::{HexDumpOptions, Transcript};

/// Panel receiving key input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    History,
}

/// Transcript presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Both,
    PlainText,
    Hex,
}

impl ViewMode {
    pub fn next(&self) -> Self {
        match self {
            ViewMode::Both => ViewMode::PlainText,
            ViewMode::PlainText => ViewMode::Hex,
            ViewMode::Hex => ViewMode::Both,
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewMode::Both => write!(f, "Both"),
            ViewMode::PlainText => write!(f, "Plain text"),
            ViewMode::Hex => write!(f, "Hex"),
        }
    }
}

/// UI state mirrored from session events
#[derive(Debug)]
pub struct AppState {
    pub focus: Focus,
    pub view_mode: ViewMode,
    pub hex_options: HexDumpOptions,
    pub transcript: Transcript,
    pub connected: bool,
    pub signals: LineSignals,
    /// Lines scrolled back from the end of the transcript
    pub scroll_offset: usize,
    pub terminal_size: (u16, u16),
    pub status_message: Option<String>,
    pub show_help: bool,
}

impl AppState {
    pub fn new(hex_options: HexDumpOptions) -> Self {
        Self {
            focus: Focus::Input,
            view_mode: ViewMode::Both,
            hex_options,
            transcript: Transcript::new(),
            connected: false,
            signals: LineSignals::default(),
            scroll_offset: 0,
            terminal_size: (80, 24),
            status_message: Some("Welcome to SerialTerm! Press F1 for help.".to_string()),
            show_help: false,
        }
    }

    /// Fold one session event into the view
    pub fn apply_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Appended { direction, text } => {
                self.transcript.append(direction, &text);
            }
            SessionEvent::TranscriptReset => {
                self.transcript.reset();
                self.scroll_offset = 0;
            }
            SessionEvent::ConnectionChanged(connected) => {
                self.connected = connected;
                if !connected {
                    self.signals = LineSignals::default();
                }
                self.set_status_message(if connected { "Connected" } else { "Disconnected" });
            }
            SessionEvent::HistoryChanged => {}
            SessionEvent::InputRejected(c) => {
                self.set_status_message(format!("'{}' is not valid input here", c.escape_default()));
            }
            SessionEvent::EncodingChanged(mode) => {
                self.set_status_message(format!("Encoding: {}", mode_label(mode)));
            }
            SessionEvent::LineBreakChanged(line_break) => {
                self.set_status_message(format!("Line break: {}", line_break));
            }
            SessionEvent::SignalsChanged(signals) => {
                self.signals = signals;
            }
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input => Focus::History,
            Focus::History => Focus::Input,
        };
    }

    pub fn cycle_view_mode(&mut self) {
        self.view_mode = self.view_mode.next();
        self.set_status_message(format!("View: {}", self.view_mode));
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status_message(&mut self) {
        self.status_message = None;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}

pub fn mode_label(mode: EncodingMode) -> &'static str {
    match mode {
        EncodingMode::Character => "Character",
        EncodingMode::Binary => "Binary",
        EncodingMode::Hexadecimal => "Hexadecimal",
    }
}
