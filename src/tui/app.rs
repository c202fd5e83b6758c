use std::io;
use std::time::Duration;

use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event, KeyEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::{
    core::{
        editor::ModeSwitch,
        session::{SessionController, SessionEvent},
        transcript::HexDumpOptions,
    },
    domain::error::{TermError, TermResult},
};
use super::{
    event::{AppAction, EventHandler},
    state::{mode_label, AppState},
    ui::draw_ui,
};

pub struct App {
    state: AppState,
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    controller: SessionController,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    handler: EventHandler,
    should_quit: bool,
    tick_rate: Duration,
}

impl App {
    pub fn new(controller: SessionController, hex_options: HexDumpOptions) -> TermResult<Self> {
        let events = controller.subscribe();

        enable_raw_mode().map_err(|e| TermError::Tui(e.to_string()))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)
            .map_err(|e| TermError::Tui(e.to_string()))?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).map_err(|e| TermError::Tui(e.to_string()))?;

        Ok(Self {
            state: AppState::new(hex_options),
            terminal,
            controller,
            events,
            handler: EventHandler::new(),
            should_quit: false,
            tick_rate: Duration::from_millis(50),
        })
    }

    pub async fn run(&mut self) -> TermResult<()> {
        info!("Terminal UI started for session {}", self.controller.id());

        // A failed open is reported in the transcript
        if self.controller.connect().await.is_err() {
            self.state.set_status_message("Could not open the line, press F5 to retry");
        }

        loop {
            while let Ok(event) = self.events.try_recv() {
                self.state.apply_event(event);
            }

            self.terminal
                .draw(|f| draw_ui(f, &mut self.state, &self.controller))
                .map_err(|e| TermError::Tui(e.to_string()))?;

            if event::poll(self.tick_rate).map_err(|e| TermError::Tui(e.to_string()))? {
                match event::read().map_err(|e| TermError::Tui(e.to_string()))? {
                    Event::Key(key) if key.kind != KeyEventKind::Release => {
                        if let Some(action) = self.handler.handle_key_event(key, &self.state) {
                            self.perform(action).await;
                        }
                    }
                    Event::Resize(width, height) => {
                        self.state.terminal_size = (width, height);
                    }
                    Event::Paste(text) => {
                        let rejected = self.controller.paste(&text);
                        if rejected > 0 {
                            self.state
                                .set_status_message(format!("{} pasted characters rejected", rejected));
                        }
                    }
                    _ => {}
                }
            }

            if self.should_quit {
                break;
            }
        }

        if let Err(e) = self.controller.disconnect().await {
            warn!("Disconnect on exit failed: {}", e);
        }
        info!("Terminal UI stopped");
        Ok(())
    }

    async fn perform(&mut self, action: AppAction) {
        let result = match action {
            AppAction::Quit => {
                self.should_quit = true;
                Ok(())
            }
            AppAction::ToggleHelp => {
                self.state.toggle_help();
                Ok(())
            }
            AppAction::CycleEncoding => {
                let mode = self.controller.encoding_mode().next();
                if self.controller.set_encoding_mode(mode) == ModeSwitch::Cleared {
                    self.state.set_status_message(format!(
                        "Pending input is not valid {} and was cleared",
                        mode_label(mode)
                    ));
                }
                Ok(())
            }
            AppAction::CycleLineBreak => {
                let next = self.controller.line_break().next();
                self.controller.set_line_break(next);
                Ok(())
            }
            AppAction::CycleViewMode => {
                self.state.cycle_view_mode();
                Ok(())
            }
            AppAction::ToggleConnection => {
                if self.controller.is_connected() {
                    self.controller.disconnect().await
                } else {
                    self.controller.connect().await
                }
            }
            AppAction::ClearTranscript => self.controller.reset(),
            AppAction::ToggleFocus => {
                self.state.toggle_focus();
                Ok(())
            }
            AppAction::Submit => {
                let sent = self.controller.submit().await;
                if sent.is_ok() {
                    self.state.scroll_offset = 0;
                    self.state.clear_status_message();
                }
                sent
            }
            AppAction::ResendSelected => self.controller.resend_selected().await,
            AppAction::HistoryPrevious => {
                self.controller.select_previous_history();
                Ok(())
            }
            AppAction::HistoryNext => {
                self.controller.select_next_history();
                Ok(())
            }
            AppAction::ScrollUp(lines) => {
                self.state.scroll_up(lines);
                Ok(())
            }
            AppAction::ScrollDown(lines) => {
                self.state.scroll_down(lines);
                Ok(())
            }
            AppAction::ToggleHexOffset => {
                self.state.hex_options.offset = !self.state.hex_options.offset;
                Ok(())
            }
            AppAction::ToggleHexBinary => {
                self.state.hex_options.binary = !self.state.hex_options.binary;
                Ok(())
            }
            AppAction::ToggleHexPlainText => {
                self.state.hex_options.plain_text = !self.state.hex_options.plain_text;
                Ok(())
            }
            AppAction::Edit(key) => {
                self.controller.edit(key);
                Ok(())
            }
        };

        if let Err(e) = result {
            let message = match e {
                TermError::NotConnected => "Not connected, press F5 to connect".to_string(),
                other => other.to_string(),
            };
            self.state.set_status_message(message);
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Restore terminal
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        );
        let _ = self.terminal.show_cursor();
    }
}
