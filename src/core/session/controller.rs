use crate::core::codec::{self, EncodingMode};
use crate::core::editor::{EditKey, InputEditor, InputOutcome, ModeSwitch};
use crate::core::history::ResendHistory;
use crate::core::linebreak::{LineBreak, PLATFORM_LINE_BREAK};
use crate::core::session::transport::{Connection, LineSignals, Link, LinkEvent, Transport};
use crate::core::transcript::{Direction, HexDumpOptions, Transcript, TranscriptEntry};
use crate::domain::config::{SerialConfig, TerminalConfig};
use crate::domain::error::{TermError, TermResult};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot, watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Change notification published by a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Text was appended to the transcript
    Appended { direction: Direction, text: String },
    TranscriptReset,
    ConnectionChanged(bool),
    HistoryChanged,
    /// The editor refused a character
    InputRejected(char),
    EncodingChanged(EncodingMode),
    LineBreakChanged(LineBreak),
    SignalsChanged(LineSignals),
}

/// Work item for the updater task, the only writer of the transcript
enum Update {
    Append {
        direction: Direction,
        text: String,
        /// Connection generation the text belongs to, `None` for local text
        generation: Option<u64>,
    },
    Reset,
    Flush(oneshot::Sender<()>),
}

#[derive(Debug, Default)]
struct LinkState {
    connected: AtomicBool,
    generation: AtomicU64,
}

/// Fan-out of session events to every live subscriber
#[derive(Clone, Default)]
struct EventHub {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<SessionEvent>>>>,
}

impl EventHub {
    fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    fn publish(&self, event: SessionEvent) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }
}

/// Cloneable entry point for inbound data.
///
/// Can be used from any task or thread. Chunks are queued in arrival order and
/// tagged with the current connection generation; chunks that belong to a
/// connection closed before they were applied are discarded.
#[derive(Clone)]
pub struct ReceiveHandle {
    state: Arc<LinkState>,
    line_break: watch::Receiver<LineBreak>,
    updates: mpsc::UnboundedSender<Update>,
}

impl ReceiveHandle {
    /// Queue `data` (plus the active line break) for the transcript
    pub fn receive(&self, data: &[u8]) -> TermResult<()> {
        let mut text = codec::bytes_to_chars(data);
        text.push_str(self.line_break.borrow().as_str());
        self.queue(Direction::Received, text)?;
        debug!("Queued {} received bytes", data.len());
        Ok(())
    }

    /// Queue a read side diagnostic
    pub fn report_error(&self, message: &str) -> TermResult<()> {
        self.queue(Direction::Error, format!("{}{}", message, PLATFORM_LINE_BREAK))
    }

    fn queue(&self, direction: Direction, text: String) -> TermResult<()> {
        // Generation first: a disconnect racing with this call either fails
        // the connected check or leaves the chunk with a stale generation.
        let generation = self.state.generation.load(Ordering::SeqCst);
        if !self.state.connected.load(Ordering::SeqCst) {
            return Err(TermError::NotConnected);
        }

        self.updates
            .send(Update::Append {
                direction,
                text,
                generation: Some(generation),
            })
            .map_err(|_| TermError::Session {
                message: "session updater has stopped".to_string(),
            })
    }
}

/// Terminal session engine.
///
/// Owns the editor, the resend history and the line to the transport. All
/// transcript mutation is serialized through a single updater task; readers
/// get snapshots.
pub struct SessionController {
    id: Uuid,
    config: SerialConfig,
    encoding: EncodingMode,
    line_break: watch::Sender<LineBreak>,
    editor: InputEditor,
    history: ResendHistory,
    transport: Arc<dyn Transport>,
    link: Option<Box<dyn Link>>,
    pump: Option<JoinHandle<()>>,
    signals: watch::Receiver<LineSignals>,
    state: Arc<LinkState>,
    receiver: ReceiveHandle,
    transcript: Arc<RwLock<Transcript>>,
    updater: JoinHandle<()>,
    events: EventHub,
}

impl SessionController {
    /// Create a disconnected session. Must be called within a tokio runtime.
    pub fn new(transport: Arc<dyn Transport>, config: SerialConfig, terminal: &TerminalConfig) -> Self {
        let id = Uuid::new_v4();
        let state = Arc::new(LinkState::default());
        let transcript = Arc::new(RwLock::new(Transcript::new()));
        let events = EventHub::default();
        let (line_break, line_break_rx) = watch::channel(terminal.line_break);
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();

        let updater = tokio::spawn(run_updater(
            updates_rx,
            Arc::clone(&transcript),
            Arc::clone(&state),
            events.clone(),
        ));

        info!("Created session {} for {}", id, config.summary());

        Self {
            id,
            config,
            encoding: terminal.encoding,
            line_break,
            editor: InputEditor::new(terminal.encoding),
            history: ResendHistory::new(terminal.history_limit),
            transport,
            link: None,
            pump: None,
            signals: watch::channel(LineSignals::default()).1,
            receiver: ReceiveHandle {
                state: Arc::clone(&state),
                line_break: line_break_rx,
                updates: updates_tx,
            },
            state,
            transcript,
            updater,
            events,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    /// Replace the line settings. Only allowed while disconnected.
    pub fn set_config(&mut self, config: SerialConfig) -> TermResult<()> {
        if self.is_connected() {
            return Err(TermError::Session {
                message: "cannot change line settings while connected".to_string(),
            });
        }
        self.config = config;
        Ok(())
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    pub fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::SeqCst)
    }

    /// Subscribe to session events. Each subscriber sees every event
    /// published after it subscribed, in order.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Open the line.
    ///
    /// On failure the cause is appended to the transcript as an error entry
    /// and the session stays disconnected.
    pub async fn connect(&mut self) -> TermResult<()> {
        if self.is_connected() {
            return Ok(());
        }

        info!(
            "Session {} opening {} via {}",
            self.id,
            self.config.summary(),
            self.transport.name()
        );

        let Connection { link, inbound } = match self.transport.open(&self.config).await {
            Ok(connection) => connection,
            Err(e) => {
                let err = TermError::from(e);
                warn!("Session {} failed to open line: {}", self.id, err);
                self.report(&err);
                return Err(err);
            }
        };

        let (signals_tx, signals_rx) = watch::channel(LineSignals::default());
        self.signals = signals_rx;
        self.state.connected.store(true, Ordering::SeqCst);
        self.link = Some(link);
        self.pump = Some(tokio::spawn(run_pump(
            inbound,
            self.receiver.clone(),
            signals_tx,
            self.events.clone(),
        )));

        self.events.publish(SessionEvent::ConnectionChanged(true));
        info!("Session {} connected", self.id);
        Ok(())
    }

    /// Close the line. Inbound chunks not yet applied are dropped.
    pub async fn disconnect(&mut self) -> TermResult<()> {
        if !self.is_connected() {
            return Ok(());
        }

        self.state.connected.store(false, Ordering::SeqCst);
        self.state.generation.fetch_add(1, Ordering::SeqCst);

        if let Some(pump) = self.pump.take() {
            pump.abort();
        }

        let result = match self.link.take() {
            Some(mut link) => link.close().await,
            None => Ok(()),
        };
        if let Err(e) = &result {
            warn!("Session {} failed to close line cleanly: {}", self.id, e);
        }

        self.signals = watch::channel(LineSignals::default()).1;
        self.events.publish(SessionEvent::ConnectionChanged(false));
        info!("Session {} disconnected", self.id);
        result
    }

    /// Decode `text` under the active mode, transmit it and record it
    pub async fn send(&mut self, text: &str) -> TermResult<()> {
        if !self.is_connected() {
            return Err(TermError::NotConnected);
        }

        let mode = self.encoding;
        let payload = codec::decode(mode, text)?;
        self.transmit(&payload).await?;

        if self.history.try_append(mode, codec::bytes_to_chars(&payload)) {
            self.events.publish(SessionEvent::HistoryChanged);
        }
        Ok(())
    }

    /// Send the editor's pending text, clearing it on success
    pub async fn submit(&mut self) -> TermResult<()> {
        let text = self.editor.content().to_string();
        self.send(&text).await?;
        self.editor.clear();
        Ok(())
    }

    /// Retransmit history entry `index`. History and cursor are left as is.
    pub async fn resend(&mut self, index: usize) -> TermResult<()> {
        if !self.is_connected() {
            return Err(TermError::NotConnected);
        }

        let payload = self.history.get(index)?.payload()?;
        debug!("Session {} resending history entry {}", self.id, index);
        self.transmit(&payload).await
    }

    pub async fn resend_selected(&mut self) -> TermResult<()> {
        let cursor = self.history.cursor();
        let index = usize::try_from(cursor).map_err(|_| TermError::IndexOutOfRange {
            index: cursor,
            len: self.history.len(),
        })?;
        self.resend(index).await
    }

    /// Queue inbound bytes for the transcript
    pub fn receive(&self, data: &[u8]) -> TermResult<()> {
        self.receiver.receive(data)
    }

    pub fn receive_handle(&self) -> ReceiveHandle {
        self.receiver.clone()
    }

    /// Empty the transcript. History is kept.
    pub fn reset(&self) -> TermResult<()> {
        self.enqueue(Update::Reset)
    }

    /// Resolve once every update queued before this call has been applied
    pub async fn flush(&self) -> TermResult<()> {
        let (tx, rx) = oneshot::channel();
        self.enqueue(Update::Flush(tx))?;
        rx.await.map_err(|_| TermError::Session {
            message: "session updater has stopped".to_string(),
        })
    }

    pub async fn transcript(&self) -> String {
        self.transcript.read().await.snapshot()
    }

    pub async fn entries(&self) -> Vec<TranscriptEntry> {
        self.transcript.read().await.entries().to_vec()
    }

    pub async fn hex_dump(&self, options: &HexDumpOptions) -> Vec<String> {
        self.transcript.read().await.hex_dump(options)
    }

    pub fn encoding_mode(&self) -> EncodingMode {
        self.encoding
    }

    /// Switch the encoding mode, transcoding the pending text
    pub fn set_encoding_mode(&mut self, mode: EncodingMode) -> ModeSwitch {
        let outcome = self.editor.set_mode(mode);
        if mode != self.encoding {
            self.encoding = mode;
            self.events.publish(SessionEvent::EncodingChanged(mode));
        }
        outcome
    }

    pub fn line_break(&self) -> LineBreak {
        *self.line_break.borrow()
    }

    pub fn set_line_break(&mut self, line_break: LineBreak) {
        if self.line_break.send_replace(line_break) != line_break {
            self.events.publish(SessionEvent::LineBreakChanged(line_break));
        }
    }

    pub fn editor(&self) -> &InputEditor {
        &self.editor
    }

    /// Feed one key to the editor
    pub fn edit(&mut self, key: EditKey) -> InputOutcome {
        let outcome = self.editor.apply(key);
        if let InputOutcome::Rejected(c) = outcome {
            self.events.publish(SessionEvent::InputRejected(c));
        }
        outcome
    }

    /// Insert a whole string, returning how many characters were rejected.
    /// Each rejected character is published like a rejected key.
    pub fn paste(&mut self, text: &str) -> usize {
        let rejected = self.editor.insert_str(text);
        for &c in &rejected {
            self.events.publish(SessionEvent::InputRejected(c));
        }
        rejected.len()
    }

    pub fn history(&self) -> &ResendHistory {
        &self.history
    }

    pub fn select_history(&mut self, index: isize) -> TermResult<()> {
        self.history.set_cursor(index)
    }

    pub fn select_previous_history(&mut self) {
        self.history.select_previous();
    }

    pub fn select_next_history(&mut self) {
        self.history.select_next();
    }

    /// Last reported modem status lines
    pub fn signals(&self) -> LineSignals {
        *self.signals.borrow()
    }

    async fn transmit(&mut self, payload: &[u8]) -> TermResult<()> {
        let line_break = self.line_break();
        let link = self.link.as_mut().ok_or(TermError::NotConnected)?;

        let mut frame = Vec::with_capacity(payload.len() + line_break.as_bytes().len());
        frame.extend_from_slice(payload);
        frame.extend_from_slice(line_break.as_bytes());

        let written = link.write(&frame).await;
        if let Err(e) = written {
            error!("Session {} write failed: {}", self.id, e);
            self.report(&e);
            return Err(e);
        }
        debug!("Session {} sent {} bytes", self.id, frame.len());

        let mut text = codec::bytes_to_chars(payload);
        text.push_str(line_break.as_str());
        self.enqueue(Update::Append {
            direction: Direction::Sent,
            text,
            generation: None,
        })
    }

    /// Append a local diagnostic to the transcript
    fn report(&self, err: &TermError) {
        let update = Update::Append {
            direction: Direction::Error,
            text: format!("{}{}", err, PLATFORM_LINE_BREAK),
            generation: None,
        };
        if self.enqueue(update).is_err() {
            error!("Session {} lost diagnostic: {}", self.id, err);
        }
    }

    fn enqueue(&self, update: Update) -> TermResult<()> {
        self.receiver
            .updates
            .send(update)
            .map_err(|_| TermError::Session {
                message: "session updater has stopped".to_string(),
            })
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.updater.abort();
    }
}

async fn run_updater(
    mut updates: mpsc::UnboundedReceiver<Update>,
    transcript: Arc<RwLock<Transcript>>,
    state: Arc<LinkState>,
    events: EventHub,
) {
    while let Some(update) = updates.recv().await {
        match update {
            Update::Append {
                direction,
                text,
                generation,
            } => {
                if let Some(generation) = generation {
                    if generation != state.generation.load(Ordering::SeqCst) {
                        debug!("Dropping {} chars from a closed connection", text.chars().count());
                        continue;
                    }
                }
                transcript.write().await.append(direction, &text);
                events.publish(SessionEvent::Appended { direction, text });
            }
            Update::Reset => {
                transcript.write().await.reset();
                events.publish(SessionEvent::TranscriptReset);
            }
            Update::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Session updater stopped");
}

async fn run_pump(
    mut inbound: mpsc::UnboundedReceiver<LinkEvent>,
    receiver: ReceiveHandle,
    signals: watch::Sender<LineSignals>,
    events: EventHub,
) {
    while let Some(event) = inbound.recv().await {
        let result = match event {
            LinkEvent::Data(data) => receiver.receive(&data),
            LinkEvent::Signals(lines) => {
                if signals.send_replace(lines) != lines {
                    events.publish(SessionEvent::SignalsChanged(lines));
                }
                Ok(())
            }
            LinkEvent::Error(message) => {
                warn!("Line reported: {}", message);
                receiver.report_error(&message)
            }
        };

        if let Err(e) = result {
            debug!("Inbound pump stopping: {}", e);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::OpenError;
    use async_trait::async_trait;

    struct RecordingLink {
        written: Arc<Mutex<Vec<u8>>>,
    }

    #[async_trait]
    impl Link for RecordingLink {
        async fn write(&mut self, data: &[u8]) -> TermResult<()> {
            self.written.lock().unwrap().extend_from_slice(data);
            Ok(())
        }

        async fn close(&mut self) -> TermResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingTransport {
        written: Arc<Mutex<Vec<u8>>>,
        inbound: Mutex<Option<mpsc::UnboundedSender<LinkEvent>>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        fn name(&self) -> &str {
            "recording"
        }

        async fn open(&self, config: &SerialConfig) -> Result<Connection, OpenError> {
            if config.port == "locked" {
                return Err(OpenError::PermissionDenied {
                    port: config.port.clone(),
                });
            }
            let (tx, rx) = mpsc::unbounded_channel();
            *self.inbound.lock().unwrap() = Some(tx);
            let link = RecordingLink {
                written: Arc::clone(&self.written),
            };
            Ok(Connection::new(Box::new(link), rx))
        }
    }

    fn terminal(line_break: LineBreak) -> TerminalConfig {
        TerminalConfig {
            line_break,
            ..TerminalConfig::default()
        }
    }

    fn session(port: &str, line_break: LineBreak) -> (SessionController, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let controller = SessionController::new(
            transport.clone(),
            SerialConfig::new(port, 9600),
            &terminal(line_break),
        );
        (controller, transport)
    }

    #[tokio::test]
    async fn test_send_requires_connection() {
        let (mut controller, _) = session("mock0", LineBreak::Lf);
        assert!(matches!(controller.send("AB").await, Err(TermError::NotConnected)));
        assert!(matches!(controller.receive(b"AB"), Err(TermError::NotConnected)));
    }

    #[tokio::test]
    async fn test_send_writes_payload_and_line_break() {
        let (mut controller, transport) = session("mock0", LineBreak::CrLf);
        controller.connect().await.unwrap();
        controller.set_encoding_mode(EncodingMode::Hexadecimal);
        controller.send("41 42").await.unwrap();
        controller.flush().await.unwrap();

        assert_eq!(*transport.written.lock().unwrap(), b"AB\r\n".to_vec());
        assert_eq!(controller.transcript().await, "AB\r\n");
        assert_eq!(controller.history().get(0).unwrap().text, "AB");
    }

    #[tokio::test]
    async fn test_open_failure_is_reported() {
        let (mut controller, _) = session("locked", LineBreak::Lf);
        let result = controller.connect().await;
        assert!(matches!(
            result,
            Err(TermError::Open(OpenError::PermissionDenied { .. }))
        ));
        assert!(!controller.is_connected());

        controller.flush().await.unwrap();
        let entries = controller.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].direction, Direction::Error);
        assert!(entries[0].text.contains("Access is denied"));
    }

    #[tokio::test]
    async fn test_pump_forwards_inbound_events() {
        let (mut controller, transport) = session("mock0", LineBreak::Lf);
        let mut events = controller.subscribe();
        controller.connect().await.unwrap();

        let inbound = transport.inbound.lock().unwrap().clone().unwrap();
        let lines = LineSignals { cts: true, ..LineSignals::default() };
        inbound.send(LinkEvent::Signals(lines)).unwrap();
        inbound.send(LinkEvent::Data(b"OK".to_vec())).unwrap();

        assert_eq!(events.recv().await, Some(SessionEvent::ConnectionChanged(true)));
        assert_eq!(events.recv().await, Some(SessionEvent::SignalsChanged(lines)));
        assert_eq!(
            events.recv().await,
            Some(SessionEvent::Appended {
                direction: Direction::Received,
                text: "OK\n".to_string(),
            })
        );
        assert_eq!(controller.signals(), lines);
    }

    #[tokio::test]
    async fn test_rejected_input_is_published() {
        let (mut controller, _) = session("mock0", LineBreak::Lf);
        let mut events = controller.subscribe();
        controller.set_encoding_mode(EncodingMode::Binary);
        assert!(controller.edit(EditKey::Char('2')).is_rejected());

        assert_eq!(
            events.recv().await,
            Some(SessionEvent::EncodingChanged(EncodingMode::Binary))
        );
        assert_eq!(events.recv().await, Some(SessionEvent::InputRejected('2')));
    }

    #[tokio::test]
    async fn test_paste_publishes_each_rejection() {
        let (mut controller, _) = session("mock0", LineBreak::Lf);
        controller.set_encoding_mode(EncodingMode::Hexadecimal);
        let mut events = controller.subscribe();

        assert_eq!(controller.paste("41 XY 42"), 2);
        assert_eq!(controller.editor().content(), "41 42");
        assert_eq!(events.recv().await, Some(SessionEvent::InputRejected('X')));
        assert_eq!(events.recv().await, Some(SessionEvent::InputRejected('Y')));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_resend_selected_without_selection() {
        let (mut controller, _) = session("mock0", LineBreak::Lf);
        controller.connect().await.unwrap();
        assert!(matches!(
            controller.resend_selected().await,
            Err(TermError::IndexOutOfRange { index: -1, len: 0 })
        ));
    }

    #[tokio::test]
    async fn test_set_config_while_connected() {
        let (mut controller, _) = session("mock0", LineBreak::Lf);
        controller.connect().await.unwrap();
        assert!(controller.set_config(SerialConfig::new("mock1", 9600)).is_err());
        controller.disconnect().await.unwrap();
        assert!(controller.set_config(SerialConfig::new("mock1", 9600)).is_ok());
        assert_eq!(controller.config().port, "mock1");
    }
}
