//! In-process transport that echoes every write back as inbound data.

use crate::core::session::transport::{Connection, LineSignals, Link, LinkEvent, Transport};
use crate::domain::config::SerialConfig;
use crate::domain::error::{OpenError, TermError, TermResult};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct LoopbackState {
    echo: bool,
    writes: Vec<Vec<u8>>,
    next_open_error: Option<OpenError>,
    next_write_error: Option<TermError>,
    peer: Option<mpsc::UnboundedSender<LinkEvent>>,
}

/// Loopback line.
///
/// Clones share state, so a test can keep one clone to inspect writes and
/// inject events while the session owns another.
#[derive(Debug, Clone)]
pub struct LoopbackTransport {
    state: Arc<Mutex<LoopbackState>>,
}

impl LoopbackTransport {
    /// Loopback that echoes writes
    pub fn new() -> Self {
        Self::with_echo(true)
    }

    /// Loopback that records writes without echoing them
    pub fn silent() -> Self {
        Self::with_echo(false)
    }

    fn with_echo(echo: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(LoopbackState {
                echo,
                ..LoopbackState::default()
            })),
        }
    }

    /// Make the next `open` fail with `err`
    pub fn fail_next_open(&self, err: OpenError) {
        if let Ok(mut state) = self.state.lock() {
            state.next_open_error = Some(err);
        }
    }

    /// Make the next write fail with `err`. The line stays open.
    pub fn fail_next_write(&self, err: TermError) {
        if let Ok(mut state) = self.state.lock() {
            state.next_write_error = Some(err);
        }
    }

    /// Every buffer written so far, in order
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state
            .lock()
            .map(|state| state.writes.clone())
            .unwrap_or_default()
    }

    /// Deliver an event to the open connection. Returns false when there is none.
    pub fn inject(&self, event: LinkEvent) -> bool {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.peer.as_ref().map(|peer| peer.send(event).is_ok()))
            .unwrap_or(false)
    }

    pub fn set_signals(&self, signals: LineSignals) -> bool {
        self.inject(LinkEvent::Signals(signals))
    }
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    fn name(&self) -> &str {
        "loopback"
    }

    async fn open(&self, config: &SerialConfig) -> Result<Connection, OpenError> {
        let mut state = self.state.lock().map_err(|_| OpenError::InvalidPortState {
            port: config.port.clone(),
            reason: "loopback state poisoned".to_string(),
        })?;

        if let Some(err) = state.next_open_error.take() {
            return Err(err);
        }
        config.validate()?;

        let (tx, rx) = mpsc::unbounded_channel();
        state.peer = Some(tx.clone());
        info!("Loopback line {} opened", config.summary());

        let link = LoopbackLink {
            state: Arc::clone(&self.state),
            peer: Some(tx),
        };
        Ok(Connection::new(Box::new(link), rx))
    }
}

struct LoopbackLink {
    state: Arc<Mutex<LoopbackState>>,
    peer: Option<mpsc::UnboundedSender<LinkEvent>>,
}

#[async_trait]
impl Link for LoopbackLink {
    async fn write(&mut self, data: &[u8]) -> TermResult<()> {
        let peer = self.peer.as_ref().ok_or(TermError::NotConnected)?;
        let mut state = self.state.lock().map_err(|_| TermError::Session {
            message: "loopback state poisoned".to_string(),
        })?;

        if let Some(err) = state.next_write_error.take() {
            return Err(err);
        }
        state.writes.push(data.to_vec());
        if state.echo {
            debug!("Echoing {} bytes", data.len());
            // The receiving side may already be gone after a disconnect
            let _ = peer.send(LinkEvent::Data(data.to_vec()));
        }
        Ok(())
    }

    async fn close(&mut self) -> TermResult<()> {
        self.peer = None;
        if let Ok(mut state) = self.state.lock() {
            state.peer = None;
        }
        info!("Loopback line closed");
        Ok(())
    }
}
