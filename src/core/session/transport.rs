use crate::domain::{config::SerialConfig, error::{OpenError, TermResult}};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Modem status lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSignals {
    /// Carrier Detect
    pub cd: bool,
    /// Clear To Send
    pub cts: bool,
    /// Data Set Ready
    pub dsr: bool,
    /// Ring Indicator
    pub ri: bool,
}

impl std::fmt::Display for LineSignals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flag = |name: &str, on: bool| {
            if on { name.to_string() } else { name.to_lowercase() }
        };
        write!(
            f,
            "{} {} {} {}",
            flag("CD", self.cd),
            flag("CTS", self.cts),
            flag("DSR", self.dsr),
            flag("RI", self.ri)
        )
    }
}

/// Notification delivered by an open link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// Inbound byte chunk
    Data(Vec<u8>),
    /// Modem status lines changed
    Signals(LineSignals),
    /// Read side failure, the link may no longer deliver data
    Error(String),
}

/// Write half of an open line
#[async_trait]
pub trait Link: Send {
    /// Write the whole buffer
    async fn write(&mut self, data: &[u8]) -> TermResult<()>;

    /// Release the line. Further writes fail.
    async fn close(&mut self) -> TermResult<()>;
}

/// An open line: the write half plus an ordered stream of inbound events
pub struct Connection {
    pub link: Box<dyn Link>,
    pub inbound: mpsc::UnboundedReceiver<LinkEvent>,
}

impl Connection {
    pub fn new(link: Box<dyn Link>, inbound: mpsc::UnboundedReceiver<LinkEvent>) -> Self {
        Self { link, inbound }
    }
}

/// Something that can open a byte-oriented line
#[async_trait]
pub trait Transport: Send + Sync {
    /// Human readable transport name
    fn name(&self) -> &str;

    /// Open a line with the given settings
    async fn open(&self, config: &SerialConfig) -> Result<Connection, OpenError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::TermError;

    struct NullLink {
        closed: bool,
    }

    #[async_trait]
    impl Link for NullLink {
        async fn write(&mut self, _data: &[u8]) -> TermResult<()> {
            if self.closed {
                return Err(TermError::NotConnected);
            }
            Ok(())
        }

        async fn close(&mut self) -> TermResult<()> {
            self.closed = true;
            Ok(())
        }
    }

    struct MockTransport;

    #[async_trait]
    impl Transport for MockTransport {
        fn name(&self) -> &str {
            "mock"
        }

        async fn open(&self, config: &SerialConfig) -> Result<Connection, OpenError> {
            config.validate()?;
            let (tx, rx) = mpsc::unbounded_channel();
            tx.send(LinkEvent::Data(b"hello".to_vec())).ok();
            Ok(Connection::new(Box::new(NullLink { closed: false }), rx))
        }
    }

    #[test]
    fn test_signals_display() {
        let signals = LineSignals { cd: true, cts: false, dsr: true, ri: false };
        assert_eq!(signals.to_string(), "CD cts DSR ri");
    }

    #[tokio::test]
    async fn test_mock_transport_open() {
        let transport = MockTransport;
        let mut connection = transport
            .open(&SerialConfig::new("mock0", 9600))
            .await
            .unwrap();

        assert_eq!(
            connection.inbound.recv().await,
            Some(LinkEvent::Data(b"hello".to_vec()))
        );
        assert!(connection.link.write(b"x").await.is_ok());
        connection.link.close().await.unwrap();
        assert!(matches!(
            connection.link.write(b"x").await,
            Err(TermError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_mock_transport_rejects_invalid_config() {
        let result = MockTransport.open(&SerialConfig::new("", 9600)).await;
        assert!(matches!(result, Err(OpenError::InvalidConfiguration { .. })));
    }
}
