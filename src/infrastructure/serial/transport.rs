use crate::core::session::transport::{Connection, LineSignals, Link, LinkEvent, Transport};
use crate::domain::config::{FlowControlConfig, ParityConfig, SerialConfig};
use crate::domain::error::{OpenError, TermError, TermResult};
use async_trait::async_trait;
use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

type SharedPort = Arc<Mutex<Box<dyn SerialPort>>>;

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const READ_BUFFER_SIZE: usize = 1024;

/// Serial port transport
#[derive(Debug, Clone, Default)]
pub struct SerialTransport;

impl SerialTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for SerialTransport {
    fn name(&self) -> &str {
        "serial"
    }

    async fn open(&self, config: &SerialConfig) -> Result<Connection, OpenError> {
        config.validate()?;

        let data_bits = match config.data_bits {
            5 => serialport::DataBits::Five,
            6 => serialport::DataBits::Six,
            7 => serialport::DataBits::Seven,
            8 => serialport::DataBits::Eight,
            other => {
                return Err(OpenError::InvalidConfiguration {
                    reason: format!("invalid data bits: {}", other),
                })
            }
        };

        let stop_bits = match config.stop_bits {
            1 => serialport::StopBits::One,
            2 => serialport::StopBits::Two,
            other => {
                return Err(OpenError::InvalidConfiguration {
                    reason: format!("invalid stop bits: {}", other),
                })
            }
        };

        let parity = match config.parity {
            ParityConfig::None => serialport::Parity::None,
            ParityConfig::Even => serialport::Parity::Even,
            ParityConfig::Odd => serialport::Parity::Odd,
        };

        let flow_control = match config.flow_control {
            FlowControlConfig::None => serialport::FlowControl::None,
            FlowControlConfig::Software => serialport::FlowControl::Software,
            FlowControlConfig::Hardware => serialport::FlowControl::Hardware,
        };

        let mut port = serialport::new(config.port.as_str(), config.baud_rate)
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(parity)
            .flow_control(flow_control)
            .timeout(config.read_timeout())
            .open()
            .map_err(|e| map_open_error(&config.port, e))?;

        port.write_request_to_send(config.rts)
            .and_then(|_| port.write_data_terminal_ready(config.dtr))
            .map_err(|e| map_open_error(&config.port, e))?;

        info!("Serial port {} opened", config.summary());

        let port: SharedPort = Arc::new(Mutex::new(port));
        let (event_sender, event_receiver) = mpsc::unbounded_channel();
        let reader = tokio::spawn(read_loop(Arc::clone(&port), event_sender));

        let link = SerialLink {
            port: Some(port),
            reader: Some(reader),
            write_timeout: config.write_timeout(),
        };
        Ok(Connection::new(Box::new(link), event_receiver))
    }
}

/// Map a `serialport` open failure onto the three causes a user can act on
fn map_open_error(port: &str, err: serialport::Error) -> OpenError {
    match err.kind() {
        serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied) => OpenError::PermissionDenied {
            port: port.to_string(),
        },
        serialport::ErrorKind::InvalidInput => OpenError::InvalidConfiguration {
            reason: err.to_string(),
        },
        _ => OpenError::InvalidPortState {
            port: port.to_string(),
            reason: err.to_string(),
        },
    }
}

struct SerialLink {
    port: Option<SharedPort>,
    reader: Option<JoinHandle<()>>,
    write_timeout: Duration,
}

#[async_trait]
impl Link for SerialLink {
    async fn write(&mut self, data: &[u8]) -> TermResult<()> {
        let port = self.port.clone().ok_or(TermError::NotConnected)?;
        let data = data.to_vec();

        let task = tokio::task::spawn_blocking(move || {
            let mut port = port.blocking_lock();
            port.write_all(&data)?;
            port.flush()
        });

        match tokio::time::timeout(self.write_timeout, task).await {
            Ok(Ok(result)) => result.map_err(TermError::from),
            Ok(Err(e)) => Err(TermError::Session {
                message: format!("serial write task failed: {}", e),
            }),
            Err(_) => Err(TermError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                "serial write timed out",
            ))),
        }
    }

    async fn close(&mut self) -> TermResult<()> {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        if self.port.take().is_some() {
            info!("Serial port closed");
        }
        Ok(())
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

fn read_signals(port: &mut Box<dyn SerialPort>) -> serialport::Result<LineSignals> {
    Ok(LineSignals {
        cd: port.read_carrier_detect()?,
        cts: port.read_clear_to_send()?,
        dsr: port.read_data_set_ready()?,
        ri: port.read_ring_indicator()?,
    })
}

/// Poll the port for buffered bytes and modem line changes.
/// Only bytes already buffered are read, so the lock is never held across a
/// blocking read.
async fn read_loop(port: SharedPort, events: mpsc::UnboundedSender<LinkEvent>) {
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    let mut last_signals: Option<LineSignals> = None;

    loop {
        tokio::time::sleep(POLL_INTERVAL).await;

        let mut port = port.lock().await;

        match read_signals(&mut port) {
            Ok(signals) if last_signals != Some(signals) => {
                last_signals = Some(signals);
                if events.send(LinkEvent::Signals(signals)).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            // Not every driver reports modem lines
            Err(e) => debug!("Modem lines unavailable: {}", e),
        }

        let available = match port.bytes_to_read() {
            Ok(0) => continue,
            Ok(n) => (n as usize).min(buffer.len()),
            Err(e) => {
                error!("Failed to query serial port: {}", e);
                let _ = events.send(LinkEvent::Error(e.to_string()));
                break;
            }
        };

        match port.read(&mut buffer[..available]) {
            Ok(0) => continue,
            Ok(n) => {
                debug!("Received {} bytes over serial", n);
                if events.send(LinkEvent::Data(buffer[..n].to_vec())).is_err() {
                    break;
                }
            }
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => continue,
            Err(e) => {
                error!("Failed to read from serial port: {}", e);
                let _ = events.send(LinkEvent::Error(e.to_string()));
                break;
            }
        }
    }

    warn!("Serial reader stopped");
}
