use crate::core::codec::EncodingMode;
use crate::core::linebreak::LineBreak;
use crate::core::transcript::HexDumpOptions;
use crate::domain::error::OpenError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Baud rates offered by the terminal UI
pub const BAUD_RATES: &[u32] = &[
    50, 75, 110, 134, 200, 300, 600, 1200, 1800, 2400, 4800, 9600, 19200, 28800, 38400, 57600,
    76800, 115200, 230400, 460800, 576000, 921600,
];

/// Data sizes offered by the terminal UI
pub const DATA_SIZES: &[u8] = &[7, 8];

/// SerialTerm configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Serial line settings
    #[serde(default)]
    pub serial: SerialConfig,
    /// Terminal defaults
    #[serde(default)]
    pub terminal: TerminalConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Serial line configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Port path, empty selects the first available port
    #[serde(default)]
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,
    #[serde(default)]
    pub parity: ParityConfig,
    #[serde(default)]
    pub flow_control: FlowControlConfig,
    /// Request To Send line state
    #[serde(default)]
    pub rts: bool,
    /// Data Terminal Ready line state
    #[serde(default)]
    pub dtr: bool,
    #[serde(default = "default_timeout")]
    pub read_timeout_ms: u64,
    #[serde(default = "default_timeout")]
    pub write_timeout_ms: u64,
}

/// Terminal defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalConfig {
    #[serde(default)]
    pub encoding: EncodingMode,
    #[serde(default)]
    pub line_break: LineBreak,
    /// Maximum resend history entries, 0 for unbounded
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default)]
    pub hex_view: HexDumpOptions,
}

/// Parity configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParityConfig {
    #[default]
    None,
    Odd,
    Even,
}

/// Flow control configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControlConfig {
    #[default]
    None,
    Hardware,
    Software,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_data_bits() -> u8 {
    8
}

fn default_stop_bits() -> u8 {
    1
}

fn default_timeout() -> u64 {
    1000
}

fn default_history_limit() -> usize {
    1000
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: default_baud_rate(),
            data_bits: default_data_bits(),
            stop_bits: default_stop_bits(),
            parity: ParityConfig::default(),
            flow_control: FlowControlConfig::default(),
            rts: false,
            dtr: false,
            read_timeout_ms: default_timeout(),
            write_timeout_ms: default_timeout(),
        }
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            encoding: EncodingMode::default(),
            line_break: LineBreak::default(),
            history_limit: default_history_limit(),
            hex_view: HexDumpOptions::default(),
        }
    }
}

impl SerialConfig {
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            ..Self::default()
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    /// Check the settings a transport needs before opening
    pub fn validate(&self) -> Result<(), OpenError> {
        let invalid = |reason: String| Err(OpenError::InvalidConfiguration { reason });

        if self.port.trim().is_empty() {
            return invalid("no port selected".to_string());
        }
        if self.baud_rate == 0 {
            return invalid("baud rate must be positive".to_string());
        }
        if !(5..=8).contains(&self.data_bits) {
            return invalid(format!("invalid data bits: {}", self.data_bits));
        }
        if !(1..=2).contains(&self.stop_bits) {
            return invalid(format!("invalid stop bits: {}", self.stop_bits));
        }
        if self.read_timeout_ms == 0 || self.write_timeout_ms == 0 {
            return invalid("timeouts must be positive".to_string());
        }
        Ok(())
    }

    /// Short one-line description, e.g. `/dev/ttyUSB0 9600 8N1`
    pub fn summary(&self) -> String {
        let parity = match self.parity {
            ParityConfig::None => 'N',
            ParityConfig::Odd => 'O',
            ParityConfig::Even => 'E',
        };
        format!(
            "{} {} {}{}{}",
            if self.port.is_empty() { "-" } else { &self.port },
            self.baud_rate,
            self.data_bits,
            parity,
            self.stop_bits
        )
    }
}

impl std::fmt::Display for ParityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParityConfig::None => write!(f, "none"),
            ParityConfig::Odd => write!(f, "odd"),
            ParityConfig::Even => write!(f, "even"),
        }
    }
}

impl std::fmt::Display for FlowControlConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowControlConfig::None => write!(f, "none"),
            FlowControlConfig::Hardware => write!(f, "hardware"),
            FlowControlConfig::Software => write!(f, "software"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized.serial, config.serial);
        assert_eq!(deserialized.terminal, config.terminal);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [serial]
            port = "/dev/ttyUSB0"
            baud_rate = 115200
            parity = "even"

            [terminal]
            encoding = "hexadecimal"
            line_break = "crlf"
            "#,
        )
        .unwrap();

        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 115200);
        assert_eq!(config.serial.data_bits, 8);
        assert_eq!(config.serial.parity, ParityConfig::Even);
        assert_eq!(config.terminal.encoding, EncodingMode::Hexadecimal);
        assert_eq!(config.terminal.line_break, LineBreak::CrLf);
        assert_eq!(config.terminal.history_limit, 1000);
        assert!(config.terminal.hex_view.offset);
        assert_eq!(config.global.log_level, "info");
    }

    #[test]
    fn test_validate() {
        assert!(SerialConfig::new("/dev/ttyUSB0", 9600).validate().is_ok());

        let cases = [
            SerialConfig::new("", 9600),
            SerialConfig::new("/dev/ttyUSB0", 0),
            SerialConfig { data_bits: 9, ..SerialConfig::new("COM1", 9600) },
            SerialConfig { stop_bits: 3, ..SerialConfig::new("COM1", 9600) },
            SerialConfig { write_timeout_ms: 0, ..SerialConfig::new("COM1", 9600) },
        ];
        for config in cases {
            assert!(matches!(
                config.validate(),
                Err(OpenError::InvalidConfiguration { .. })
            ));
        }
    }

    #[test]
    fn test_summary() {
        let config = SerialConfig {
            parity: ParityConfig::Odd,
            stop_bits: 2,
            ..SerialConfig::new("COM3", 115200)
        };
        assert_eq!(config.summary(), "COM3 115200 8O2");
    }
}
