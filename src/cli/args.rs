use crate::core::codec::EncodingMode;
use crate::core::linebreak::LineBreak;
use crate::domain::config::{FlowControlConfig, ParityConfig, SerialConfig};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Command line arguments for SerialTerm
#[derive(Parser, Debug)]
#[command(
    name = "serialterm",
    version = env!("CARGO_PKG_VERSION"),
    about = "Serial line terminal with character, binary and hexadecimal views",
    long_about = "Open a serial line, send and receive data, and view it as plain text, hexadecimal or binary. Runs as an interactive terminal or as one-shot commands."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available serial ports
    Ports,
    /// Convert text between encodings
    Convert(ConvertArgs),
    /// Send one payload and print what comes back
    Send(SendArgs),
    /// Open the interactive terminal
    Connect(ConnectArgs),
    /// Configuration management commands
    Config(ConfigArgs),
    /// Display version information
    Version,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
    /// CSV output
    Csv,
}

/// Serial line settings, each overriding the configuration file
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct LineArgs {
    /// Serial port path
    #[arg(short, long)]
    pub port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Data bits
    #[arg(long)]
    pub data_bits: Option<u8>,

    /// Stop bits
    #[arg(long)]
    pub stop_bits: Option<u8>,

    /// Parity
    #[arg(long, value_enum)]
    pub parity: Option<ParityArg>,

    /// Flow control
    #[arg(long, value_enum)]
    pub flow_control: Option<FlowControlArg>,

    /// Assert Request To Send
    #[arg(long)]
    pub rts: bool,

    /// Assert Data Terminal Ready
    #[arg(long)]
    pub dtr: bool,
}

impl LineArgs {
    /// Apply the given options on top of `config`
    pub fn apply(&self, config: &mut SerialConfig) {
        if let Some(port) = &self.port {
            config.port = port.clone();
        }
        if let Some(baud) = self.baud {
            config.baud_rate = baud;
        }
        if let Some(data_bits) = self.data_bits {
            config.data_bits = data_bits;
        }
        if let Some(stop_bits) = self.stop_bits {
            config.stop_bits = stop_bits;
        }
        if let Some(parity) = self.parity {
            config.parity = parity.into();
        }
        if let Some(flow_control) = self.flow_control {
            config.flow_control = flow_control.into();
        }
        config.rts |= self.rts;
        config.dtr |= self.dtr;
    }
}

/// Conversion arguments
#[derive(ClapArgs, Debug)]
pub struct ConvertArgs {
    /// Encoding of the input text
    #[arg(short, long, value_enum)]
    pub from: EncodingArg,

    /// Encoding to produce
    #[arg(short, long, value_enum)]
    pub to: EncodingArg,

    /// Text to convert
    pub text: String,
}

/// One-shot send arguments
#[derive(ClapArgs, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub line: LineArgs,

    /// Encoding of the data argument
    #[arg(short, long, value_enum, default_value = "char")]
    pub encoding: EncodingArg,

    /// Line break appended to the payload
    #[arg(short, long, value_enum)]
    pub line_break: Option<LineBreakArg>,

    /// Milliseconds to wait for a response
    #[arg(short, long, default_value = "500")]
    pub wait: u64,

    /// Use the in-process loopback line instead of a serial port
    #[arg(long)]
    pub loopback: bool,

    /// Data to send
    pub data: String,
}

/// Interactive terminal arguments
#[derive(ClapArgs, Debug)]
pub struct ConnectArgs {
    #[command(flatten)]
    pub line: LineArgs,

    /// Initial input encoding
    #[arg(short, long, value_enum)]
    pub encoding: Option<EncodingArg>,

    /// Initial line break
    #[arg(short, long, value_enum)]
    pub line_break: Option<LineBreakArg>,

    /// Use the in-process loopback line instead of a serial port
    #[arg(long)]
    pub loopback: bool,

    /// Log file, defaults to serialterm.log in the temp directory
    #[arg(long)]
    pub log_file: Option<String>,
}

/// Configuration management arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Validate configuration
    Validate {
        /// Configuration file path
        file: Option<String>,
    },
    /// Create a default project configuration
    Init {
        /// Directory to create it in
        #[arg(short, long)]
        dir: Option<String>,
    },
}

/// Encoding argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingArg {
    Char,
    Bin,
    Hex,
}

/// Line break argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineBreakArg {
    None,
    Cr,
    Lf,
    Crlf,
    Lfcr,
    System,
}

/// Parity configuration argument
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ParityArg {
    None,
    Even,
    Odd,
}

/// Flow control configuration argument
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum FlowControlArg {
    None,
    Software,
    Hardware,
}

impl From<EncodingArg> for EncodingMode {
    fn from(encoding: EncodingArg) -> Self {
        match encoding {
            EncodingArg::Char => Self::Character,
            EncodingArg::Bin => Self::Binary,
            EncodingArg::Hex => Self::Hexadecimal,
        }
    }
}

impl From<LineBreakArg> for LineBreak {
    fn from(line_break: LineBreakArg) -> Self {
        match line_break {
            LineBreakArg::None => Self::None,
            LineBreakArg::Cr => Self::Cr,
            LineBreakArg::Lf => Self::Lf,
            LineBreakArg::Crlf => Self::CrLf,
            LineBreakArg::Lfcr => Self::LfCr,
            LineBreakArg::System => Self::Platform,
        }
    }
}

impl From<ParityArg> for ParityConfig {
    fn from(parity: ParityArg) -> Self {
        match parity {
            ParityArg::None => Self::None,
            ParityArg::Even => Self::Even,
            ParityArg::Odd => Self::Odd,
        }
    }
}

impl From<FlowControlArg> for FlowControlConfig {
    fn from(flow_control: FlowControlArg) -> Self {
        match flow_control {
            FlowControlArg::None => Self::None,
            FlowControlArg::Software => Self::Software,
            FlowControlArg::Hardware => Self::Hardware,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_args_override_config() {
        let args = LineArgs {
            port: Some("COM5".to_string()),
            baud: Some(57600),
            parity: Some(ParityArg::Odd),
            dtr: true,
            ..LineArgs::default()
        };
        let mut config = SerialConfig::default();
        args.apply(&mut config);

        assert_eq!(config.port, "COM5");
        assert_eq!(config.baud_rate, 57600);
        assert_eq!(config.data_bits, 8);
        assert_eq!(config.parity, ParityConfig::Odd);
        assert!(config.dtr);
        assert!(!config.rts);
    }

    #[test]
    fn test_empty_line_args_keep_config() {
        let mut config = SerialConfig::new("COM2", 4800);
        LineArgs::default().apply(&mut config);
        assert_eq!(config, SerialConfig::new("COM2", 4800));
    }

    #[test]
    fn test_arg_conversions() {
        assert_eq!(EncodingMode::from(EncodingArg::Hex), EncodingMode::Hexadecimal);
        assert_eq!(LineBreak::from(LineBreakArg::System), LineBreak::Platform);
        assert_eq!(LineBreak::from(LineBreakArg::Lfcr), LineBreak::LfCr);
    }
}
