use crate::cli::args::OutputFormat;
use crate::core::codec::{self, EncodingMode};
use crate::core::transcript::{Direction, TranscriptEntry};
use crate::domain::config::AppConfig;
use crate::infrastructure::serial::PortInfo;
use serde::Serialize;
use std::io;
use tabled::{Table, Tabled};

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_ports(&self, ports: &[PortInfo]) -> Result<(), OutputError>;
    fn write_conversion(&self, conversion: &Conversion) -> Result<(), OutputError>;
    fn write_exchange(&self, exchange: &Exchange) -> Result<(), OutputError>;
    fn write_config(&self, config: &AppConfig) -> Result<(), OutputError>;
    fn write_validation(&self, report: &ValidationReport) -> Result<(), OutputError>;
    fn write_message(&self, message: &str) -> Result<(), OutputError>;
    fn write_error(&self, error: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::TermError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Result of `convert`
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    pub from: EncodingMode,
    pub to: EncodingMode,
    pub input: String,
    pub output: String,
}

/// Result of `send`: what went out and what the line produced
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub port: String,
    pub entries: Vec<TranscriptEntry>,
}

impl Exchange {
    /// Everything received, concatenated
    pub fn received(&self) -> String {
        self.entries
            .iter()
            .filter(|entry| entry.direction == Direction::Received)
            .map(|entry| entry.text.as_str())
            .collect()
    }
}

/// Result of `config validate`
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub path: String,
    pub problems: Vec<String>,
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
    quiet: bool,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            quiet: false,
        }
    }

    /// Suppress informational messages; errors and results are still printed
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), OutputError> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_ports(&self, ports: &[PortInfo]) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                if ports.is_empty() {
                    println!("No serial ports found");
                }
                for port in ports {
                    if port.description.is_empty() {
                        println!("{} ({})", port.name, port.kind);
                    } else {
                        println!("{} ({}) {}", port.name, port.kind, port.description);
                    }
                }
            }
            OutputFormat::Json => self.print_json(ports)?,
            OutputFormat::Table => {
                if !ports.is_empty() {
                    let table_data: Vec<PortTableRow> = ports.iter().map(PortTableRow::from).collect();
                    println!("{}", Table::new(table_data));
                }
            }
            OutputFormat::Csv => {
                println!("name,kind,description");
                for port in ports {
                    println!("{},{},{}", csv_field(&port.name), port.kind, csv_field(&port.description));
                }
            }
        }
        Ok(())
    }

    fn write_conversion(&self, conversion: &Conversion) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => println!("{}", conversion.output),
            OutputFormat::Json => self.print_json(conversion)?,
            OutputFormat::Table => {
                let row = ConversionTableRow {
                    from: conversion.from.short_name().to_string(),
                    to: conversion.to.short_name().to_string(),
                    input: conversion.input.escape_default().to_string(),
                    output: conversion.output.escape_default().to_string(),
                };
                println!("{}", Table::new(vec![row]));
            }
            OutputFormat::Csv => {
                println!("from,to,input,output");
                println!(
                    "{},{},{},{}",
                    conversion.from,
                    conversion.to,
                    csv_field(&conversion.input),
                    csv_field(&conversion.output)
                );
            }
        }
        Ok(())
    }

    fn write_exchange(&self, exchange: &Exchange) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                for entry in &exchange.entries {
                    match entry.direction {
                        Direction::Received => print!("{}", entry.text),
                        Direction::Error => eprint!("{}", entry.text),
                        Direction::Sent if !self.quiet => {
                            print!("> {}", entry.text);
                        }
                        Direction::Sent => {}
                    }
                }
                println!();
            }
            OutputFormat::Json => self.print_json(exchange)?,
            OutputFormat::Table => {
                if !exchange.entries.is_empty() {
                    let table_data: Vec<EntryTableRow> =
                        exchange.entries.iter().map(EntryTableRow::from).collect();
                    println!("{}", Table::new(table_data));
                }
            }
            OutputFormat::Csv => {
                println!("direction,text,hex");
                for entry in &exchange.entries {
                    let row = EntryTableRow::from(entry);
                    println!("{},{},{}", row.direction, csv_field(&entry.text), row.hex);
                }
            }
        }
        Ok(())
    }

    fn write_config(&self, config: &AppConfig) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                println!("SerialTerm Configuration:");
                println!("  Log level: {}", config.global.log_level);
                println!("  Serial:");
                println!("    Line: {}", config.serial.summary());
                println!("    Flow control: {}", config.serial.flow_control);
                println!("    RTS: {}  DTR: {}", config.serial.rts, config.serial.dtr);
                println!(
                    "    Timeouts: read {}ms, write {}ms",
                    config.serial.read_timeout_ms, config.serial.write_timeout_ms
                );
                println!("  Terminal:");
                println!("    Encoding: {}", config.terminal.encoding);
                println!("    Line break: {}", config.terminal.line_break);
                println!("    History limit: {}", config.terminal.history_limit);
            }
            OutputFormat::Json => self.print_json(config)?,
            OutputFormat::Table => {
                let table_data = config_rows(config);
                println!("{}", Table::new(table_data));
            }
            OutputFormat::Csv => {
                println!("key,value");
                for row in config_rows(config) {
                    println!("{},{}", row.key, csv_field(&row.value));
                }
            }
        }
        Ok(())
    }

    fn write_validation(&self, report: &ValidationReport) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => self.print_json(report)?,
            _ => {
                if report.problems.is_empty() {
                    println!("{}: configuration is valid", report.path);
                } else {
                    println!("{}: {} problem(s)", report.path, report.problems.len());
                    for problem in &report.problems {
                        println!("  - {}", problem);
                    }
                }
            }
        }
        Ok(())
    }

    fn write_message(&self, message: &str) -> Result<(), OutputError> {
        if self.quiet {
            return Ok(());
        }
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "message": message,
                    "level": "info"
                });
                self.print_json(&output)?;
            }
            _ => {
                println!("{}", message);
            }
        }
        Ok(())
    }

    fn write_error(&self, error: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "error": error,
                    "level": "error"
                });
                eprintln!("{}", serde_json::to_string_pretty(&output)?);
            }
            _ => {
                eprintln!("Error: {}", error);
            }
        }
        Ok(())
    }
}

/// Quote a CSV field when needed
fn csv_field(value: &str) -> String {
    let value = value.escape_default().to_string();
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value
    }
}

/// Table row for a serial port
#[derive(Tabled)]
struct PortTableRow {
    name: String,
    kind: String,
    description: String,
}

impl From<&PortInfo> for PortTableRow {
    fn from(port: &PortInfo) -> Self {
        Self {
            name: port.name.clone(),
            kind: port.kind.clone(),
            description: port.description.clone(),
        }
    }
}

/// Table row for a conversion
#[derive(Tabled)]
struct ConversionTableRow {
    from: String,
    to: String,
    input: String,
    output: String,
}

/// Table row for a transcript entry
#[derive(Tabled)]
struct EntryTableRow {
    direction: String,
    text: String,
    hex: String,
}

impl From<&TranscriptEntry> for EntryTableRow {
    fn from(entry: &TranscriptEntry) -> Self {
        let hex = codec::chars_to_bytes(&entry.text)
            .map(|bytes| codec::bytes_to_hex(&bytes))
            .unwrap_or_default();
        Self {
            direction: entry.direction.to_string(),
            text: entry.text.escape_default().to_string(),
            hex,
        }
    }
}

/// Table row for a configuration value
#[derive(Tabled)]
struct ConfigTableRow {
    key: String,
    value: String,
}

fn config_rows(config: &AppConfig) -> Vec<ConfigTableRow> {
    let row = |key: &str, value: String| ConfigTableRow {
        key: key.to_string(),
        value,
    };
    vec![
        row("global.log_level", config.global.log_level.clone()),
        row("serial.port", config.serial.port.clone()),
        row("serial.baud_rate", config.serial.baud_rate.to_string()),
        row("serial.data_bits", config.serial.data_bits.to_string()),
        row("serial.stop_bits", config.serial.stop_bits.to_string()),
        row("serial.parity", config.serial.parity.to_string()),
        row("serial.flow_control", config.serial.flow_control.to_string()),
        row("serial.rts", config.serial.rts.to_string()),
        row("serial.dtr", config.serial.dtr.to_string()),
        row("terminal.encoding", config.terminal.encoding.to_string()),
        row("terminal.line_break", config.terminal.line_break.to_string()),
        row("terminal.history_limit", config.terminal.history_limit.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn entry(direction: Direction, text: &str) -> TranscriptEntry {
        TranscriptEntry {
            timestamp: SystemTime::now(),
            direction,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("OK\r\n"), "OK\\r\\n");
    }

    #[test]
    fn test_entry_row_shows_hex() {
        let row = EntryTableRow::from(&entry(Direction::Received, "OK\n"));
        assert_eq!(row.direction, "received");
        assert_eq!(row.text, "OK\\n");
        assert_eq!(row.hex, "4F 4B 0A");
    }

    #[test]
    fn test_exchange_received_text() {
        let exchange = Exchange {
            port: "loop".to_string(),
            entries: vec![
                entry(Direction::Sent, "AT\r\n"),
                entry(Direction::Received, "O"),
                entry(Direction::Received, "K\r\n"),
            ],
        };
        assert_eq!(exchange.received(), "OK\r\n");
    }

    #[test]
    fn test_config_rows_cover_sections() {
        let rows = config_rows(&AppConfig::default());
        assert!(rows.iter().any(|r| r.key == "serial.baud_rate" && r.value == "9600"));
        assert!(rows.iter().any(|r| r.key == "terminal.history_limit" && r.value == "1000"));
    }

    #[test]
    fn test_writer_formats_do_not_fail() {
        let ports = vec![PortInfo {
            name: "COM1".to_string(),
            kind: "unknown".to_string(),
            description: String::new(),
        }];
        for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Table, OutputFormat::Csv] {
            let writer = ConsoleWriter::new(format);
            assert!(writer.write_ports(&ports).is_ok());
            assert!(writer.write_config(&AppConfig::default()).is_ok());
        }
    }
}
