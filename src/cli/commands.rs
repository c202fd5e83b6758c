use crate::cli::args::{
    Args, Command, ConfigArgs, ConfigCommand, ConnectArgs, ConvertArgs, LineArgs, SendArgs,
};
use crate::cli::output::{ConsoleWriter, Conversion, Exchange, OutputWriter, ValidationReport};
use crate::core::codec::{self, EncodingMode};
use crate::core::session::{SessionController, Transport};
use crate::domain::config::{AppConfig, SerialConfig, TerminalConfig};
use crate::domain::error::{TermError, TermResult};
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::logging;
use crate::infrastructure::loopback::LoopbackTransport;
use crate::infrastructure::serial::{self, SerialTransport};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const LOOPBACK_PORT: &str = "loopback";

/// Execute CLI command
pub async fn execute_command(args: Args) -> TermResult<()> {
    let writer = ConsoleWriter::new(args.output).quiet(args.quiet);

    let config_manager = match &args.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let config = config_manager.load_config()?;

    // The interactive terminal owns the screen, so it logs to a file instead
    match &args.command {
        Command::Connect(connect) => {
            let log_path = connect
                .log_file
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(logging::default_log_path);
            logging::init_file_logging(&log_path, &config.global.log_level, args.verbose)?;
        }
        _ if !args.quiet => {
            logging::init_logging(&config.global.log_level, args.verbose)?;
        }
        _ => {}
    }

    match args.command {
        Command::Ports => {
            let ports = serial::list_ports()?;
            writer.write_ports(&ports)?;
            Ok(())
        }
        Command::Convert(convert_args) => execute_convert(convert_args, &writer),
        Command::Send(send_args) => execute_send(send_args, &writer, &config).await,
        Command::Connect(connect_args) => execute_connect(connect_args, &config).await,
        Command::Config(config_args) => {
            execute_config_command(config_args, &writer, &config, &config_manager)
        }
        Command::Version => {
            writer.write_message(&format!("serialterm {}", env!("CARGO_PKG_VERSION")))?;
            Ok(())
        }
    }
}

fn execute_convert(args: ConvertArgs, writer: &ConsoleWriter) -> TermResult<()> {
    let from = EncodingMode::from(args.from);
    let to = EncodingMode::from(args.to);
    let output = codec::transcode(from, to, &args.text)?;

    writer.write_conversion(&Conversion {
        from,
        to,
        input: args.text,
        output,
    })?;
    Ok(())
}

async fn execute_send(args: SendArgs, writer: &ConsoleWriter, config: &AppConfig) -> TermResult<()> {
    let line = resolve_line(config, &args.line, args.loopback)?;
    let terminal = TerminalConfig {
        encoding: args.encoding.into(),
        line_break: args.line_break.map(Into::into).unwrap_or(config.terminal.line_break),
        ..config.terminal.clone()
    };

    let mut controller = SessionController::new(transport_for(args.loopback), line, &terminal);
    controller.connect().await?;
    controller.send(&args.data).await?;

    debug!("Waiting {}ms for a response", args.wait);
    tokio::time::sleep(Duration::from_millis(args.wait)).await;
    controller.flush().await?;
    controller.disconnect().await?;

    let exchange = Exchange {
        port: controller.config().port.clone(),
        entries: controller.entries().await,
    };
    writer.write_exchange(&exchange)?;
    Ok(())
}

async fn execute_connect(args: ConnectArgs, config: &AppConfig) -> TermResult<()> {
    let line = resolve_line(config, &args.line, args.loopback)?;
    let mut terminal = config.terminal.clone();
    if let Some(encoding) = args.encoding {
        terminal.encoding = encoding.into();
    }
    if let Some(line_break) = args.line_break {
        terminal.line_break = line_break.into();
    }

    info!("Starting interactive terminal on {}", line.summary());
    let controller = SessionController::new(transport_for(args.loopback), line, &terminal);
    crate::tui::run(controller, terminal.hex_view).await
}

fn execute_config_command(
    args: ConfigArgs,
    writer: &ConsoleWriter,
    config: &AppConfig,
    config_manager: &ConfigManager,
) -> TermResult<()> {
    match args.command {
        ConfigCommand::Show => {
            writer.write_config(config)?;
            Ok(())
        }
        ConfigCommand::Validate { file } => {
            let (path, checked) = match file {
                Some(path) => {
                    let checked = config_manager.load_config_from_path(path.as_ref())?;
                    (path, checked)
                }
                None => ("current configuration".to_string(), config.clone()),
            };

            let problems = config_manager.validate(&checked);
            let count = problems.len();
            writer.write_validation(&ValidationReport { path, problems })?;

            if count > 0 {
                return Err(TermError::Config {
                    message: format!("{} configuration problem(s) found", count),
                });
            }
            Ok(())
        }
        ConfigCommand::Init { dir } => {
            let dir = match dir {
                Some(dir) => PathBuf::from(dir),
                None => std::env::current_dir()?,
            };
            let path = config_manager.init_project_config(&dir)?;
            writer.write_message(&format!(
                "Project configuration initialized at '{}'",
                path.display()
            ))?;
            Ok(())
        }
    }
}

fn transport_for(loopback: bool) -> Arc<dyn Transport> {
    if loopback {
        Arc::new(LoopbackTransport::new())
    } else {
        Arc::new(SerialTransport::new())
    }
}

/// Merge the configured line with command line overrides and pick a port
/// when none is set
pub fn resolve_line(config: &AppConfig, line: &LineArgs, loopback: bool) -> TermResult<SerialConfig> {
    let mut serial_config = config.serial.clone();
    line.apply(&mut serial_config);

    if serial_config.port.is_empty() {
        serial_config.port = if loopback {
            LOOPBACK_PORT.to_string()
        } else {
            serial::ports::first_port().ok_or_else(|| {
                TermError::InvalidInput("no serial port found, pass --port".to_string())
            })?
        };
        debug!("Using port {}", serial_config.port);
    }

    Ok(serial_config)
}
