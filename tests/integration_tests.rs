use serialterm::core::codec::EncodingMode;
use serialterm::core::linebreak::LineBreak;
use serialterm::core::session::SessionController;
use serialterm::core::transcript::HexDumpOptions;
use serialterm::domain::config::{AppConfig, ParityConfig, SerialConfig};
use serialterm::infrastructure::config::ConfigManager;
use serialterm::infrastructure::loopback::LoopbackTransport;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

/// Integration tests for the SerialTerm library
#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let mut config = AppConfig::default();
        config.serial = SerialConfig::new("/dev/ttyACM0", 57600);
        config.terminal.line_break = LineBreak::CrLf;
        config.terminal.encoding = EncodingMode::Hexadecimal;

        let toml_str = toml::to_string(&config).expect("Failed to serialize config");
        assert!(toml_str.contains("line_break = \"crlf\""));
        assert!(toml_str.contains("encoding = \"hexadecimal\""));

        let deserialized: AppConfig = toml::from_str(&toml_str).expect("Failed to deserialize config");
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[serial]\nport = \"COM7\"\nparity = \"even\"\n\n[terminal]\nhistory_limit = 5\n",
        )
        .unwrap();

        let manager = ConfigManager::with_path(&path);
        let config = manager.load_config().unwrap();

        assert_eq!(config.serial.port, "COM7");
        assert_eq!(config.serial.parity, ParityConfig::Even);
        assert_eq!(config.serial.baud_rate, SerialConfig::default().baud_rate);
        assert_eq!(config.terminal.history_limit, 5);
        assert_eq!(config.terminal.line_break, LineBreak::Platform);
        assert_eq!(config.terminal.hex_view, HexDumpOptions::default());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[terminal]\nline_break = \"sideways\"\n").unwrap();

        let manager = ConfigManager::with_path(&path);
        let err = manager.load_config().unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_init_then_find_project_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("global.toml"));

        let created = manager.init_project_config(temp_dir.path()).unwrap();
        assert!(created.exists());

        let nested = temp_dir.path().join("firmware").join("src");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(ConfigManager::find_project_config_path(&nested), Some(created.clone()));

        let config = manager.load_config_from_path(&created).unwrap();
        assert_eq!(config.serial.baud_rate, 115200);
        assert!(manager.validate(&config).is_empty());

        // A second init must not clobber the first
        assert!(manager.init_project_config(temp_dir.path()).is_err());
    }

    #[test]
    fn test_validate_reports_problems() {
        let manager = ConfigManager::with_path("unused.toml");
        let mut config = AppConfig::default();
        config.global.log_level = "chatty".to_string();
        config.serial = SerialConfig::new("COM1", 0);
        config.terminal.hex_view.bytes_per_row = 0;

        let problems = manager.validate(&config);
        assert_eq!(problems.len(), 3);
    }

    #[tokio::test]
    async fn test_session_from_loaded_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "[serial]\nport = \"loopback\"\n\n[terminal]\nline_break = \"cr\"\nencoding = \"hexadecimal\"\n",
        )
        .unwrap();
        let config = ConfigManager::with_path(&path).load_config().unwrap();

        let line = LoopbackTransport::new();
        let mut controller =
            SessionController::new(Arc::new(line.clone()), config.serial.clone(), &config.terminal);
        let mut events = controller.subscribe();

        controller.connect().await.unwrap();
        controller.send("4F 4B").await.unwrap();
        assert_eq!(line.writes(), vec![b"OK\r".to_vec()]);

        // Wait for the echo to come back through the pump
        let echoed = timeout(Duration::from_secs(1), async {
            while let Some(event) = events.recv().await {
                if let serialterm::SessionEvent::Appended { direction, .. } = event {
                    if direction == serialterm::Direction::Received {
                        return true;
                    }
                }
            }
            false
        })
        .await
        .unwrap();
        assert!(echoed);

        assert_eq!(controller.transcript().await, "OK\rOK\r\r");

        let dump = controller.hex_dump(&HexDumpOptions::default()).await;
        assert_eq!(dump.len(), 1);
        assert!(dump[0].starts_with("00000000  4F 4B 0D 4F 4B 0D 0D"));

        controller.disconnect().await.unwrap();
    }
}
