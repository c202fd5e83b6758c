use serialterm::core::codec::{self, EncodingMode};
use serialterm::core::session::SessionController;
use serialterm::domain::config::{SerialConfig, TerminalConfig};
use serialterm::infrastructure::loopback::LoopbackTransport;
use serialterm::{OpenError, TermError, TermResult};
use std::error::Error;
use std::sync::Arc;

/// Error handling and resilience tests
#[cfg(test)]
mod error_handling_tests {
    use super::*;

    #[test]
    fn test_error_types() {
        let errors = vec![
            TermError::InvalidEncoding("bad digit".to_string()),
            TermError::IndexOutOfRange { index: -1, len: 0 },
            TermError::NotConnected,
            TermError::Config { message: "Config error".to_string() },
            TermError::Session { message: "Session error".to_string() },
            TermError::InvalidInput("Invalid input".to_string()),
            TermError::Output("Output error".to_string()),
            TermError::Tui("TUI error".to_string()),
        ];

        for error in errors {
            assert!(!error.to_string().is_empty(), "Error display should not be empty");
        }

        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TermError>();
        assert_send_sync::<OpenError>();
    }

    #[test]
    fn test_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let term_error: TermError = io_error.into();
        assert!(matches!(term_error, TermError::Io(_)));
        assert!(term_error.source().is_some());

        let open_error = OpenError::InvalidConfiguration { reason: "baud".to_string() };
        let term_error: TermError = open_error.clone().into();
        assert!(matches!(term_error, TermError::Open(ref e) if *e == open_error));
    }

    #[test]
    fn test_result_type() {
        fn parse(text: &str) -> TermResult<Vec<u8>> {
            codec::decode(EncodingMode::Hexadecimal, text)
        }

        assert_eq!(parse("0A FF").unwrap(), vec![0x0A, 0xFF]);
        assert!(matches!(parse("ZZ"), Err(TermError::InvalidEncoding(_))));
    }

    #[test]
    fn test_characters_beyond_latin1_are_rejected() {
        let result = codec::decode(EncodingMode::Character, "\u{20AC}");
        assert!(matches!(result, Err(TermError::InvalidEncoding(_))));
    }

    #[test]
    fn test_invalid_line_settings() {
        let mut config = SerialConfig::new("COM3", 9600);
        config.data_bits = 9;
        assert!(matches!(
            config.validate(),
            Err(OpenError::InvalidConfiguration { .. })
        ));

        let empty = SerialConfig::new("", 9600);
        assert!(empty.validate().is_err());
    }

    #[tokio::test]
    async fn test_invalid_settings_fail_to_open() {
        let line = LoopbackTransport::new();
        let mut config = SerialConfig::new("loopback", 9600);
        config.stop_bits = 3;
        let mut controller =
            SessionController::new(Arc::new(line), config, &TerminalConfig::default());

        let err = controller.connect().await.unwrap_err();
        assert!(matches!(err, TermError::Open(OpenError::InvalidConfiguration { .. })));
        assert!(!controller.is_connected());
    }

    #[tokio::test]
    async fn test_disconnect_twice_is_harmless() {
        let line = LoopbackTransport::new();
        let mut controller = SessionController::new(
            Arc::new(line),
            SerialConfig::new("loopback", 9600),
            &TerminalConfig::default(),
        );

        controller.connect().await.unwrap();
        controller.disconnect().await.unwrap();
        controller.disconnect().await.unwrap();
        assert!(matches!(controller.send("x").await, Err(TermError::NotConnected)));
    }

    #[tokio::test]
    async fn test_session_survives_bad_input() {
        let line = LoopbackTransport::silent();
        let mut controller = SessionController::new(
            Arc::new(line.clone()),
            SerialConfig::new("loopback", 9600),
            &TerminalConfig::default(),
        );
        controller.connect().await.unwrap();
        controller.set_encoding_mode(EncodingMode::Hexadecimal);

        assert!(controller.send("GG").await.is_err());
        controller.send("41").await.unwrap();

        assert_eq!(line.writes().len(), 1);
        assert_eq!(controller.history().len(), 1);
    }
}
