use thiserror::Error;

/// Failure to open the serial line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpenError {
    #[error("Access is denied to the port '{port}'")]
    PermissionDenied { port: String },

    #[error("One or more of the port properties are invalid: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("The state of the port '{port}' is invalid: {reason}")]
    InvalidPortState { port: String, reason: String },
}

/// SerialTerm unified error type
#[derive(Error, Debug)]
pub enum TermError {
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange { index: isize, len: usize },

    #[error("Device not connected")]
    NotConnected,

    #[error("Open error: {0}")]
    Open(#[from] OpenError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("TUI error: {0}")]
    Tui(String),
}

pub type TermResult<T> = Result<T, TermError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_error_messages() {
        let denied = OpenError::PermissionDenied { port: "/dev/ttyS0".to_string() };
        assert_eq!(denied.to_string(), "Access is denied to the port '/dev/ttyS0'");

        let err: TermError = denied.into();
        assert!(matches!(err, TermError::Open(OpenError::PermissionDenied { .. })));
        assert!(err.to_string().starts_with("Open error"));
    }

    #[test]
    fn test_index_out_of_range_display() {
        let err = TermError::IndexOutOfRange { index: 3, len: 2 };
        assert_eq!(err.to_string(), "Index 3 out of range for length 2");
    }
}
