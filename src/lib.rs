//! SerialTerm Library
//!
//! Serial line terminal engine: a session controller that sends and
//! receives in character, binary or hexadecimal notation, keeps a
//! transcript and a resend history, and drives a terminal UI.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod tui;

pub use core::codec::EncodingMode;
pub use core::linebreak::LineBreak;
pub use core::session::{ReceiveHandle, SessionController, SessionEvent, Transport};
pub use core::transcript::{Direction, Transcript, TranscriptEntry};
pub use domain::config::{AppConfig, SerialConfig};
pub use domain::error::{OpenError, TermError, TermResult};
