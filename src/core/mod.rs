// Core module - Encoding, editing, history and session logic
pub mod codec;
pub mod editor;
pub mod history;
pub mod linebreak;
pub mod session;
pub mod transcript;
