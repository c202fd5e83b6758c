pub mod editor;
pub mod help;
pub mod history;
pub mod status;
pub mod terminal;
