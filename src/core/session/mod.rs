// Session module - Terminal session engine and transport boundary
pub mod controller;
pub mod transport;

pub use controller::{ReceiveHandle, SessionController, SessionEvent};
pub use transport::{Connection, LineSignals, Link, LinkEvent, Transport};
