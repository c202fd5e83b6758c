// Infrastructure module - Transports, configuration files and logging
pub mod config;
pub mod logging;
pub mod loopback;
pub mod serial;
