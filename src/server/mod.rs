//! TCP server: configuration, accept loop, and per-connection handling

pub mod config;
pub mod handler;
pub mod listener;

pub use config::ServerConfig;
pub use handler::Connection;
pub use listener::IpServer;
