//! Server configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::registry::RegistryConfig;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// How long an inactive address stays in the registry
    pub kill_time: Duration,

    /// Period between background eviction sweeps
    pub sweep_interval: Duration,

    /// Path of the snapshot file loaded at startup and saved at shutdown
    pub data_file: PathBuf,

    /// Path of the service log file (consumed by the binary's logging setup)
    pub log_file: PathBuf,

    /// Request target that returns the known-address list
    pub get_view: String,

    /// Request target that records the peer address
    pub log_view: String,

    /// Requests shorter than this many bytes are dropped without a reply
    pub min_request_len: usize,

    /// Upper bound on how many request bytes are read per connection
    pub read_budget: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            kill_time: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(60),
            data_file: PathBuf::from("ipdata.txt"),
            log_file: PathBuf::from("iplog.log"),
            get_view: "/get".to_string(),
            log_view: "/log".to_string(),
            min_request_len: 10,
            read_budget: 256,
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the retention window
    pub fn kill_time(mut self, kill_time: Duration) -> Self {
        self.kill_time = kill_time;
        self
    }

    /// Set the sweep interval
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Set the snapshot file path
    pub fn data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = path.into();
        self
    }

    /// Set the log file path
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = path.into();
        self
    }

    /// Set the "get" view string
    pub fn get_view(mut self, view: impl Into<String>) -> Self {
        self.get_view = view.into();
        self
    }

    /// Set the "log" view string
    pub fn log_view(mut self, view: impl Into<String>) -> Self {
        self.log_view = view.into();
        self
    }

    /// Project the retention fields into a registry configuration
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig::default()
            .kill_time(self.kill_time)
            .sweep_interval(self.sweep_interval)
    }
}
