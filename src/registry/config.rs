//! Registry configuration

use std::time::Duration;

/// Retention and sweep configuration for [`super::IpRegistry`]
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// How long an address stays in the registry after its last activity
    pub kill_time: Duration,

    /// Period between background eviction passes; also throttles the
    /// opportunistic prune on the "get" path
    pub sweep_interval: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            kill_time: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl RegistryConfig {
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
}
