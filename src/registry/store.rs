//! Address registry implementation
//!
//! The central shared map from client address to last-seen timestamp. This is
//! the only cross-task mutable state in the service; connection handlers and
//! the sweep task all go through the methods here, never the map itself.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};

use super::config::RegistryConfig;
use super::entry::IpEntry;

/// Registry of recently-seen client addresses
///
/// Thread-safe via `RwLock`; every operation takes the lock for its full
/// duration, so concurrent readers never observe a partial mutation.
pub struct IpRegistry {
    /// Map of address to last-seen timestamp
    entries: RwLock<HashMap<IpAddr, OffsetDateTime>>,

    /// When the opportunistic prune path last ran
    last_pruned: Mutex<OffsetDateTime>,

    /// Configuration
    config: RegistryConfig,
}

impl IpRegistry {
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            last_pruned: Mutex::new(OffsetDateTime::now_utc()),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Insert or refresh an address, stamping it with the current time.
    ///
    /// Always succeeds; logging a second time simply refreshes the timestamp,
    /// it never produces a duplicate entry.
    pub async fn touch(&self, addr: IpAddr) {
        let mut entries = self.entries.write().await;
        entries.insert(addr, OffsetDateTime::now_utc());
    }

    /// Current set of known addresses, order unspecified
    pub async fn snapshot(&self) -> Vec<IpAddr> {
        let entries = self.entries.read().await;
        entries.keys().copied().collect()
    }

    /// Remove every entry whose last activity is older than the kill time.
    ///
    /// Returns the removed addresses so callers can log them; the registry
    /// itself stays quiet. Idempotent: a second call with no intervening
    /// `touch` removes nothing.
    pub async fn prune(&self, now: OffsetDateTime) -> Vec<IpAddr> {
        let mut entries = self.entries.write().await;

        if entries.is_empty() {
            return Vec::new();
        }

        let expired: Vec<IpAddr> = entries
            .iter()
            .filter(|(_, last_seen)| now - **last_seen > self.config.kill_time)
            .map(|(addr, _)| *addr)
            .collect();

        for addr in &expired {
            entries.remove(addr);
        }

        expired
    }

    /// Opportunistic prune for the "get" path.
    ///
    /// Runs a prune only when more than a sweep interval has passed since the
    /// last one, so a lagging sweep task cannot make "get" results stale.
    /// Returns the removed addresses, empty when throttled.
    pub async fn maybe_prune(&self, now: OffsetDateTime) -> Vec<IpAddr> {
        {
            let mut last_pruned = self.last_pruned.lock().await;
            if now - *last_pruned <= self.config.sweep_interval {
                return Vec::new();
            }
            *last_pruned = now;
        }

        self.prune(now).await
    }

    /// Bulk replace the registry contents; startup only
    pub async fn load_all(&self, loaded: Vec<IpEntry>) {
        let mut entries = self.entries.write().await;
        entries.clear();
        for entry in loaded {
            entries.insert(entry.addr, entry.last_seen);
        }
    }

    /// Bulk read of every entry; shutdown/save only
    pub async fn dump_all(&self) -> Vec<IpEntry> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .map(|(addr, last_seen)| IpEntry::new(*addr, *last_seen))
            .collect()
    }

    /// Number of known addresses
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the registry holds no addresses
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Spawn the background sweep task.
    ///
    /// The task sleeps for a sweep interval, prunes, and repeats until the
    /// returned handle is aborted. Aborting interrupts the pending sleep
    /// without running a final sweep.
    pub fn spawn_sweep_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let registry = Arc::clone(self);
        let interval = registry.config.sweep_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; consume it so the task
            // sleeps before its first prune.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = registry.prune(OffsetDateTime::now_utc()).await;
                for addr in removed {
                    tracing::info!(%addr, "ip removed");
                }
            }
        })
    }
}

impl Default for IpRegistry {
    fn default() -> Self {
        Self::new()
    }
}
