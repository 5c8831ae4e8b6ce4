//! Recently-seen address registry
//!
//! The registry owns the full set of entries and is the sole mutator of
//! entry lifetime: entries appear on `touch`, refresh on repeated `touch`,
//! and disappear on `prune`. Eviction happens at sweep boundaries (plus the
//! opportunistic prune on the "get" path), so an idle entry may outlive the
//! kill time by up to one sweep interval. That slack is intentional.

pub mod config;
pub mod entry;
pub mod store;

pub use config::RegistryConfig;
pub use entry::IpEntry;
pub use store::IpRegistry;
