//! iplog-rs: a minimal address-logging TCP service
//!
//! The service answers two request kinds over a raw byte stream: `/log`
//! records the connecting peer's address, `/get` returns every address seen
//! within the retention window, `;`-joined. Entries that go quiet for longer
//! than the kill time are evicted by a background sweep, and opportunistically
//! when a `/get` arrives while the sweeper is lagging.
//!
//! # Architecture
//!
//! ```text
//!               IpServer (accept loop)
//!                   │ spawn per connection
//!                   ▼
//!             Connection::run ──► Request::classify
//!                   │                   │
//!                   │    Get ──► maybe_prune + snapshot
//!                   │    Log ──► touch(peer)
//!                   ▼
//!            Arc<IpRegistry> ◄── sweep task (interval prune)
//!                   │
//!        SnapshotFile (load at startup, save at shutdown)
//! ```
//!
//! The registry is the only cross-task mutable state; every access goes
//! through its methods, so connection handlers and the sweeper never observe
//! a partial mutation.

pub mod error;
pub mod persist;
pub mod protocol;
pub mod registry;
pub mod server;

pub use error::{Error, Result};
pub use persist::SnapshotFile;
pub use registry::{IpEntry, IpRegistry, RegistryConfig};
pub use server::{IpServer, ServerConfig};
