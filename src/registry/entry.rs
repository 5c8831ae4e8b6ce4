//! Registry entry type

use std::net::IpAddr;

use time::OffsetDateTime;

/// A single address record: one per distinct address, keyed by the address.
///
/// Used as the bulk-transfer record between the registry and the persistence
/// layer (`dump_all`/`load_all`); on the request path the registry works on
/// its internal map directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpEntry {
    /// Network-level identifier of the client
    pub addr: IpAddr,

    /// When the address last contacted the service
    pub last_seen: OffsetDateTime,
}

impl IpEntry {
    /// Create an entry seen at the given instant
    pub fn new(addr: IpAddr, last_seen: OffsetDateTime) -> Self {
        Self { addr, last_seen }
    }
}
