//! Snapshot persistence
//!
//! Best-effort persistence of the registry across restarts. The on-disk
//! format is UTF-8 text, one record per line:
//!
//! ```text
//! 192.168.1.7|2026-08-23T10:15:30Z
//! ```
//!
//! The file is read wholesale at startup and overwritten wholesale at
//! shutdown; it is never touched on the request path. Load is tolerant per
//! line: a line without the delimiter or with an unparsable address is
//! skipped, and an unparsable timestamp defaults the entry to "now" rather
//! than dropping the address.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::registry::IpEntry;

/// Field delimiter within a snapshot line
const DELIMITER: char = '|';

/// Handle to the registry's snapshot file
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    /// Create a handle for the given path; the file need not exist
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every parsable entry from the snapshot file.
    ///
    /// An absent file is not an error; it yields an empty set so the service
    /// starts fresh. `now` stamps entries whose timestamp field fails to
    /// parse.
    pub async fn load(&self, now: OffsetDateTime) -> Result<Vec<IpEntry>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::Snapshot {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        let mut entries = Vec::new();
        for line in content.lines() {
            if let Some(entry) = parse_line(line, now) {
                entries.push(entry);
            } else if !line.trim().is_empty() {
                tracing::warn!(line, "skipping malformed snapshot line");
            }
        }

        Ok(entries)
    }

    /// Overwrite the snapshot file with one line per entry.
    ///
    /// Callers treat failure as non-fatal: the error is logged and the
    /// service keeps running with its in-memory state.
    pub async fn save(&self, entries: &[IpEntry]) -> Result<()> {
        let mut content = String::new();
        for entry in entries {
            // Rfc3339 formatting of a UTC timestamp cannot fail; fall back
            // to skipping the record rather than aborting the save.
            match entry.last_seen.format(&Rfc3339) {
                Ok(ts) => {
                    content.push_str(&entry.addr.to_string());
                    content.push(DELIMITER);
                    content.push_str(&ts);
                    content.push('\n');
                }
                Err(e) => {
                    tracing::warn!(addr = %entry.addr, error = %e, "skipping unformattable entry");
                }
            }
        }

        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| Error::Snapshot {
                path: self.path.clone(),
                source: e,
            })
    }
}

/// Parse one `address|rfc3339` line.
///
/// Returns `None` when the structure or the address is unusable; a bad
/// timestamp alone degrades to `now`.
fn parse_line(line: &str, now: OffsetDateTime) -> Option<IpEntry> {
    let line = line.trim();
    let (addr_str, ts_str) = line.split_once(DELIMITER)?;

    let addr: IpAddr = addr_str.parse().ok()?;
    let last_seen = OffsetDateTime::parse(ts_str, &Rfc3339).unwrap_or(now);

    Some(IpEntry::new(addr, last_seen))
}
