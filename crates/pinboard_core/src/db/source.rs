//! Scoped connection acquisition.
//!
//! # Responsibility
//! - Turn an externally supplied descriptor into a SQLite target.
//! - Open one fully bootstrapped connection per invocation.
//!
//! # Invariants
//! - `acquire` never caches connections; the caller owns the returned value
//!   and the connection closes when it is dropped, on every exit path.

use super::{open_db, DbError, DbResult, DEFAULT_BUSY_TIMEOUT};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Source of per-invocation store connections.
pub trait ConnectionSource {
    /// Opens a connection with migrations applied.
    fn acquire(&self) -> DbResult<Connection>;
}

/// File-backed SQLite connection source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteSource {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Builds a source from a connection descriptor such as `sqlite:///var/pins.db`.
    pub fn from_descriptor(descriptor: &str) -> DbResult<Self> {
        parse_descriptor(descriptor).map(Self::new)
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn busy_timeout(&self) -> Duration {
        self.busy_timeout
    }
}

impl ConnectionSource for SqliteSource {
    fn acquire(&self) -> DbResult<Connection> {
        open_db(&self.path, self.busy_timeout)
    }
}

/// Resolves a connection descriptor to a database file path.
///
/// Accepted forms: a bare path, `sqlite://<path>`, `sqlite:<path>` and
/// `file:<path>`. In-memory targets are rejected because every invocation
/// opens a fresh connection and would see an empty database.
pub fn parse_descriptor(descriptor: &str) -> DbResult<PathBuf> {
    let trimmed = descriptor.trim();
    if trimmed.is_empty() {
        return Err(DbError::InvalidDescriptor(
            "descriptor cannot be empty".to_string(),
        ));
    }

    let path = ["sqlite://", "sqlite:", "file:"]
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);
    let path = path.split('?').next().unwrap_or_default();

    if path.is_empty() {
        return Err(DbError::InvalidDescriptor(format!(
            "descriptor `{trimmed}` does not name a database file"
        )));
    }
    if path == ":memory:" {
        return Err(DbError::InvalidDescriptor(
            "in-memory databases do not persist across invocations".to_string(),
        ));
    }

    Ok(PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::parse_descriptor;
    use std::path::PathBuf;

    #[test]
    fn parse_descriptor_accepts_known_prefixes() {
        assert_eq!(
            parse_descriptor("sqlite:///var/lib/pins.db").unwrap(),
            PathBuf::from("/var/lib/pins.db")
        );
        assert_eq!(
            parse_descriptor("file:pins.db?mode=rwc").unwrap(),
            PathBuf::from("pins.db")
        );
        assert_eq!(
            parse_descriptor("  /tmp/pins.db ").unwrap(),
            PathBuf::from("/tmp/pins.db")
        );
    }

    #[test]
    fn parse_descriptor_rejects_blank_and_memory_targets() {
        assert!(parse_descriptor("   ").is_err());
        assert!(parse_descriptor("sqlite://").is_err());
        let err = parse_descriptor("sqlite::memory:").unwrap_err();
        assert!(err.to_string().contains("in-memory"));
    }
}
