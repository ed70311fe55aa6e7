use std::error::Error;
use std::fmt;

/// Error type for lock operations.
///
/// Only three of these are part of the lock protocol proper: `NotReady`,
/// `AlreadyLocked` and `Store`. The rest cover driver-registry glue.
#[derive(Debug)]
pub enum LockError {
    /// Operation attempted before a successful `open`.
    /// Recoverable: open the connection, then retry.
    NotReady,
    /// The conditional write found the key already present.
    ///
    /// This is the contention signal, not a fault. It is expected and
    /// frequent under load. The caller decides whether to retry, back off,
    /// or abort.
    AlreadyLocked(String),
    /// Transport, authentication, or store-internal fault surfaced by the
    /// underlying client. Wrapped, never swallowed.
    Store(StoreError),
    /// No driver registered under this name.
    UnknownDriver(String),
    /// An interior map (registry or namespace table) was poisoned.
    Poisoned(String),
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::NotReady => write!(f, "connection not ready"),
            LockError::AlreadyLocked(key) => write!(f, "already locked: {}", key),
            LockError::Store(e) => write!(f, "store error: {}", e),
            LockError::UnknownDriver(name) => write!(f, "unknown driver: {}", name),
            LockError::Poisoned(msg) => write!(f, "lock poisoned: {}", msg),
        }
    }
}

impl Error for LockError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LockError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for LockError {
    fn from(err: StoreError) -> Self {
        LockError::Store(err)
    }
}

/// Error type for the backing store itself.
#[derive(Debug)]
pub enum StoreError {
    /// Could not establish or verify a connection to the store.
    Connect(String),
    /// A store command failed after the connection was established.
    Command(String),
    /// The configured database/namespace index is outside the store's
    /// supported range. Surfaced at open time, never silently clamped.
    InvalidDatabase(i64),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Connect(msg) => write!(f, "store unreachable: {}", msg),
            StoreError::Command(msg) => write!(f, "store command failed: {}", msg),
            StoreError::InvalidDatabase(db) => write!(f, "invalid database index: {}", db),
        }
    }
}

impl Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(LockError::NotReady.to_string(), "connection not ready");
        assert_eq!(
            LockError::AlreadyLocked("jobs:nightly".into()).to_string(),
            "already locked: jobs:nightly"
        );
        assert_eq!(
            LockError::UnknownDriver("etcd".into()).to_string(),
            "unknown driver: etcd"
        );
    }

    #[test]
    fn store_error_is_source() {
        let err = LockError::from(StoreError::Connect("refused".into()));
        assert!(err.source().is_some());
        assert!(matches!(err, LockError::Store(StoreError::Connect(_))));
    }
}
