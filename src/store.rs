use std::time::Duration;

use crate::config::Settings;
use crate::error::StoreError;

/// Capability contract for a backing key-value store.
///
/// This is everything the lock protocol needs from a store: an atomic
/// set-if-absent-with-expiry, a delete, and a liveness check. Mutual
/// exclusion rests entirely on `set_if_absent` being atomic at the store:
/// among N concurrent writers of the same absent key, exactly one may see
/// `true`.
///
/// A store handle is shared by concurrent callers issuing independent
/// requests, so implementations must be safe to use that way (hence
/// `Send + Sync`).
pub trait Store: Sized + Send + Sync {
    /// Establish a handle to the store described by `settings`.
    ///
    /// Validates the settings (e.g. the database index) but is not required
    /// to dial eagerly; reachability is verified separately via [`ping`].
    ///
    /// [`ping`]: Store::ping
    fn connect(settings: &Settings) -> Result<Self, StoreError>;

    /// Verify the store is reachable.
    fn ping(&self) -> Result<(), StoreError>;

    /// Atomically write `value` under `key` only if `key` is absent,
    /// attaching `ttl` so the store reclaims the record on its own.
    ///
    /// Returns `Ok(true)` if the write happened, `Ok(false)` if the key was
    /// already present. `ttl` is guaranteed strictly positive by the caller.
    fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// Delete the record under `key`. Deleting an absent key is a success;
    /// the desired end state already holds.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}
