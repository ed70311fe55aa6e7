use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, trace};

use crate::config::Settings;
use crate::error::LockError;
use crate::store::Store;

/// Floor applied when neither the `lock` call nor the connection configures
/// a positive expiry. A record must never reach the store without a TTL, or
/// a crashed holder would deadlock the key forever.
pub const MIN_EXPIRE: Duration = Duration::from_secs(1);

/// Operation surface of one lock connection.
///
/// Implementations are obtained from a [`Driver`] in the constructed-but-
/// unopened state; `lock` and `unlock` before a successful `open` fail with
/// [`LockError::NotReady`] without contacting the store.
///
/// Every call blocks for at most one store round-trip. Nothing here retries,
/// spawns background work, or renews a held lock; hold time is strictly
/// bounded by the expiry chosen at acquisition.
///
/// [`Driver`]: crate::Driver
pub trait Connection: Send + Sync {
    /// Establish the store handle and verify reachability.
    ///
    /// Calling `open` on an already-open connection re-creates the handle.
    fn open(&mut self) -> Result<(), LockError>;

    /// Release the store handle. A no-op success when never opened.
    fn close(&mut self) -> Result<(), LockError>;

    /// Try to acquire the lock for `key`, holding it for at most `expire`.
    ///
    /// A zero `expire` falls back to the connection's configured default,
    /// and failing that to [`MIN_EXPIRE`].
    ///
    /// Returns `Ok(())` when the caller now holds the lock, and
    /// [`LockError::AlreadyLocked`] when another holder does. `AlreadyLocked`
    /// is contention, not a fault; the caller decides whether to retry, back
    /// off, or abort. This call never retries on its own.
    fn lock(&self, key: &str, expire: Duration) -> Result<(), LockError>;

    /// Release the lock for `key` by deleting its record.
    ///
    /// The delete is unconditional: no token or fencing check ties the
    /// release to the original acquisition, so an `unlock` after this
    /// holder's record expired can release a lock acquired by someone else
    /// in the meantime. Callers needing stricter guarantees must keep their
    /// hold time comfortably inside the expiry.
    ///
    /// Unlocking an absent key is a success, not an error.
    fn unlock(&self, key: &str) -> Result<(), LockError>;
}

/// The lock protocol over any [`Store`]: drivers supply the store, this
/// type supplies the semantics, so every backend behaves identically.
pub struct StoreConnection<S: Store> {
    settings: Settings,
    store: Option<S>,
}

impl<S: Store> StoreConnection<S> {
    /// Construct an unopened connection with already-resolved settings.
    pub fn new(settings: Settings) -> Self {
        StoreConnection {
            settings,
            store: None,
        }
    }

    fn store(&self) -> Result<&S, LockError> {
        self.store.as_ref().ok_or(LockError::NotReady)
    }

    /// Resolve the effective expiry: the caller's duration if positive, else
    /// the connection default if positive, else [`MIN_EXPIRE`].
    fn effective_expire(&self, expire: Duration) -> Duration {
        if !expire.is_zero() {
            expire
        } else if !self.settings.default_expire.is_zero() {
            self.settings.default_expire
        } else {
            MIN_EXPIRE
        }
    }
}

impl<S: Store> Connection for StoreConnection<S> {
    fn open(&mut self) -> Result<(), LockError> {
        let store = S::connect(&self.settings)?;
        store.ping()?;
        debug!("lock store opened at {}", self.settings.addr);
        self.store = Some(store);
        Ok(())
    }

    fn close(&mut self) -> Result<(), LockError> {
        if self.store.take().is_some() {
            debug!("lock store at {} closed", self.settings.addr);
        }
        Ok(())
    }

    fn lock(&self, key: &str, expire: Duration) -> Result<(), LockError> {
        let store = self.store()?;
        let expire = self.effective_expire(expire);

        // The record's value is informational only: the acquisition instant
        // in nanoseconds. Ownership is never verified against it.
        let now_nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);

        if store.set_if_absent(key, &now_nanos.to_string(), expire)? {
            debug!("acquired lock {} for {:?}", key, expire);
            Ok(())
        } else {
            trace!("lock {} contended", key);
            Err(LockError::AlreadyLocked(key.to_string()))
        }
    }

    fn unlock(&self, key: &str) -> Result<(), LockError> {
        let store = self.store()?;
        store.delete(key)?;
        debug!("released lock {}", key);
        Ok(())
    }
}
