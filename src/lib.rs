//! Distributed mutual-exclusion locks over a shared key-value store.
//!
//! A lock is one record in the store: present means held, absent means free.
//! Acquisition is a single atomic set-if-absent write; the store's native TTL
//! bounds every hold, so a holder that crashes without unlocking can never
//! deadlock a key; release is a delete. The store is the single authority:
//! this crate keeps no lock state of its own and never retries on the
//! caller's behalf.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Registry (per host app)                   │
//! │  name → Driver; connect(name, config) → Box<dyn Connection> │
//! └─────────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Connection (StoreConnection<S>)                │
//! │  open / close / lock(key, expire) / unlock(key)             │
//! │  (the lock protocol, written once over any Store)           │
//! └─────────────────────────────────────────────────────────────┘
//!          │                                  │
//!          ▼                                  ▼
//! ┌─────────────────┐              ┌─────────────────────┐
//! │   MemoryStore   │              │     RedisStore      │
//! │   (included)    │              │  (feature "redis")  │
//! └─────────────────┘              └─────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use storelock::{Connection, LockConfig, LockError, RedisDriver, Registry};
//!
//! # fn main() -> Result<(), LockError> {
//! let registry = Registry::new();
//! registry.register("redis", Arc::new(RedisDriver))?;
//!
//! let mut conn = registry.connect("redis", &LockConfig::default())?;
//! conn.open()?;
//!
//! match conn.lock("jobs:nightly", Duration::from_secs(30)) {
//!     Ok(()) => {
//!         // critical section, bounded by the 30s expiry
//!         conn.unlock("jobs:nightly")?;
//!     }
//!     Err(LockError::AlreadyLocked(_)) => {
//!         // another process holds it; back off or skip this run
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## What this is not
//!
//! Locks are not reentrant and not fair (no wait queue; contenders just see
//! [`LockError::AlreadyLocked`]), and not renewable: hold time is fixed at
//! acquisition. `unlock` deletes unconditionally, without verifying the
//! caller still owns the record. See [`Connection::unlock`] for the
//! implications.

mod config;
mod connection;
mod driver;
mod error;
mod memory;
mod store;

#[cfg(feature = "redis")]
mod redis;

pub use config::{ConfigMap, LockConfig, Settings};
pub use connection::{Connection, StoreConnection, MIN_EXPIRE};
pub use driver::{Driver, Registry};
pub use error::{LockError, StoreError};
pub use store::Store;
pub use memory::{MemoryDriver, MemoryStore, MEMORY_DRIVER};

#[cfg(feature = "redis")]
pub use self::redis::{RedisDriver, RedisStore, REDIS_DRIVER};
