use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use crate::config::{LockConfig, Settings};
use crate::connection::{Connection, StoreConnection};
use crate::driver::Driver;
use crate::error::{LockError, StoreError};
use crate::store::Store;

/// Symbolic name the memory driver is conventionally registered under.
pub const MEMORY_DRIVER: &str = "memory";

const DEFAULT_ADDR: &str = "local";

struct Entry {
    #[allow(dead_code)]
    value: String,
    deadline: Instant,
}

type Namespace = Mutex<HashMap<String, Entry>>;

// One namespace per address, shared process-wide. This stands in for the
// external store instance: two connections opened against the same address
// contend over the same keys, just as two redis connections to the same
// server would.
fn namespace(addr: &str) -> Result<Arc<Namespace>, StoreError> {
    static NAMESPACES: OnceLock<Mutex<HashMap<String, Arc<Namespace>>>> = OnceLock::new();
    let mut table = NAMESPACES
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .map_err(|_| StoreError::Command("namespace table poisoned".into()))?;
    Ok(table
        .entry(addr.to_string())
        .or_insert_with(|| Arc::new(Mutex::new(HashMap::new())))
        .clone())
}

/// In-process store with real TTL semantics.
///
/// The always-available backend: useful for tests and for single-process
/// deployments that want the lock API without an external store. Expired
/// entries are reclaimed lazily, on the next access of their key.
pub struct MemoryStore {
    entries: Arc<Namespace>,
}

impl Store for MemoryStore {
    fn connect(settings: &Settings) -> Result<Self, StoreError> {
        Ok(MemoryStore {
            entries: namespace(&settings.addr)?,
        })
    }

    fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Command("namespace poisoned".into()))?;

        if let Some(entry) = entries.get(key) {
            if entry.deadline > Instant::now() {
                return Ok(false);
            }
            // TTL elapsed; the record no longer counts.
            entries.remove(key);
        }

        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                deadline: Instant::now() + ttl,
            },
        );
        Ok(true)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Command("namespace poisoned".into()))?;
        entries.remove(key);
        Ok(())
    }
}

/// Driver producing [`MemoryStore`]-backed connections.
///
/// The only setting it reads is the address (`addr`/`server`), which selects
/// the shared namespace; everything else is accepted and ignored.
pub struct MemoryDriver;

impl Driver for MemoryDriver {
    fn connect(&self, config: &LockConfig) -> Result<Box<dyn Connection>, LockError> {
        let settings = Settings::resolve(config, DEFAULT_ADDR);
        Ok(Box::new(StoreConnection::<MemoryStore>::new(settings)))
    }
}
