use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::config::LockConfig;
use crate::connection::Connection;
use crate::error::LockError;

/// Factory trait for lock backends.
///
/// A driver resolves the loosely-typed [`LockConfig`] into its own typed
/// settings and produces a connection in the constructed-but-unopened state.
/// It never opens the connection itself; the caller decides when to dial.
pub trait Driver: Send + Sync {
    fn connect(&self, config: &LockConfig) -> Result<Box<dyn Connection>, LockError>;
}

/// Name → driver mapping, held explicitly by the hosting application.
///
/// The host constructs a registry, registers the drivers it wants available,
/// and hands it to generic code that selects a backend by name:
///
/// ```
/// use storelock::{Connection, LockConfig, MemoryDriver, Registry};
///
/// let registry = Registry::new();
/// registry.register("memory", std::sync::Arc::new(MemoryDriver)).unwrap();
///
/// let mut conn = registry.connect("memory", &LockConfig::default()).unwrap();
/// conn.open().unwrap();
/// ```
///
/// Registration of unrelated drivers may happen concurrently from multiple
/// threads. Registering an existing name replaces the previous driver.
pub struct Registry {
    drivers: RwLock<HashMap<String, Arc<dyn Driver>>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            drivers: RwLock::new(HashMap::new()),
        }
    }

    pub fn register(&self, name: &str, driver: Arc<dyn Driver>) -> Result<(), LockError> {
        let mut drivers = self
            .drivers
            .write()
            .map_err(|_| LockError::Poisoned("driver registry poisoned".into()))?;
        drivers.insert(name.to_string(), driver);
        Ok(())
    }

    /// Produce an unopened connection from the driver registered as `name`.
    pub fn connect(
        &self,
        name: &str,
        config: &LockConfig,
    ) -> Result<Box<dyn Connection>, LockError> {
        let drivers = self
            .drivers
            .read()
            .map_err(|_| LockError::Poisoned("driver registry poisoned".into()))?;
        let driver = drivers
            .get(name)
            .ok_or_else(|| LockError::UnknownDriver(name.to_string()))?;
        driver.connect(config)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
