use std::time::Duration;

use ::redis::{Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};

use crate::config::{LockConfig, Settings};
use crate::connection::{Connection, StoreConnection};
use crate::driver::Driver;
use crate::error::{LockError, StoreError};
use crate::store::Store;

/// Symbolic name the redis driver is conventionally registered under.
pub const REDIS_DRIVER: &str = "redis";

const DEFAULT_ADDR: &str = "127.0.0.1:6379";
const DEFAULT_PORT: u16 = 6379;

impl From<::redis::RedisError> for StoreError {
    fn from(err: ::redis::RedisError) -> Self {
        StoreError::Command(err.to_string())
    }
}

fn connection_info(settings: &Settings) -> Result<ConnectionInfo, StoreError> {
    if settings.database < 0 {
        return Err(StoreError::InvalidDatabase(settings.database));
    }

    let (host, port) = match settings.addr.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| StoreError::Connect(format!("invalid address: {}", settings.addr)))?;
            (host.to_string(), port)
        }
        None => (settings.addr.clone(), DEFAULT_PORT),
    };

    Ok(ConnectionInfo {
        addr: ConnectionAddr::Tcp(host, port),
        redis: RedisConnectionInfo {
            db: settings.database,
            username: settings.username.clone(),
            password: settings.password.clone(),
            ..Default::default()
        },
    })
}

/// Redis-backed store.
///
/// Holds a [`Client`], which is a cheap connection factory safe to share
/// across threads; each operation checks out its own connection. The
/// conditional write maps onto `SET key value NX PX millis`, so atomicity is
/// redis's own.
///
/// A database index the server does not support is caught either here (when
/// negative) or by the server during the handshake. Both surface at open
/// time, never clamped.
pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    fn connection(&self) -> Result<::redis::Connection, StoreError> {
        self.client
            .get_connection()
            .map_err(|e| StoreError::Connect(e.to_string()))
    }
}

impl Store for RedisStore {
    fn connect(settings: &Settings) -> Result<Self, StoreError> {
        let client = Client::open(connection_info(settings)?)
            .map_err(|e| StoreError::Connect(e.to_string()))?;
        Ok(RedisStore { client })
    }

    fn ping(&self) -> Result<(), StoreError> {
        let mut con = self.connection()?;
        ::redis::cmd("PING")
            .query::<String>(&mut con)
            .map_err(|e| StoreError::Connect(e.to_string()))?;
        Ok(())
    }

    fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut con = self.connection()?;
        // PX takes whole milliseconds and rejects zero; the protocol layer
        // guarantees a positive ttl, so only sub-millisecond durations need
        // rounding up.
        let millis = ttl.as_millis().max(1) as u64;
        let reply: Option<String> = ::redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("PX")
            .arg(millis)
            .query(&mut con)?;
        Ok(reply.is_some())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut con = self.connection()?;
        // DEL reports how many keys it removed; zero (absent key) is fine.
        let _removed: i64 = ::redis::cmd("DEL").arg(key).query(&mut con)?;
        Ok(())
    }
}

/// Driver producing [`RedisStore`]-backed connections.
pub struct RedisDriver;

impl Driver for RedisDriver {
    fn connect(&self, config: &LockConfig) -> Result<Box<dyn Connection>, LockError> {
        let settings = Settings::resolve(config, DEFAULT_ADDR);
        Ok(Box::new(StoreConnection::<RedisStore>::new(settings)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(addr: &str, database: i64) -> Settings {
        Settings {
            addr: addr.to_string(),
            username: None,
            password: None,
            database,
            default_expire: Duration::ZERO,
        }
    }

    #[test]
    fn addr_splits_host_and_port() {
        let info = connection_info(&settings("redis.internal:6390", 2)).unwrap();
        match info.addr {
            ConnectionAddr::Tcp(host, port) => {
                assert_eq!(host, "redis.internal");
                assert_eq!(port, 6390);
            }
            other => panic!("expected tcp address, got {:?}", other),
        }
        assert_eq!(info.redis.db, 2);
    }

    #[test]
    fn addr_without_port_uses_conventional_port() {
        let info = connection_info(&settings("redis.internal", 0)).unwrap();
        match info.addr {
            ConnectionAddr::Tcp(host, port) => {
                assert_eq!(host, "redis.internal");
                assert_eq!(port, DEFAULT_PORT);
            }
            other => panic!("expected tcp address, got {:?}", other),
        }
    }

    #[test]
    fn bad_port_is_a_connect_error() {
        assert!(matches!(
            connection_info(&settings("redis.internal:port", 0)),
            Err(StoreError::Connect(_))
        ));
    }

    #[test]
    fn negative_database_rejected() {
        assert!(matches!(
            connection_info(&settings("127.0.0.1:6379", -1)),
            Err(StoreError::InvalidDatabase(-1))
        ));
    }

    #[test]
    fn credentials_carried_into_connection_info() {
        let mut settings = settings("127.0.0.1:6379", 0);
        settings.username = Some("u".to_string());
        settings.password = Some("p".to_string());
        let info = connection_info(&settings).unwrap();
        assert_eq!(info.redis.username.as_deref(), Some("u"));
        assert_eq!(info.redis.password.as_deref(), Some("p"));
    }
}
