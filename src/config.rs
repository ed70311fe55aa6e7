use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The loosely-typed settings mapping a host hands to a driver.
///
/// Values come from whatever configuration format the host uses (JSON, TOML,
/// env vars parsed into JSON values), so they arrive as mixed types:
/// `database` might be an integer, a float, or a numeric string.
pub type ConfigMap = HashMap<String, Value>;

/// Configuration for one lock connection: the driver-specific settings
/// mapping plus the connection-level default expiry applied when `lock` is
/// called with a zero duration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LockConfig {
    /// Driver-specific settings, resolved into [`Settings`] at connect time.
    #[serde(default)]
    pub settings: ConfigMap,
    /// Default expiry for `lock` calls that don't specify one.
    /// Zero means "no default"; the 1-second floor applies instead.
    #[serde(default)]
    pub default_expire: Duration,
}

/// Typed, resolved connection settings. Immutable once resolved; there is
/// no way to mutate a connection's settings after it has been constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Store address, `host:port`.
    pub addr: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Database/namespace index within the store.
    pub database: i64,
    /// Default expiry inherited from [`LockConfig::default_expire`].
    pub default_expire: Duration,
}

impl Settings {
    /// Resolve a loosely-typed [`LockConfig`] into typed settings.
    ///
    /// Field synonyms, checked in this order (the second alias overwrites
    /// the first when both are set):
    ///
    /// - `addr`, `server` → [`Settings::addr`] (empty strings ignored)
    /// - `username`, `user` → [`Settings::username`] (empty strings ignored)
    /// - `password`, `pass` → [`Settings::password`] (empty string counts)
    /// - `database` → [`Settings::database`]; accepts integers, floats, and
    ///   numeric strings, normalized to `i64`
    ///
    /// Anything unrecognized or missing falls back to the defaults:
    /// `default_addr`, no credentials, database 0.
    pub fn resolve(config: &LockConfig, default_addr: &str) -> Settings {
        let mut settings = Settings {
            addr: default_addr.to_string(),
            username: None,
            password: None,
            database: 0,
            default_expire: config.default_expire,
        };

        for key in ["addr", "server"] {
            if let Some(v) = config.settings.get(key).and_then(Value::as_str) {
                if !v.is_empty() {
                    settings.addr = v.to_string();
                }
            }
        }
        for key in ["username", "user"] {
            if let Some(v) = config.settings.get(key).and_then(Value::as_str) {
                if !v.is_empty() {
                    settings.username = Some(v.to_string());
                }
            }
        }
        for key in ["password", "pass"] {
            if let Some(v) = config.settings.get(key).and_then(Value::as_str) {
                settings.password = Some(v.to_string());
            }
        }

        if let Some(v) = config.settings.get("database") {
            if let Some(db) = coerce_i64(v) {
                settings.database = db;
            }
        }

        settings
    }
}

/// Numeric coercion for the `database` field: native integers pass through,
/// floats are truncated, numeric strings are parsed. Anything else is
/// treated as unset.
fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else {
                n.as_f64().map(|f| f as i64)
            }
        }
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(entries: &[(&str, Value)]) -> LockConfig {
        LockConfig {
            settings: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            default_expire: Duration::ZERO,
        }
    }

    #[test]
    fn defaults_when_empty() {
        let settings = Settings::resolve(&LockConfig::default(), "127.0.0.1:6379");
        assert_eq!(settings.addr, "127.0.0.1:6379");
        assert_eq!(settings.username, None);
        assert_eq!(settings.password, None);
        assert_eq!(settings.database, 0);
        assert_eq!(settings.default_expire, Duration::ZERO);
    }

    #[test]
    fn synonyms_resolve() {
        let config = config(&[("server", json!("h:1")), ("user", json!("u"))]);
        let settings = Settings::resolve(&config, "127.0.0.1:6379");
        assert_eq!(settings.addr, "h:1");
        assert_eq!(settings.username, Some("u".to_string()));
    }

    #[test]
    fn second_alias_overwrites_first() {
        let config = config(&[
            ("addr", json!("first:1")),
            ("server", json!("second:2")),
            ("username", json!("alice")),
            ("user", json!("bob")),
            ("password", json!("one")),
            ("pass", json!("two")),
        ]);
        let settings = Settings::resolve(&config, "127.0.0.1:6379");
        assert_eq!(settings.addr, "second:2");
        assert_eq!(settings.username, Some("bob".to_string()));
        assert_eq!(settings.password, Some("two".to_string()));
    }

    #[test]
    fn empty_strings_ignored_except_password() {
        let config = config(&[
            ("addr", json!("real:1")),
            ("server", json!("")),
            ("username", json!("")),
            ("password", json!("")),
        ]);
        let settings = Settings::resolve(&config, "127.0.0.1:6379");
        assert_eq!(settings.addr, "real:1"); // empty server does not clobber
        assert_eq!(settings.username, None);
        assert_eq!(settings.password, Some(String::new())); // empty password counts
    }

    #[test]
    fn database_coercions() {
        for (value, expected) in [
            (json!(3), 3),
            (json!(7u64), 7),
            (json!(2.9), 2), // truncated, not rounded
            (json!("11"), 11),
        ] {
            let config = config(&[("database", value)]);
            let settings = Settings::resolve(&config, "127.0.0.1:6379");
            assert_eq!(settings.database, expected);
        }
    }

    #[test]
    fn database_garbage_falls_back_to_zero() {
        for value in [json!("eleven"), json!(true), json!(["1"])] {
            let config = config(&[("database", value)]);
            let settings = Settings::resolve(&config, "127.0.0.1:6379");
            assert_eq!(settings.database, 0);
        }
    }

    #[test]
    fn default_expire_carried_from_config() {
        let config = LockConfig {
            settings: ConfigMap::new(),
            default_expire: Duration::from_secs(30),
        };
        let settings = Settings::resolve(&config, "127.0.0.1:6379");
        assert_eq!(settings.default_expire, Duration::from_secs(30));
    }
}
