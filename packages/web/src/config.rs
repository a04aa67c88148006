//! Process configuration read from the environment.

use std::str::FromStr;
use std::time::Duration;

use api::AppState;
use db::DbConfig;
use realtime::RealtimeConfig;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_ITEMS_LIMIT: usize = 100;

/// Everything `main` needs to start the service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: String,
    pub db: DbConfig,
    pub realtime: RealtimeConfig,
    pub items_limit: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Unparseable numbers fall back
    /// to their defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let listen_addr = lookup("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());

        let db = match lookup("DATA_PATH") {
            Some(path) if cfg!(feature = "rocksdb") => DbConfig::rocksdb(path),
            Some(path) => {
                tracing::warn!(%path, "DATA_PATH set but built without rocksdb, using memory");
                DbConfig::memory()
            }
            None => DbConfig::memory(),
        };

        let mut realtime = RealtimeConfig::default();
        if let Some(ms) = parse_var::<u64>(&lookup, "HEARTBEAT_MS") {
            realtime = realtime.with_heartbeat_interval(Duration::from_millis(ms));
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "SEND_TIMEOUT_MS") {
            realtime = realtime.with_send_timeout(Duration::from_millis(ms));
        }

        let items_limit = parse_var(&lookup, "ITEMS_LIMIT").unwrap_or(DEFAULT_ITEMS_LIMIT);

        Self {
            listen_addr,
            db,
            realtime,
            items_limit,
        }
    }

    /// Apply the HTTP-level settings to the handler state.
    pub fn apply(&self, state: AppState) -> AppState {
        state.with_items_limit(self.items_limit)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(name, value = %raw, "Ignoring invalid number");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.listen_addr, "0.0.0.0:8000");
        assert_eq!(config.db, DbConfig::memory());
        assert_eq!(config.realtime, RealtimeConfig::default());
        assert_eq!(config.items_limit, 100);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("LISTEN_ADDR", "127.0.0.1:9000"),
            ("HEARTBEAT_MS", "250"),
            ("SEND_TIMEOUT_MS", "500"),
            ("ITEMS_LIMIT", "5"),
        ]);
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.realtime.heartbeat_interval, Duration::from_millis(250));
        assert_eq!(config.realtime.send_timeout, Duration::from_millis(500));
        assert_eq!(config.items_limit, 5);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config(&[("HEARTBEAT_MS", "soon"), ("ITEMS_LIMIT", "-1")]);
        assert_eq!(config.realtime.heartbeat_interval, Duration::from_secs(1));
        assert_eq!(config.items_limit, 100);
    }
}
