use std::env;
use std::str::FromStr;
use std::time::Duration;

use log::warn;

use crate::blockchain::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY};

/// Node settings, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    pub difficulty: u32,
    /// Bootstrap peers registered at startup.
    pub peers: Vec<String>,
    /// Upper bound on each peer round-trip.
    pub peer_timeout: Duration,
    /// Period of the background sync; `None` disables it.
    pub sync_interval: Option<Duration>,
    /// Address announced to peers we register; `None` turns announcing off.
    pub advertise: Option<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            difficulty: DEFAULT_DIFFICULTY,
            peers: Vec::new(),
            peer_timeout: Duration::from_millis(3_000),
            sync_interval: Some(Duration::from_secs(30)),
            advertise: Some("127.0.0.1:8080".to_string()),
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let difficulty = parse_or(&lookup, "DIFFICULTY", defaults.difficulty);
        let difficulty = if difficulty > MAX_DIFFICULTY {
            warn!("DIFFICULTY={difficulty} too high, capping at {MAX_DIFFICULTY}");
            MAX_DIFFICULTY
        } else {
            difficulty
        };

        let peers = lookup("PEERS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let timeout_ms = parse_or(&lookup, "PEER_TIMEOUT_MS", 3_000u64);
        let sync_secs = parse_or(&lookup, "SYNC_INTERVAL_SECS", 30u64);

        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_or(&lookup, "PORT", defaults.port);
        // A wildcard bind address is useless to a peer, so it needs an
        // explicit ADVERTISE_ADDR.
        let advertise = match lookup("ADVERTISE_ADDR") {
            Some(addr) => Some(addr.trim().to_string()).filter(|a| !a.is_empty()),
            None if host == "0.0.0.0" || host == "::" => None,
            None => Some(format!("{host}:{port}")),
        };

        Self {
            host,
            port,
            difficulty,
            peers,
            peer_timeout: Duration::from_millis(timeout_ms.max(1)),
            sync_interval: (sync_secs > 0).then(|| Duration::from_secs(sync_secs)),
            advertise,
        }
    }
}

fn parse_or<T: FromStr + Copy>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring malformed {key}={raw:?}, using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> NodeConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        NodeConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let cfg = config_from(&[]);
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.difficulty, DEFAULT_DIFFICULTY);
        assert!(cfg.peers.is_empty());
        assert_eq!(cfg.sync_interval, Some(Duration::from_secs(30)));
        assert_eq!(cfg.advertise.as_deref(), Some("127.0.0.1:8080"));
    }

    #[test]
    fn reads_peers_and_timeouts() {
        let cfg = config_from(&[
            ("PORT", "5001"),
            ("PEERS", "localhost:5002, localhost:5003,,"),
            ("PEER_TIMEOUT_MS", "250"),
            ("SYNC_INTERVAL_SECS", "0"),
        ]);
        assert_eq!(cfg.port, 5001);
        assert_eq!(cfg.peers, vec!["localhost:5002", "localhost:5003"]);
        assert_eq!(cfg.peer_timeout, Duration::from_millis(250));
        assert_eq!(cfg.sync_interval, None);
    }

    #[test]
    fn bad_values_fall_back() {
        let cfg = config_from(&[("PORT", "eighty"), ("DIFFICULTY", "40")]);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.difficulty, MAX_DIFFICULTY);
    }

    #[test]
    fn advertise_address_follows_bind_unless_wildcard() {
        let cfg = config_from(&[("HOST", "10.0.0.5"), ("PORT", "5002")]);
        assert_eq!(cfg.advertise.as_deref(), Some("10.0.0.5:5002"));

        let cfg = config_from(&[("HOST", "0.0.0.0")]);
        assert_eq!(cfg.advertise, None);

        let cfg = config_from(&[("HOST", "0.0.0.0"), ("ADVERTISE_ADDR", "node-a:8080")]);
        assert_eq!(cfg.advertise.as_deref(), Some("node-a:8080"));

        let cfg = config_from(&[("ADVERTISE_ADDR", " ")]);
        assert_eq!(cfg.advertise, None);
    }
}
