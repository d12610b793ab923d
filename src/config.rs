use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{anyhow, bail, Context};

use crate::reaper::ReaperConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub reaper: ReaperConfig,
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").ok_or(anyhow!("DATABASE_URL is not set"))?;
        let bind_addr = parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 5000)))?;
        let max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 16u32)?;

        let defaults = ReaperConfig::default();
        let stale_after = parse_or(&lookup, "STALE_THRESHOLD_MS", defaults.stale_after.as_millis() as u64)?;
        let every = parse_or(&lookup, "SWEEP_INTERVAL_MS", defaults.every.as_millis() as u64)?;

        if max_connections == 0 {
            bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        if stale_after == 0 || every == 0 {
            bail!("STALE_THRESHOLD_MS and SWEEP_INTERVAL_MS must be positive");
        }
        if stale_after >= every {
            bail!("STALE_THRESHOLD_MS ({stale_after}) must be less than SWEEP_INTERVAL_MS ({every})");
        }

        Ok(Config {
            database_url,
            bind_addr,
            max_connections,
            reaper: ReaperConfig {
                stale_after: Duration::from_millis(stale_after),
                every: Duration::from_millis(every),
            },
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().with_context(|| format!("invalid {key}: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = Config::from_lookup(env(&[("DATABASE_URL", "sqlite::memory:")])).unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.max_connections, 16);
        assert_eq!(config.reaper, ReaperConfig::default());
    }

    #[test]
    fn database_url_is_required() {
        let err = Config::from_lookup(env(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(env(&[
            ("DATABASE_URL", "sqlite://chat.db"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("STALE_THRESHOLD_MS", "500"),
            ("SWEEP_INTERVAL_MS", "750"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.reaper.stale_after, Duration::from_millis(500));
        assert_eq!(config.reaper.every, Duration::from_millis(750));
    }

    #[test]
    fn threshold_must_be_shorter_than_sweep_period() {
        let err = Config::from_lookup(env(&[
            ("DATABASE_URL", "sqlite://chat.db"),
            ("STALE_THRESHOLD_MS", "15000"),
            ("SWEEP_INTERVAL_MS", "15000"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("less than"));
    }

    #[test]
    fn garbage_numbers_are_rejected() {
        let err = Config::from_lookup(env(&[
            ("DATABASE_URL", "sqlite://chat.db"),
            ("SWEEP_INTERVAL_MS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("SWEEP_INTERVAL_MS"));
    }
}
