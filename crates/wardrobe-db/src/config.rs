//! Environment configuration for the database layer and tag sync.

use std::str::FromStr;
use std::time::Duration;

use wardrobe_core::{defaults, Error, Result, RetryPolicy};

use crate::pool::PoolConfig;

/// Runtime configuration read from the environment.
#[derive(Debug, Clone)]
pub struct WardrobeConfig {
    pub database_url: String,
    pub pool: PoolConfig,
    pub retry: RetryPolicy,
}

impl WardrobeConfig {
    /// Read configuration from process environment variables.
    ///
    /// `DATABASE_URL` is required; every other variable falls back to
    /// [`wardrobe_core::defaults`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::Config("DATABASE_URL is not set".to_string()))?;

        let pool = PoolConfig::new()
            .max_connections(parse_var(
                &lookup,
                "DB_MAX_CONNECTIONS",
                defaults::DB_MAX_CONNECTIONS,
            )?)
            .min_connections(parse_var(
                &lookup,
                "DB_MIN_CONNECTIONS",
                defaults::DB_MIN_CONNECTIONS,
            )?)
            .acquire_timeout(Duration::from_secs(parse_var(
                &lookup,
                "DB_CONNECT_TIMEOUT_SECS",
                defaults::DB_CONNECT_TIMEOUT_SECS,
            )?))
            .idle_timeout(Duration::from_secs(parse_var(
                &lookup,
                "DB_IDLE_TIMEOUT_SECS",
                defaults::DB_IDLE_TIMEOUT_SECS,
            )?));

        let max_attempts: u32 = parse_var(
            &lookup,
            "TAG_SYNC_MAX_ATTEMPTS",
            defaults::TAG_SYNC_MAX_ATTEMPTS,
        )?;
        if max_attempts == 0 {
            return Err(Error::Config(
                "TAG_SYNC_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        let retry = RetryPolicy::default()
            .max_attempts(max_attempts)
            .initial_backoff(Duration::from_millis(parse_var(
                &lookup,
                "TAG_SYNC_INITIAL_BACKOFF_MS",
                defaults::TAG_SYNC_INITIAL_BACKOFF_MS,
            )?))
            .max_backoff(Duration::from_millis(parse_var(
                &lookup,
                "TAG_SYNC_MAX_BACKOFF_MS",
                defaults::TAG_SYNC_MAX_BACKOFF_MS,
            )?));

        Ok(Self {
            database_url,
            pool,
            retry,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("{key}={raw:?} is invalid: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_url_is_set() {
        let config =
            WardrobeConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/w")]))
                .unwrap();

        assert_eq!(config.database_url, "postgres://localhost/w");
        assert_eq!(config.pool, PoolConfig::default());
        assert_eq!(config.retry.max_attempts, defaults::TAG_SYNC_MAX_ATTEMPTS);
        assert_eq!(
            config.retry.initial_backoff,
            Duration::from_millis(defaults::TAG_SYNC_INITIAL_BACKOFF_MS)
        );
    }

    #[test]
    fn test_missing_url_is_config_error() {
        let result = WardrobeConfig::from_lookup(lookup(&[]));
        assert!(matches!(result, Err(Error::Config(_))));

        let result = WardrobeConfig::from_lookup(lookup(&[("DATABASE_URL", "  ")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = WardrobeConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/w"),
            ("DB_MAX_CONNECTIONS", "25"),
            ("DB_CONNECT_TIMEOUT_SECS", "5"),
            ("TAG_SYNC_MAX_ATTEMPTS", "5"),
            ("TAG_SYNC_MAX_BACKOFF_MS", " 250 "),
        ]))
        .unwrap();

        assert_eq!(config.pool.max_connections, 25);
        assert_eq!(config.pool.acquire_timeout, Duration::from_secs(5));
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.max_backoff, Duration::from_millis(250));
    }

    #[test]
    fn test_unparseable_value_names_the_variable() {
        let err = WardrobeConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/w"),
            ("DB_MAX_CONNECTIONS", "lots"),
        ]))
        .unwrap_err();

        match err {
            Error::Config(msg) => assert!(msg.contains("DB_MAX_CONNECTIONS")),
            other => panic!("expected Config, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let result = WardrobeConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/w"),
            ("TAG_SYNC_MAX_ATTEMPTS", "0"),
        ]));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
