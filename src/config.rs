//! Runtime configuration, loaded once from the environment (`.env` via
//! `dotenvy`, then process env). Mirrors `spec.md` §6's configuration table.

use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub app_env: String,
    pub app_name: String,
    pub service_type: String,
    pub redis_addr: String,
    pub redis_password: Option<String>,
    pub redis_db: i64,
    pub request_limiter_ttl: Duration,
    pub request_limiter_max: i64,
    pub max_retry_count: u32,
    pub retry_backoff: Duration,
    pub cache_ttl: Duration,
}

impl Config {
    /// Loads `.env` (if present) then reads the process environment.
    /// `REQUEST_LIMITER_MAX` has no default — it is the one variable
    /// `spec.md` §6 requires an operator to set explicitly.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            port: env_or("PORT", "8080").parse().context("PORT must be a valid port number")?,
            app_env: env_or("APP_ENV", "development"),
            app_name: env_or("APP_NAME", "search-service"),
            service_type: env_or("SERVICE_TYPE", "http"),
            redis_addr: env_or("REDIS_ADDR", "127.0.0.1:6379"),
            redis_password: std::env::var("REDIS_PASSWORD").ok().filter(|s| !s.is_empty()),
            redis_db: env_or("REDIS_DB", "0").parse().context("REDIS_DB must be an integer")?,
            request_limiter_ttl: Duration::from_secs(
                env_or("REQUEST_LIMITER_TTL", "10").parse().context("REQUEST_LIMITER_TTL must be seconds")?,
            ),
            request_limiter_max: std::env::var("REQUEST_LIMITER_MAX")
                .context("REQUEST_LIMITER_MAX must be set")?
                .parse()
                .context("REQUEST_LIMITER_MAX must be an integer")?,
            max_retry_count: env_or("MAX_RETRY_COUNT", "3").parse().context("MAX_RETRY_COUNT must be an integer")?,
            retry_backoff: Duration::from_millis(
                env_or("RETRY_BACKOFF", "200").parse().context("RETRY_BACKOFF must be milliseconds")?,
            ),
            cache_ttl: Duration::from_secs(
                env_or("CACHE_TTL_SECONDS", "300").parse().context("CACHE_TTL_SECONDS must be seconds")?,
            ),
        })
    }

    /// A config usable in tests without requiring the environment to be set.
    pub fn for_tests() -> Self {
        Self {
            port: 8080,
            app_env: "test".to_string(),
            app_name: "search-service".to_string(),
            service_type: "http".to_string(),
            redis_addr: "127.0.0.1:6379".to_string(),
            redis_password: None,
            redis_db: 0,
            request_limiter_ttl: Duration::from_secs(10),
            request_limiter_max: 100,
            max_retry_count: 3,
            retry_backoff: Duration::from_millis(10),
            cache_ttl: Duration::from_secs(300),
        }
    }

    pub fn redis_url(&self) -> String {
        let auth = self.redis_password.as_deref().map(|p| format!(":{p}@")).unwrap_or_default();
        format!("redis://{auth}{}/{}", self.redis_addr, self.redis_db)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redis_url_without_password() {
        let cfg = Config::for_tests();
        assert_eq!(cfg.redis_url(), "redis://127.0.0.1:6379/0");
    }

    #[test]
    fn redis_url_with_password() {
        let mut cfg = Config::for_tests();
        cfg.redis_password = Some("hunter2".to_string());
        assert_eq!(cfg.redis_url(), "redis://:hunter2@127.0.0.1:6379/0");
    }
}
