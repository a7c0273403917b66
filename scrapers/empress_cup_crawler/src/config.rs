use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{CrawlError, Result};

pub const DEFAULT_SCHEDULE_URL: &str = "https://www.jfa.jp/match/empressscup_2024/schedule_result/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapingConfig {
    pub schedule_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            schedule_url: DEFAULT_SCHEDULE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub write_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
            write_timeout_secs: 10,
        }
    }
}

impl DatabaseConfig {
    pub fn require_url(&self) -> Result<&str> {
        self.url
            .as_deref()
            .ok_or_else(|| CrawlError::Config("DATABASE_URL is not set".to_string()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrawlerConfig {
    pub server: ServerConfig,
    pub scraping: ScrapingConfig,
    pub database: DatabaseConfig,
}

impl CrawlerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(port) = parse_var("PORT") {
            config.server.port = port;
        }
        if let Ok(url) = env::var("SCHEDULE_URL") {
            config.scraping.schedule_url = url;
        }
        if let Ok(user_agent) = env::var("SCRAPER_USER_AGENT") {
            config.scraping.user_agent = user_agent;
        }
        if let Some(timeout) = parse_var("SCRAPER_TIMEOUT_SECS") {
            config.scraping.request_timeout_secs = timeout;
        }
        if let Ok(url) = env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                config.database.url = Some(url);
            }
        }
        if let Some(max) = parse_var("DB_MAX_CONNECTIONS") {
            config.database.max_connections = max;
        }
        if let Some(timeout) = parse_var("DB_TIMEOUT_SECS") {
            config.database.write_timeout_secs = timeout;
        }

        config
    }
}

// Unset or unparsable values fall back to the default.
fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "PORT",
        "SCHEDULE_URL",
        "SCRAPER_USER_AGENT",
        "SCRAPER_TIMEOUT_SECS",
        "DATABASE_URL",
        "DB_MAX_CONNECTIONS",
        "DB_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear_env();
        let config = CrawlerConfig::from_env();
        assert_eq!(config, CrawlerConfig::default());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.scraping.schedule_url, DEFAULT_SCHEDULE_URL);
        assert!(config.database.require_url().is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        env::set_var("PORT", "9090");
        env::set_var("DATABASE_URL", "postgres://localhost/matches");
        env::set_var("SCRAPER_TIMEOUT_SECS", "5");
        env::set_var("SCHEDULE_URL", "http://localhost/schedule");

        let config = CrawlerConfig::from_env();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.require_url().unwrap(), "postgres://localhost/matches");
        assert_eq!(config.scraping.request_timeout_secs, 5);
        assert_eq!(config.scraping.schedule_url, "http://localhost/schedule");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_port_keeps_default() {
        clear_env();
        env::set_var("PORT", "not-a-port");
        let config = CrawlerConfig::from_env();
        assert_eq!(config.server.port, 8080);
        clear_env();
    }
}
