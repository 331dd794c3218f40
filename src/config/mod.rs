//! Environment-driven configuration.
//!
//! Every knob has a default that works for local development; deployments
//! override via `SCOREBOARD_*` variables or a `.env` file.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// E-mail domain allowed through the identity gate; unset accepts any.
    pub allowed_domain: Option<String>,
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Listen address.
    pub bind_addr: SocketAddr,
    /// Default log filter when RUST_LOG is unset.
    pub log_level: String,
}

impl Config {
    /// Read configuration from the environment (and `.env`, when present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            allowed_domain: env::var("SCOREBOARD_ALLOWED_DOMAIN").ok(),
            db_path: env_or("SCOREBOARD_DB_PATH", "./data/scoreboard.sqlite").into(),
            bind_addr: env_or("SCOREBOARD_BIND_ADDR", "127.0.0.1:8080")
                .parse()
                .expect("Invalid SCOREBOARD_BIND_ADDR format"),
            log_level: env_or("SCOREBOARD_LOG_LEVEL", "info"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        env::remove_var("SCOREBOARD_ALLOWED_DOMAIN");
        env::remove_var("SCOREBOARD_DB_PATH");
        env::remove_var("SCOREBOARD_BIND_ADDR");
        env::remove_var("SCOREBOARD_LOG_LEVEL");

        let config = Config::from_env();

        assert!(config.allowed_domain.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/scoreboard.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
    }
}
