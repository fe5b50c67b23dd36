//! Configuration module for the relay.

use serde::Deserialize;
use std::path::Path;

use crate::relay::{DEFAULT_MAX_RETAINED, DEFAULT_OUTBOX_CAPACITY, REPLAY_LIMIT};
use crate::{RelayError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed cross-origin values. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Relay behavior configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Messages replayed to a newly registered connection.
    #[serde(default = "default_replay_limit")]
    pub replay_limit: usize,
    /// Total messages retained in the log before trimming.
    #[serde(default = "default_max_retained")]
    pub max_retained: usize,
    /// Per-connection outbound queue capacity.
    #[serde(default = "default_outbox_capacity")]
    pub outbox_capacity: usize,
}

fn default_replay_limit() -> usize {
    REPLAY_LIMIT
}

fn default_max_retained() -> usize {
    DEFAULT_MAX_RETAINED
}

fn default_outbox_capacity() -> usize {
    DEFAULT_OUTBOX_CAPACITY
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            replay_limit: default_replay_limit(),
            max_retained: default_max_retained(),
            outbox_capacity: default_outbox_capacity(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/partyline.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Auto-reply bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// WebSocket URL of the relay.
    #[serde(default = "default_bot_server_url")]
    pub server_url: String,
    /// Logical identity the bot registers as.
    #[serde(default = "default_bot_user_id")]
    pub user_id: String,
    /// Display name the bot registers with.
    #[serde(default = "default_bot_username")]
    pub username: String,
    /// Initial reconnect delay in milliseconds.
    #[serde(default = "default_reconnect_initial_ms")]
    pub reconnect_initial_ms: u64,
    /// Reconnect delay cap in milliseconds.
    #[serde(default = "default_reconnect_max_ms")]
    pub reconnect_max_ms: u64,
}

fn default_bot_server_url() -> String {
    "ws://127.0.0.1:4000/ws".to_string()
}

fn default_bot_user_id() -> String {
    "bot-1".to_string()
}

fn default_bot_username() -> String {
    "HelperBot".to_string()
}

fn default_reconnect_initial_ms() -> u64 {
    500
}

fn default_reconnect_max_ms() -> u64 {
    5000
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            server_url: default_bot_server_url(),
            user_id: default_bot_user_id(),
            username: default_bot_username(),
            reconnect_initial_ms: default_reconnect_initial_ms(),
            reconnect_max_ms: default_reconnect_max_ms(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Relay behavior settings.
    #[serde(default)]
    pub relay: RelayConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Bot worker settings.
    #[serde(default)]
    pub bot: BotConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(RelayError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| RelayError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `PARTYLINE_PORT`: Override the listening port
    /// - `PARTYLINE_CORS_ORIGIN`: Override the allowed origin list (comma-separated)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("PARTYLINE_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(origins) = std::env::var("PARTYLINE_CORS_ORIGIN") {
            if !origins.is_empty() {
                self.server.cors_origins = origins
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 4000);
        assert!(config.server.cors_origins.is_empty());
        assert_eq!(config.relay.replay_limit, 80);
        assert_eq!(config.relay.max_retained, 800);
        assert_eq!(config.relay.outbox_capacity, 256);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.bot.user_id, "bot-1");
        assert_eq!(config.bot.reconnect_initial_ms, 500);
        assert_eq!(config.bot.reconnect_max_ms, 5000);
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.relay.replay_limit, 80);
    }

    #[test]
    fn test_parse_partial_section() {
        let config = Config::parse(
            r#"
            [server]
            port = 8080
            cors_origins = ["http://localhost:5173"]
        "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.cors_origins, vec!["http://localhost:5173"]);
        // Untouched sections keep their defaults.
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.relay.max_retained, 800);
    }

    #[test]
    fn test_parse_bot_section() {
        let config = Config::parse(
            r#"
            [bot]
            server_url = "ws://relay.example:4000/ws"
            username = "GreeterBot"
        "#,
        )
        .unwrap();

        assert_eq!(config.bot.server_url, "ws://relay.example:4000/ws");
        assert_eq!(config.bot.username, "GreeterBot");
        assert_eq!(config.bot.user_id, "bot-1");
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = Config::parse("[server\nport = oops");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("does-not-exist.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();

        std::env::set_var("PARTYLINE_PORT", "5050");
        std::env::set_var("PARTYLINE_CORS_ORIGIN", "http://a.example, http://b.example");
        config.apply_env_overrides();

        assert_eq!(config.server.port, 5050);
        assert_eq!(
            config.server.cors_origins,
            vec!["http://a.example", "http://b.example"]
        );

        // An unparseable port is ignored rather than panicking.
        let mut config = Config::default();
        std::env::set_var("PARTYLINE_PORT", "not-a-port");
        config.apply_env_overrides();
        assert_eq!(config.server.port, 4000);

        std::env::remove_var("PARTYLINE_PORT");
        std::env::remove_var("PARTYLINE_CORS_ORIGIN");
    }
}
