use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// When true, every route except /health requires a bearer token to be
    /// present. Token validity is checked upstream, not here.
    #[serde(default = "default_true")]
    pub required: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { required: true }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Max characters per stream_token frame
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Pause between token frames, purely presentational
    #[serde(default = "default_chunk_delay_ms")]
    pub chunk_delay_ms: u64,
    /// How long a finished generation entry lingers before removal
    #[serde(default = "default_cleanup_grace_ms")]
    pub cleanup_grace_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_delay_ms: default_chunk_delay_ms(),
            cleanup_grace_ms: default_cleanup_grace_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_chunk_size() -> usize {
    10
}

fn default_chunk_delay_ms() -> u64 {
    15
}

fn default_cleanup_grace_ms() -> u64 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (nested keys via `__`, e.g. SERVER__PORT)
    /// 4. Explicit switches: SERVER_PORT, AUTH_REQUIRED, AUTH_DISABLED
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true));

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        if let Ok(port) = std::env::var("SERVER_PORT") {
            cfg.server.port = port
                .parse()
                .map_err(|_| ConfigError::Message(format!("invalid SERVER_PORT: {port}")))?;
        }
        if let Ok(required) = std::env::var("AUTH_REQUIRED") {
            cfg.auth.required = required.to_lowercase() == "true" || required == "1";
        }
        if let Ok(disabled) = std::env::var("AUTH_DISABLED") {
            if disabled.to_lowercase() == "true" || disabled == "1" {
                cfg.auth.required = false;
            }
        }

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));
        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert!(config.auth.required);
        assert_eq!(config.stream.chunk_size, 10);
    }

    #[test]
    fn test_config_structure() {
        let toml = r#"
            [server]
            host = "127.0.0.1"
            port = 3000

            [auth]
            required = false

            [stream]
            chunk_size = 4
            chunk_delay_ms = 0
            cleanup_grace_ms = 100

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(!config.auth.required);
        assert_eq!(config.stream.chunk_size, 4);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config: Config = toml::from_str("[server]\nport = 9999\n").unwrap();
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.stream.cleanup_grace_ms, 5000);
    }
}
