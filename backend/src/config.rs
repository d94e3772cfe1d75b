//! # Configuration
//!
//! Layered application configuration. Sources, highest priority first:
//!
//! 1. Environment variables (`EVENT_CALENDAR__SERVER__PORT=4000`, etc.)
//! 2. Optional TOML file (`event-calendar.toml`, or `EVENT_CALENDAR_CONFIG`)
//! 3. Built-in defaults

use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::net::SocketAddr;

pub const DEFAULT_CONFIG_PATH: &str = "event-calendar.toml";
pub const CONFIG_PATH_ENV: &str = "EVENT_CALENDAR_CONFIG";
const ENV_PREFIX: &str = "EVENT_CALENDAR";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub calendar: CalendarConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin allowed to call the API from a browser
    pub cors_origin: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set
    pub level: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CalendarConfig {
    pub grid_cache_enabled: bool,
    /// Most month grids kept in the cache at once
    pub grid_cache_capacity: usize,
    pub max_title_length: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                cors_origin: "http://localhost:8080".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            calendar: CalendarConfig {
                grid_cache_enabled: true,
                grid_cache_capacity: 64,
                max_title_length: 256,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file location and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load configuration from a specific file (which may be absent) and the environment
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let builder = ConfigBuilder::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("server.cors_origin", defaults.server.cors_origin)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("calendar.grid_cache_enabled", defaults.calendar.grid_cache_enabled)?
            .set_default(
                "calendar.grid_cache_capacity",
                defaults.calendar.grid_cache_capacity as i64,
            )?
            .set_default(
                "calendar.max_title_length",
                defaults.calendar.max_title_length as i64,
            )?
            .add_source(File::with_name(config_path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values that deserialization cannot check
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if self.calendar.grid_cache_enabled && self.calendar.grid_cache_capacity == 0 {
            return Err("calendar.grid_cache_capacity must be at least 1 when the cache is enabled".to_string());
        }
        if self.calendar.max_title_length == 0 {
            return Err("calendar.max_title_length must be at least 1".to_string());
        }
        self.socket_addr().map(|_| ())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid server address '{}': {}", self.server.host, e))
    }
}
