//! Configuration management for AgriNote
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides of the form `AGRINOTE__SECTION__KEY`,
//!    e.g. `AGRINOTE__DATABASE__URL` or `AGRINOTE__SERVER__PORT`
//!
//! The environment name itself is read from `AGRINOTE__ENVIRONMENT` and
//! picks the config file.

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::geometry::{GeometryCalculator, DEFAULT_DEGENERATE_THRESHOLD};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Field geometry configuration
    pub geometry: GeometryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeometryConfig {
    /// Squared-degree area under which a boundary is stored with 0 ha
    pub degenerate_threshold: f64,
}

impl GeometryConfig {
    pub fn calculator(&self) -> GeometryCalculator {
        GeometryCalculator::with_degenerate_threshold(self.degenerate_threshold)
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("AGRINOTE__ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("geometry.degenerate_threshold", DEFAULT_DEGENERATE_THRESHOLD)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (AGRINOTE__ prefix)
            .add_source(
                Environment::with_prefix("AGRINOTE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            degenerate_threshold: DEFAULT_DEGENERATE_THRESHOLD,
        }
    }
}
