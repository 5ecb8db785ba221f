//! ==============================================================================
//! config.rs - Dashboard Configuration Loader
//! ==============================================================================
//!
//! purpose:
//!     defines the schema for `dashboard.toml`.
//!     loads configuration from file or falls back to defaults.
//!
//! structure:
//!     - ServerConfig: Where the dashboard listens.
//!     - ApiConfig: Base URL of the remote ThermoLog API.
//!     - LoggingConfig: Default log level (RUST_LOG still wins).
//!
//! ==============================================================================

use log::{info, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// environment variable pointing at an explicit config file
pub const CONFIG_ENV: &str = "THERMOLOG_CONFIG";

/// Root configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 4200,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api/v1".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: DashboardConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))?;

        Ok(config)
    }

    /// Load with default fallback.
    ///
    /// Logging is not up until the config is known, so the outcome is
    /// returned for `print_summary` to report.
    pub fn load_or_default() -> (Self, ConfigSource) {
        let mut paths = Vec::new();
        if let Ok(explicit) = std::env::var(CONFIG_ENV) {
            paths.push(PathBuf::from(explicit));
        }
        paths.push(PathBuf::from("config").join("dashboard.toml"));
        paths.push(PathBuf::from("..").join("config").join("dashboard.toml"));

        let mut failures = Vec::new();
        for path in paths {
            if path.exists() {
                match Self::load(&path) {
                    Ok(config) => return (config, ConfigSource::File(path)),
                    Err(e) => failures.push(format!("{}: {}", path.display(), e)),
                }
            }
        }

        (Self::default(), ConfigSource::Defaults { failures })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }

    /// Log configuration summary
    pub fn print_summary(&self, source: &ConfigSource) {
        match source {
            ConfigSource::File(path) => info!("[CONFIG] Loaded from {}", path.display()),
            ConfigSource::Defaults { failures } => {
                for failure in failures {
                    warn!("[CONFIG] Failed to load {}", failure);
                }
                warn!("[CONFIG] No usable config file found - using defaults");
            }
        }
        info!("[CONFIG] Listen: {}", self.listen_addr());
        info!("[CONFIG] ThermoLog API: {}", self.api.base_url);
        info!("[CONFIG] Log level: {}", self.logging.level);
    }
}

/// where the effective configuration came from
#[derive(Debug)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults { failures: Vec<String> },
}
