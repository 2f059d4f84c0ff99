//! Configuration management for envmond.
//!
//! Loads settings from $ENVMON_CONFIG, /etc/envmon/config.toml or
//! /var/lib/envmon/config.toml, in that order, else uses defaults.
//! A few environment variables override the file afterwards.

use anyhow::{Context, Result};
use envmon_common::store::READINGS_DB_PATH;
use envmon_common::{DataMode, ThresholdSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/envmon/config.toml";

/// Default config file path for fallback
pub const DEFAULT_CONFIG_PATH: &str = "/var/lib/envmon/config.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "ENVMON_CONFIG";

pub const DATA_MODE_ENV: &str = "ENVMON_DATA_MODE";
pub const DB_PATH_ENV: &str = "ENVMON_DB_PATH";
pub const BIND_ADDR_ENV: &str = "ENVMON_BIND_ADDR";

/// Daemon behaviour
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Tag series responses with their provenance
    #[serde(default)]
    pub debug_mode: bool,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:7870".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Reading store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// `database` queries the store, `synthetic` always synthesizes
    #[serde(default)]
    pub mode: DataMode,
}

fn default_db_path() -> String {
    READINGS_DB_PATH.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            mode: DataMode::default(),
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// Alert thresholds overriding the catalog defaults
    #[serde(default)]
    pub thresholds: ThresholdSettings,
}

impl Config {
    pub fn debug_mode(&self) -> bool {
        self.daemon.debug_mode
    }

    /// Load config from file, or return defaults, then apply environment overrides
    pub fn load() -> Self {
        let explicit = std::env::var(CONFIG_PATH_ENV).ok();

        let loaded = match explicit.as_deref() {
            Some(path) => Self::load_from_path(path),
            None => Self::load_from_path(CONFIG_PATH)
                .or_else(|_| Self::load_from_path(DEFAULT_CONFIG_PATH)),
        };

        let config = loaded.unwrap_or_else(|e| {
            warn!("Config not found, using defaults: {:#}", e);
            Config::default()
        });

        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Load config from specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply overrides looked up through `lookup` (the process environment in production)
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup(DATA_MODE_ENV) {
            match mode.parse::<DataMode>() {
                Ok(mode) => {
                    info!("Data mode set to {} by {}", mode, DATA_MODE_ENV);
                    self.storage.mode = mode;
                }
                Err(e) => warn!("Ignoring {}: {}", DATA_MODE_ENV, e),
            }
        }
        if let Some(path) = lookup(DB_PATH_ENV) {
            self.storage.db_path = path;
        }
        if let Some(addr) = lookup(BIND_ADDR_ENV) {
            self.server.bind_addr = addr;
        }
        self
    }
}
