// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Gateway Configuration
//
// Defines the configuration file for a Lattice gateway node:
// - HTTP server bind address and proxy trust
// - Log level and development mode
// - Domain Store location
// - Host route cache sizing
//
// Configuration is YAML. Discovery order and environment overrides follow
// `GatewayConfig::load_or_default`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "LATTICE_CONFIG_PATH";
pub const ROUTE_CACHE_MAX_SIZE_ENV: &str = "LATTICE_ROUTE_CACHE_MAX_SIZE";
pub const ROUTE_CACHE_MAX_AGE_ENV: &str = "LATTICE_ROUTE_CACHE_MAX_AGE_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Development mode: verbose error bodies on the HTTP surface
    #[serde(default)]
    pub dev: bool,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub route_cache: RouteCacheConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Take client ip, hostname and protocol from `X-Forwarded-*` headers.
    /// Only enable behind a reverse proxy that overwrites them.
    #[serde(default)]
    pub trust_proxy: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root directory of the file-backed Domain Store
    /// (`<root>/<type>/<id>.yaml`)
    #[serde(default = "default_store_root")]
    pub root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteCacheConfig {
    /// Maximum number of hosts kept in the route cache
    #[serde(default = "default_cache_max_size")]
    pub max_size: usize,

    /// Route table lifetime in milliseconds
    #[serde(default = "default_cache_max_age_ms")]
    pub max_age_ms: u64,
}

impl RouteCacheConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_millis(self.max_age_ms)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_store_root() -> PathBuf {
    PathBuf::from("./store")
}

fn default_cache_max_size() -> usize {
    500
}

fn default_cache_max_age_ms() -> u64 {
    60 * 60 * 1000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            trust_proxy: false,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_store_root(),
        }
    }
}

impl Default for RouteCacheConfig {
    fn default() -> Self {
        Self {
            max_size: default_cache_max_size(),
            max_age_ms: default_cache_max_age_ms(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            log_level: default_log_level(),
            dev: false,
            store: StoreConfig::default(),
            route_cache: RouteCacheConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Discover configuration file using precedence order
    /// 1. LATTICE_CONFIG_PATH environment variable
    /// 2. ./lattice-config.yaml (working directory)
    /// 3. ~/.lattice/config.yaml (user home)
    /// 4. /etc/lattice/config.yaml (Unix)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./lattice-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".lattice").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        {
            let system_config = PathBuf::from("/etc/lattice/config.yaml");
            if system_config.exists() {
                return Some(system_config);
            }
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // An explicit path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        let mut config = match Self::discover_config() {
            Some(config_path) => {
                tracing::info!("Loading configuration from discovered path: {:?}", config_path);
                Self::from_yaml_file(config_path)?
            }
            None => {
                tracing::warn!("No configuration file found in standard locations. Using defaults.");
                Self::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup(ROUTE_CACHE_MAX_SIZE_ENV) {
            match val.trim().parse::<usize>() {
                Ok(size) if size > 0 => {
                    tracing::info!("Environment override: {}={}", ROUTE_CACHE_MAX_SIZE_ENV, size);
                    self.route_cache.max_size = size;
                }
                _ => tracing::warn!(
                    "Invalid value for {}: '{}'. Expected a positive integer. Ignoring.",
                    ROUTE_CACHE_MAX_SIZE_ENV,
                    val
                ),
            }
        }

        if let Some(val) = lookup(ROUTE_CACHE_MAX_AGE_ENV) {
            match val.trim().parse::<u64>() {
                Ok(ms) => {
                    tracing::info!("Environment override: {}={}", ROUTE_CACHE_MAX_AGE_ENV, ms);
                    self.route_cache.max_age_ms = ms;
                }
                Err(_) => tracing::warn!(
                    "Invalid value for {}: '{}'. Expected milliseconds. Ignoring.",
                    ROUTE_CACHE_MAX_AGE_ENV,
                    val
                ),
            }
        }
    }
}
