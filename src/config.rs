//! Service configuration.
//!
//! Resolution order (highest priority first):
//! 1. `PORT` environment variable (server port only)
//! 2. TOML config file, if one is given
//! 3. Compiled defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::PackCatalog;
use crate::error::ConfigError;
use crate::solver::{AllocationStrategy, Strategy};

pub const DEFAULT_PACK_SIZES: [i64; 5] = [250, 500, 1000, 2000, 5000];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub solver: SolverConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub log_file: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            log_file: PathBuf::from("development.log"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub strategy: Strategy,
    /// Largest accepted order quantity. Bounds solver memory.
    pub max_order: u64,
    /// Largest accepted pack size.
    pub max_pack_size: u64,
    /// Most solver states (table entries or visited totals) one solve may
    /// track. Orders needing more are rejected before any allocation.
    pub max_table_len: u64,
    /// Catalog in effect at startup.
    pub pack_sizes: Vec<i64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            max_order: 1_000_000_000,
            max_pack_size: 1_000_000,
            max_table_len: 50_000_000,
            pack_sizes: DEFAULT_PACK_SIZES.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_secs: u64,
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 3600,
            max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Config {
    /// Loads defaults, merges `path` over them when given, applies the
    /// environment and validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies environment overrides read through `var`.
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = var("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT '{}' is not a valid port", port)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solver.max_order == 0 {
            return Err(ConfigError::Invalid("solver.max_order must be at least 1".to_string()));
        }
        if self.solver.max_pack_size == 0 {
            return Err(ConfigError::Invalid(
                "solver.max_pack_size must be at least 1".to_string(),
            ));
        }
        if self.solver.max_table_len == 0 {
            return Err(ConfigError::Invalid(
                "solver.max_table_len must be at least 1".to_string(),
            ));
        }
        let catalog = PackCatalog::new(self.solver.pack_sizes.iter().copied())
            .map_err(|e| ConfigError::Invalid(format!("solver.pack_sizes: {e}")))?;
        if catalog.largest() > self.solver.max_pack_size {
            return Err(ConfigError::Invalid(format!(
                "solver.pack_sizes: pack size {} exceeds solver.max_pack_size {}",
                catalog.largest(),
                self.solver.max_pack_size
            )));
        }
        let required = self
            .solver
            .strategy
            .state_space(self.solver.max_order, &catalog);
        if required > self.solver.max_table_len {
            return Err(ConfigError::Invalid(format!(
                "{} needs {} states for an order of {} against {}, above solver.max_table_len {}",
                self.solver.strategy,
                required,
                self.solver.max_order,
                catalog,
                self.solver.max_table_len
            )));
        }
        if self.cache.enabled && self.cache.max_entries == 0 {
            return Err(ConfigError::Invalid(
                "cache.max_entries must be at least 1 when the cache is enabled".to_string(),
            ));
        }
        Ok(())
    }
}
