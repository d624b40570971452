//! # vf-config
//!
//! Layered configuration loading for the vendor fact engine using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`VENDORFACTS_*` prefix, `__` as separator)
//! 2. Project-level `.vendorfacts/config.toml`
//! 3. User-level `~/.config/vendorfacts/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! `VENDORFACTS_STORE__DB_PATH` -> `store.db_path`,
//! `VENDORFACTS_RESEARCH__MAX_CONCURRENT_RECHECKS` -> `research.max_concurrent_rechecks`.
//!
//! # Usage
//!
//! ```no_run
//! use vf_config::VfConfig;
//!
//! let config = VfConfig::load_with_dotenv().expect("config");
//! println!("facts live in {}", config.store.db_path.display());
//! ```

mod error;
mod freshness;
mod http;
mod research;
mod store;

pub use error::ConfigError;
pub use freshness::FreshnessConfig;
pub use http::HttpConfig;
pub use research::ResearchConfig;
pub use store::StoreConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "VENDORFACTS_";

/// Project-local config file, relative to the working directory.
pub const LOCAL_CONFIG_PATH: &str = ".vendorfacts/config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct VfConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub research: ResearchConfig,
    #[serde(default)]
    pub freshness: FreshnessConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

impl VfConfig {
    /// Load configuration from all sources and validate it.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after reading a `.env` file from the current
    /// directory, if one exists.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load with an explicit config file layered above the standard files.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::base_figment()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or add providers on top.
    pub fn figment() -> Figment {
        Self::base_figment().merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Defaults plus the global and local TOML files, without the environment.
    fn base_figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(LOCAL_CONFIG_PATH);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vendorfacts").join("config.toml"))
    }

    /// Reject values that would stall or disable the engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.db_path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("store.db_path", "must not be empty"));
        }
        if self.research.max_concurrent_rechecks == 0 {
            return Err(ConfigError::invalid(
                "research.max_concurrent_rechecks",
                "must be at least 1",
            ));
        }
        if self.research.recheck_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "research.recheck_timeout_secs",
                "must be at least 1",
            ));
        }
        if self.research.discovery_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "research.discovery_timeout_secs",
                "must be at least 1",
            ));
        }
        if self.research.write_retries == 0 {
            return Err(ConfigError::invalid(
                "research.write_retries",
                "must be at least 1",
            ));
        }
        if self.freshness.default_ttl_days == 0 {
            return Err(ConfigError::invalid(
                "freshness.default_ttl_days",
                "must be at least 1",
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::invalid("http.timeout_secs", "must be at least 1"));
        }
        Ok(())
    }
}
