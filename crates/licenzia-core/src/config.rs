//! Layered configuration.
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. A TOML file (`--config`, or `licenzia.toml` in the working directory)
//! 3. Environment variables with the `LICENZIA_` prefix, `__` separating
//!    sections: `LICENZIA_RULES__DUTY_MINIMUM_RUB=65000`,
//!    `LICENZIA_REGISTRY__SUBDIVISION_URL=http://...`

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::money::Amount;

const DEFAULT_CONFIG_FILE: &str = "licenzia.toml";
const ENV_PREFIX: &str = "LICENZIA_";

/// Address registry portal search endpoints, tried in order.
const DEFAULT_ENDPOINTS: &[&str] = &[
    "https://fias.nalog.ru/Search/FullTextSearch",
    "https://fias.nalog.ru/Search/Search",
    "https://fias.nalog.ru/Search/SearchAddress_Read",
    "https://fias.nalog.ru/Search/SearchByAddress",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpertiseConfig {
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

/// Thresholds and limits used by the consistency rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Minimum license duty, whole rubles.
    pub duty_minimum_rub: i64,
    /// Bound on each address registry call.
    pub address_timeout_ms: u64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            duty_minimum_rub: 65_000,
            address_timeout_ms: 10_000,
        }
    }
}

impl RulesConfig {
    pub fn duty_minimum(&self) -> Amount {
        Amount::from_major(self.duty_minimum_rub)
    }

    pub fn address_timeout(&self) -> Duration {
        Duration::from_millis(self.address_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub endpoints: Vec<String>,
    /// Base URL answering `GET {url}/{location_id}` with a subdivision code.
    pub subdivision_url: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            subdivision_url: None,
            request_timeout_secs: 10,
        }
    }
}

impl ExpertiseConfig {
    /// Load from defaults, the given (or default) TOML file, and environment.
    ///
    /// An explicitly given file must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path
            && !path.exists()
        {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let config: Self = Self::figment(path).extract().map_err(Box::new)?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// The provider chain, exposed so tests can layer extra providers.
    pub fn figment(path: Option<&Path>) -> Figment {
        let file = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
