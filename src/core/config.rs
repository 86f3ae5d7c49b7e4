use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::core::market::DEFAULT_LISTING_LIMIT;

pub const DEFAULT_COINCAP_URL: &str = "https://api.coincap.io/v2";
pub const DEFAULT_EXCHANGE_RATE_URL: &str = "https://api.exchangerate-api.com/v4/latest";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoinCapProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeRateProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub coincap: Option<CoinCapProviderConfig>,
    pub exchange_rate: Option<ExchangeRateProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            coincap: Some(CoinCapProviderConfig {
                base_url: DEFAULT_COINCAP_URL.to_string(),
            }),
            exchange_rate: Some(ExchangeRateProviderConfig {
                base_url: DEFAULT_EXCHANGE_RATE_URL.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ListingConfig {
    #[serde(default = "default_limit")]
    pub limit: NonZeroU32,
}

fn default_limit() -> NonZeroU32 {
    DEFAULT_LISTING_LIMIT
}

impl Default for ListingConfig {
    fn default() -> Self {
        ListingConfig {
            limit: default_limit(),
        }
    }
}

/// Base URLs handed to the market data client at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub assets_base_url: String,
    pub exchange_base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            assets_base_url: DEFAULT_COINCAP_URL.to_string(),
            exchange_base_url: DEFAULT_EXCHANGE_RATE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub listing: ListingConfig,
}

impl AppConfig {
    /// Loads the config from the default location, falling back to defaults
    /// when no file exists there.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "coinview", "coinview")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            assets_base_url: self
                .providers
                .coincap
                .as_ref()
                .map_or(DEFAULT_COINCAP_URL, |p| p.base_url.as_str())
                .trim_end_matches('/')
                .to_string(),
            exchange_base_url: self
                .providers
                .exchange_rate
                .as_ref()
                .map_or(DEFAULT_EXCHANGE_RATE_URL, |p| p.base_url.as_str())
                .trim_end_matches('/')
                .to_string(),
        }
    }
}
