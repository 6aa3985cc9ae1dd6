//! Application settings loaded from config.toml
//!
//! The file has two parts: a `[billing]` table with runtime knobs for the payment
//! and rent-cycle engine, and a list of `[[categories]]` used to seed the pricing
//! tiers on first run. Both parts are optional.

use crate::core::payment::DEFAULT_PAYMENT_CHANNEL;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Billing engine settings
    #[serde(default)]
    pub billing: BillingConfig,
    /// Categories to seed when missing
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

/// Runtime settings for payments and rent generation
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Channel recorded when a payment does not name one
    #[serde(default = "default_channel")]
    pub default_channel: String,
    /// Upper bound for any single store operation, in seconds
    #[serde(default = "default_store_timeout_secs")]
    pub store_timeout_secs: u64,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            default_channel: default_channel(),
            store_timeout_secs: default_store_timeout_secs(),
        }
    }
}

impl BillingConfig {
    /// Store timeout as a `Duration`
    #[must_use]
    pub const fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }
}

fn default_channel() -> String {
    DEFAULT_PAYMENT_CHANNEL.to_string()
}

const fn default_store_timeout_secs() -> u64 {
    DEFAULT_STORE_TIMEOUT_SECS
}

/// Seed definition for a single category
#[derive(Debug, Deserialize, Clone)]
pub struct CategoryConfig {
    /// Category title
    pub title: String,
    /// Monthly tariff
    pub amount: f64,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading configuration from {}", path_ref.display());
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses configuration from a TOML string
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from `RENT_BUDDY_CONFIG`, or ./config.toml when unset.
///
/// A missing default file is not an error; built-in defaults are used instead.
pub fn load_default_config() -> Result<Config> {
    match std::env::var("RENT_BUDDY_CONFIG") {
        Ok(path) => load_config(path),
        Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => load_config(DEFAULT_CONFIG_PATH),
        Err(_) => {
            tracing::info!("No {DEFAULT_CONFIG_PATH} found, using built-in defaults");
            Ok(Config::default())
        }
    }
}
