//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_STORAGE_PATH` - Path of the persisted cart snapshot file
//!   (default: `pomelo-cart.json` in the working directory)
//! - `CART_CURRENCY` - ISO 4217 code used to price newly added lines
//!   (default: USD)

use std::env;
use std::path::PathBuf;

use pomelo_core::CurrencyCode;
use thiserror::Error;

const DEFAULT_STORAGE_PATH: &str = "pomelo-cart.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart subsystem configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Path of the file holding the persisted cart snapshot
    pub storage_path: PathBuf,
    /// Currency used to price newly added lines
    pub currency: CurrencyCode,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            currency: CurrencyCode::default(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable has an invalid value (an empty
    /// storage path, or an unsupported currency code).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// `from_env` delegates here; tests inject their own lookup instead of
    /// mutating process-wide environment state.
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable has an invalid value.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let storage_path = match lookup("CART_STORAGE_PATH") {
            Some(value) if value.trim().is_empty() => {
                return Err(ConfigError::InvalidEnvVar(
                    "CART_STORAGE_PATH".to_string(),
                    "path must not be empty".to_string(),
                ));
            }
            Some(value) => PathBuf::from(value),
            None => PathBuf::from(DEFAULT_STORAGE_PATH),
        };

        let currency = match lookup("CART_CURRENCY") {
            Some(value) => value.parse().map_err(|e| {
                ConfigError::InvalidEnvVar("CART_CURRENCY".to_string(), format!("{e}"))
            })?,
            None => CurrencyCode::default(),
        };

        Ok(Self {
            storage_path,
            currency,
        })
    }
}
