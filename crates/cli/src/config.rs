//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `POCKETSHOP_DATA_DIR` - Directory holding saved state (default: `.pocketshop`)
//! - `POCKETSHOP_CART_KEY` - Storage key for the cart (default: `cart`)
//! - `POCKETSHOP_WISHLIST_KEY` - Storage key for the wishlist (default: `wishlist`)
//! - `POCKETSHOP_LOG_FORMAT` - `text` or `json` (default: `text`)
//! - `RUST_LOG` - Log filter (default: `pocketshop_cart=info,pocketshop_cli=info`)

use std::path::PathBuf;
use std::str::FromStr;

use pocketshop_cart::StorageKeys;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'text' or 'json', got '{other}'")),
        }
    }
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory for the file-backed store
    pub data_dir: PathBuf,
    /// Storage keys
    pub keys: StorageKeys,
    /// Log output format
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let data_dir = PathBuf::from(get_env_or_default("POCKETSHOP_DATA_DIR", ".pocketshop"));
        let keys = StorageKeys {
            cart: get_key("POCKETSHOP_CART_KEY", "cart")?,
            wishlist: get_key("POCKETSHOP_WISHLIST_KEY", "wishlist")?,
            ..StorageKeys::default()
        };
        let log_format = get_optional_env("POCKETSHOP_LOG_FORMAT")
            .map(|value| {
                value.parse::<LogFormat>().map_err(|e| {
                    ConfigError::InvalidEnvVar("POCKETSHOP_LOG_FORMAT".to_string(), e)
                })
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            data_dir,
            keys,
            log_format,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a storage key, rejecting blank values.
fn get_key(var: &str, default: &str) -> Result<String, ConfigError> {
    let value = get_env_or_default(var, default);
    validate_key(var, value)
}

fn validate_key(var: &str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            var.to_string(),
            "storage key cannot be empty".to_string(),
        ));
    }
    Ok(value)
}
