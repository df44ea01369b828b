//! Application settings loaded from `ledger.toml`.
//!
//! Every section is optional. A missing file yields the defaults, so the ledger runs
//! with no configuration at all.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default file name looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "ledger.toml";

/// Configuration structure representing the entire `ledger.toml` file
#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Persistence settings
    #[serde(default)]
    pub database: DatabaseSettings,
    /// Ledger service tuning
    #[serde(default)]
    pub ledger: LedgerSettings,
}

/// `[database]` section
#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    /// Connection URL; `DATABASE_URL` overrides it
    pub url: Option<String>,
}

/// `[ledger]` section
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LedgerSettings {
    /// How many times a vendor write is recomputed after losing a version race
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,
}

const fn default_max_conflict_retries() -> u32 {
    3
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            max_conflict_retries: default_max_conflict_retries(),
        }
    }
}

/// Parses settings from a TOML string.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse ledger settings: {e}"),
    })
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file exists but cannot be read
/// - The TOML syntax is invalid
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!("No settings file at {:?}, using defaults", path);
        return Ok(Settings::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read settings file {}: {e}", path.display()),
    })?;
    parse_settings(&contents)
}

/// Loads settings from the default location (`./ledger.toml`)
pub fn load_default_settings() -> Result<Settings> {
    load_settings(DEFAULT_CONFIG_PATH)
}
