/// Database connection and table creation
pub mod database;

/// Settings loading from ledger.toml
pub mod settings;

pub use settings::{Settings, load_default_settings, load_settings};
