//! Configuration management.

mod settings;

pub use settings::{ApiSettings, AppConfig, AppSettings, LoggingConfig};

use config::{Config, Environment, File};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Load configuration from an optional file and the environment.
///
/// A missing file is not an error; `WIKIFOLIO__API__BASE_URL` style
/// variables override whatever the file sets.
pub fn load_config(path: &Path) -> Result<AppConfig, SettingsError> {
    let config = Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(
            Environment::with_prefix("WIKIFOLIO")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(config.try_deserialize()?)
}

/// Render a configuration as TOML, e.g. to write a starter file.
pub fn to_toml(config: &AppConfig) -> Result<String, SettingsError> {
    Ok(toml::to_string_pretty(config)?)
}
