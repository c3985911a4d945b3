//! Configuration loading utilities

use crate::Settings;
use herdbot_common::{HerdBotError, Result};
use std::env;
use std::path::Path;
use tracing::info;

/// Environment variable naming a configuration file to load
const CONFIG_PATH_VAR: &str = "HERDBOT_CONFIG_PATH";
/// Default configuration file looked for in the working directory
const DEFAULT_CONFIG_FILE: &str = "herdbot.toml";
/// Prefix for environment overrides, e.g. `HERDBOT__TWITTER__ACCESS_TOKEN`
const ENV_PREFIX: &str = "HERDBOT";

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from `HERDBOT_CONFIG_PATH`, else `herdbot.toml` in
    /// the working directory, else defaults; environment overrides apply in
    /// every case.
    pub fn load() -> Result<Settings> {
        if let Ok(path) = env::var(CONFIG_PATH_VAR) {
            Self::load_from_file(&path)
        } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
            Self::load_from_file(DEFAULT_CONFIG_FILE)
        } else {
            info!("No configuration file found, using defaults with environment overrides");
            let settings = Self::builder(None)?;
            Self::validated(settings)
        }
    }

    /// Load configuration from a specific TOML file with environment
    /// overrides.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration file");
        let settings = Self::builder(Some(path))?;
        Self::validated(settings)
    }

    fn builder(file: Option<&Path>) -> Result<Settings> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;
        Ok(settings)
    }

    fn validated(settings: Settings) -> Result<Settings> {
        settings
            .validate_all()
            .map_err(|e| HerdBotError::validation(e.to_string()))?;
        Ok(settings)
    }
}
