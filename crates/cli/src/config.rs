//! Layered CLI settings

use config::{Config, ConfigError, Environment, File};
use portal_http::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings read from defaults, an optional TOML file and `PORTAL_*` variables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalSettings {
    /// Backend connection
    #[serde(default)]
    pub api: ClientConfig,
    /// Where the session file and log live
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
    /// Default log level when neither `RUST_LOG` nor `--log-level` is given
    #[serde(default)]
    pub log_level: Option<String>,
}

impl PortalSettings {
    /// Load settings from `path` if it exists, then the environment
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_env(path, Environment::with_prefix("PORTAL"))
    }

    fn load_with_env(path: &Path, env: Environment) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from(path).required(false))
            .add_source(env.prefix_separator("_").separator("__").try_parsing(true))
            .build()?;

        config.try_deserialize()
    }
}
