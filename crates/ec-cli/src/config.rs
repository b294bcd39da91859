//! `ec.toml` handling.
//!
//! ```toml
//! def_dir = "def"
//! extension = "def"
//!
//! [registry]
//! default_colour = [0.3, 0.3, 1.0]
//!
//! [registry.colour_overrides]
//! worldspawn = [0.0, 0.5, 0.0]
//! ```

use std::path::Path;

use ec_core::RegistryConfig;
use ec_dsl::source::{DEFAULT_DEF_DIR, DEFAULT_EXTENSION};
use serde::{Deserialize, Serialize};

/// Name of the config file looked up in the definitions root.
pub const CONFIG_FILE: &str = "ec.toml";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML content.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings for one definitions root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Directory, relative to the root, holding declaration files.
    pub def_dir: String,
    /// Declaration file extension.
    pub extension: String,
    /// Registry settings.
    pub registry: RegistryConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            def_dir: DEFAULT_DEF_DIR.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            registry: RegistryConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load `explicit` if given, else `<root>/ec.toml` if present, else defaults.
    ///
    /// An explicitly named file must exist.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = root.join(CONFIG_FILE);
                if !path.exists() {
                    tracing::debug!("no {} in {}, using defaults", CONFIG_FILE, root.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!("loaded config from {:?}", path);
        Ok(config)
    }
}
