//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use occ_core::DEFAULT_SEPARATOR;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Documents exported when `export` is given no files (the agenda list).
    pub files: Vec<PathBuf>,
    /// Separator used to join the parents path.
    pub separator: String,
    /// Optional override for the emitted header line. Must name the same
    /// fields the active row format emits, in the same order.
    pub header: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            separator: DEFAULT_SEPARATOR.to_string(),
            header: None,
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (OCC_*)
        figment = figment.merge(Env::prefixed("OCC_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for occ.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("occ"))
}
