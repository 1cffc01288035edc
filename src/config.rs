//! Session configuration.

use std::fs;
use std::path::{Path, PathBuf};

use attrbind_core::{BindingError, MIN_PLATFORM_VERSION};
use attrbind_registry::{DEFAULT_SNAPSHOT_SUFFIX, SnapshotLayout};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading a [`BindingConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("module_name must not be empty")]
    MissingModuleName,
}

impl From<ConfigError> for BindingError {
    fn from(err: ConfigError) -> Self {
        BindingError::Config(err.to_string())
    }
}

/// Settings for one compilation invocation.
///
/// ```toml
/// module_name = "app"
/// output_dir = "build/intermediates/binding"
/// snapshot_suffix = "-setter_store.bin"
/// min_platform_version = 14
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// Name of the module being compiled.
    pub module_name: String,
    /// Directory holding every module's snapshot.
    pub output_dir: PathBuf,
    /// Appended to a module name to form its snapshot file name.
    pub snapshot_suffix: String,
    /// Lowest platform version reported by calls that do not inherit one.
    pub min_platform_version: u32,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            module_name: String::new(),
            output_dir: PathBuf::from("."),
            snapshot_suffix: DEFAULT_SNAPSHOT_SUFFIX.to_string(),
            min_platform_version: MIN_PLATFORM_VERSION,
        }
    }
}

impl BindingConfig {
    pub fn new(module_name: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            module_name: module_name.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: BindingConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.module_name.trim().is_empty() {
            return Err(ConfigError::MissingModuleName);
        }
        Ok(())
    }

    /// Where snapshots are read from and written to.
    pub fn snapshot_layout(&self) -> SnapshotLayout {
        SnapshotLayout::new(self.output_dir.clone(), self.snapshot_suffix.clone())
    }

    /// This module's own snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot_layout().path_for(&self.module_name)
    }
}
