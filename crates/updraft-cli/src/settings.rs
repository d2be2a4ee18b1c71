//! Persisted last-used settings.
//!
//! Every value the generate command collects is written back to a TOML
//! file after a run and loaded as defaults for the next one. Command-line
//! flags always override loaded values.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("settings serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("no user config directory available")]
    NoConfigDir,
}

/// Last-used generate inputs, one field per form value the original
/// utility collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub root_folder: String,
    pub include_mask: String,
    pub exclude_mask: String,
    pub include_subfolders: bool,
    pub use_validation: bool,
    pub run_command: String,
    pub run_path: String,
    pub run_arguments: String,
    pub delete_after_run: bool,
    pub update_location: String,
    pub copy_method: String,
    pub target_path: String,
    pub product: String,
    pub publisher: String,
    pub target_version: String,
    pub new_version: String,
    pub description: String,
    pub platform: String,
    pub manifest_file_name: String,
    pub format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_folder: String::new(),
            include_mask: String::new(),
            exclude_mask: String::new(),
            include_subfolders: false,
            use_validation: true,
            run_command: String::new(),
            run_path: String::new(),
            run_arguments: String::new(),
            delete_after_run: false,
            update_location: String::new(),
            copy_method: String::new(),
            target_path: String::new(),
            product: String::new(),
            publisher: String::new(),
            target_version: String::new(),
            new_version: String::new(),
            description: String::new(),
            platform: String::new(),
            manifest_file_name: String::new(),
            format: String::new(),
        }
    }
}

impl Settings {
    /// Default settings file location under the user config directory.
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        dirs::config_dir()
            .map(|dir| dir.join("updraft").join("settings.toml"))
            .ok_or(SettingsError::NoConfigDir)
    }

    /// Load settings from `path` (or the default location). A missing
    /// file yields defaults — first runs start clean.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: Option<&Path>) -> Result<(), SettingsError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}
