//! Configuration for slotfile
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, SlotError};

/// Main configuration for a record store instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the data file. Created on open if missing.
    pub data_dir: PathBuf,

    /// Name of the data file inside `data_dir` (one file per record type)
    pub file_name: String,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// fsync after every mutating operation
    pub sync_writes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./dados"),
            file_name: "records.db".to_string(),
            sync_writes: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Full path of the data file
    pub fn file_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }

    /// Reject file names that would escape `data_dir` or name nothing
    pub fn validate(&self) -> Result<()> {
        if self.file_name.is_empty() {
            return Err(SlotError::Config("file name must not be empty".to_string()));
        }

        let has_separator = self.file_name.contains(|c| c == '/' || c == '\\');
        if has_separator || self.file_name == "." || self.file_name == ".." {
            return Err(SlotError::Config(format!(
                "file name must be a plain name, got {:?}",
                self.file_name
            )));
        }

        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the data file name
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.config.file_name = name.into();
        self
    }

    /// Enable or disable fsync after every write
    pub fn sync_writes(mut self, enabled: bool) -> Self {
        self.config.sync_writes = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
