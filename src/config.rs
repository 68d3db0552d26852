//! Configuration for rosterdb
//!
//! Centralized configuration with sensible defaults.

use std::path::{Path, PathBuf};

/// Main configuration for a rosterdb instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Path Conventions
    // -------------------------------------------------------------------------
    /// Suffix appended to the data file path for the sidecar index file
    /// (`roster.json` → `roster.json.index`)
    pub index_suffix: String,

    /// Tag inserted before the data file extension for backups
    /// (`roster.json` → `roster_backup.json`)
    pub backup_tag: String,

    /// Suffix appended to the data file path for the compaction temp file
    /// (`roster.json` → `roster.json.temp`)
    pub temp_suffix: String,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// fsync the data file after every append
    pub sync_appends: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_suffix: ".index".to_string(),
            backup_tag: "_backup".to_string(),
            temp_suffix: ".temp".to_string(),
            sync_appends: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    // =========================================================================
    // Derived Paths
    // =========================================================================

    /// Sidecar index path for a data file
    /// `roster.json` → `roster.json.index`
    pub fn index_path(&self, data_path: &Path) -> PathBuf {
        let mut name = data_path.as_os_str().to_os_string();
        name.push(&self.index_suffix);
        PathBuf::from(name)
    }

    /// Compaction temp path for a data file
    /// `roster.json` → `roster.json.temp`
    pub fn temp_path(&self, data_path: &Path) -> PathBuf {
        let mut name = data_path.as_os_str().to_os_string();
        name.push(&self.temp_suffix);
        PathBuf::from(name)
    }

    /// Backup path for a data file: the tag goes before the extension
    /// `roster.json` → `roster_backup.json`
    pub fn backup_path(&self, data_path: &Path) -> PathBuf {
        let stem = data_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut name = format!("{}{}", stem, self.backup_tag);
        if let Some(ext) = data_path.extension() {
            name.push('.');
            name.push_str(&ext.to_string_lossy());
        }

        data_path.with_file_name(name)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the sidecar index suffix
    pub fn index_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.index_suffix = suffix.into();
        self
    }

    /// Set the backup tag
    pub fn backup_tag(mut self, tag: impl Into<String>) -> Self {
        self.config.backup_tag = tag.into();
        self
    }

    /// Set the compaction temp suffix
    pub fn temp_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.temp_suffix = suffix.into();
        self
    }

    /// Enable or disable fsync after every append
    pub fn sync_appends(mut self, sync: bool) -> Self {
        self.config.sync_appends = sync;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
