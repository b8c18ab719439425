//! Configuration management for lifecard.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "lifecard";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "directory.db";

/// Default photo bucket directory name.
const BUCKET_DIR_NAME: &str = "photos";

/// Default session file name.
const SESSION_FILE_NAME: &str = "session";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `LIFECARD_`, with `__`
///    separating the section from the key, e.g.
///    `LIFECARD_DIRECTORY__PAGE_SIZE`)
/// 2. TOML config file at `~/.config/lifecard/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Photo bucket configuration.
    pub photos: PhotosConfig,
    /// Share link configuration.
    pub share: ShareConfig,
    /// Directory view configuration.
    pub directory: DirectoryConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/lifecard/directory.db`
    pub database_path: Option<PathBuf>,
    /// Path to the persisted CLI session token.
    /// Defaults to `~/.local/share/lifecard/session`
    pub session_file: Option<PathBuf>,
}

/// Photo-bucket configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotosConfig {
    /// The bucket directory photos are written under.
    /// Defaults to `~/.local/share/lifecard/photos`
    pub bucket_dir: Option<PathBuf>,
    /// Base URL photos are publicly served from.
    pub public_base_url: String,
}

/// Share-link configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Base URL public record links are built from.
    pub base_url: String,
}

/// Directory-view configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Records shown per page.
    pub page_size: usize,
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            bucket_dir: None, // Will be resolved to default at runtime
            public_base_url: "https://lifecard.example/photos".to_string(),
        }
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: "https://lifecard.example".to_string(),
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            page_size: crate::directory::DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (`LIFECARD_<SECTION>__<KEY>`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("LIFECARD_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.directory.page_size == 0 {
            return Err(Error::ConfigValidation {
                message: "page_size must be greater than 0".to_string(),
            });
        }

        if self.share.base_url.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "share.base_url must not be empty".to_string(),
            });
        }

        if self.photos.public_base_url.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "photos.public_base_url must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the session file path, resolving defaults if not set.
    #[must_use]
    pub fn session_file_path(&self) -> PathBuf {
        self.storage
            .session_file
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(SESSION_FILE_NAME))
    }

    /// Get the photo bucket directory, resolving defaults if not set.
    #[must_use]
    pub fn bucket_dir(&self) -> PathBuf {
        self.photos
            .bucket_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(BUCKET_DIR_NAME))
    }
}
