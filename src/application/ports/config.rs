//! Configuration port interface

use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Port for configuration storage
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load configuration from storage.
    ///
    /// # Returns
    /// The stored config, or an empty one when nothing has been saved
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Save configuration to storage, replacing what was there.
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    /// Location of the configuration file.
    fn path(&self) -> PathBuf;

    /// Whether a configuration file has been written.
    fn exists(&self) -> bool;

    /// Write the default configuration.
    /// Fails if a file already exists.
    async fn init(&self) -> Result<(), ConfigError>;
}
