//! Configuration Module
//!
//! This module defines all configuration structures for the node.
//! Configuration is loaded from TOML files and parsed using serde.

use serde::Deserialize;
use std::fs;

/// Main configuration structure
///
/// # Example TOML
/// ```toml
/// [api]
/// host = "127.0.0.1"
/// port = 26660
///
/// [database]
/// url = "sqlite://lastlook.db"
///
/// [consensus]
/// vote_extensions_enable_height = 0
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub consensus: ConsensusConfig,
}

/// API server configuration
///
/// # Fields
/// - `host`: IP address to bind to (e.g., "127.0.0.1" or "0.0.0.0")
/// - `port`: TCP port to listen on
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

/// Batch store configuration
///
/// # Fields
/// - `url`: SQLite connection URL (e.g., "sqlite://lastlook.db"), or
///   `"memory"` to keep batches in process memory only
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url == "memory"
    }
}

/// Consensus parameters the pipeline depends on
///
/// # Fields
/// - `vote_extensions_enable_height`: height after which vote extensions
///   occupy slot 0 of every block (0 disables them)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsensusConfig {
    #[serde(default)]
    pub vote_extensions_enable_height: u64,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was successfully loaded and parsed
    /// * `Err` if the file couldn't be read or the TOML is invalid
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
