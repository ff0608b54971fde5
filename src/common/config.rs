use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Verification parameters used by the cleanup stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanConfig {
    /// Verify level for the shallow leaf scan
    #[serde(default = "default_basic_level")]
    pub basic_level: u32,

    /// Workers for the shallow leaf scan
    #[serde(default = "default_concurrency")]
    pub basic_concurrency: usize,

    /// Verify level for the incomplete and orphan graph walks
    #[serde(default = "default_full_level")]
    pub full_level: u32,

    /// Workers for the graph walks
    #[serde(default = "default_concurrency")]
    pub full_concurrency: usize,
}

fn default_basic_level() -> u32 {
    6
}
fn default_full_level() -> u32 {
    1
}
fn default_concurrency() -> usize {
    1
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            basic_level: default_basic_level(),
            basic_concurrency: default_concurrency(),
            full_level: default_full_level(),
            full_concurrency: default_concurrency(),
        }
    }
}

impl CleanConfig {
    /// Get the data directory (~/.filestore-clean)
    pub fn data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".filestore-clean")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    /// Load config from the default location, or defaults if there is none
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from a specific file, or defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(CleanConfig::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: CleanConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// Save config to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config dir: {}", dir.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}
