//! Configuration management for pagesplit.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.

use crate::core::error::{PagesplitError, Result};
use crate::core::types::{ChunkStrategy, SplitMode};
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Default strategy for new sessions
    #[serde(default)]
    pub chunking: ChunkStrategy,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory; session files live in `{data_dir}/sessions`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Input limits applied to new sessions and strategy changes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LimitsConfig {
    #[serde(default = "default_min_chunk_size")]
    pub min_chunk_size: usize,

    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    #[serde(default = "default_max_overlap")]
    pub max_overlap: usize,

    /// Maximum pages per document
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_min_chunk_size() -> usize {
    100
}

fn default_max_chunk_size() -> usize {
    10_000
}

fn default_max_overlap() -> usize {
    1_000
}

fn default_max_pages() -> usize {
    2_000
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_chunk_size: default_min_chunk_size(),
            max_chunk_size: default_max_chunk_size(),
            max_overlap: default_max_overlap(),
            max_pages: default_max_pages(),
        }
    }
}

impl LimitsConfig {
    /// Check a strategy against both its own invariants and these limits
    pub fn check_strategy(&self, strategy: &ChunkStrategy) -> Result<()> {
        strategy.validate()?;

        if strategy.chunk_size < self.min_chunk_size || strategy.chunk_size > self.max_chunk_size {
            return Err(PagesplitError::InvalidStrategy(format!(
                "chunk_size {} outside allowed range {}..={}",
                strategy.chunk_size, self.min_chunk_size, self.max_chunk_size
            )));
        }

        if strategy.overlap > self.max_overlap {
            return Err(PagesplitError::InvalidStrategy(format!(
                "overlap {} exceeds maximum {}",
                strategy.overlap, self.max_overlap
            )));
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| PagesplitError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// Priority order:
    /// 1. PAGESPLIT_CONFIG env var
    /// 2. XDG config file (~/.config/pagesplit/config.toml)
    /// 3. ./pagesplit.toml
    /// 4. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("PAGESPLIT_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new("pagesplit.toml").exists() {
                Self::from_file("pagesplit.toml")?
            } else {
                Self::default()
            }
        };

        // Use the XDG data directory unless one was chosen explicitly
        if env::var("PAGESPLIT_DATA_DIR").is_err() && config.storage.data_dir == default_data_dir()
        {
            config.storage.data_dir = xdg.data_dir.clone();
        }

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        // Chunking configuration
        if let Some(size) = env_parse("PAGESPLIT_CHUNK_SIZE") {
            self.chunking.chunk_size = size;
        }
        if let Some(overlap) = env_parse("PAGESPLIT_OVERLAP") {
            self.chunking.overlap = overlap;
        }
        if let Some(mode) = env_parse::<SplitMode>("PAGESPLIT_SPLIT_MODE") {
            self.chunking.split_mode = mode;
        }
        if let Some(normalize) = env_parse("PAGESPLIT_NORMALIZE") {
            self.chunking.normalize = normalize;
        }

        // Storage configuration
        if let Ok(data_dir) = env::var("PAGESPLIT_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(data_dir);
        }

        // Limits configuration
        if let Some(min) = env_parse("PAGESPLIT_MIN_CHUNK_SIZE") {
            self.limits.min_chunk_size = min;
        }
        if let Some(max) = env_parse("PAGESPLIT_MAX_CHUNK_SIZE") {
            self.limits.max_chunk_size = max;
        }
        if let Some(max) = env_parse("PAGESPLIT_MAX_OVERLAP") {
            self.limits.max_overlap = max;
        }
        if let Some(max) = env_parse("PAGESPLIT_MAX_PAGES") {
            self.limits.max_pages = max;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.limits.min_chunk_size == 0 {
            return Err(PagesplitError::ConfigError(
                "Min chunk size must be non-zero".to_string(),
            ));
        }

        if self.limits.min_chunk_size > self.limits.max_chunk_size {
            return Err(PagesplitError::ConfigError(
                "Min chunk size cannot exceed max chunk size".to_string(),
            ));
        }

        if self.limits.max_pages == 0 {
            return Err(PagesplitError::ConfigError(
                "Max pages must be non-zero".to_string(),
            ));
        }

        self.limits
            .check_strategy(&self.chunking)
            .map_err(|e| PagesplitError::ConfigError(format!("Default chunking: {e}")))?;

        Ok(())
    }

    /// Directory holding session files
    pub fn sessions_dir(&self) -> PathBuf {
        self.storage.data_dir.join("sessions")
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Chunk size: {} chars", self.chunking.chunk_size);
        tracing::info!("  Overlap: {} chars", self.chunking.overlap);
        tracing::info!("  Split mode: {}", self.chunking.split_mode);
        tracing::info!("  Normalize: {}", self.chunking.normalize);
        tracing::info!("  Data dir: {:?}", self.storage.data_dir);
        tracing::info!(
            "  Chunk size limits: {}..={}",
            self.limits.min_chunk_size,
            self.limits.max_chunk_size
        );
        tracing::info!("  Max overlap: {}", self.limits.max_overlap);
        tracing::info!("  Max pages: {}", self.limits.max_pages);
    }
}

/// Parse an env var, ignoring unset or malformed values
fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let value = env::var(name).ok()?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("Ignoring invalid value for {}: {:?}", name, value);
            None
        }
    }
}
