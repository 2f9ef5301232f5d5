//! Configuration management
//!
//! This module handles loading, saving, and migrating the s3nav configuration
//! file. The file is stored in TOML format at `~/.config/s3nav/config.toml`,
//! or under `$S3NAV_CONFIG_DIR` when that variable is set.
//!
//! Everything else talks to configuration through [`BucketRepository`], so
//! sessions and tests never touch ambient global state.

use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::bucket::BucketConfig;
use crate::error::{Error, Result};
use crate::pipeline::PageSize;

/// Current configuration schema version
///
/// Bumping this version requires a migration step in [`ConfigManager::migrate`].
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "S3NAV_CONFIG_DIR";

/// Default output format
const DEFAULT_OUTPUT: &str = "human";

/// Default color setting
const DEFAULT_COLOR: &str = "auto";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,

    /// Configured buckets
    #[serde(default)]
    pub buckets: Vec<BucketConfig>,
}

/// Default settings for CLI behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    /// Output format: "human" or "json"
    #[serde(default = "default_output")]
    pub output: String,

    /// Color mode: "auto", "always", or "never"
    #[serde(default = "default_color")]
    pub color: String,

    /// Show progress spinners
    #[serde(default = "default_true")]
    pub progress: bool,

    /// Page size used when a command does not pass one
    #[serde(default)]
    pub page_size: PageSize,
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            progress: true,
            page_size: PageSize::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
            buckets: Vec::new(),
        }
    }
}

/// Persistent store for the configuration, with an explicit load/save lifecycle
pub trait BucketRepository: Send + Sync {
    /// Load the current configuration
    fn load(&self) -> Result<Config>;

    /// Replace the stored configuration
    fn save(&self, config: &Config) -> Result<()>;
}

/// Configuration manager handles loading and saving the config file
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    pub fn new() -> Result<Self> {
        let config_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("Could not determine config directory".into()))?
                .join("s3nav"),
        };
        Ok(Self {
            config_path: config_dir.join("config.toml"),
        })
    }

    /// Create a ConfigManager with a custom path (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Migrate configuration from an older schema version
    fn migrate(&self, mut config: Config) -> Result<Config> {
        tracing::info!(
            from = config.schema_version,
            to = SCHEMA_VERSION,
            "migrating configuration"
        );
        config.schema_version = SCHEMA_VERSION;
        Ok(config)
    }
}

impl BucketRepository for ConfigManager {
    /// Load configuration from disk
    ///
    /// A missing file yields the default configuration.
    fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        if config.schema_version < SCHEMA_VERSION {
            config = self.migrate(config)?;
        } else if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade s3nav.",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        Ok(config)
    }

    /// Save configuration to disk
    ///
    /// Creates parent directories and restricts the file to its owner, since
    /// it may hold secret keys.
    fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.config_path, permissions)?;
        }

        tracing::debug!(path = %self.config_path.display(), "configuration saved");
        Ok(())
    }
}

/// In-memory repository for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryRepository {
    config: Mutex<Config>,
}

impl MemoryRepository {
    pub fn new(config: Config) -> Self {
        Self {
            config: Mutex::new(config),
        }
    }
}

impl BucketRepository for MemoryRepository {
    fn load(&self) -> Result<Config> {
        self.config
            .lock()
            .map(|config| config.clone())
            .map_err(|_| Error::General("configuration lock poisoned".into()))
    }

    fn save(&self, config: &Config) -> Result<()> {
        let mut guard = self
            .config
            .lock()
            .map_err(|_| Error::General("configuration lock poisoned".into()))?;
        *guard = config.clone();
        Ok(())
    }
}
