//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file: `--config PATH`, or `config.toml` in the platform config
//!    directory when it exists
//! 3. Environment variables prefixed `COPYFINDER_` (e.g.
//!    `COPYFINDER_CHUNK_SIZE=1048576`)
//! 4. Command-line flags, applied by the caller on the loaded value
//!
//! # Example
//!
//! ```toml
//! threads = 4
//! chunk_size = 1048576
//! report_singletons = false
//! skip_hidden = true
//! min_size = 1
//! ```

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::duplicates::{FinderConfig, DEFAULT_CHUNK_SIZE};
use crate::scanner::WalkerConfig;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "COPYFINDER_";

/// Errors raised while loading or saving configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A layer could not be parsed or extracted.
    #[error("Invalid configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// A value parsed but is out of range.
    #[error("Invalid value for '{field}': {reason}")]
    Invalid {
        /// Offending field name
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// An explicitly named configuration file does not exist.
    #[error("Configuration file not found: {0}")]
    Missing(PathBuf),

    /// Writing the configuration failed.
    #[error("Failed to write configuration to {path}: {source}")]
    Write {
        /// Target file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be rendered as TOML.
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Clustering worker threads (`None` = one per logical CPU)
    pub threads: Option<usize>,
    /// Bytes read per file per comparison step
    pub chunk_size: u64,
    /// Report one-member groups
    pub report_singletons: bool,
    /// Skip files and directories whose name starts with '.'
    pub skip_hidden: bool,
    /// Ignore files smaller than this many bytes
    pub min_size: Option<u64>,
    /// Ignore files larger than this many bytes
    pub max_size: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: None,
            chunk_size: DEFAULT_CHUNK_SIZE as u64,
            report_singletons: true,
            skip_hidden: false,
            min_size: None,
            max_size: None,
        }
    }
}

impl Config {
    /// Load defaults, the default config file (if present), and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a layer is malformed or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path().filter(|p| p.exists());
        Self::load_from(path.as_deref())
    }

    /// Load defaults, the given TOML file (if any), and environment.
    ///
    /// An explicit path that does not exist is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a layer is malformed or a value is invalid.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::Missing(path.to_path_buf()));
            }
            log::debug!("Loading configuration from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(Box::new)?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values that cannot drive a scan.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid {
                field: "chunk_size",
                reason: "must be at least 1 byte".to_string(),
            });
        }
        if usize::try_from(self.chunk_size).is_err() {
            return Err(ConfigError::Invalid {
                field: "chunk_size",
                reason: format!("{} does not fit in memory on this platform", self.chunk_size),
            });
        }
        if self.threads == Some(0) {
            return Err(ConfigError::Invalid {
                field: "threads",
                reason: "must be at least 1".to_string(),
            });
        }
        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if min > max {
                return Err(ConfigError::Invalid {
                    field: "min_size",
                    reason: format!("{} is larger than max_size {}", min, max),
                });
            }
        }
        Ok(())
    }

    /// Build the finder configuration these settings describe.
    #[must_use]
    pub fn to_finder_config(&self) -> FinderConfig {
        let walker = WalkerConfig::default()
            .with_skip_hidden(self.skip_hidden)
            .with_min_size(self.min_size)
            .with_max_size(self.max_size);

        FinderConfig::default()
            .with_threads(self.threads)
            .with_chunk_size(usize::try_from(self.chunk_size).unwrap_or(DEFAULT_CHUNK_SIZE))
            .with_report_singletons(self.report_singletons)
            .with_walker_config(walker)
    }

    /// Write the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, content).map_err(write_err)
    }

    /// Platform-specific location of `config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "copyfinder", "copyfinder")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
