//! YAML configuration
//!
//! ```yaml
//! max_connectivity: 1000
//! query_timeout_secs: 30
//! skip: 0
//! limit: 500
//! log_level: info
//! ```
//!
//! Every key is optional.

use crate::api::AnswerOptions;
use crate::cypher::{CompileOptions, Pagination};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Unknown log level: {0}")]
    LogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Exclusive upper bound on the degree of each edge's far endpoint
    pub max_connectivity: Option<u64>,
    pub query_timeout_secs: Option<u64>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_connectivity: None,
            query_timeout_secs: None,
            skip: None,
            limit: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Default location (~/.config/qgraph/config.yaml on Linux)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("qgraph").join("config.yaml"))
    }

    /// Load `path`, or the default location when it exists, or defaults
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// file is not.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        config.log_level()?;
        Ok(config)
    }

    pub fn log_level(&self) -> Result<Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    pub fn answer_options(&self) -> AnswerOptions {
        let mut pagination = Pagination::new();
        if let Some(skip) = self.skip {
            pagination = pagination.skip(skip);
        }
        if let Some(limit) = self.limit {
            pagination = pagination.limit(limit);
        }

        let mut compile = CompileOptions::new().with_pagination(pagination);
        if let Some(bound) = self.max_connectivity {
            compile = compile.with_max_connectivity(bound);
        }

        let options = AnswerOptions::new().with_compile(compile);
        match self.query_timeout_secs {
            Some(secs) => options.with_timeout(Duration::from_secs(secs)),
            None => options,
        }
    }
}
