//! Audit configuration
//!
//! Settings come from up to three layers, highest first: command line (and
//! its environment variables), an optional TOML file, built-in defaults.
//!
//! ```toml
//! root_dir = '\\TRUENAS\nasuser\GTS-Data\Reports'
//! output = "Agent_Fee_Audit.xlsx"
//! start_date = "2025-06-01"
//! end_date = "2025-06-30"
//! name_pattern = "STE_Report"
//! contract_name = "STE"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use feeaudit_core::{AuditError, DateRange, DEFAULT_CONTRACT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default output workbook
pub const DEFAULT_OUTPUT: &str = "Agent_Fee_Audit.xlsx";

/// Substring a report filename must contain
pub const DEFAULT_NAME_PATTERN: &str = "STE_Report";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("No root directory given (use --root-dir or root_dir in the config file)")]
    MissingRootDir,

    #[error("Name pattern must not be empty")]
    EmptyNamePattern,

    #[error(transparent)]
    Range(#[from] AuditError),
}

/// One layer of optional settings
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub root_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub name_pattern: Option<String>,
    pub contract_name: Option<String>,
}

impl ConfigLayer {
    /// Load a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fill every unset field from `fallback`
    pub fn or(self, fallback: ConfigLayer) -> Self {
        Self {
            root_dir: self.root_dir.or(fallback.root_dir),
            output: self.output.or(fallback.output),
            start_date: self.start_date.or(fallback.start_date),
            end_date: self.end_date.or(fallback.end_date),
            name_pattern: self.name_pattern.or(fallback.name_pattern),
            contract_name: self.contract_name.or(fallback.contract_name),
        }
    }
}

/// Resolved settings for one audit run
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuditConfig {
    pub root_dir: PathBuf,
    pub output: PathBuf,
    pub range: DateRange,
    pub name_pattern: String,
    pub contract_name: String,
}

impl AuditConfig {
    /// Defaults for everything but the root directory
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            range: DateRange::unbounded(),
            name_pattern: DEFAULT_NAME_PATTERN.to_string(),
            contract_name: DEFAULT_CONTRACT.to_string(),
        }
    }

    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }

    pub fn range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    pub fn name_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.name_pattern = pattern.into();
        self
    }

    pub fn contract_name(mut self, name: impl Into<String>) -> Self {
        self.contract_name = name.into();
        self
    }

    /// Resolve a merged layer into a complete configuration
    pub fn from_layer(layer: ConfigLayer) -> Result<Self, ConfigError> {
        let root_dir = layer.root_dir.ok_or(ConfigError::MissingRootDir)?;
        let range = DateRange::new(layer.start_date, layer.end_date)?;

        let mut config = Self::new(root_dir).range(range);
        if let Some(output) = layer.output {
            config.output = output;
        }
        if let Some(pattern) = layer.name_pattern {
            if pattern.is_empty() {
                return Err(ConfigError::EmptyNamePattern);
            }
            config.name_pattern = pattern;
        }
        if let Some(contract) = layer.contract_name {
            config.contract_name = contract;
        }
        Ok(config)
    }
}
