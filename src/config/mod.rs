//! Store configuration.
//!
//! [`StoreConfig`] controls how a fileset is opened: where the three files
//! live, how duplicate variant ids are indexed, and which samples are selected
//! by default. It can be built in code or loaded from JSON:
//!
//! ```json
//! {
//!   "duplicate_policy": "reject",
//!   "select_samples": ["HG00097", "HG00096"],
//!   "sort_samples": true,
//!   "pvar_path": "/data/cohort.pvar.gz"
//! }
//! ```
//!
//! Every field is optional; unknown fields are rejected.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::DuplicatePolicy;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Options for opening a [`PgenStore`](crate::retrieval::store::PgenStore)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Indexing policy for repeated variant ids
    pub duplicate_policy: DuplicatePolicy,

    /// Samples selected by [`default_selection`]; `None` selects all
    ///
    /// [`default_selection`]: crate::retrieval::store::PgenStore::default_selection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select_samples: Option<Vec<String>>,

    /// Present selected samples in store order rather than request order
    pub sort_samples: bool,

    /// Overrides for the individual fileset paths (default: `<prefix>.pgen` etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pgen_path: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pvar_path: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub psam_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::default(),
            select_samples: None,
            sort_samples: true,
            pgen_path: None,
            pvar_path: None,
            psam_path: None,
        }
    }
}

/// Resolved locations of the three files of a fileset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesetPaths {
    pub pgen: PathBuf,
    pub pvar: PathBuf,
    pub psam: PathBuf,
}

impl FilesetPaths {
    /// `<prefix>.pgen`, `<prefix>.pvar`, `<prefix>.psam`
    #[must_use]
    pub fn from_prefix(prefix: &Path) -> Self {
        Self {
            pgen: with_suffix(prefix, ".pgen"),
            pvar: with_suffix(prefix, ".pvar"),
            psam: with_suffix(prefix, ".psam"),
        }
    }
}

/// Append a suffix without touching dots already in the prefix
fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut path = OsString::from(prefix.as_os_str());
    path.push(suffix);
    PathBuf::from(path)
}

impl StoreConfig {
    /// Load config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file cannot be read or
    /// `ConfigError::ParseError` if it is not a valid config.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse config from a JSON string
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` if the JSON is invalid or has unknown fields.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Export config to JSON
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    #[must_use]
    pub fn with_samples<I, S>(mut self, samples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select_samples = Some(samples.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_sort_samples(mut self, sort: bool) -> Self {
        self.sort_samples = sort;
        self
    }

    /// Fileset paths for `prefix`, with any configured overrides applied
    #[must_use]
    pub fn resolve_paths(&self, prefix: &Path) -> FilesetPaths {
        let defaults = FilesetPaths::from_prefix(prefix);
        FilesetPaths {
            pgen: self.pgen_path.clone().unwrap_or(defaults.pgen),
            pvar: self.pvar_path.clone().unwrap_or(defaults.pvar),
            psam: self.psam_path.clone().unwrap_or(defaults.psam),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.duplicate_policy, DuplicatePolicy::LastWins);
        assert!(config.sort_samples);
        assert!(config.select_samples.is_none());
    }

    #[test]
    fn test_from_json_partial() {
        let json = r#"{"duplicate_policy": "reject", "select_samples": ["b", "a"]}"#;
        let config = StoreConfig::from_json(json).unwrap();
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
        assert_eq!(config.select_samples, Some(vec!["b".to_string(), "a".to_string()]));
        assert!(config.sort_samples);
    }

    #[test]
    fn test_from_json_unknown_field() {
        let result = StoreConfig::from_json(r#"{"sort_sample": false}"#);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let config = StoreConfig::default()
            .with_samples(["S2", "S1"])
            .with_sort_samples(false);
        let json = config.to_json().unwrap();
        assert!(!json.contains("pgen_path"));
        assert_eq!(StoreConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, r#"{"sort_samples": false}"#).unwrap();

        let config = StoreConfig::load_from_file(&path).unwrap();
        assert!(!config.sort_samples);
    }

    #[test]
    fn test_resolve_paths() {
        let prefix = Path::new("/data/chr1.v2");
        let paths = StoreConfig::default().resolve_paths(prefix);
        assert_eq!(paths.pgen, PathBuf::from("/data/chr1.v2.pgen"));
        assert_eq!(paths.pvar, PathBuf::from("/data/chr1.v2.pvar"));
        assert_eq!(paths.psam, PathBuf::from("/data/chr1.v2.psam"));

        let config = StoreConfig {
            pvar_path: Some(PathBuf::from("/other/x.pvar.gz")),
            ..StoreConfig::default()
        };
        let paths = config.resolve_paths(prefix);
        assert_eq!(paths.pvar, PathBuf::from("/other/x.pvar.gz"));
        assert_eq!(paths.psam, PathBuf::from("/data/chr1.v2.psam"));
    }
}
