//! Visibility configuration
//!
//! Loaded once per process from a JSON file. Every field is optional; the
//! defaults describe an ordinary dispatching backend under a running
//! postmaster.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::commit_log::{LocalDistribXactCache, DEFAULT_LOCAL_COMMIT_CACHE_SIZE};
use crate::observability::{log_event, DebugSwitches, Event, Logger, Severity};
use crate::snapshot::{DistributedSnapshot, DistributedSnapshotWithLocalMapping};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// What kind of backend this process is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Coordinator-side backend that dispatches work
    #[default]
    Dispatch,
    /// Segment-side backend executing dispatched work
    Execute,
    /// Standalone utility connection
    Utility,
}

/// Process-level flags consulted by the policy gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingMode {
    #[serde(default)]
    pub role: Role,

    /// False in single-process (maintenance) startup
    #[serde(default = "default_true")]
    pub under_postmaster: bool,

    /// False during bootstrap and init processing
    #[serde(default = "default_true")]
    pub normal_processing: bool,

    #[serde(default)]
    pub binary_upgrade: bool,

    /// The connected database only ever holds bootstrap-era tuples
    #[serde(default)]
    pub database_is_bootstrap_only: bool,
}

fn default_true() -> bool {
    true
}

impl Default for OperatingMode {
    fn default() -> Self {
        Self {
            role: Role::default(),
            under_postmaster: true,
            normal_processing: true,
            binary_upgrade: false,
            database_is_bootstrap_only: false,
        }
    }
}

impl OperatingMode {
    pub fn with_role(role: Role) -> Self {
        Self {
            role,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityConfig {
    #[serde(default)]
    pub mode: OperatingMode,

    /// Capacity of the process-local commit-resolution cache (default 1024)
    #[serde(default = "default_local_commit_cache_size")]
    pub local_commit_cache_size: usize,

    /// Capacity of each snapshot's local mapping cache (default: the
    /// snapshot's maxCount)
    #[serde(default)]
    pub max_local_mapped_xids: Option<usize>,

    #[serde(default)]
    pub debug_print_snapshot_dtm: bool,

    #[serde(default)]
    pub debug_print_full_dtm: bool,

    #[serde(default = "default_log_level")]
    pub log_level: Severity,
}

fn default_local_commit_cache_size() -> usize {
    DEFAULT_LOCAL_COMMIT_CACHE_SIZE
}

fn default_log_level() -> Severity {
    Severity::Info
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            mode: OperatingMode::default(),
            local_commit_cache_size: default_local_commit_cache_size(),
            max_local_mapped_xids: None,
            debug_print_snapshot_dtm: false,
            debug_print_full_dtm: false,
            log_level: default_log_level(),
        }
    }
}

impl VisibilityConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_json(&content)?;

        log_event(
            Event::ConfigLoaded,
            &[
                ("log_level", config.log_level.as_str()),
                ("path", path.display().to_string().as_str()),
            ],
        );

        Ok(config)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: VisibilityConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.local_commit_cache_size == 0 {
            return Err(ConfigError::Invalid(
                "local_commit_cache_size must be > 0".to_string(),
            ));
        }

        if self.max_local_mapped_xids == Some(0) {
            return Err(ConfigError::Invalid(
                "max_local_mapped_xids must be > 0 when set".to_string(),
            ));
        }

        Ok(())
    }

    /// Installs the logger threshold and debug switches for this process.
    pub fn apply(&self) {
        Logger::set_min_severity(self.log_level);
        DebugSwitches::set(self.debug_print_snapshot_dtm, self.debug_print_full_dtm);
    }

    pub fn new_local_commit_cache(&self) -> LocalDistribXactCache {
        LocalDistribXactCache::new(self.local_commit_cache_size)
    }

    /// Wraps a freshly received snapshot with its mapping cache.
    pub fn wrap_snapshot(&self, snapshot: DistributedSnapshot) -> DistributedSnapshotWithLocalMapping {
        match self.max_local_mapped_xids {
            Some(max) => DistributedSnapshotWithLocalMapping::new(snapshot, max),
            None => DistributedSnapshotWithLocalMapping::sized_to_snapshot(snapshot),
        }
    }
}
