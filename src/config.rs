//! Ingestion configuration
//!
//! Loaded from an optional `buildprof.toml`, then overridden by environment
//! variables, then by command-line flags.
//!
//! # Example buildprof.toml
//!
//! ```toml
//! profile_path_pattern = "prod/tensorflow/rel.*/profile.json.gz"
//! enforce_path_pattern = true
//! nesting = "arrival-order"
//! ```

use crate::error::{ProfileError, Result};
use crate::self_time::NestingStrategy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Overrides `profile_path_pattern`
pub const ENV_PATH_PATTERN: &str = "BUILDPROF_PATH_PATTERN";
/// Overrides `job_name`
pub const ENV_JOB_NAME: &str = "BUILDPROF_JOB_NAME";

/// Configuration for profile ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Paths matching this regex (from the start of the path) are build profiles
    pub profile_path_pattern: String,

    /// Skip files whose path does not match `profile_path_pattern`, and take
    /// the job name from the path
    pub enforce_path_pattern: bool,

    /// Job name to attach to every row, instead of the one taken from the path
    pub job_name: Option<String>,

    /// Nesting reconstruction used for self-time
    pub nesting: NestingStrategy,
}

fn default_profile_path_pattern() -> String {
    "prod/tensorflow/rel.*/profile.json.gz".to_string()
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            profile_path_pattern: default_profile_path_pattern(),
            enforce_path_pattern: false,
            job_name: None,
            nesting: NestingStrategy::default(),
        }
    }
}

impl IngestConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| ProfileError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ProfileError::Config(e.to_string()))
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(pattern) = lookup(ENV_PATH_PATTERN) {
            self.profile_path_pattern = pattern;
        }
        if let Some(job) = lookup(ENV_JOB_NAME) {
            self.job_name = Some(job);
        }
        self
    }

    /// Compile the path pattern, anchored at the start of the path
    pub fn path_regex(&self) -> Result<Regex> {
        Regex::new(&format!("^(?:{})", self.profile_path_pattern)).map_err(|source| {
            ProfileError::InvalidPattern {
                pattern: self.profile_path_pattern.clone(),
                source,
            }
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.path_regex()?;
        if matches!(&self.job_name, Some(job) if job.trim().is_empty()) {
            return Err(ProfileError::Config("job_name must not be empty".to_string()));
        }
        Ok(())
    }
}
