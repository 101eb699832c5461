//! End-to-end ingestion of one build profile
//!
//! Decides whether a path is a build profile, derives the job name, runs the
//! self-time pipeline (`EventStore` → `SelfTimeCalculator` → `flatten`) and
//! enriches every row with run metadata.

use crate::aggregator::{flatten, OutputRecord};
use crate::config::IngestConfig;
use crate::error::{ProfileError, Result};
use crate::event_store::EventStore;
use crate::profile::BuildProfile;
use crate::self_time::{NestingStrategy, SelfTimeCalculator};
use crate::trace_event::TraceEvent;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The job name is everything before the first `/<digit>` path segment
const JOB_BOUNDARY_PATTERN: &str = "/[0-9].*";

/// Run the self-time pipeline over a list of trace events
///
/// An input without Complete events yields an empty vector.
pub fn compute_records(
    events: Vec<TraceEvent>,
    strategy: NestingStrategy,
) -> Result<Vec<OutputRecord>> {
    let store = EventStore::build(events)?;
    let table = SelfTimeCalculator::new(strategy).compute(store.timelines())?;
    flatten(&table, store.categories())
}

/// Run-level metadata attached to every row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMetadata {
    pub build_id: String,
    pub job_name: String,
    pub date_created: NaiveDate,
}

/// An output row enriched with run metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub record: OutputRecord,
    #[serde(rename = "BUILD_ID")]
    pub build_id: String,
    #[serde(rename = "JOB_NAME")]
    pub job_name: String,
    #[serde(rename = "DATE_CREATED")]
    pub date_created: NaiveDate,
}

impl EnrichedRecord {
    pub fn new(record: OutputRecord, metadata: &RunMetadata) -> Self {
        Self {
            record,
            build_id: metadata.build_id.clone(),
            job_name: metadata.job_name.clone(),
            date_created: metadata.date_created,
        }
    }
}

/// Result of ingesting one file
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// The path is not something to ingest
    Skipped { reason: String },
    /// The profile had no Complete events
    Empty,
    Records(Vec<EnrichedRecord>),
}

impl IngestOutcome {
    pub fn records(&self) -> &[EnrichedRecord] {
        match self {
            IngestOutcome::Records(records) => records,
            IngestOutcome::Skipped { .. } | IngestOutcome::Empty => &[],
        }
    }
}

/// Ingests build profiles according to an [`IngestConfig`]
#[derive(Debug, Clone)]
pub struct Ingester {
    config: IngestConfig,
    path_regex: Regex,
    job_regex: Regex,
    date_created: NaiveDate,
}

impl Ingester {
    pub fn new(config: IngestConfig, date_created: NaiveDate) -> Result<Self> {
        config.validate()?;
        let path_regex = config.path_regex()?;
        let job_regex = Regex::new(JOB_BOUNDARY_PATTERN).map_err(|source| {
            ProfileError::InvalidPattern {
                pattern: JOB_BOUNDARY_PATTERN.to_string(),
                source,
            }
        })?;

        Ok(Self {
            config,
            path_regex,
            job_regex,
            date_created,
        })
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Whether an object path names a build profile
    pub fn is_build_profile(&self, object_path: &str) -> bool {
        self.path_regex.is_match(object_path)
    }

    /// Job name taken from an object path, if it has a numeric segment
    pub fn job_name_from_path(&self, object_path: &str) -> Option<String> {
        self.job_regex
            .find(object_path)
            .map(|m| object_path[..m.start()].to_string())
    }

    /// Resolve the job name for a path, or the reason the path is skipped
    fn resolve_job_name(&self, object_path: &str) -> std::result::Result<String, String> {
        if self.config.enforce_path_pattern && !self.is_build_profile(object_path) {
            return Err(format!(
                "{} is not a build profile according to its path",
                object_path
            ));
        }

        if let Some(job) = &self.config.job_name {
            return Ok(job.clone());
        }

        match self.job_name_from_path(object_path) {
            Some(job) => Ok(job),
            None if self.config.enforce_path_pattern => {
                Err(format!("{} has no valid job name", object_path))
            }
            None => Ok(object_path.to_string()),
        }
    }

    /// Load and ingest a profile file
    pub fn ingest_file<P: AsRef<Path>>(&self, path: P) -> Result<IngestOutcome> {
        let path = path.as_ref();
        let object_path = path.to_string_lossy();
        let _span = tracing::info_span!("ingest", path = %object_path).entered();

        let job_name = match self.resolve_job_name(&object_path) {
            Ok(job) => job,
            Err(reason) => {
                tracing::info!(%reason, "Skipping file");
                return Ok(IngestOutcome::Skipped { reason });
            }
        };

        tracing::info!(job = %job_name, "Build profile found");
        let profile = BuildProfile::from_file(path)?;
        self.ingest_profile(profile, job_name)
    }

    /// Ingest an already-decoded profile
    pub fn ingest_profile(&self, profile: BuildProfile, job_name: String) -> Result<IngestOutcome> {
        let metadata = RunMetadata {
            build_id: profile.build_id,
            job_name,
            date_created: self.date_created,
        };

        let event_count = profile.trace_events.len();
        let records = compute_records(profile.trace_events, self.config.nesting)?;

        if records.is_empty() {
            tracing::warn!(
                build_id = %metadata.build_id,
                events = event_count,
                "Profile had no completed action events"
            );
            return Ok(IngestOutcome::Empty);
        }

        tracing::info!(
            build_id = %metadata.build_id,
            events = event_count,
            records = records.len(),
            "Computed self-time records"
        );

        Ok(IngestOutcome::Records(
            records
                .into_iter()
                .map(|record| EnrichedRecord::new(record, &metadata))
                .collect(),
        ))
    }
}
