//! JSON output for self-time rows
//!
//! Two shapes: a pretty-printed document with a summary (`--format json`) and
//! newline-delimited rows ready for a warehouse bulk insert (`--format ndjson`).

use crate::ingest::{EnrichedRecord, IngestOutcome};
use serde::{Deserialize, Serialize};

/// Summary of one CLI run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonSummary {
    /// Files that produced rows
    pub files_ingested: u64,
    /// Files skipped because of their path
    pub files_skipped: u64,
    /// Files with no Complete events
    pub files_empty: u64,
    /// Total rows emitted
    pub total_records: u64,
    /// Sum of TIME_TAKEN over all rows, in seconds
    pub total_time_seconds: f64,
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    pub records: Vec<EnrichedRecord>,
    pub summary: JsonSummary,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "buildprof-json-v1".to_string(),
            records: Vec::new(),
            summary: JsonSummary::default(),
        }
    }

    /// Fold one file's outcome into the output
    pub fn add_outcome(&mut self, outcome: IngestOutcome) {
        match outcome {
            IngestOutcome::Skipped { .. } => self.summary.files_skipped += 1,
            IngestOutcome::Empty => self.summary.files_empty += 1,
            IngestOutcome::Records(records) => {
                self.summary.files_ingested += 1;
                for record in records {
                    self.add_record(record);
                }
            }
        }
    }

    pub fn add_record(&mut self, record: EnrichedRecord) {
        self.summary.total_records += 1;
        self.summary.total_time_seconds += record.record.time_taken;
        self.records.push(record);
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// One compact JSON object per line, one line per row
    pub fn to_ndjson(&self) -> anyhow::Result<String> {
        let mut output = String::new();
        for record in &self.records {
            output.push_str(&serde_json::to_string(record)?);
            output.push('\n');
        }
        Ok(output)
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}
