//! Flattening of per-thread self-time into output rows

use crate::error::{ProfileError, Result};
use crate::event_store::CategoryIndex;
use crate::self_time::SelfTimeTable;
use crate::trace_event::ThreadId;
use serde::{Deserialize, Serialize};

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// One row per (thread, event name)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct OutputRecord {
    pub event_name: String,
    pub category: String,
    pub thread: ThreadId,
    /// Self-time in seconds
    pub time_taken: f64,
}

/// Flatten a self-time table into output records
///
/// Threads are emitted in first-seen order and names in first-accumulated
/// order. Fails if a name never had a category recorded.
pub fn flatten(table: &SelfTimeTable, categories: &CategoryIndex) -> Result<Vec<OutputRecord>> {
    let mut records = Vec::new();

    for thread in table.threads() {
        for (name, self_time_us) in thread.totals.iter() {
            let category = categories
                .get(name)
                .ok_or_else(|| ProfileError::CategoryLookup {
                    name: name.to_string(),
                })?;

            records.push(OutputRecord {
                event_name: name.to_string(),
                category: category.to_string(),
                thread: thread.thread.clone(),
                time_taken: self_time_us as f64 / MICROS_PER_SECOND,
            });
        }
    }

    tracing::debug!(records = records.len(), "Flattened self-time table");
    Ok(records)
}
