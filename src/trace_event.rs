//! Raw trace-event records
//!
//! Build profiles use the Chrome trace-event format. Only the fields the
//! self-time engine consumes are typed; everything else on a record (`pid`,
//! `args`, ...) is retained verbatim so the record keeps a stable structural
//! identity.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Phase value marking a Complete event (one finished span with a duration)
pub const COMPLETE_PHASE: &str = "X";

/// Event phase as far as self-time accounting is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// `ph == "X"`: carries `ts` and `dur`
    Complete,
    /// Any other phase, or no phase at all
    Other,
}

/// Thread identifier, either numeric or textual as found in the input
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThreadId {
    Int(i64),
    Name(String),
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadId::Int(id) => write!(f, "{}", id),
            ThreadId::Name(name) => f.write_str(name),
        }
    }
}

impl From<i64> for ThreadId {
    fn from(id: i64) -> Self {
        ThreadId::Int(id)
    }
}

impl From<i32> for ThreadId {
    fn from(id: i32) -> Self {
        ThreadId::Int(i64::from(id))
    }
}

impl From<&str> for ThreadId {
    fn from(name: &str) -> Self {
        ThreadId::Name(name.to_string())
    }
}

/// A single trace event record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<String>,
    /// Start timestamp in microseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<i64>,
    /// Duration in microseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dur: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tid: Option<ThreadId>,
    /// Remaining fields, kept for identity
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TraceEvent {
    /// Build a Complete event with every field the engine needs
    pub fn complete(
        name: &str,
        cat: &str,
        ts: i64,
        dur: i64,
        tid: impl Into<ThreadId>,
    ) -> Self {
        Self {
            name: Some(name.to_string()),
            cat: Some(cat.to_string()),
            ph: Some(COMPLETE_PHASE.to_string()),
            ts: Some(ts),
            dur: Some(dur),
            tid: Some(tid.into()),
            extra: BTreeMap::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        match self.ph.as_deref() {
            Some(COMPLETE_PHASE) => Phase::Complete,
            _ => Phase::Other,
        }
    }

    /// Stable structural identity of this record
    ///
    /// Two records with identical content share a key, wherever they sit in
    /// memory or in the input.
    pub fn key(&self) -> serde_json::Result<EventKey> {
        serde_json::to_string(self).map(EventKey)
    }
}

/// Canonical serialization of a [`TraceEvent`], used as its identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey(String);

impl EventKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
