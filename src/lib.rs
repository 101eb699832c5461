//! buildprof - Self-time statistics for Chrome trace-event build profiles
//!
//! This library reconstructs parent/child nesting of trace events from their
//! timestamps, computes per-thread self-time for every event name, and
//! flattens the result into rows enriched with run metadata.

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod csv_output;
pub mod error;
pub mod event_store;
pub mod ingest;
pub mod json_output;
pub mod profile;
pub mod self_time;
pub mod summary;
pub mod trace_event;
