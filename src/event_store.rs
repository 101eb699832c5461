//! Per-thread grouping of raw trace events
//!
//! Splits the flat `traceEvents` list into one timeline per thread, keeping
//! arrival order, and builds the name → category lookup used when rows are
//! emitted.

use crate::error::{ProfileError, Result};
use crate::trace_event::{ThreadId, TraceEvent};
use std::collections::HashMap;

/// An event together with its position in the input `traceEvents` list
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEvent {
    pub index: usize,
    pub event: TraceEvent,
}

/// All events sharing one thread id, in arrival order (not sorted by `ts`)
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadTimeline {
    pub thread: ThreadId,
    pub events: Vec<TimelineEvent>,
}

impl ThreadTimeline {
    pub fn new(thread: ThreadId) -> Self {
        Self {
            thread,
            events: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Event name → category, last write wins
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryIndex {
    categories: HashMap<String, String>,
}

impl CategoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a category for a name, overwriting any earlier value
    pub fn record(&mut self, name: &str, category: &str) {
        self.categories
            .insert(name.to_string(), category.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.categories.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Thread timelines plus the category lookup for one input file
#[derive(Debug, Default)]
pub struct EventStore {
    timelines: Vec<ThreadTimeline>,
    categories: CategoryIndex,
}

impl EventStore {
    /// Group events by thread and index their categories
    ///
    /// Fails on the first event that has no `tid`. Nothing else is validated
    /// here; Complete-event fields are checked during self-time computation.
    pub fn build<I>(events: I) -> Result<Self>
    where
        I: IntoIterator<Item = TraceEvent>,
    {
        let mut timelines: Vec<ThreadTimeline> = Vec::new();
        let mut slots: HashMap<ThreadId, usize> = HashMap::new();
        let mut categories = CategoryIndex::new();

        for (index, event) in events.into_iter().enumerate() {
            if let (Some(name), Some(cat)) = (&event.name, &event.cat) {
                categories.record(name, cat);
            }

            let thread = event.tid.clone().ok_or(ProfileError::RecordFormat {
                field: "tid",
                index,
            })?;

            let slot = *slots.entry(thread.clone()).or_insert_with(|| {
                timelines.push(ThreadTimeline::new(thread));
                timelines.len() - 1
            });
            timelines[slot].events.push(TimelineEvent { index, event });
        }

        tracing::debug!(
            threads = timelines.len(),
            categories = categories.len(),
            "Built event store"
        );

        Ok(Self {
            timelines,
            categories,
        })
    }

    /// Timelines in first-seen thread order
    pub fn timelines(&self) -> &[ThreadTimeline] {
        &self.timelines
    }

    pub fn categories(&self) -> &CategoryIndex {
        &self.categories
    }

    pub fn into_parts(self) -> (Vec<ThreadTimeline>, CategoryIndex) {
        (self.timelines, self.categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_without_cat(name: &str, tid: i64) -> TraceEvent {
        TraceEvent {
            name: Some(name.to_string()),
            tid: Some(ThreadId::Int(tid)),
            ..Default::default()
        }
    }

    #[test]
    fn test_groups_by_thread_in_arrival_order() {
        let store = EventStore::build(vec![
            TraceEvent::complete("a", "x", 50, 1, 1),
            TraceEvent::complete("b", "x", 0, 1, 2),
            TraceEvent::complete("c", "x", 10, 1, 1),
        ])
        .unwrap();

        let timelines = store.timelines();
        assert_eq!(timelines.len(), 2);
        assert_eq!(timelines[0].thread, ThreadId::Int(1));
        assert_eq!(timelines[1].thread, ThreadId::Int(2));

        let names: Vec<_> = timelines[0]
            .events
            .iter()
            .map(|e| e.event.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(timelines[0].events[1].index, 2);
    }

    #[test]
    fn test_missing_tid_fails() {
        let mut orphan = TraceEvent::complete("a", "x", 0, 1, 1);
        orphan.tid = None;

        let err = EventStore::build(vec![TraceEvent::complete("b", "x", 0, 1, 1), orphan])
            .unwrap_err();
        assert!(matches!(
            err,
            ProfileError::RecordFormat {
                field: "tid",
                index: 1
            }
        ));
    }

    #[test]
    fn test_missing_tid_fails_for_non_complete_events() {
        let metadata = TraceEvent {
            name: Some("process_name".to_string()),
            ph: Some("M".to_string()),
            ..Default::default()
        };
        assert!(EventStore::build(vec![metadata]).is_err());
    }

    #[test]
    fn test_category_last_write_wins() {
        let store = EventStore::build(vec![
            TraceEvent::complete("a", "first", 0, 1, 1),
            TraceEvent::complete("a", "second", 5, 1, 2),
        ])
        .unwrap();
        assert_eq!(store.categories().get("a"), Some("second"));
    }

    #[test]
    fn test_category_recorded_for_any_phase() {
        let mut counter = TraceEvent::complete("mem", "counter", 0, 0, 1);
        counter.ph = Some("C".to_string());
        counter.dur = None;

        let store = EventStore::build(vec![counter]).unwrap();
        assert_eq!(store.categories().get("mem"), Some("counter"));
    }

    #[test]
    fn test_event_without_cat_keeps_previous_category() {
        let store = EventStore::build(vec![
            TraceEvent::complete("a", "kept", 0, 1, 1),
            event_without_cat("a", 1),
        ])
        .unwrap();
        assert_eq!(store.categories().get("a"), Some("kept"));
        assert_eq!(store.timelines()[0].len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let store = EventStore::build(Vec::new()).unwrap();
        assert!(store.timelines().is_empty());
        assert!(store.categories().is_empty());
    }
}
