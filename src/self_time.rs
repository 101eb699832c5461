//! Self-time computation for nested trace events
//!
//! Trace events carry no explicit parent links, so nesting has to be inferred
//! from timestamps. Self-time is an event's duration minus the durations of
//! the events nested inside it.
//!
//! Two strategies are available:
//!
//! - [`NestingStrategy::ArrivalOrder`] (default): children are emitted before
//!   their parents, so each Complete event looks back over the events already
//!   seen on its thread and subtracts every shorter one that starts strictly
//!   inside its interval. Each event is subtracted at most once. This is a
//!   heuristic: it can under- or over-subtract when siblings share timestamps
//!   or arrival order does not reflect nesting. Its output is the historical
//!   reference and is preserved exactly.
//! - [`NestingStrategy::StartTimeStack`]: events are sorted by start time and
//!   nested with an explicit stack of open intervals. Independent of arrival
//!   order, but yields different totals than the historical heuristic.
//!
//! Self-time is signed and never clamped; over-subtraction shows up as a
//! negative total rather than being hidden.

use crate::error::{ProfileError, Result};
use crate::event_store::{ThreadTimeline, TimelineEvent};
use crate::trace_event::{EventKey, Phase, ThreadId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// How parent/child nesting is reconstructed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NestingStrategy {
    /// Look back over earlier arrivals (historical behaviour)
    #[default]
    ArrivalOrder,
    /// Sort by start time and nest with a stack of open intervals
    StartTimeStack,
}

/// Accumulated self-time per event name for one thread, in microseconds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelfTimeTotals {
    names: Vec<String>,
    totals: HashMap<String, i64>,
}

impl SelfTimeTotals {
    pub fn add(&mut self, name: &str, self_time: i64) {
        match self.totals.get_mut(name) {
            Some(total) => *total = total.saturating_add(self_time),
            None => {
                self.names.push(name.to_string());
                self.totals.insert(name.to_string(), self_time);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.totals.get(name).copied()
    }

    /// Names in the order they first accumulated time
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.names
            .iter()
            .map(move |name| (name.as_str(), self.totals[name]))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Self-time totals for one thread
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadSelfTime {
    pub thread: ThreadId,
    pub totals: SelfTimeTotals,
}

/// Thread id → event name → self-time
///
/// Only threads with at least one Complete event appear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelfTimeTable {
    threads: Vec<ThreadSelfTime>,
}

impl SelfTimeTable {
    pub fn get(&self, thread: &ThreadId) -> Option<&SelfTimeTotals> {
        self.threads
            .iter()
            .find(|t| &t.thread == thread)
            .map(|t| &t.totals)
    }

    pub fn threads(&self) -> &[ThreadSelfTime] {
        &self.threads
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}

/// A validated Complete event
#[derive(Debug, Clone)]
struct Span<'a> {
    name: &'a str,
    ts: i64,
    dur: i64,
    key: EventKey,
}

impl Span<'_> {
    fn end(&self) -> i64 {
        self.ts.saturating_add(self.dur)
    }
}

/// Extract the fields of a Complete event, or `None` for any other phase
fn complete_span(entry: &TimelineEvent) -> Result<Option<Span<'_>>> {
    let event = &entry.event;
    if event.phase() != Phase::Complete {
        return Ok(None);
    }

    let missing = |field| ProfileError::RecordFormat {
        field,
        index: entry.index,
    };
    let ts = event.ts.ok_or_else(|| missing("ts"))?;
    let dur = event.dur.ok_or_else(|| missing("dur"))?;
    let name = event.name.as_deref().ok_or_else(|| missing("name"))?;

    Ok(Some(Span {
        name,
        ts,
        dur,
        key: event.key()?,
    }))
}

/// Fold state for the arrival-order walk over one thread
#[derive(Default)]
struct ArrivalAccumulator<'a> {
    processed: Vec<Span<'a>>,
    subtracted: HashSet<EventKey>,
    totals: SelfTimeTotals,
    running_total: i64,
    subtractions: usize,
}

impl<'a> ArrivalAccumulator<'a> {
    fn fold(mut self, span: Span<'a>) -> Self {
        let mut self_time = span.dur;

        // Nothing to subtract until some self-time has been recorded
        if self.running_total > 0 {
            let (low, high) = (span.ts, span.end());
            for prior in self.processed.iter().rev() {
                if prior.ts > low
                    && prior.ts < high
                    && prior.dur < span.dur
                    && !self.subtracted.contains(&prior.key)
                {
                    self.subtracted.insert(prior.key.clone());
                    self_time = self_time.saturating_sub(prior.dur);
                    self.subtractions += 1;
                }
            }
        }

        self.totals.add(span.name, self_time);
        self.running_total = self.running_total.saturating_add(self_time);
        self.processed.push(span);
        self
    }
}

/// Computes per-thread, per-name self-time
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfTimeCalculator {
    strategy: NestingStrategy,
}

impl SelfTimeCalculator {
    pub fn new(strategy: NestingStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> NestingStrategy {
        self.strategy
    }

    /// Compute self-time for every thread
    ///
    /// Any malformed Complete event aborts the whole computation.
    pub fn compute(&self, timelines: &[ThreadTimeline]) -> Result<SelfTimeTable> {
        let mut table = SelfTimeTable::default();

        for timeline in timelines {
            let spans = timeline
                .events
                .iter()
                .filter_map(|entry| complete_span(entry).transpose())
                .collect::<Result<Vec<_>>>()?;

            if spans.is_empty() {
                continue;
            }

            let span_count = spans.len();
            let totals = match self.strategy {
                NestingStrategy::ArrivalOrder => {
                    let acc = spans
                        .into_iter()
                        .fold(ArrivalAccumulator::default(), ArrivalAccumulator::fold);
                    tracing::debug!(
                        thread = %timeline.thread,
                        complete_events = span_count,
                        subtractions = acc.subtractions,
                        "Computed arrival-order self-time"
                    );
                    acc.totals
                }
                NestingStrategy::StartTimeStack => {
                    tracing::debug!(
                        thread = %timeline.thread,
                        complete_events = span_count,
                        "Computing stack-nested self-time"
                    );
                    stack_self_time(spans)
                }
            };

            table.threads.push(ThreadSelfTime {
                thread: timeline.thread.clone(),
                totals,
            });
        }

        Ok(table)
    }
}

/// Nest spans by start time with an explicit stack of open intervals
///
/// Ties on start time put the longer span first so it becomes the parent.
/// A child that runs past its parent's end only removes the overlapping part.
fn stack_self_time(mut spans: Vec<Span<'_>>) -> SelfTimeTotals {
    spans.sort_by(|a, b| a.ts.cmp(&b.ts).then(b.dur.cmp(&a.dur)));

    let mut self_times: Vec<i64> = spans.iter().map(|s| s.dur).collect();
    let mut open: Vec<usize> = Vec::new();

    for (i, span) in spans.iter().enumerate() {
        while let Some(&top) = open.last() {
            if spans[top].end() <= span.ts {
                open.pop();
            } else {
                break;
            }
        }

        if let Some(&parent) = open.last() {
            let overlap = span.end().min(spans[parent].end()).saturating_sub(span.ts);
            self_times[parent] = self_times[parent].saturating_sub(overlap);
        }
        open.push(i);
    }

    let mut totals = SelfTimeTotals::default();
    for (span, self_time) in spans.iter().zip(self_times) {
        totals.add(span.name, self_time);
    }
    totals
}
