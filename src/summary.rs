//! Human-readable self-time summary (`--format text`)

use crate::ingest::EnrichedRecord;
use std::fmt::Write;

/// Rows collected for the text table
#[derive(Debug, Default)]
pub struct TextSummary {
    records: Vec<EnrichedRecord>,
}

impl TextSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self, record: EnrichedRecord) {
        self.records.push(record);
    }

    /// Render the table, rows sorted by self-time (descending)
    pub fn render(&self) -> String {
        let mut out = String::new();

        if self.records.is_empty() {
            out.push_str("No self-time data collected.\n");
            return out;
        }

        let mut sorted: Vec<_> = self.records.iter().collect();
        sorted.sort_by(|a, b| b.record.time_taken.total_cmp(&a.record.time_taken));

        let _ = writeln!(
            out,
            "{:<50} {:<20} {:>12} {:>14}",
            "Event", "Category", "Thread", "Self Time"
        );
        let _ = writeln!(out, "{}", "─".repeat(99));

        for row in &sorted {
            let _ = writeln!(
                out,
                "{:<50} {:<20} {:>12} {:>13.6}s",
                truncate(&row.record.event_name, 50),
                truncate(&row.record.category, 20),
                row.record.thread.to_string(),
                row.record.time_taken
            );
        }

        let total: f64 = self.records.iter().map(|r| r.record.time_taken).sum();
        let _ = writeln!(out, "{}", "─".repeat(99));
        let _ = writeln!(
            out,
            "{:<50} {:<20} {:>12} {:>13.6}s",
            format!("total ({} rows)", self.records.len()),
            "",
            "",
            total
        );

        out
    }
}

/// Shorten to `width` characters, marking the cut with `…`
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(width - 1).collect();
        cut.push('…');
        cut
    }
}
