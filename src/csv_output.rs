//! CSV output for self-time rows
//!
//! Column order matches the warehouse table.

use crate::ingest::EnrichedRecord;

const HEADER: &str = "EVENT_NAME,CATEGORY,THREAD,TIME_TAKEN,BUILD_ID,JOB_NAME,DATE_CREATED";

/// CSV output formatter
#[derive(Debug, Default)]
pub struct CsvOutput {
    records: Vec<EnrichedRecord>,
}

impl CsvOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self, record: EnrichedRecord) {
        self.records.push(record);
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn format_record(record: &EnrichedRecord) -> String {
        [
            Self::escape_field(&record.record.event_name),
            Self::escape_field(&record.record.category),
            Self::escape_field(&record.record.thread.to_string()),
            record.record.time_taken.to_string(),
            Self::escape_field(&record.build_id),
            Self::escape_field(&record.job_name),
            record.date_created.format("%Y-%m-%d").to_string(),
        ]
        .join(",")
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str(HEADER);
        output.push('\n');

        for record in &self.records {
            output.push_str(&Self::format_record(record));
            output.push('\n');
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::OutputRecord;
    use crate::trace_event::ThreadId;
    use chrono::NaiveDate;

    fn row(name: &str, category: &str, thread: ThreadId) -> EnrichedRecord {
        EnrichedRecord {
            record: OutputRecord {
                event_name: name.to_string(),
                category: category.to_string(),
                thread,
                time_taken: 0.5,
            },
            build_id: "b1".to_string(),
            job_name: "prod/job".to_string(),
            date_created: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
        }
    }

    #[test]
    fn test_csv_header_only() {
        let output = CsvOutput::new();
        assert_eq!(output.to_csv(), format!("{}\n", HEADER));
    }

    #[test]
    fn test_csv_row() {
        let mut output = CsvOutput::new();
        output.add_record(row("Compiling", "action", ThreadId::Int(3)));

        let csv = output.to_csv();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "Compiling,action,3,0.5,b1,prod/job,2024-05-06");
    }

    #[test]
    fn test_csv_escapes_commas_and_quotes() {
        let mut output = CsvOutput::new();
        output.add_record(row(
            "Compiling a.cc, b.cc",
            "say \"hi\"",
            ThreadId::from("main"),
        ));

        let csv = output.to_csv();
        assert!(csv.contains("\"Compiling a.cc, b.cc\""));
        assert!(csv.contains("\"say \"\"hi\"\"\""));
        assert!(csv.contains(",main,"));
    }

    #[test]
    fn test_escape_field_plain() {
        assert_eq!(CsvOutput::escape_field("plain"), "plain");
        assert_eq!(CsvOutput::escape_field("a\nb"), "\"a\nb\"");
    }
}
