//! Build profile container loading
//!
//! A build profile is a JSON document, usually gzip-compressed:
//!
//! ```json
//! { "otherData": { "build_id": "..." }, "traceEvents": [ ... ] }
//! ```
//!
//! Only the parts needed to reach the events and the build id are validated.

use crate::error::{ProfileError, Result};
use crate::trace_event::TraceEvent;
use flate2::read::GzDecoder;
use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A decoded build profile
#[derive(Debug, Clone)]
pub struct BuildProfile {
    pub build_id: String,
    pub trace_events: Vec<TraceEvent>,
}

impl BuildProfile {
    /// Load a profile from disk, gunzipping it when needed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Read profile");
        Self::from_bytes(&bytes)
    }

    /// Decode a profile from raw (optionally gzip-compressed) bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(&GZIP_MAGIC) {
            let mut json = Vec::new();
            GzDecoder::new(bytes)
                .read_to_end(&mut json)
                .map_err(ProfileError::Decompress)?;
            Self::from_json_slice(&json)
        } else {
            Self::from_json_slice(bytes)
        }
    }

    pub fn from_json_slice(json: &[u8]) -> Result<Self> {
        let document: Value = serde_json::from_slice(json)?;
        Self::from_value(document)
    }

    /// Validate the container and decode its events
    pub fn from_value(mut document: Value) -> Result<Self> {
        let other_data = document
            .get("otherData")
            .ok_or(ProfileError::MissingTopLevel { field: "otherData" })?;
        let build_id = match other_data.get("build_id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Null) | None => return Err(ProfileError::MissingBuildId),
            Some(other) => other.to_string(),
        };

        let events = document
            .get_mut("traceEvents")
            .map(Value::take)
            .ok_or(ProfileError::MissingTopLevel {
                field: "traceEvents",
            })?;
        let trace_events: Vec<TraceEvent> = serde_json::from_value(events)?;

        Ok(Self {
            build_id,
            trace_events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const PROFILE: &str = r#"{
        "otherData": {"build_id": "b-123", "output_base": "/tmp"},
        "traceEvents": [
            {"name": "thread_name", "ph": "M", "pid": 1, "tid": 0, "args": {"name": "main"}},
            {"name": "Compiling", "cat": "action", "ph": "X", "ts": 10, "dur": 20, "pid": 1, "tid": 0}
        ]
    }"#;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_plain_json() {
        let profile = BuildProfile::from_bytes(PROFILE.as_bytes()).unwrap();
        assert_eq!(profile.build_id, "b-123");
        assert_eq!(profile.trace_events.len(), 2);
    }

    #[test]
    fn test_gzip_matches_plain() {
        let plain = BuildProfile::from_bytes(PROFILE.as_bytes()).unwrap();
        let zipped = BuildProfile::from_bytes(&gzip(PROFILE.as_bytes())).unwrap();
        assert_eq!(plain.build_id, zipped.build_id);
        assert_eq!(plain.trace_events, zipped.trace_events);
    }

    #[test]
    fn test_numeric_build_id() {
        let profile = BuildProfile::from_bytes(
            br#"{"otherData": {"build_id": 42}, "traceEvents": []}"#,
        )
        .unwrap();
        assert_eq!(profile.build_id, "42");
    }

    #[test]
    fn test_missing_trace_events() {
        let err = BuildProfile::from_bytes(br#"{"otherData": {"build_id": "x"}}"#).unwrap_err();
        assert!(matches!(
            err,
            ProfileError::MissingTopLevel {
                field: "traceEvents"
            }
        ));
    }

    #[test]
    fn test_missing_other_data() {
        let err = BuildProfile::from_bytes(br#"{"traceEvents": []}"#).unwrap_err();
        assert!(matches!(
            err,
            ProfileError::MissingTopLevel { field: "otherData" }
        ));
    }

    #[test]
    fn test_missing_build_id() {
        let err =
            BuildProfile::from_bytes(br#"{"otherData": {}, "traceEvents": []}"#).unwrap_err();
        assert!(matches!(err, ProfileError::MissingBuildId));
    }

    #[test]
    fn test_invalid_json() {
        let err = BuildProfile::from_bytes(b"{not json").unwrap_err();
        assert!(matches!(err, ProfileError::Json(_)));
    }

    #[test]
    fn test_truncated_gzip() {
        let zipped = gzip(PROFILE.as_bytes());
        let err = BuildProfile::from_bytes(&zipped[..zipped.len() / 2]).unwrap_err();
        assert!(matches!(err, ProfileError::Decompress(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json.gz");
        std::fs::write(&path, gzip(PROFILE.as_bytes())).unwrap();

        let profile = BuildProfile::from_file(&path).unwrap();
        assert_eq!(profile.trace_events[1].name.as_deref(), Some("Compiling"));
    }
}
