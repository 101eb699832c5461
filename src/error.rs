//! Error types for profile loading and self-time computation
//!
//! Every error here is fatal for the input it was raised on: the library
//! never returns partial results alongside an error.

use thiserror::Error;

/// Errors that can occur while loading a build profile or computing self-time
#[derive(Error, Debug)]
pub enum ProfileError {
    /// A trace event is missing a field it is required to carry
    ///
    /// Every event needs `tid`; Complete (`ph == "X"`) events additionally need
    /// `ts`, `dur` and `name`.
    #[error("Trace event #{index} is missing required field `{field}`")]
    RecordFormat { field: &'static str, index: usize },

    /// An event name accumulated self-time but no event ever gave it a category
    #[error("No category recorded for event name `{name}`")]
    CategoryLookup { name: String },

    /// The container document lacks a top-level object
    #[error("Build profile is missing top-level `{field}`")]
    MissingTopLevel { field: &'static str },

    /// `otherData.build_id` is absent
    #[error("Build profile is missing `otherData.build_id`")]
    MissingBuildId,

    /// The input looked gzip-compressed but could not be inflated
    #[error("Unable to decompress profile: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("Invalid profile JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid path pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type for profile operations
pub type Result<T> = std::result::Result<T, ProfileError>;
