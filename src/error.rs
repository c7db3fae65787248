//! Error types for blockname.

use thiserror::Error;

/// Error type for blockname operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed `HH:MM` clock string in a schedule
    #[error("syntax error in a time expression: [{0}]")]
    InvalidTimeFormat(String),

    /// Audit log format other than `tsv` or `ltsv`
    #[error("unexpected log format: [{0}]")]
    UnknownLogFormat(String),

    /// Index construction failed
    #[error("index error: {0}")]
    Index(String),

    /// Audit record written without an open log handle
    #[error("log file not initialized")]
    LogNotInitialized,
}

/// Result type alias for blockname operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for a single rule line.
///
/// These never abort compilation: the line is logged and skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleSyntaxError {
    /// More than one `@` on the line
    #[error("unexpected @ character")]
    UnexpectedAt,

    /// Glob pattern that does not parse
    #[error("invalid glob pattern: {0}")]
    InvalidPattern(String),

    /// Rule too short for its kind, or empty after stripping
    #[error("rule is empty or too short")]
    TooShort,
}
