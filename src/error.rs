//! Error kinds for the three failure classes named in the design notes:
//! configuration errors, domain errors and infeasibility.

use thiserror::Error;

/// A fatal failure while reading or normalizing a parameter/cell document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown value {value:?} for key {key}")]
    UnknownEnumValue { key: String, value: String },

    #[error("missing required key {0}")]
    MissingKey(String),

    #[error("key {key} expected a {expected} but found {found}")]
    WrongType { key: String, expected: &'static str, found: String },

    #[error("search range for {axis} is invalid: min {min} > max {max}")]
    InvalidRange { axis: String, min: i64, max: i64 },

    #[error("failed to read {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },

    #[error("failed to parse {path} as JSON: {source}")]
    Json { path: String, #[source] source: serde_json::Error },
}

/// A value that was supplied for the wrong cell kind. Never fatal: the
/// value is ignored and the warning is carried into the report.
#[derive(Debug, Clone, Error)]
#[error("field {field} is meaningful only for {expected_kind}, but cell kind is {actual_kind}; ignored")]
pub struct DomainWarning {
    pub field: String,
    pub expected_kind: String,
    pub actual_kind: String,
}

/// No admissible candidate satisfied every active constraint.
#[derive(Debug, Error)]
#[error("no candidate satisfies the given constraints; most frequently violated: {most_violated}")]
pub struct InfeasibleError {
    pub most_violated: String,
    pub candidates_evaluated: usize,
}
