//! Error types for the lead router

use thiserror::Error;

/// Errors surfaced to callers
///
/// Evaluation and scoring never fail. Only structurally invalid inputs
/// are reported.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid value for {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Agent listed more than once: {0}")]
    DuplicateAgent(String),

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Invalid time of day: {0}")]
    InvalidTimeOfDay(String),
}

pub type Result<T> = std::result::Result<T, Error>;
