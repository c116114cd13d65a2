//! Analytics error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur in the analytics engine.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Underlying storage failure.
    #[error(transparent)]
    Database(#[from] database::DatabaseError),

    /// A required submission field was absent.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A stored day string could not be parsed back into a date.
    #[error("malformed stored date: {0}")]
    MalformedDate(#[from] chrono::ParseError),

    /// Too few recorded days to build or apply a prediction window.
    #[error("insufficient history for prediction")]
    InsufficientHistory,

    /// The requested date has no recorded daily average.
    #[error("no recorded data for {0}")]
    DateNotFound(NaiveDate),

    /// No fitted classifier exists for the user.
    #[error("model not trained for user: {0}")]
    ModelNotTrained(String),
}

/// Result type for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
