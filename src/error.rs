// ⚠️ Error Taxonomy
// Client-input rejections, missing aggregate results and internal failures

use thiserror::Error;

// ============================================================================
// VALIDATION ERRORS (client input, never persisted)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("not all required fields are filled in (name, category, amount, date)")]
    MissingField,

    #[error("amount must be a number")]
    NotANumber,

    #[error("amount must be a positive number")]
    NonPositiveAmount,

    #[error("invalid date format, expected <day.month>")]
    BadDateFormat,

    #[error("invalid day or month value")]
    DayOutOfRange,
}

// ============================================================================
// TRACKER ERRORS (everything a tracker operation can surface)
// ============================================================================

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("malformed request body: {0}")]
    MalformedRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl TrackerError {
    /// Category string used in the `error` field of HTTP error bodies
    pub fn category(&self) -> &'static str {
        match self {
            TrackerError::Validation(_) | TrackerError::MalformedRequest(_) => "Bad Request",
            TrackerError::NotFound(_) => "Not Found",
            TrackerError::Internal(_) => "Internal Server Error",
        }
    }
}

pub type TrackerResult<T> = std::result::Result<T, TrackerError>;
