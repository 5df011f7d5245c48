use thiserror::Error;

/// Errors that can occur while building, numbering, or exporting orders.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PcaError {
    /// One or more validation rules failed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Builder encountered invalid or missing input.
    #[error("builder error: {0}")]
    Builder(String),

    /// Order number allocation or parsing error.
    #[error("numbering error: {0}")]
    Numbering(String),

    /// The sequence store failed and no fallback applied.
    #[error("sequence store error: {0}")]
    Store(#[from] StoreError),

    /// CSV could not be read back into records.
    #[error("CSV error: {0}")]
    Csv(String),
}

/// Errors reported by a [`SequenceStore`](super::SequenceStore) backend.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The store could not be reached (connection, lock, or I/O failure).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store was reached but rejected or failed the operation.
    #[error("store backend error: {0}")]
    Backend(String),

    /// The stored counter holds a value that cannot be a sequence number.
    #[error("corrupt counter for year {year}: {value}")]
    Corrupt { year: i32, value: i64 },
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "details[2].quantity").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Join a list of validation errors into a single [`PcaError::Validation`].
pub(crate) fn validation_failure(errors: &[ValidationError]) -> PcaError {
    let msg = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    PcaError::Validation(msg)
}
