//! Error types for the form builder

use thiserror::Error;

use crate::domain::value_objects::{FieldId, FormId};
use crate::ports::outbound::RepositoryError;

/// Form builder error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormsError {
    /// A mutation would break a schema invariant
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Field id not present in the form
    #[error("field not found: {0}")]
    FieldNotFound(FieldId),

    /// Form id not present in storage
    #[error("form not found: {0}")]
    FormNotFound(FormId),

    /// Grid row does not exist
    #[error("row not found: {0}")]
    RowNotFound(usize),

    /// Grid cell does not exist in its row
    #[error("cell ({row}, {col}) does not exist")]
    CellNotFound { row: usize, col: usize },

    /// Grid cell already holds a field
    #[error("cell ({row}, {col}) is already occupied")]
    CellOccupied { row: usize, col: usize },

    /// Positional index outside the sequence
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// A submission is already pending for this session
    #[error("a submission is already in progress")]
    SubmissionInProgress,

    /// The session has already been submitted successfully
    #[error("form has already been submitted")]
    AlreadySubmitted,

    /// The submission collaborator failed
    #[error("submission failed: {0}")]
    SubmissionFailed(String),

    /// Uniqueness violation on save
    #[error("a form with this title already exists")]
    PersistenceConflict(String),

    /// Actor may not touch this form
    #[error("not authorized to modify this form")]
    Unauthorized,

    /// Persistence collaborator failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration could not be loaded
    #[error("config error: {0}")]
    Config(String),
}

impl FormsError {
    /// Whether the caller can retry the same operation unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SubmissionFailed(_) | Self::Storage(_))
    }
}

impl From<RepositoryError> for FormsError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateTitle(title) => Self::PersistenceConflict(title),
            RepositoryError::NotFound(id) => Self::FormNotFound(id),
            RepositoryError::Storage(e) => Self::Storage(e),
            RepositoryError::Serialization(e) => Self::Storage(e),
        }
    }
}

/// Result type for the form builder
pub type Result<T> = std::result::Result<T, FormsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_is_user_facing() {
        let err = FormsError::from(RepositoryError::DuplicateTitle("Contact".into()));
        assert_eq!(err.to_string(), "a form with this title already exists");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_submission_failure_is_retryable() {
        assert!(FormsError::SubmissionFailed("timeout".into()).is_retryable());
    }
}
