use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

use crate::models::UserId;
use crate::services::StoreError;

/// Errors returned by the swipe and discovery operations
///
/// Every variant is scoped to a single request. Duplicate match creation is
/// absorbed by the match store and never appears here.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed input, one entry per violated field
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("User not found: {0}")]
    NotFound(UserId),

    /// An adapter call failed; retrying the same operation is safe
    #[error("{operation} failed: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

impl EngineError {
    /// Wrap an adapter error, naming the adapter call that raised it
    pub fn storage(operation: &'static str, source: StoreError) -> Self {
        match source {
            StoreError::UnknownUser(id) => EngineError::NotFound(id),
            source => EngineError::Storage { operation, source },
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }
}

/// A single field failure with a human readable message
pub(crate) fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_user_becomes_not_found() {
        let err = EngineError::storage("record_if_absent", StoreError::UnknownUser(9));
        assert!(matches!(err, EngineError::NotFound(9)));
    }

    #[test]
    fn test_storage_error_names_operation() {
        let err = EngineError::storage(
            "decisions_for",
            StoreError::Unavailable("connection reset".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "decisions_for failed: Store unavailable: connection reset"
        );
    }
}
