//! Unified error types for the domain layer

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., reserved identifier values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Invalid ID format
    #[error("Invalid ID format: {0}")]
    InvalidId(String),
}

impl DomainError {
    /// Creates a validation error for values the domain refuses to wrap.
    ///
    /// # Example
    /// ```ignore
    /// if raw == 0 {
    ///     return Err(DomainError::validation("session id 0 is reserved"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid ID error
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = DomainError::validation("session id 0 is reserved");
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Validation failed: session id 0 is reserved"
        );
    }

    #[test]
    fn test_invalid_id_error() {
        let err = DomainError::invalid_id("not a form id: \"xyz\"");
        assert!(matches!(err, DomainError::InvalidId(_)));
        assert!(err.to_string().starts_with("Invalid ID format"));
    }
}
