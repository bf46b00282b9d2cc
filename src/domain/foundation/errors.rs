//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction and input checks.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("Input '{field}' is {actual} characters, maximum is {max}")]
    OversizedInput {
        field: String,
        max: usize,
        actual: usize,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField {
            field: field.into(),
        }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an oversized input validation error.
    pub fn oversized_input(field: impl Into<String>, max: usize, actual: usize) -> Self {
        ValidationError::OversizedInput {
            field: field.into(),
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    EmptyField,
    OversizedInput,
    InvalidFormat,

    // Not found errors
    SessionNotFound,
    CheckpointNotFound,

    // State errors
    InvalidStateTransition,
    SessionCompleted,
    SessionFailed,
    StageNotComplete,

    // Concurrency errors
    ConcurrencyConflict,

    // External service errors
    ExternalServiceFailed,

    // Infrastructure errors
    PersistenceFailed,
    CorruptCheckpoint,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::OversizedInput => "OVERSIZED_INPUT",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::SessionNotFound => "SESSION_NOT_FOUND",
            ErrorCode::CheckpointNotFound => "CHECKPOINT_NOT_FOUND",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::SessionCompleted => "SESSION_COMPLETED",
            ErrorCode::SessionFailed => "SESSION_FAILED",
            ErrorCode::StageNotComplete => "STAGE_NOT_COMPLETE",
            ErrorCode::ConcurrencyConflict => "CONCURRENCY_CONFLICT",
            ErrorCode::ExternalServiceFailed => "EXTERNAL_SERVICE_FAILED",
            ErrorCode::PersistenceFailed => "PERSISTENCE_FAILED",
            ErrorCode::CorruptCheckpoint => "CORRUPT_CHECKPOINT",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a concurrency conflict error for a session.
    pub fn concurrency_conflict(session_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ConcurrencyConflict,
            "Another operation is in flight for this session",
        )
        .with_detail("session_id", session_id.to_string())
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Returns true if the operation is safe to retry as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::ConcurrencyConflict | ErrorCode::ExternalServiceFailed
        )
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let code = match err {
            ValidationError::EmptyField { .. } => ErrorCode::EmptyField,
            ValidationError::OversizedInput { .. } => ErrorCode::OversizedInput,
            ValidationError::OutOfRange { .. } => ErrorCode::ValidationFailed,
            ValidationError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
        };
        DomainError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("project_name");
        assert_eq!(format!("{}", err), "Field 'project_name' cannot be empty");
    }

    #[test]
    fn validation_error_oversized_input_displays_limits() {
        let err = ValidationError::oversized_input("response", 10_000, 50_000);
        assert_eq!(
            format!("{}", err),
            "Input 'response' is 50000 characters, maximum is 10000"
        );
    }

    #[test]
    fn validation_error_out_of_range_displays_correctly() {
        let err = ValidationError::out_of_range("score", 0.0, 10.0, 11.5);
        assert_eq!(
            format!("{}", err),
            "Field 'score' must be between 0 and 10, got 11.5"
        );
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::SessionNotFound, "Session not found");
        assert_eq!(format!("{}", err), "[SESSION_NOT_FOUND] Session not found");
    }

    #[test]
    fn domain_error_with_detail_adds_detail() {
        let err = DomainError::new(ErrorCode::ValidationFailed, "Validation failed")
            .with_detail("field", "business_objective");

        assert_eq!(
            err.details.get("field"),
            Some(&"business_objective".to_string())
        );
    }

    #[test]
    fn concurrency_conflict_is_retryable() {
        let err = DomainError::concurrency_conflict("abc");
        assert_eq!(err.code, ErrorCode::ConcurrencyConflict);
        assert!(err.is_retryable());
    }

    #[test]
    fn persistence_failure_is_not_retryable() {
        let err = DomainError::new(ErrorCode::PersistenceFailed, "write failed");
        assert!(!err.is_retryable());
    }

    #[test]
    fn validation_error_converts_to_domain_error() {
        let err: DomainError = ValidationError::oversized_input("response", 10, 20).into();
        assert_eq!(err.code, ErrorCode::OversizedInput);
    }
}
