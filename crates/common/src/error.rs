// Domain error kinds raised by reducers.

use thiserror::Error;

/// Stable, machine-readable error codes for [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationFailed,
    DuplicateId,
    NotFound,
    InvariantViolation,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::DuplicateId => "DUPLICATE_ID",
            Self::NotFound => "NOT_FOUND",
            Self::InvariantViolation => "INVARIANT_VIOLATION",
        }
    }

    pub const fn default_message(self) -> &'static str {
        match self {
            Self::ValidationFailed => "action input failed validation",
            Self::DuplicateId => "an entity with this id already exists",
            Self::NotFound => "target entity not found",
            Self::InvariantViolation => "operation would break a document invariant",
        }
    }
}

/// An error raised while reducing an action. Any error aborts the whole action;
/// the caller keeps its prior envelope.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("validation failed: {message}")]
    Validation { message: String },

    #[error("{entity}{} already exists", describe_id(.id))]
    DuplicateId { entity: String, id: String },

    #[error("{entity}{} not found", describe_id(.id))]
    NotFound { entity: String, id: String },

    #[error("invariant violated: {message}")]
    InvariantViolation { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn duplicate(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::DuplicateId { entity: entity.into(), id: id.into() }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound { entity: entity.into(), id: id.into() }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation { message: message.into() }
    }

    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::ValidationFailed,
            Self::DuplicateId { .. } => ErrorCode::DuplicateId,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::InvariantViolation { .. } => ErrorCode::InvariantViolation,
        }
    }
}

fn describe_id(id: &str) -> String {
    if id.is_empty() {
        String::new()
    } else {
        format!(" `{id}`")
    }
}
