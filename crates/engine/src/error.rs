use docket_common::error::DomainError;
use docket_common::types::Scope;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the engine outside of pure reduction: log sequencing,
/// envelope decoding, registry lookups, and journal storage.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{scope} operation index {actual} does not follow head (expected {expected})")]
    OutOfOrder { scope: Scope, expected: u64, actual: u64 },

    #[error("unknown document type `{0}`")]
    UnknownDocumentType(String),

    #[error("document type mismatch: expected `{expected}`, found `{found}`")]
    DocumentTypeMismatch { expected: String, found: String },

    #[error("document {0} not found")]
    DocumentNotFound(Uuid),

    #[error("document {0} already exists")]
    DocumentExists(Uuid),

    #[error("failed to decode document envelope: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl EngineError {
    /// The domain error carried by this error, if reduction failed.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(error) => Some(error),
            _ => None,
        }
    }

    /// Stable code for callers that surface error kinds.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Domain(error) => error.code().as_str(),
            Self::OutOfOrder { .. } => "OUT_OF_ORDER",
            Self::UnknownDocumentType(_) | Self::DocumentTypeMismatch { .. } => {
                "UNKNOWN_DOCUMENT_TYPE"
            }
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::DocumentExists(_) => "DOCUMENT_EXISTS",
            Self::Decode(_) => "DECODE_FAILED",
            Self::Storage(_) => "STORAGE_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use docket_common::error::DomainError;
    use docket_common::types::Scope;

    use super::EngineError;

    #[test]
    fn domain_errors_keep_their_code() {
        let err = EngineError::from(DomainError::duplicate("milestone", "m1"));
        assert_eq!(err.code(), "DUPLICATE_ID");
        assert_eq!(err.to_string(), "milestone `m1` already exists");
        assert!(err.as_domain().is_some());
    }

    #[test]
    fn out_of_order_names_scope_and_indices() {
        let err = EngineError::OutOfOrder { scope: Scope::Local, expected: 2, actual: 5 };
        assert_eq!(err.to_string(), "local operation index 5 does not follow head (expected 2)");
        assert_eq!(err.code(), "OUT_OF_ORDER");
    }
}
