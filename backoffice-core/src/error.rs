//! Error types for back-office operations

use crate::draft::FieldKind;
use crate::identity::{RecordId, ResourceKind};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors surfaced by a [`crate::ResourceClient`].
///
/// The client classifies and returns; it never recovers on its own. The
/// type is `Clone` so that every waiter on a coalesced refresh receives the
/// same outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// No response was received (unreachable host, connection reset, timeout).
    #[error("Network error: {message}")]
    Network { message: String },

    /// 5xx response, `success: false` envelope, or a body that failed to decode.
    #[error("Server error: {message}")]
    Server { status: Option<u16>, message: String },

    /// 4xx response carrying field-level detail.
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        fields: BTreeMap<String, String>,
    },

    /// 404 on the targeted record.
    #[error("Record not found: {id}")]
    NotFound { id: RecordId },

    /// The resource has no route configured for this operation.
    #[error("{operation} is not supported for {resource}")]
    Unsupported {
        resource: ResourceKind,
        operation: &'static str,
    },
}

impl ClientError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn server(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Whether a manual retry by the user can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Server { .. })
    }

    /// Field-level message for a draft field, if the server reported one.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        match self {
            Self::Validation { fields, .. } => fields.get(field).map(String::as_str),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Short label for notifications and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Server { .. } => "server",
            Self::Validation { .. } => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Unsupported { .. } => "unsupported",
        }
    }
}

/// Result type for remote collection operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Illegal operations on the editing state machine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("No modal is open")]
    NoSession,

    #[error("{operation} is not allowed while {mode}")]
    InvalidState {
        operation: &'static str,
        mode: &'static str,
    },

    #[error("A submission is already in flight")]
    AlreadyInFlight,

    #[error("Record {id} no longer exists; cancel to continue")]
    TargetMissing { id: RecordId },

    #[error("Unknown field: {field}")]
    UnknownField { field: String },

    #[error("Invalid value for {field} (expected {expected}): {value}")]
    Coercion {
        field: String,
        expected: FieldKind,
        value: String,
    },
}

/// Export failures.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to finalize export buffer: {0}")]
    Buffer(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ClientError::network("reset").is_retryable());
        assert!(ClientError::server(Some(502), "bad gateway").is_retryable());
        assert!(!ClientError::validation("bad email").is_retryable());
        assert!(!ClientError::NotFound { id: "x".into() }.is_retryable());
    }

    #[test]
    fn test_field_error_only_on_validation() {
        let mut fields = BTreeMap::new();
        fields.insert("email".to_string(), "must be unique".to_string());
        let err = ClientError::Validation {
            message: "invalid".into(),
            fields,
        };
        assert_eq!(err.field_error("email"), Some("must be unique"));
        assert_eq!(err.field_error("name"), None);
        assert_eq!(ClientError::network("x").field_error("email"), None);
    }
}
