use thiserror::Error;
use veil_schema::{FromValueError, SchemaError};

/// Errors returned by [`Mapper`](crate::Mapper) operations.
///
/// Every failure is fatal to the call that raised it; nothing is retried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MapperError {
    #[error("type `{type_path}` cannot be serialized: it exposes no fields and is not a scalar, collection or mapping")]
    UnsupportedType { type_path: String },
    #[error("circular reference to `{type_path}` at `{path}`")]
    CircularReference { type_path: String, path: String },
    #[error("type mismatch at `{path}`: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },
    #[error("nesting deeper than {max_depth} at `{path}`")]
    DepthLimitExceeded { max_depth: usize, path: String },
    #[error("invalid registration for `{type_path}`: {reason}")]
    InvalidRegistration { type_path: String, reason: String },
    #[error("invalid date format `{pattern}`: {reason}")]
    InvalidDateFormat { pattern: String, reason: String },
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
    #[error("custom serializer for `{type_path}` failed: {message}")]
    Custom { type_path: String, message: String },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    FromValue(#[from] FromValueError),
    #[error("{0}")]
    Message(String),
}

impl MapperError {
    pub(crate) fn invalid_registration(type_path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidRegistration {
            type_path: type_path.to_owned(),
            reason: reason.into(),
        }
    }
}

impl From<SchemaError> for MapperError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::UnsupportedType { type_path } => Self::UnsupportedType { type_path },
            other => Self::Message(other.to_string()),
        }
    }
}
