use std::borrow::Cow;

use thiserror::Error;

use crate::{FieldPath, PathSegment, Value};

// -----------------------------------------------------------------------------
// SchemaError

/// Errors raised while describing types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("type `{type_path}` exposes no fields and is not a scalar, collection or mapping")]
    UnsupportedType { type_path: String },
}

// -----------------------------------------------------------------------------
// FromValueError

/// A [`Value`] could not be converted into the requested type.
///
/// The path is relative to the value passed to the outermost
/// [`FromValue::from_value`](crate::FromValue::from_value) call.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("cannot build `{type_path}` at `{path}`: {reason}")]
pub struct FromValueError {
    type_path: Cow<'static, str>,
    path: FieldPath,
    reason: String,
}

impl FromValueError {
    /// Creates an error for `type_path` at the root.
    pub fn new(type_path: impl Into<Cow<'static, str>>, reason: impl Into<String>) -> Self {
        Self {
            type_path: type_path.into(),
            path: FieldPath::root(),
            reason: reason.into(),
        }
    }

    /// Creates an error reporting that `found` has the wrong kind.
    pub fn unexpected(type_path: impl Into<Cow<'static, str>>, expected: &str, found: &Value) -> Self {
        Self::new(
            type_path,
            format!("expected {expected}, found {}", found.kind_name()),
        )
    }

    /// Prefixes the path with a field segment.
    #[must_use]
    pub fn in_field(mut self, name: &str) -> Self {
        self.path.prepend(PathSegment::Field(name.to_owned()));
        self
    }

    /// Prefixes the path with an index segment.
    #[must_use]
    pub fn at_index(mut self, index: usize) -> Self {
        self.path.prepend(PathSegment::Index(index));
        self
    }

    /// Returns the path of the offending value.
    #[inline]
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Returns the path of the type that could not be built.
    #[inline]
    pub fn type_path(&self) -> &str {
        &self.type_path
    }

    /// Returns the reason.
    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[cfg(test)]
mod tests {
    use super::FromValueError;
    use crate::Value;

    #[test]
    fn nested_paths_are_prefixed() {
        let err = FromValueError::unexpected("i32", "integer", &Value::Str("x".into()))
            .in_field("age")
            .at_index(3);
        assert_eq!(err.path().to_string(), "$[3].age");
        assert_eq!(
            err.to_string(),
            "cannot build `i32` at `$[3].age`: expected integer, found string"
        );
    }
}
