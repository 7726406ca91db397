use veil_schema::info::TypeDescriptor;
use veil_schema::{Describe, Value};

// -----------------------------------------------------------------------------
// SerializeOptions

/// Per-call serialization settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Filter applied to every object whose type registered it.
    pub filter_id: Option<String>,
    /// Writes the root as `{"<TypeName>": <value>}`.
    pub wrap_root: bool,
    /// Writes several roots as one array instead of one value per line.
    pub roots_as_array: bool,
}

impl SerializeOptions {
    /// Options applying the filter `id`.
    pub fn filtered(id: impl Into<String>) -> Self {
        Self {
            filter_id: Some(id.into()),
            ..Self::default()
        }
    }
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            filter_id: None,
            wrap_root: false,
            roots_as_array: true,
        }
    }
}

// -----------------------------------------------------------------------------
// TargetShape

/// What the deserialization engine reads its input as.
///
/// ```
/// use veil_mapper::TargetShape;
///
/// let shape = TargetShape::collection_of::<i32>();
/// assert!(matches!(shape, TargetShape::CollectionOf(info) if info.is::<i32>()));
/// ```
#[derive(Debug, Clone, Copy)]
pub enum TargetShape {
    /// A value of the described type.
    Type(&'static TypeDescriptor),
    /// An array of values of the described type.
    CollectionOf(&'static TypeDescriptor),
    /// Any value, read as an untyped tree.
    Untyped,
}

impl TargetShape {
    #[inline]
    pub fn of<T: Describe>() -> Self {
        Self::Type(T::type_descriptor())
    }

    #[inline]
    pub fn collection_of<T: Describe>() -> Self {
        Self::CollectionOf(T::type_descriptor())
    }

    /// Resolves [`Untyped`](Self::Untyped) to the untyped value descriptor.
    pub(crate) fn normalize(self) -> Self {
        match self {
            Self::Untyped => Self::Type(Value::type_descriptor()),
            other => other,
        }
    }
}
