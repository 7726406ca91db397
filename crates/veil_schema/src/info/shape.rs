use std::fmt;

use veil_utils::hash::HashMap;

use crate::info::{DescriptorFn, FieldDescriptor};

// -----------------------------------------------------------------------------
// ValueKind

/// The coarse kind of a value, as seen in the token stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Integer,
    Float,
    String,
    Date,
    Sequence,
    Mapping,
    Object,
    /// Anything: read as an untyped tree.
    Any,
}

impl ValueKind {
    /// Lower-case name used in error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Date => "date",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
            Self::Object => "object",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// ScalarKind

/// Kinds of scalar types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Integer,
    Float,
    String,
    Date,
}

impl ScalarKind {
    /// Returns the matching [`ValueKind`].
    pub const fn value_kind(self) -> ValueKind {
        match self {
            Self::Bool => ValueKind::Bool,
            Self::Integer => ValueKind::Integer,
            Self::Float => ValueKind::Float,
            Self::String => ValueKind::String,
            Self::Date => ValueKind::Date,
        }
    }
}

// -----------------------------------------------------------------------------
// Shape

/// The structural shape of a type.
pub enum Shape {
    /// Numbers, strings, booleans and dates.
    Scalar(ScalarKind),
    /// Enum without payloads, written as the variant name.
    Enum(EnumShape),
    /// A value that may be `null`.
    Optional(DescriptorFn),
    /// Ordered collection of the element type.
    Sequence(DescriptorFn),
    /// String-keyed mapping to the value type.
    Mapping(DescriptorFn),
    /// Named fields.
    Struct(StructShape),
    /// Any value, read back as an untyped tree.
    Any,
    /// A type without a known shape.
    Opaque,
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => f.debug_tuple("Scalar").field(kind).finish(),
            Self::Enum(shape) => f.debug_tuple("Enum").field(shape).finish(),
            Self::Optional(element) => f.debug_tuple("Optional").field(&element().path()).finish(),
            Self::Sequence(element) => f.debug_tuple("Sequence").field(&element().path()).finish(),
            Self::Mapping(value) => f.debug_tuple("Mapping").field(&value().path()).finish(),
            Self::Struct(shape) => f.debug_tuple("Struct").field(shape).finish(),
            Self::Any => f.write_str("Any"),
            Self::Opaque => f.write_str("Opaque"),
        }
    }
}

// -----------------------------------------------------------------------------
// StructShape

/// Ordered named fields of a struct.
///
/// # Examples
///
/// ```
/// use veil_schema::{Describe, Introspect};
///
/// #[derive(Introspect, Default)]
/// struct Rectangle {
///     w: i32,
///     h: i32,
///     name: String,
/// }
///
/// let shape = Rectangle::type_descriptor().as_struct().unwrap();
/// assert_eq!(shape.len(), 3);
/// assert_eq!(shape.index_of("h"), Some(1));
/// assert_eq!(shape.field_at(2).unwrap().name(), "name");
/// ```
pub struct StructShape {
    fields: Box<[FieldDescriptor]>,
    index: HashMap<&'static str, usize>,
}

impl StructShape {
    /// Creates a shape; field order is the input order.
    ///
    /// # Panics
    ///
    /// Panics if two fields share a name.
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        let mut index = HashMap::with_capacity_and_hasher(fields.len(), Default::default());
        let fields: Box<[FieldDescriptor]> = fields
            .into_iter()
            .enumerate()
            .map(|(i, field)| {
                let previous = index.insert(field.name(), i);
                assert!(previous.is_none(), "duplicate field name `{}`", field.name());
                field.with_index(i)
            })
            .collect();
        Self { fields, index }
    }

    /// Returns the field named `name`.
    #[inline]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(*self.index.get(name)?)
    }

    /// Returns the field at `index`.
    #[inline]
    pub fn field_at(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get(index)
    }

    /// Returns the position of the field named `name`.
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Iterates over the fields in declaration order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    /// Iterates over the field names in declaration order.
    #[inline]
    pub fn field_names(&self) -> impl ExactSizeIterator<Item = &'static str> + '_ {
        self.fields.iter().map(FieldDescriptor::name)
    }

    /// Returns the number of declared fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

impl fmt::Debug for StructShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.fields.iter()).finish()
    }
}

// -----------------------------------------------------------------------------
// EnumShape

/// Variant names of a unit-only enum, in declaration order.
#[derive(Debug)]
pub struct EnumShape {
    variants: Box<[&'static str]>,
}

impl EnumShape {
    /// Creates a shape from the variant names.
    pub fn new(variants: &[&'static str]) -> Self {
        Self {
            variants: variants.into(),
        }
    }

    /// Returns the variant names.
    #[inline]
    pub fn variants(&self) -> &[&'static str] {
        &self.variants
    }

    /// Returns `true` if `name` is a variant.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.variants.iter().any(|v| *v == name)
    }
}
