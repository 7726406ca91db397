use std::any::Any;
use std::fmt;

use chrono::NaiveDateTime;

use crate::info::{FieldDescriptor, TypeDescriptor};
use crate::{FromValueError, Value};

// -----------------------------------------------------------------------------
// Describe

/// Static access to the [`TypeDescriptor`] of a type.
///
/// Implemented for built-in types and by `#[derive(Introspect)]`.
pub trait Describe: 'static {
    /// Returns the descriptor of `Self`, built on first access.
    fn type_descriptor() -> &'static TypeDescriptor;
}

// -----------------------------------------------------------------------------
// Introspect

/// Runtime view of a value.
///
/// This is the capability the serialization engine walks: it reports the
/// runtime type through [`descriptor`](Introspect::descriptor) and exposes the
/// value's content through [`inspect`](Introspect::inspect).
///
/// Pointer types (`Box`, `Arc`) are transparent: they report and expose the
/// value they point to, so `Box<dyn Introspect>` serializes as its content.
///
/// `Option` and `Result` have an inherent `inspect` method that method-call
/// syntax picks first; call `Introspect::inspect(&value)` on them.
pub trait Introspect: Any + Send + Sync {
    /// Returns the descriptor of the runtime type.
    fn descriptor(&self) -> &'static TypeDescriptor;

    /// Returns the value as [`Any`], looking through pointers.
    fn as_any(&self) -> &dyn Any;

    /// Returns a view of the value's content.
    fn inspect(&self) -> Inspect<'_>;
}

impl fmt::Debug for dyn Introspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dyn Introspect<{}>", self.descriptor().path())
    }
}

// -----------------------------------------------------------------------------
// FromValue

/// Rebuilds a typed value from the untyped [`Value`] tree.
///
/// The deserialization engine first reads the token stream into a `Value`
/// shaped after the target [`TypeDescriptor`], then calls this.
pub trait FromValue: Sized {
    /// Converts `value` into `Self`.
    fn from_value(value: Value) -> Result<Self, FromValueError>;
}

// -----------------------------------------------------------------------------
// Inspect

/// The content of a value, one level deep.
pub enum Inspect<'a> {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(&'a str),
    Date(NaiveDateTime),
    /// Elements of an ordered collection.
    Seq(Box<dyn Iterator<Item = &'a dyn Introspect> + 'a>),
    /// Entries of a string-keyed mapping, in the mapping's iteration order.
    Map(Box<dyn Iterator<Item = (&'a str, &'a dyn Introspect)> + 'a>),
    /// A value with named fields.
    Object(ObjectRef<'a>),
}

impl fmt::Debug for Inspect<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::UInt(v) => f.debug_tuple("UInt").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Self::Date(v) => f.debug_tuple("Date").field(v).finish(),
            Self::Seq(_) => f.write_str("Seq(..)"),
            Self::Map(_) => f.write_str("Map(..)"),
            Self::Object(obj) => f.debug_tuple("Object").field(&obj.descriptor().path()).finish(),
        }
    }
}

// -----------------------------------------------------------------------------
// ObjectRef

/// A borrowed struct value together with its descriptor.
///
/// The owner is kept type-erased; fields are read through the accessors of
/// the descriptor's [`FieldDescriptor`]s.
#[derive(Clone, Copy)]
pub struct ObjectRef<'a> {
    descriptor: &'static TypeDescriptor,
    owner: &'a dyn Any,
}

impl<'a> ObjectRef<'a> {
    /// Wraps `value`.
    #[inline]
    pub fn new<T: Introspect>(value: &'a T) -> Self {
        Self {
            descriptor: value.descriptor(),
            owner: value,
        }
    }

    /// Returns the descriptor of the object's type.
    #[inline]
    pub const fn descriptor(&self) -> &'static TypeDescriptor {
        self.descriptor
    }

    /// Returns the object's address, used to detect reference cycles.
    #[inline]
    pub fn address(&self) -> *const () {
        std::ptr::from_ref(self.owner).cast::<()>()
    }

    /// Reads `field` from the object.
    #[inline]
    pub fn field(&self, field: &FieldDescriptor) -> Option<&'a dyn Introspect> {
        field.get(self.owner)
    }

    /// Reads the field named `name` from the object.
    pub fn field_by_name(&self, name: &str) -> Option<&'a dyn Introspect> {
        let field = self.descriptor.as_struct()?.field(name)?;
        self.field(field)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::{Describe, Inspect, Introspect};

    #[derive(Introspect, Default)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn object_ref_reads_fields() {
        let point = Point { x: 3, y: -4 };
        let Inspect::Object(obj) = point.inspect() else {
            panic!("expected object");
        };
        assert!(obj.descriptor().is::<Point>());
        assert!(matches!(obj.field_by_name("y").unwrap().inspect(), Inspect::Int(-4)));
        assert!(obj.field_by_name("z").is_none());
        assert_eq!(obj.address(), &point as *const Point as *const ());
    }

    #[test]
    fn boxed_dyn_reports_runtime_type() {
        let boxed: Box<dyn Introspect> = Box::new(Point::default());
        assert!(boxed.descriptor().is::<Point>());
        assert_eq!(Point::type_descriptor().name(), "Point");
    }
}
