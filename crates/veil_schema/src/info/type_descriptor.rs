use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::ops::RangeInclusive;

use crate::info::{EnumShape, ScalarKind, Shape, StructShape, ValueKind};

/// Lazily resolves a [`TypeDescriptor`].
///
/// Field and element types are stored this way so that describing a type
/// never forces the description of the types it contains.
pub type DescriptorFn = fn() -> &'static TypeDescriptor;

// -----------------------------------------------------------------------------
// TypeDescriptor

/// Identity and shape of one type.
///
/// # Examples
///
/// ```
/// use veil_schema::{Describe, info::{Shape, ValueKind}};
///
/// let info = <Vec<i32>>::type_descriptor();
/// assert_eq!(info.name(), "Vec<i32>");
/// assert_eq!(info.ident(), "Vec");
/// assert_eq!(info.kind(), ValueKind::Sequence);
///
/// let Shape::Sequence(element) = info.shape() else { unreachable!() };
/// assert!(element().is::<i32>());
/// ```
pub struct TypeDescriptor {
    id: TypeId,
    path: Cow<'static, str>,
    name: Cow<'static, str>,
    ident: &'static str,
    shape: Shape,
}

impl TypeDescriptor {
    /// Creates a descriptor for `T`.
    ///
    /// - `path`: unique, fully qualified name.
    /// - `name`: name without module path, generics included.
    /// - `ident`: shortest name, without module path or generics.
    pub fn new<T: Any + ?Sized>(
        path: impl Into<Cow<'static, str>>,
        name: impl Into<Cow<'static, str>>,
        ident: &'static str,
        shape: Shape,
    ) -> Self {
        Self {
            id: TypeId::of::<T>(),
            path: path.into(),
            name: name.into(),
            ident,
            shape,
        }
    }

    /// Creates a descriptor for a scalar type whose path, name and ident coincide.
    pub fn scalar<T: Any>(name: &'static str, kind: ScalarKind) -> Self {
        Self::new::<T>(name, name, name, Shape::Scalar(kind))
    }

    /// Returns the `TypeId` of the described type.
    #[inline]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Returns `true` if this describes `T`.
    #[inline]
    pub fn is<T: Any + ?Sized>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Returns the fully qualified type path.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the type name without module path.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the shortest name, without module path and generics.
    #[inline]
    pub const fn ident(&self) -> &'static str {
        self.ident
    }

    /// Returns the shape.
    #[inline]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the value kind of the shape.
    ///
    /// Optionals report the kind of their element.
    pub fn kind(&self) -> ValueKind {
        match &self.shape {
            Shape::Scalar(kind) => kind.value_kind(),
            Shape::Enum(_) => ValueKind::String,
            Shape::Optional(element) => element().kind(),
            Shape::Sequence(_) => ValueKind::Sequence,
            Shape::Mapping(_) => ValueKind::Mapping,
            Shape::Struct(_) | Shape::Opaque => ValueKind::Object,
            Shape::Any => ValueKind::Any,
        }
    }

    /// Returns the values a built-in integer type can hold.
    ///
    /// `None` for every other type, derived ones included.
    pub fn integer_bounds(&self) -> Option<RangeInclusive<i128>> {
        macro_rules! bounds {
            ($($ty:ty)*) => {$(
                if self.is::<$ty>() {
                    return Some(<$ty>::MIN as i128..=<$ty>::MAX as i128);
                }
            )*};
        }
        bounds!(i8 i16 i32 i64 isize u8 u16 u32 u64 usize);
        None
    }

    /// Returns the struct shape, if this is a struct.
    #[inline]
    pub const fn as_struct(&self) -> Option<&StructShape> {
        match &self.shape {
            Shape::Struct(shape) => Some(shape),
            _ => None,
        }
    }

    /// Returns the enum shape, if this is a unit-only enum.
    #[inline]
    pub const fn as_enum(&self) -> Option<&EnumShape> {
        match &self.shape {
            Shape::Enum(shape) => Some(shape),
            _ => None,
        }
    }

    /// Returns `true` for struct shapes.
    #[inline]
    pub const fn is_struct(&self) -> bool {
        matches!(self.shape, Shape::Struct(_))
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Element descriptors are not followed: recursive types would never end.
        f.debug_struct("TypeDescriptor")
            .field("path", &self.path)
            .field("shape", &self.shape)
            .finish()
    }
}

impl PartialEq for TypeDescriptor {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

#[cfg(test)]
mod tests {
    use crate::Describe;
    use crate::info::{ScalarKind, Shape, TypeDescriptor, ValueKind};

    #[test]
    fn scalar_descriptor_names() {
        let info = TypeDescriptor::scalar::<u16>("u16", ScalarKind::Integer);
        assert_eq!(info.path(), "u16");
        assert_eq!(info.name(), "u16");
        assert_eq!(info.ident(), "u16");
        assert_eq!(info.kind(), ValueKind::Integer);
        assert!(info.is::<u16>());
        assert!(!info.is::<u32>());
    }

    #[test]
    fn optional_reports_element_kind() {
        let info = <Option<String>>::type_descriptor();
        assert!(matches!(info.shape(), Shape::Optional(_)));
        assert_eq!(info.kind(), ValueKind::String);
    }

    #[test]
    fn integer_bounds_follow_the_type() {
        assert_eq!(u8::type_descriptor().integer_bounds(), Some(0..=255));
        assert_eq!(i16::type_descriptor().integer_bounds(), Some(-32768..=32767));
        assert_eq!(u64::type_descriptor().integer_bounds(), Some(0..=u64::MAX as i128));
        assert_eq!(f32::type_descriptor().integer_bounds(), None);
        assert_eq!(<Option<u8>>::type_descriptor().integer_bounds(), None);
    }

    #[test]
    fn descriptors_compare_by_type() {
        assert_eq!(<Vec<u8>>::type_descriptor(), <Vec<u8>>::type_descriptor());
        assert_ne!(<Vec<u8>>::type_descriptor(), <Vec<u16>>::type_descriptor());
    }
}
