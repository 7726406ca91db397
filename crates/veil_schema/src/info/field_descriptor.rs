use std::any::Any;
use std::fmt;

use bitflags::bitflags;

use crate::info::{DescriptorFn, TypeDescriptor, ValueKind};
use crate::{Describe, Introspect};

/// Reads one field out of its owner.
///
/// The owner is passed type-erased; accessors return `None` when handed a
/// value of another type.
pub type FieldAccessor = for<'a> fn(&'a dyn Any) -> Option<&'a dyn Introspect>;

bitflags! {
    /// Visibility flags of a field.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u8 {
        /// Never written.
        const SKIP_SERIALIZING = 1;
        /// Ignored when read.
        const SKIP_DESERIALIZING = 1 << 1;
        /// Neither written nor read.
        const SKIP = Self::SKIP_SERIALIZING.bits() | Self::SKIP_DESERIALIZING.bits();
    }
}

// -----------------------------------------------------------------------------
// FieldDescriptor

/// A named struct field.
///
/// # Examples
///
/// ```
/// use veil_schema::{Describe, Introspect, info::{FieldFlags, ValueKind}};
///
/// #[derive(Introspect, Default)]
/// struct Bean {
///     name: String,
///     #[veil(skip_serializing)]
///     token: String,
/// }
///
/// let info = Bean::type_descriptor().as_struct().unwrap();
/// let token = info.field("token").unwrap();
///
/// assert_eq!(token.kind(), ValueKind::String);
/// assert!(token.flags().contains(FieldFlags::SKIP_SERIALIZING));
/// assert!(!token.is_serializable());
/// assert!(token.is_deserializable());
/// ```
#[derive(Clone)]
pub struct FieldDescriptor {
    name: &'static str,
    index: usize,
    flags: FieldFlags,
    type_descriptor: DescriptorFn,
    accessor: FieldAccessor,
}

impl FieldDescriptor {
    /// Creates a field named `name` of type `F`.
    #[inline]
    pub fn new<F: Describe>(name: &'static str, accessor: FieldAccessor) -> Self {
        Self {
            name,
            index: 0,
            flags: FieldFlags::empty(),
            type_descriptor: F::type_descriptor,
            accessor,
        }
    }

    /// Replaces the visibility flags.
    #[inline]
    pub fn with_flags(mut self, flags: FieldFlags) -> Self {
        self.flags = flags;
        self
    }

    #[inline]
    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Returns the field name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the declaration index.
    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the visibility flags.
    #[inline]
    pub const fn flags(&self) -> FieldFlags {
        self.flags
    }

    /// Returns `true` unless the field is flagged [`FieldFlags::SKIP_SERIALIZING`].
    #[inline]
    pub const fn is_serializable(&self) -> bool {
        !self.flags.contains(FieldFlags::SKIP_SERIALIZING)
    }

    /// Returns `true` unless the field is flagged [`FieldFlags::SKIP_DESERIALIZING`].
    #[inline]
    pub const fn is_deserializable(&self) -> bool {
        !self.flags.contains(FieldFlags::SKIP_DESERIALIZING)
    }

    /// Returns the descriptor of the field's type.
    #[inline]
    pub fn type_descriptor(&self) -> &'static TypeDescriptor {
        (self.type_descriptor)()
    }

    /// Returns the value kind of the field's type.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        self.type_descriptor().kind()
    }

    /// Reads the field out of `owner`.
    #[inline]
    pub fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Introspect> {
        (self.accessor)(owner)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::FieldFlags;

    #[test]
    fn skip_is_both_directions() {
        assert!(FieldFlags::SKIP.contains(FieldFlags::SKIP_SERIALIZING));
        assert!(FieldFlags::SKIP.contains(FieldFlags::SKIP_DESERIALIZING));
        assert!(FieldFlags::default().is_empty());
    }
}
