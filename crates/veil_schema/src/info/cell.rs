//! Static storage for descriptors.
//!
//! [`Describe::type_descriptor`](crate::Describe::type_descriptor) returns a
//! `&'static` reference, so each descriptor is built once and kept forever.
//!
//! - [`DescriptorCell`]: for non-generic types, a plain [`OnceLock`].
//! - [`GenericDescriptorCell`]: for generic types. A `static` inside a generic
//!   function is shared by every instantiation, so the cell is keyed by `TypeId`.
//! - [`GenericNameCell`]: the same for generated names such as `Vec<i32>`.

use std::any::{Any, TypeId};
use std::sync::{OnceLock, PoisonError, RwLock};

use veil_utils::TypeIdMap;

use crate::info::TypeDescriptor;

// -----------------------------------------------------------------------------
// DescriptorCell

/// Storage for the descriptor of a non-generic type.
///
/// ```
/// use veil_schema::Describe;
/// use veil_schema::info::{DescriptorCell, ScalarKind, TypeDescriptor};
///
/// struct Celsius(f64);
///
/// impl Describe for Celsius {
///     fn type_descriptor() -> &'static TypeDescriptor {
///         static CELL: DescriptorCell = DescriptorCell::new();
///         CELL.get_or_init(|| TypeDescriptor::scalar::<Self>("Celsius", ScalarKind::Float))
///     }
/// }
///
/// assert!(std::ptr::eq(Celsius::type_descriptor(), Celsius::type_descriptor()));
/// ```
pub struct DescriptorCell(OnceLock<TypeDescriptor>);

impl DescriptorCell {
    /// Creates an empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the stored descriptor, building it with `f` on first access.
    #[inline]
    pub fn get_or_init(&self, f: impl FnOnce() -> TypeDescriptor) -> &TypeDescriptor {
        self.0.get_or_init(f)
    }
}

// -----------------------------------------------------------------------------
// GenericCell

/// `TypeId`-keyed static storage shared by all instantiations of a generic type.
pub struct GenericCell<T: 'static>(RwLock<TypeIdMap<&'static T>>);

/// Storage for the descriptors of a generic type.
///
/// ```
/// use veil_schema::Describe;
/// use veil_schema::info::{GenericDescriptorCell, Shape, TypeDescriptor};
///
/// struct Wrapper<T>(T);
///
/// impl<T: Describe> Describe for Wrapper<T> {
///     fn type_descriptor() -> &'static TypeDescriptor {
///         static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
///         CELL.get_or_insert::<Self>(|| {
///             TypeDescriptor::new::<Self>("Wrapper", "Wrapper", "Wrapper", Shape::Optional(T::type_descriptor))
///         })
///     }
/// }
///
/// assert!(Wrapper::<u8>::type_descriptor().is::<Wrapper<u8>>());
/// assert!(Wrapper::<i8>::type_descriptor().is::<Wrapper<i8>>());
/// ```
pub type GenericDescriptorCell = GenericCell<TypeDescriptor>;

/// Storage for generated type names of a generic type.
pub type GenericNameCell = GenericCell<String>;

impl<T: 'static> GenericCell<T> {
    /// Creates an empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(TypeIdMap::new()))
    }

    /// Returns the entry for `G`, building it with `f` on first access.
    ///
    /// `f` runs without holding the lock, so it may describe other types.
    #[inline(always)]
    pub fn get_or_insert<G: Any + ?Sized>(&self, f: impl FnOnce() -> T) -> &'static T {
        self.get_or_insert_by_type_id(TypeId::of::<G>(), f)
    }

    #[inline(never)]
    fn get_or_insert_by_type_id(&self, type_id: TypeId, f: impl FnOnce() -> T) -> &'static T {
        match self.get_by_type_id(type_id) {
            Some(entry) => entry,
            None => self.insert_by_type_id(type_id, f()),
        }
    }

    #[inline(never)]
    fn get_by_type_id(&self, type_id: TypeId) -> Option<&'static T> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .copied()
    }

    #[inline(never)]
    fn insert_by_type_id(&self, type_id: TypeId, value: T) -> &'static T {
        // Another thread may have won the race; its entry is kept and `value` dropped.
        *self
            .0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert(type_id, || Box::leak(Box::new(value)))
    }
}
