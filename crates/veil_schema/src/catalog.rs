use std::sync::{Arc, PoisonError, RwLock};

use veil_utils::TypeIdMap;

use crate::SchemaError;
use crate::info::{FieldDescriptor, FieldFlags, Shape, TypeDescriptor};

// -----------------------------------------------------------------------------
// FieldEnumerator

/// Lists the named fields of a type.
///
/// Returning `None` means the type exposes no introspectable fields and has
/// no other known shape.
pub trait FieldEnumerator: Send + Sync + 'static {
    fn enumerate_fields(
        &self,
        descriptor: &'static TypeDescriptor,
    ) -> Option<Vec<&'static FieldDescriptor>>;
}

/// The default enumerator: declared struct fields in declaration order,
/// except those flagged [`FieldFlags::SKIP`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclaredFields;

impl FieldEnumerator for DeclaredFields {
    fn enumerate_fields(
        &self,
        descriptor: &'static TypeDescriptor,
    ) -> Option<Vec<&'static FieldDescriptor>> {
        match descriptor.shape() {
            Shape::Struct(shape) => Some(
                shape
                    .iter()
                    .filter(|field| !field.flags().contains(FieldFlags::SKIP))
                    .collect(),
            ),
            Shape::Opaque => None,
            _ => Some(Vec::new()),
        }
    }
}

// -----------------------------------------------------------------------------
// FieldCatalog

/// Ordered field lists per type, computed once and cached forever.
///
/// # Examples
///
/// ```
/// use veil_schema::{Describe, FieldCatalog, Introspect};
///
/// #[derive(Introspect, Default)]
/// struct Bean {
///     name: String,
///     #[veil(skip)]
///     secret: String,
///     age: i32,
/// }
///
/// let catalog = FieldCatalog::new();
/// let fields = catalog.fields_of(Bean::type_descriptor()).unwrap();
/// let names: Vec<_> = fields.iter().map(|f| f.name()).collect();
/// assert_eq!(names, ["name", "age"]);
///
/// assert!(catalog.fields_of(i32::type_descriptor()).unwrap().is_empty());
/// ```
pub struct FieldCatalog {
    enumerator: Box<dyn FieldEnumerator>,
    cache: RwLock<TypeIdMap<Arc<[&'static FieldDescriptor]>>>,
}

impl FieldCatalog {
    /// Creates a catalog backed by [`DeclaredFields`].
    #[inline]
    pub fn new() -> Self {
        Self::with_enumerator(DeclaredFields)
    }

    /// Creates a catalog backed by `enumerator`.
    pub fn with_enumerator(enumerator: impl FieldEnumerator) -> Self {
        Self {
            enumerator: Box::new(enumerator),
            cache: RwLock::new(TypeIdMap::new()),
        }
    }

    /// Returns the ordered fields of the described type.
    ///
    /// # Errors
    ///
    /// [`SchemaError::UnsupportedType`] if the enumerator knows no shape for it.
    pub fn fields_of(
        &self,
        descriptor: &'static TypeDescriptor,
    ) -> Result<Arc<[&'static FieldDescriptor]>, SchemaError> {
        if let Some(fields) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&descriptor.id())
        {
            return Ok(Arc::clone(fields));
        }

        let fields: Arc<[&'static FieldDescriptor]> = self
            .enumerator
            .enumerate_fields(descriptor)
            .ok_or_else(|| SchemaError::UnsupportedType {
                type_path: descriptor.path().to_owned(),
            })?
            .into();

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(cache.get_or_insert(descriptor.id(), || fields)))
    }
}

impl Default for FieldCatalog {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{DeclaredFields, FieldCatalog, FieldEnumerator};
    use crate::info::{DescriptorCell, FieldDescriptor, Shape, TypeDescriptor};
    use crate::{Describe, Introspect, SchemaError};

    #[derive(Introspect, Default)]
    struct Rectangle {
        w: i32,
        h: i32,
        #[veil(skip_serializing)]
        size: i32,
        #[veil(skip)]
        cache: i32,
        name: String,
    }

    struct Handle;

    impl Describe for Handle {
        fn type_descriptor() -> &'static TypeDescriptor {
            static CELL: DescriptorCell = DescriptorCell::new();
            CELL.get_or_init(|| TypeDescriptor::new::<Self>("tests::Handle", "Handle", "Handle", Shape::Opaque))
        }
    }

    #[test]
    fn declared_order_without_skipped() {
        let catalog = FieldCatalog::new();
        let fields = catalog.fields_of(Rectangle::type_descriptor()).unwrap();
        let names: Vec<_> = fields.iter().map(|f| f.name()).collect();
        // one-directional skips are left to the engines
        assert_eq!(names, ["w", "h", "size", "name"]);
    }

    #[test]
    fn opaque_is_unsupported() {
        let err = FieldCatalog::new().fields_of(Handle::type_descriptor()).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnsupportedType {
                type_path: "tests::Handle".into()
            }
        );
        assert_eq!(
            err.to_string(),
            "type `tests::Handle` exposes no fields and is not a scalar, collection or mapping"
        );
    }

    #[test]
    fn enumerator_runs_once_per_type() {
        struct Counting(Arc<AtomicUsize>);

        impl FieldEnumerator for Counting {
            fn enumerate_fields(
                &self,
                descriptor: &'static TypeDescriptor,
            ) -> Option<Vec<&'static FieldDescriptor>> {
                self.0.fetch_add(1, Ordering::Relaxed);
                DeclaredFields.enumerate_fields(descriptor)
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let catalog = FieldCatalog::with_enumerator(Counting(Arc::clone(&calls)));
        for _ in 0..3 {
            catalog.fields_of(Rectangle::type_descriptor()).unwrap();
        }
        catalog.fields_of(<Vec<i32>>::type_descriptor()).unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }
}
