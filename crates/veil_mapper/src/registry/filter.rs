use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use veil_utils::TypeIdMap;
use veil_utils::hash::{HashMap, HashSet};

use super::next_stamp;

// -----------------------------------------------------------------------------
// FilterSpec

/// An allow-list of field names for one type, registered under a filter id.
///
/// Names are case-sensitive; their order is irrelevant. Output follows the
/// declaration order of the type.
#[derive(Clone)]
pub struct FilterSpec {
    id: Box<str>,
    fields: HashSet<Box<str>>,
    stamp: u64,
}

impl FilterSpec {
    pub(crate) fn new<I, S>(id: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            fields: fields.into_iter().map(|f| f.into().into_boxed_str()).collect(),
            stamp: next_stamp(),
        }
    }

    /// Returns the filter id.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns `true` if `field` is allowed.
    #[inline]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    /// Iterates over the allowed names in no particular order.
    #[inline]
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(AsRef::as_ref)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub(crate) fn stamp(&self) -> u64 {
        self.stamp
    }
}

impl fmt::Debug for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<&str> = self.fields().collect();
        fields.sort_unstable();
        f.debug_struct("FilterSpec")
            .field("id", &self.id)
            .field("fields", &fields)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// FilterRegistry

/// `(type, filter id) -> FilterSpec`.
#[derive(Default)]
pub(crate) struct FilterRegistry {
    by_type: TypeIdMap<HashMap<Box<str>, Arc<FilterSpec>>>,
}

impl FilterRegistry {
    /// Registers `spec`, returning the one it replaced.
    pub fn register(&mut self, type_id: TypeId, spec: FilterSpec) -> Option<Arc<FilterSpec>> {
        self.by_type
            .get_or_insert(type_id, HashMap::default)
            .insert(spec.id.clone(), Arc::new(spec))
    }

    pub fn resolve(&self, type_id: TypeId, id: &str) -> Option<&Arc<FilterSpec>> {
        self.by_type.get(&type_id)?.get(id)
    }

    pub fn remove(&mut self, type_id: TypeId, id: &str) -> Option<Arc<FilterSpec>> {
        let filters = self.by_type.get_mut(&type_id)?;
        let removed = filters.remove(id);
        if filters.is_empty() {
            self.by_type.remove(&type_id);
        }
        removed
    }

    pub fn clear(&mut self) {
        self.by_type.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::any::TypeId;

    use super::{FilterRegistry, FilterSpec};

    #[test]
    fn replacing_changes_stamp() {
        let mut registry = FilterRegistry::default();
        let ty = TypeId::of::<u8>();

        assert!(registry.register(ty, FilterSpec::new("f", ["a"])).is_none());
        let first = registry.resolve(ty, "f").unwrap().stamp();
        let previous = registry.register(ty, FilterSpec::new("f", ["a", "b"])).unwrap();
        assert_eq!(previous.stamp(), first);

        let current = registry.resolve(ty, "f").unwrap();
        assert_ne!(current.stamp(), first);
        assert!(current.contains("b"));
        assert_eq!(current.len(), 2);
    }

    #[test]
    fn filters_are_scoped_per_type() {
        let mut registry = FilterRegistry::default();
        registry.register(TypeId::of::<u8>(), FilterSpec::new("f", ["a"]));
        assert!(registry.resolve(TypeId::of::<u16>(), "f").is_none());
        assert!(registry.resolve(TypeId::of::<u8>(), "F").is_none());

        assert!(registry.remove(TypeId::of::<u8>(), "f").is_some());
        assert!(registry.resolve(TypeId::of::<u8>(), "f").is_none());
        assert!(registry.remove(TypeId::of::<u8>(), "f").is_none());
    }
}
