use std::any::TypeId;
use std::sync::{Arc, PoisonError, RwLock};

use log::trace;
use veil_schema::info::FieldDescriptor;
use veil_utils::hash::HashMap;

use crate::MapperError;
use crate::registry::{FilterSpec, NO_STAMP, OverlaySpec};

// -----------------------------------------------------------------------------
// Strategy

/// How the effective fields of a type were chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Every catalog field under its own name.
    Full,
    /// The fields allowed by a filter, in catalog order.
    Filtered,
    /// The fields kept by an overlay, renamed where it says so.
    Overlaid,
}

// -----------------------------------------------------------------------------
// Resolution

/// A catalog field and the name it is written and read under.
#[derive(Debug)]
pub(crate) struct ResolvedField {
    pub descriptor: &'static FieldDescriptor,
    pub name: Box<str>,
}

/// The effective fields of one type under one filter and overlay.
#[derive(Debug)]
pub(crate) struct Resolution {
    strategy: Strategy,
    fields: Box<[ResolvedField]>,
    by_name: HashMap<Box<str>, usize>,
}

impl Resolution {
    /// Applies `overlay`, or else `filter`, to the catalog fields.
    pub fn build(
        catalog: &[&'static FieldDescriptor],
        filter: Option<&FilterSpec>,
        overlay: Option<&OverlaySpec>,
    ) -> Self {
        let (strategy, fields): (Strategy, Box<[ResolvedField]>) = match (overlay, filter) {
            (Some(overlay), _) => (
                Strategy::Overlaid,
                catalog
                    .iter()
                    .filter_map(|&descriptor| {
                        let name = overlay.output_name(descriptor.name())?;
                        Some(ResolvedField {
                            descriptor,
                            name: name.into(),
                        })
                    })
                    .collect(),
            ),
            (None, Some(filter)) => (
                Strategy::Filtered,
                catalog
                    .iter()
                    .filter(|descriptor| filter.contains(descriptor.name()))
                    .map(|&descriptor| ResolvedField::plain(descriptor))
                    .collect(),
            ),
            (None, None) => (
                Strategy::Full,
                catalog.iter().map(|&descriptor| ResolvedField::plain(descriptor)).collect(),
            ),
        };

        let by_name = fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field.name.clone(), i))
            .collect();

        Self {
            strategy,
            fields,
            by_name,
        }
    }

    #[inline]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// All effective fields, in catalog order.
    #[inline]
    pub fn fields(&self) -> &[ResolvedField] {
        &self.fields
    }

    /// Fields that are written, in catalog order.
    pub fn output(&self) -> impl Iterator<Item = &ResolvedField> {
        self.fields.iter().filter(|f| f.descriptor.is_serializable())
    }

    /// The field read under `name`, if any.
    pub fn input(&self, name: &str) -> Option<&ResolvedField> {
        let field = &self.fields[*self.by_name.get(name)?];
        field.descriptor.is_deserializable().then_some(field)
    }
}

impl ResolvedField {
    #[inline]
    fn plain(descriptor: &'static FieldDescriptor) -> Self {
        Self {
            descriptor,
            name: descriptor.name().into(),
        }
    }
}

// -----------------------------------------------------------------------------
// ResolutionCache

/// The full identity of a resolution.
///
/// Stamps are unique per registration, so an entry computed from a replaced
/// filter or overlay is never found again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    pub type_id: TypeId,
    pub filter: u64,
    pub overlay: u64,
}

impl CacheKey {
    pub fn new(type_id: TypeId, filter: Option<&FilterSpec>, overlay: Option<&OverlaySpec>) -> Self {
        Self {
            type_id,
            filter: filter.map_or(NO_STAMP, FilterSpec::stamp),
            overlay: overlay.map_or(NO_STAMP, OverlaySpec::stamp),
        }
    }
}

/// Resolutions shared by every call of one mapper.
#[derive(Default)]
pub(crate) struct ResolutionCache {
    entries: RwLock<HashMap<CacheKey, Arc<Resolution>>>,
}

impl ResolutionCache {
    /// Returns the entry for `key`, computing it with `f` on a miss.
    pub fn get_or_try_insert(
        &self,
        key: CacheKey,
        f: impl FnOnce() -> Result<Resolution, MapperError>,
    ) -> Result<Arc<Resolution>, MapperError> {
        if let Some(hit) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(hit));
        }

        trace!("resolution cache miss for {key:?}");
        let resolution = Arc::new(f()?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry(key).or_insert(resolution)))
    }

    /// Drops every entry of one type.
    pub fn purge_type(&self, type_id: TypeId) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|key, _| key.type_id != type_id);
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}
