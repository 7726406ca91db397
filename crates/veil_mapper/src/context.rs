use std::any::TypeId;
use std::cell::{Cell, RefCell};
use std::fmt::Display;
use std::sync::Arc;

use veil_schema::FieldPath;
use veil_schema::info::{FieldDescriptor, TypeDescriptor};
use veil_utils::TypeIdMap;

use crate::cache::{CacheKey, Resolution};
use crate::registry::{FilterSpec, OverlaySpec, Registries, TypeSerializer};
use crate::{CyclePolicy, DateFormat, Mapper, MapperError};

/// Identity of an object being written: its address and its type.
///
/// The type is part of the key because a struct and its first field share an
/// address.
type ObjectKey = (*const (), TypeId);

// -----------------------------------------------------------------------------
// CallContext

/// State of one serialization or deserialization call.
///
/// Created by the mapper for every call and dropped when it returns. Serde
/// callbacks only report string errors; the typed error is kept here and
/// handed back by [`take_error`](Self::take_error).
pub(crate) struct CallContext<'a> {
    mapper: &'a Mapper,
    registries: &'a Registries,
    filter_id: Option<&'a str>,
    local_overlays: Option<&'a TypeIdMap<OverlaySpec>>,
    local_resolutions: RefCell<TypeIdMap<Arc<Resolution>>>,
    depth: Cell<usize>,
    path: RefCell<FieldPath>,
    visiting: RefCell<Vec<ObjectKey>>,
    error: RefCell<Option<MapperError>>,
}

impl<'a> CallContext<'a> {
    pub fn new(
        mapper: &'a Mapper,
        registries: &'a Registries,
        filter_id: Option<&'a str>,
        local_overlays: Option<&'a TypeIdMap<OverlaySpec>>,
    ) -> Self {
        Self {
            mapper,
            registries,
            filter_id,
            local_overlays,
            local_resolutions: RefCell::new(TypeIdMap::new()),
            depth: Cell::new(0),
            path: RefCell::new(FieldPath::root()),
            visiting: RefCell::new(Vec::new()),
            error: RefCell::new(None),
        }
    }

    #[inline]
    pub fn date_format(&self) -> &DateFormat {
        self.mapper.date_format()
    }

    #[inline]
    pub fn cycle_policy(&self) -> CyclePolicy {
        self.mapper.config().cycle_policy
    }

    #[inline]
    pub fn custom_serializer(&self, type_id: TypeId) -> Option<&TypeSerializer> {
        self.registries.serializers.get(type_id).map(Arc::as_ref)
    }

    // -------------------------------------------------------------------------
    // Field resolution

    #[inline]
    pub fn fields_of(
        &self,
        descriptor: &'static TypeDescriptor,
    ) -> Result<Arc<[&'static FieldDescriptor]>, MapperError> {
        Ok(self.mapper.catalog().fields_of(descriptor)?)
    }

    /// Effective output fields of a type.
    pub fn resolve(&self, descriptor: &'static TypeDescriptor) -> Result<Arc<Resolution>, MapperError> {
        self.resolve_with(descriptor, self.filter_id)
    }

    /// Effective input fields of a type. Filters never apply to input.
    pub fn resolve_input(
        &self,
        descriptor: &'static TypeDescriptor,
    ) -> Result<Arc<Resolution>, MapperError> {
        self.resolve_with(descriptor, None)
    }

    fn resolve_with(
        &self,
        descriptor: &'static TypeDescriptor,
        filter_id: Option<&str>,
    ) -> Result<Arc<Resolution>, MapperError> {
        let type_id = descriptor.id();

        if let Some(local) = self.local_overlays.and_then(|map| map.get(&type_id)) {
            if let Some(hit) = self.local_resolutions.borrow().get(&type_id) {
                return Ok(Arc::clone(hit));
            }
            let fields = self.fields_of(descriptor)?;
            let resolution = Arc::new(Resolution::build(&fields, None, Some(local)));
            self.local_resolutions
                .borrow_mut()
                .insert(type_id, Arc::clone(&resolution));
            return Ok(resolution);
        }

        let overlay: Option<&OverlaySpec> = self.registries.overlays.resolve(type_id).map(Arc::as_ref);
        let filter: Option<&FilterSpec> = match (overlay, filter_id) {
            (None, Some(id)) => self.registries.filters.resolve(type_id, id).map(Arc::as_ref),
            _ => None,
        };

        let key = CacheKey::new(type_id, filter, overlay);
        self.mapper.cache().get_or_try_insert(key, || {
            let fields = self.fields_of(descriptor)?;
            Ok(Resolution::build(&fields, filter, overlay))
        })
    }

    // -------------------------------------------------------------------------
    // Errors

    /// Keeps `err` unless an earlier error is already kept.
    pub fn record(&self, err: MapperError) {
        let mut slot = self.error.borrow_mut();
        if slot.is_none() {
            *slot = Some(err);
        }
    }

    /// Keeps `err` and returns a serializer error carrying its message.
    pub fn fail_ser<E: serde::ser::Error>(&self, err: MapperError) -> E {
        let out = E::custom(&err);
        self.record(err);
        out
    }

    /// Keeps `err` and returns a deserializer error carrying its message.
    pub fn fail_de<E: serde::de::Error>(&self, err: MapperError) -> E {
        let out = E::custom(&err);
        self.record(err);
        out
    }

    /// Returns the kept error, or converts the format's own error.
    pub fn finish<T, E>(
        &self,
        result: Result<T, E>,
        convert: impl FnOnce(E) -> MapperError,
    ) -> Result<T, MapperError> {
        result.map_err(|err| self.error.borrow_mut().take().unwrap_or_else(|| convert(err)))
    }

    // -------------------------------------------------------------------------
    // Path, depth and cycles

    /// The current position, e.g. `$.items[2].name`.
    pub fn path(&self) -> String {
        self.path.borrow().to_string()
    }

    pub fn enter_field(&self, name: impl Display) -> PathGuard<'_, 'a> {
        self.path.borrow_mut().push_field(name.to_string());
        PathGuard(self)
    }

    pub fn enter_index(&self, index: usize) -> PathGuard<'_, 'a> {
        self.path.borrow_mut().push_index(index);
        PathGuard(self)
    }

    /// Goes one level deeper.
    ///
    /// # Errors
    ///
    /// [`MapperError::DepthLimitExceeded`] past the configured maximum.
    pub fn descend(&self) -> Result<DepthGuard<'_, 'a>, MapperError> {
        let max_depth = self.mapper.config().max_depth;
        let depth = self.depth.get() + 1;
        if depth > max_depth {
            return Err(MapperError::DepthLimitExceeded {
                max_depth,
                path: self.path(),
            });
        }
        self.depth.set(depth);
        Ok(DepthGuard(self))
    }

    /// Marks an object as being written, or returns `None` if it already is.
    pub fn visit(&self, address: *const (), descriptor: &TypeDescriptor) -> Option<VisitGuard<'_, 'a>> {
        let key = (address, descriptor.id());
        let mut visiting = self.visiting.borrow_mut();
        if visiting.contains(&key) {
            return None;
        }
        visiting.push(key);
        Some(VisitGuard(self))
    }
}

// -----------------------------------------------------------------------------
// Guards

pub(crate) struct PathGuard<'c, 'a>(&'c CallContext<'a>);

impl Drop for PathGuard<'_, '_> {
    fn drop(&mut self) {
        self.0.path.borrow_mut().pop();
    }
}

pub(crate) struct DepthGuard<'c, 'a>(&'c CallContext<'a>);

impl Drop for DepthGuard<'_, '_> {
    fn drop(&mut self) {
        self.0.depth.set(self.0.depth.get().saturating_sub(1));
    }
}

pub(crate) struct VisitGuard<'c, 'a>(&'c CallContext<'a>);

impl Drop for VisitGuard<'_, '_> {
    fn drop(&mut self) {
        self.0.visiting.borrow_mut().pop();
    }
}
