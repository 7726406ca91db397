use std::io;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::debug;
use serde::de::DeserializeSeed;
use serde::{Deserializer, Serialize, Serializer};
use veil_schema::info::{Shape, TypeDescriptor};
use veil_schema::{Describe, FieldCatalog, FromValue, Introspect, Value};
use veil_utils::TypeIdMap;

use crate::cache::{ResolutionCache, Strategy};
use crate::context::CallContext;
use crate::de::ShapeSeed;
use crate::registry::{FilterSpec, OverlaySpec, Registries, TypeSerializer, next_stamp};
use crate::ser::{RootSerializer, RootsSerializer};
use crate::{DateFormat, MapperBuilder, MapperConfig, MapperError, SerializeOptions, Session, TargetShape};

/// Overlays local to one call, on top of the registered ones.
pub(crate) type LocalOverlays = TypeIdMap<OverlaySpec>;

// -----------------------------------------------------------------------------
// Mapper

/// The serialization service: filter, overlay and serializer registries, the
/// resolution cache and the field catalog, shared by every call.
///
/// A `Mapper` is `Send + Sync`; share it behind a reference or an `Arc`.
/// Registrations take effect for every call that starts after they return.
///
/// # Examples
///
/// ```
/// use veil_mapper::{Mapper, OverlaySpec};
/// use veil_schema::Introspect;
///
/// #[derive(Introspect, Default, Debug, PartialEq)]
/// struct Bean {
///     name: String,
///     age: i32,
/// }
///
/// let mapper = Mapper::new();
/// let joe = Bean { name: "joe".into(), age: 12 };
///
/// mapper.register_filter::<Bean>("name-only", ["name"]).unwrap();
/// assert_eq!(mapper.serialize_filtered(&joe, "name-only").unwrap(), r#"{"name":"joe"}"#);
/// assert_eq!(mapper.serialize(&joe).unwrap(), r#"{"name":"joe","age":12}"#);
///
/// mapper.set_overlay::<Bean>(OverlaySpec::new("renamed").rename("age", "years")).unwrap();
/// let json = mapper.serialize(&joe).unwrap();
/// assert_eq!(json, r#"{"name":"joe","years":12}"#);
/// assert_eq!(mapper.deserialize::<Bean>(&json).unwrap(), joe);
/// ```
pub struct Mapper {
    config: MapperConfig,
    date_format: DateFormat,
    catalog: FieldCatalog,
    registries: RwLock<Registries>,
    cache: ResolutionCache,
}

impl Mapper {
    /// The filter id used by [`serialize_only`](Self::serialize_only).
    pub const SERIALIZE_ONLY: &'static str = "veil::serialize_only";

    /// Creates a mapper with the default configuration.
    pub fn new() -> Self {
        Self::from_parts(MapperConfig::default(), DateFormat::default(), FieldCatalog::new())
    }

    /// Returns a builder for a custom configuration.
    #[inline]
    pub fn builder() -> MapperBuilder {
        MapperBuilder::new()
    }

    pub(crate) fn from_parts(config: MapperConfig, date_format: DateFormat, catalog: FieldCatalog) -> Self {
        Self {
            config,
            date_format,
            catalog,
            registries: RwLock::new(Registries::default()),
            cache: ResolutionCache::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Returns the pattern every date is written and read with.
    #[inline]
    pub fn date_format(&self) -> &DateFormat {
        &self.date_format
    }

    #[inline]
    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    #[inline]
    pub(crate) fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    fn read(&self) -> RwLockReadGuard<'_, Registries> {
        self.registries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registries> {
        self.registries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with the registries locked for reading.
    fn with_context<R>(
        &self,
        filter_id: Option<&str>,
        overlays: Option<&LocalOverlays>,
        f: impl FnOnce(&CallContext<'_>) -> R,
    ) -> R {
        let registries = self.read();
        let ctx = CallContext::new(self, &registries, filter_id, overlays);
        f(&ctx)
    }

    // -------------------------------------------------------------------------
    // Filters

    /// Registers an allow-list of fields for `T` under `id`, replacing any
    /// list registered under the same id.
    ///
    /// Names the type does not have are kept but never match.
    ///
    /// # Errors
    ///
    /// [`MapperError::InvalidRegistration`] for an empty id or a type without
    /// named fields.
    pub fn register_filter<T: Describe>(
        &self,
        id: &str,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<(), MapperError> {
        self.register_filter_for(T::type_descriptor(), id, fields)
    }

    fn register_filter_for(
        &self,
        descriptor: &'static TypeDescriptor,
        id: &str,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<(), MapperError> {
        if id.is_empty() {
            return Err(MapperError::invalid_registration(descriptor.path(), "filter id is empty"));
        }
        if !descriptor.is_struct() {
            return Err(MapperError::invalid_registration(
                descriptor.path(),
                "filters apply to types with named fields only",
            ));
        }

        let spec = FilterSpec::new(id, fields);
        debug!("filter `{id}` for `{}`: {spec:?}", descriptor.path());
        self.write().filters.register(descriptor.id(), spec);
        self.cache.purge_type(descriptor.id());
        Ok(())
    }

    /// Returns the filter registered for `T` under `id`.
    pub fn resolve_filter<T: Describe>(&self, id: &str) -> Option<Arc<FilterSpec>> {
        self.read().filters.resolve(T::type_descriptor().id(), id).cloned()
    }

    /// Removes the filter registered for `T` under `id`; returns whether
    /// there was one.
    pub fn clear_filter<T: Describe>(&self, id: &str) -> bool {
        let descriptor = T::type_descriptor();
        let removed = self.write().filters.remove(descriptor.id(), id).is_some();
        if removed {
            debug!("filter `{id}` for `{}` cleared", descriptor.path());
            self.cache.purge_type(descriptor.id());
        }
        removed
    }

    /// Removes every filter.
    pub fn clear_filters(&self) {
        self.write().filters.clear();
        self.cache.clear();
        debug!("all filters cleared");
    }

    // -------------------------------------------------------------------------
    // Overlays

    /// Sets the overlay of `T`, returning the overlay it replaced.
    ///
    /// Overlays are never merged: the previous overlay is discarded whole.
    ///
    /// # Errors
    ///
    /// [`MapperError::InvalidRegistration`] if the overlay id is empty, `T`
    /// has no named fields, the overlay names a field `T` does not have, or
    /// two fields would be written under the same name.
    pub fn set_overlay<T: Describe>(
        &self,
        overlay: OverlaySpec,
    ) -> Result<Option<Arc<OverlaySpec>>, MapperError> {
        let descriptor = T::type_descriptor();
        overlay.validate(descriptor)?;

        debug!("overlay `{}` set for `{}`", overlay.id(), descriptor.path());
        let previous = self.write().overlays.set(descriptor, overlay);
        self.cache.purge_type(descriptor.id());
        Ok(previous)
    }

    /// Returns the overlay of `T`.
    pub fn resolve_overlay<T: Describe>(&self) -> Option<Arc<OverlaySpec>> {
        self.read().overlays.resolve(T::type_descriptor().id()).cloned()
    }

    /// Removes the overlay of `T`; returns whether there was one.
    pub fn clear_overlay<T: Describe>(&self) -> bool {
        let descriptor = T::type_descriptor();
        let removed = self.write().overlays.remove(descriptor.id()).is_some();
        if removed {
            debug!("overlay for `{}` cleared", descriptor.path());
            self.cache.purge_type(descriptor.id());
        }
        removed
    }

    /// Removes every overlay.
    pub fn clear_overlays(&self) {
        self.write().overlays.clear();
        self.cache.clear();
        debug!("all overlays cleared");
    }

    // -------------------------------------------------------------------------
    // Custom serializers

    /// Registers a serializer for the runtime type it was created for.
    pub fn register_serializer(&self, serializer: TypeSerializer) {
        debug!("custom serializer for `{}`", serializer.descriptor().path());
        self.write().serializers.register(serializer);
    }

    /// Removes the serializer of `T`; returns whether there was one.
    pub fn clear_serializer<T: Describe>(&self) -> bool {
        self.write().serializers.remove(T::type_descriptor().id()).is_some()
    }

    /// Drops every filter, overlay and custom serializer, and empties the
    /// resolution cache. The configuration is kept.
    pub fn reset(&self) {
        self.write().clear();
        self.cache.clear();
        debug!("mapper reset");
    }

    // -------------------------------------------------------------------------
    // Serialization

    /// Writes `value` as compact JSON.
    ///
    /// # Errors
    ///
    /// [`MapperError::UnsupportedType`], [`MapperError::CircularReference`],
    /// [`MapperError::DepthLimitExceeded`] or [`MapperError::Custom`].
    pub fn serialize(&self, value: &dyn Introspect) -> Result<String, MapperError> {
        self.serialize_with_options(value, &SerializeOptions::default())
    }

    /// Writes `value` as indented JSON.
    pub fn serialize_pretty(&self, value: &dyn Introspect) -> Result<String, MapperError> {
        self.json(value, &SerializeOptions::default(), None, true)
    }

    /// Writes `value`, applying the filter `filter_id` to every object whose
    /// type registered it.
    pub fn serialize_filtered(&self, value: &dyn Introspect, filter_id: &str) -> Result<String, MapperError> {
        self.serialize_with_options(value, &SerializeOptions::filtered(filter_id))
    }

    pub fn serialize_with_options(
        &self,
        value: &dyn Introspect,
        options: &SerializeOptions,
    ) -> Result<String, MapperError> {
        self.json(value, options, None, false)
    }

    /// Writes `value` to any serde serializer.
    ///
    /// ```
    /// use veil_mapper::{Mapper, SerializeOptions};
    ///
    /// let mapper = Mapper::new();
    /// let value = mapper
    ///     .serialize_with(&vec![1, 2], &SerializeOptions::default(), serde_json::value::Serializer)
    ///     .unwrap();
    /// assert_eq!(value, serde_json::json!([1, 2]));
    /// ```
    pub fn serialize_with<S: Serializer>(
        &self,
        value: &dyn Introspect,
        options: &SerializeOptions,
        serializer: S,
    ) -> Result<S::Ok, MapperError> {
        self.serialize_in(value, options, None, serializer)
    }

    /// Writes `value` as compact JSON to `writer`.
    pub fn serialize_to_writer<W: io::Write>(
        &self,
        value: &dyn Introspect,
        options: &SerializeOptions,
        writer: W,
    ) -> Result<(), MapperError> {
        self.with_context(options.filter_id.as_deref(), None, |ctx| {
            let root = RootSerializer {
                value,
                ctx,
                wrap_root: options.wrap_root,
            };
            ctx.finish(serde_json::to_writer(writer, &root), MapperError::Json)
        })
    }

    /// Writes several roots in one call.
    ///
    /// With [`SerializeOptions::roots_as_array`] (the default) the roots form
    /// one JSON array; otherwise each root is written on its own line.
    pub fn serialize_roots(
        &self,
        values: &[&dyn Introspect],
        options: &SerializeOptions,
    ) -> Result<String, MapperError> {
        self.roots(values, options, None)
    }

    /// Writes `value` with only `fields` of its root object type, or of the
    /// element type of a root collection.
    ///
    /// The allow-list lives for this call only. It is a filter like any
    /// other: an overlay registered for the target type takes precedence and
    /// the allow-list is ignored for that type.
    ///
    /// ```
    /// use veil_mapper::Mapper;
    /// use veil_schema::Introspect;
    ///
    /// #[derive(Introspect, Default)]
    /// struct Bean {
    ///     name: String,
    ///     age: i32,
    /// }
    ///
    /// let mapper = Mapper::new();
    /// let beans = vec![Bean { name: "a".into(), age: 1 }, Bean { name: "b".into(), age: 2 }];
    /// let json = mapper.serialize_only(&beans, ["age"]).unwrap();
    /// assert_eq!(json, r#"[{"age":1},{"age":2}]"#);
    /// ```
    pub fn serialize_only(
        &self,
        value: &dyn Introspect,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<String, MapperError> {
        let mut target = value.descriptor();
        while let Shape::Optional(inner) | Shape::Sequence(inner) = target.shape() {
            target = inner();
        }

        let id = format!("{}#{}", Self::SERIALIZE_ONLY, next_stamp());
        self.register_filter_for(target, &id, fields)?;
        let result = self.serialize_with_options(value, &SerializeOptions::filtered(id.as_str()));

        if self.write().filters.remove(target.id(), &id).is_some() {
            self.cache.purge_type(target.id());
        }
        result
    }

    /// Returns how the fields of `T` resolve under `filter_id` and the
    /// registered overlay, and the names they are written under.
    ///
    /// ```
    /// use veil_mapper::{Mapper, Strategy};
    /// use veil_schema::Introspect;
    ///
    /// #[derive(Introspect, Default)]
    /// struct Bean {
    ///     name: String,
    ///     age: i32,
    /// }
    ///
    /// let mapper = Mapper::new();
    /// mapper.register_filter::<Bean>("f", ["age"]).unwrap();
    ///
    /// let (strategy, names) = mapper.effective_fields::<Bean>(Some("f")).unwrap();
    /// assert_eq!(strategy, Strategy::Filtered);
    /// assert_eq!(names, ["age"]);
    /// ```
    pub fn effective_fields<T: Describe>(
        &self,
        filter_id: Option<&str>,
    ) -> Result<(Strategy, Vec<String>), MapperError> {
        self.with_context(filter_id, None, |ctx| {
            let resolution = ctx.resolve(T::type_descriptor())?;
            let names = resolution.output().map(|field| field.name.to_string()).collect();
            Ok((resolution.strategy(), names))
        })
    }

    pub(crate) fn serialize_in<S: Serializer>(
        &self,
        value: &dyn Introspect,
        options: &SerializeOptions,
        overlays: Option<&LocalOverlays>,
        serializer: S,
    ) -> Result<S::Ok, MapperError> {
        self.with_context(options.filter_id.as_deref(), overlays, |ctx| {
            let root = RootSerializer {
                value,
                ctx,
                wrap_root: options.wrap_root,
            };
            ctx.finish(root.serialize(serializer), |err| MapperError::Message(err.to_string()))
        })
    }

    pub(crate) fn json(
        &self,
        value: &dyn Introspect,
        options: &SerializeOptions,
        overlays: Option<&LocalOverlays>,
        pretty: bool,
    ) -> Result<String, MapperError> {
        self.with_context(options.filter_id.as_deref(), overlays, |ctx| {
            let root = RootSerializer {
                value,
                ctx,
                wrap_root: options.wrap_root,
            };
            to_json(ctx, &root, pretty)
        })
    }

    pub(crate) fn roots(
        &self,
        values: &[&dyn Introspect],
        options: &SerializeOptions,
        overlays: Option<&LocalOverlays>,
    ) -> Result<String, MapperError> {
        self.with_context(options.filter_id.as_deref(), overlays, |ctx| {
            if options.roots_as_array {
                let roots = RootsSerializer {
                    values,
                    ctx,
                    wrap_root: options.wrap_root,
                };
                return to_json(ctx, &roots, false);
            }

            let lines = values
                .iter()
                .map(|&value| {
                    let root = RootSerializer {
                        value,
                        ctx,
                        wrap_root: options.wrap_root,
                    };
                    to_json(ctx, &root, false)
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(lines.join("\n"))
        })
    }

    // -------------------------------------------------------------------------
    // Deserialization

    /// Reads a `T` from JSON.
    ///
    /// Absent and `null` fields take their default value; unknown fields are
    /// ignored.
    ///
    /// # Errors
    ///
    /// [`MapperError::TypeMismatch`] when a token cannot be coerced to the
    /// declared kind, [`MapperError::Json`] for malformed input.
    pub fn deserialize<T: Describe + FromValue>(&self, json: &str) -> Result<T, MapperError> {
        let value = self.deserialize_value(json, TargetShape::of::<T>())?;
        Ok(T::from_value(value)?)
    }

    /// Reads a JSON array of `T`.
    pub fn deserialize_collection<T: Describe + FromValue>(&self, json: &str) -> Result<Vec<T>, MapperError> {
        let value = self.deserialize_value(json, TargetShape::collection_of::<T>())?;
        Ok(Vec::<T>::from_value(value)?)
    }

    /// Reads JSON as an untyped tree shaped after `target`.
    pub fn deserialize_value(&self, json: &str, target: TargetShape) -> Result<Value, MapperError> {
        self.read_json(json, target, None)
    }

    /// Reads any JSON as an untyped tree. Dates stay strings.
    pub fn deserialize_untyped(&self, json: &str) -> Result<Value, MapperError> {
        self.deserialize_value(json, TargetShape::Untyped)
    }

    /// Reads a `T` from any self-describing serde deserializer.
    pub fn deserialize_from<'de, T, D>(&self, deserializer: D) -> Result<T, MapperError>
    where
        T: Describe + FromValue,
        D: Deserializer<'de>,
    {
        let value = self.with_context(None, None, |ctx| {
            let value = ShapeSeed::new(TargetShape::of::<T>(), ctx).deserialize(deserializer);
            ctx.finish(value, |err| MapperError::Message(err.to_string()))
        })?;
        Ok(T::from_value(value)?)
    }

    pub(crate) fn read_json(
        &self,
        json: &str,
        target: TargetShape,
        overlays: Option<&LocalOverlays>,
    ) -> Result<Value, MapperError> {
        self.with_context(None, overlays, |ctx| {
            let mut deserializer = serde_json::Deserializer::from_str(json);
            let value = ShapeSeed::new(target, ctx).deserialize(&mut deserializer);
            let value = ctx.finish(value, MapperError::Json)?;
            deserializer.end()?;
            Ok(value)
        })
    }

    // -------------------------------------------------------------------------
    // Sessions

    /// Starts a call with its own filter, options and overlays.
    #[inline]
    pub fn session(&self) -> Session<'_> {
        Session::new(self)
    }
}

impl Default for Mapper {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

fn to_json<T: Serialize>(ctx: &CallContext<'_>, value: &T, pretty: bool) -> Result<String, MapperError> {
    let result = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    ctx.finish(result, MapperError::Json)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::collections::BTreeMap;

    use chrono::{NaiveDate, NaiveDateTime};
    use veil_schema::info::{DescriptorCell, Shape, TypeDescriptor};
    use veil_schema::{Describe, Inspect, Introspect, Value};

    use super::Mapper;
    use crate::{MapperError, OverlaySpec, SerializeOptions, Strategy, TargetShape, TypeSerializer};

    #[derive(Introspect, Default, Debug, PartialEq, Clone)]
    struct Bean {
        name: String,
        age: i32,
    }

    fn bean(name: &str, age: i32) -> Bean {
        Bean {
            name: name.to_owned(),
            age,
        }
    }

    #[derive(Introspect, Default, Debug, PartialEq)]
    struct Rectangle {
        w: i32,
        h: i32,
        size: i32,
        name: String,
    }

    fn rectangle(w: i32, h: i32, name: &str) -> Rectangle {
        Rectangle {
            w,
            h,
            size: w * h,
            name: name.to_owned(),
        }
    }

    #[derive(Introspect, Default, Debug, PartialEq, Clone, Copy)]
    enum Level {
        #[default]
        Low,
        High,
    }

    #[derive(Introspect, Default, Debug, PartialEq)]
    struct Profile {
        name: String,
        age: u8,
        score: f64,
        active: bool,
        tags: Vec<String>,
        born: NaiveDate,
        nickname: Option<String>,
        level: Level,
        friends: Vec<Bean>,
    }

    #[derive(Introspect, Default, Debug, PartialEq)]
    struct Event {
        title: String,
        at: NaiveDateTime,
    }

    struct Handle;

    impl Describe for Handle {
        fn type_descriptor() -> &'static TypeDescriptor {
            static CELL: DescriptorCell = DescriptorCell::new();
            CELL.get_or_init(|| TypeDescriptor::new::<Self>("tests::Handle", "Handle", "Handle", Shape::Opaque))
        }
    }

    impl Introspect for Handle {
        fn descriptor(&self) -> &'static TypeDescriptor {
            Self::type_descriptor()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn inspect(&self) -> Inspect<'_> {
            Inspect::Null
        }
    }

    #[test]
    fn name_only_filter() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mapper = Mapper::new();
        mapper.register_filter::<Bean>("name-only", ["name"]).unwrap();
        assert_eq!(
            mapper.serialize_filtered(&bean("joe", 12), "name-only").unwrap(),
            r#"{"name":"joe"}"#
        );
        // Unknown filter ids apply nothing.
        assert_eq!(
            mapper.serialize_filtered(&bean("joe", 12), "missing").unwrap(),
            r#"{"name":"joe","age":12}"#
        );
    }

    #[test]
    fn filter_follows_catalog_order() {
        let mapper = Mapper::new();
        mapper.register_filter::<Rectangle>("f", ["name", "w"]).unwrap();
        assert_eq!(
            mapper.serialize_filtered(&rectangle(5, 10, "jim"), "f").unwrap(),
            r#"{"w":5,"name":"jim"}"#
        );
    }

    #[test]
    fn rectangle_overlay() {
        let mapper = Mapper::new();
        mapper
            .set_overlay::<Rectangle>(
                OverlaySpec::new("mixin").rename("w", "width").exclude_all(["h", "size"]),
            )
            .unwrap();
        assert_eq!(
            mapper.serialize(&rectangle(5, 10, "jim")).unwrap(),
            r#"{"width":5,"name":"jim"}"#
        );
    }

    #[test]
    fn ten_beans() {
        let mapper = Mapper::new();
        mapper.register_filter::<Bean>("both", ["name", "age"]).unwrap();
        let beans: Vec<Bean> = (0..10).map(|i| bean(&format!("b{i}"), i)).collect();

        let json = mapper.serialize_filtered(&beans, "both").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let items = parsed.as_array().unwrap();
        assert_eq!(items.len(), 10);
        for (i, item) in items.iter().enumerate() {
            assert_eq!(item, &serde_json::json!({ "name": format!("b{i}"), "age": i }));
        }
    }

    #[test]
    fn absent_fields_take_defaults() {
        let mapper = Mapper::new();
        assert_eq!(mapper.deserialize::<Bean>(r#"{"name":"joe"}"#).unwrap(), bean("joe", 0));
        assert_eq!(
            mapper.deserialize::<Bean>(r#"{"name":null,"age":3,"extra":[1,{"x":2}]}"#).unwrap(),
            bean("", 3)
        );
    }

    #[test]
    fn round_trip_without_filters() {
        let mapper = Mapper::new();
        let profile = Profile {
            name: "ann".into(),
            age: 41,
            score: 0.25,
            active: true,
            tags: vec!["x".into(), "y".into()],
            born: NaiveDate::from_ymd_opt(1983, 7, 4).unwrap(),
            nickname: Some("a".into()),
            level: Level::High,
            friends: vec![bean("bo", 3)],
        };
        let json = mapper.serialize(&profile).unwrap();
        assert!(json.contains(r#""born":"04/07/1983""#), "{json}");
        assert!(json.contains(r#""level":"High""#), "{json}");
        assert_eq!(mapper.deserialize::<Profile>(&json).unwrap(), profile);
    }

    #[test]
    fn type_mismatch_reports_path() {
        let mapper = Mapper::new();
        let err = mapper
            .deserialize::<Profile>(r#"{"friends":[{"name":"a"},{"age":"old"}]}"#)
            .unwrap_err();
        match err {
            MapperError::TypeMismatch {
                path,
                expected,
                found,
            } => {
                assert_eq!(path, "$.friends[1].age");
                assert_eq!(expected, "integer");
                assert_eq!(found, r#"string "old""#);
            }
            other => panic!("unexpected {other}"),
        }

        let err = mapper.deserialize::<Profile>(r#"{"level":"Medium"}"#).unwrap_err();
        assert!(matches!(err, MapperError::TypeMismatch { .. }), "{err}");

        let err = mapper.deserialize::<Profile>(r#"{"age":300}"#).unwrap_err();
        match err {
            MapperError::TypeMismatch { path, expected, found } => {
                assert_eq!(path, "$.age");
                assert_eq!(expected, "u8 in 0..=255");
                assert_eq!(found, "integer");
            }
            other => panic!("unexpected {other}"),
        }
        let err = mapper
            .deserialize::<Profile>(r#"{"friends":[{"age":2147483648}]}"#)
            .unwrap_err();
        assert!(
            matches!(&err, MapperError::TypeMismatch { path, .. } if path == "$.friends[0].age"),
            "{err}"
        );

        let err = mapper.deserialize::<Bean>(r#"{"name":"#).unwrap_err();
        assert!(matches!(err, MapperError::Json(_)), "{err}");
    }

    #[test]
    fn overlay_replaces_without_merge() {
        let mapper = Mapper::new();
        let first = mapper
            .set_overlay::<Rectangle>(OverlaySpec::new("a").exclude("h"))
            .unwrap();
        assert!(first.is_none());
        let previous = mapper
            .set_overlay::<Rectangle>(OverlaySpec::new("b").rename("w", "width"))
            .unwrap();
        assert_eq!(previous.unwrap().id(), "a");
        assert_eq!(mapper.resolve_overlay::<Rectangle>().unwrap().id(), "b");

        assert_eq!(
            mapper.serialize(&rectangle(1, 2, "r")).unwrap(),
            r#"{"width":1,"h":2,"size":2,"name":"r"}"#
        );
    }

    #[test]
    fn overlay_wins_over_filter() {
        let mapper = Mapper::new();
        mapper.register_filter::<Bean>("f", ["age"]).unwrap();
        mapper.set_overlay::<Bean>(OverlaySpec::new("o").exclude("age")).unwrap();

        let (strategy, names) = mapper.effective_fields::<Bean>(Some("f")).unwrap();
        assert_eq!(strategy, Strategy::Overlaid);
        assert_eq!(names, ["name"]);

        assert!(mapper.clear_overlay::<Bean>());
        assert_eq!(mapper.serialize_filtered(&bean("x", 1), "f").unwrap(), r#"{"age":1}"#);
    }

    #[test]
    fn cache_never_serves_stale_entries() {
        let mapper = Mapper::new();
        let value = bean("joe", 12);

        mapper.register_filter::<Bean>("f1", ["name"]).unwrap();
        assert_eq!(mapper.serialize_filtered(&value, "f1").unwrap(), r#"{"name":"joe"}"#);

        mapper.register_filter::<Bean>("f2", ["age"]).unwrap();
        assert_eq!(mapper.serialize_filtered(&value, "f2").unwrap(), r#"{"age":12}"#);

        mapper.register_filter::<Bean>("f1", ["age", "name"]).unwrap();
        assert_eq!(
            mapper.serialize_filtered(&value, "f1").unwrap(),
            r#"{"name":"joe","age":12}"#
        );

        assert!(mapper.clear_filter::<Bean>("f2"));
        assert!(!mapper.clear_filter::<Bean>("f2"));
        assert_eq!(
            mapper.serialize_filtered(&value, "f2").unwrap(),
            r#"{"name":"joe","age":12}"#
        );

        mapper.set_overlay::<Bean>(OverlaySpec::new("o").exclude("name")).unwrap();
        assert_eq!(mapper.serialize(&value).unwrap(), r#"{"age":12}"#);
        mapper.set_overlay::<Bean>(OverlaySpec::new("o").exclude("age")).unwrap();
        assert_eq!(mapper.serialize(&value).unwrap(), r#"{"name":"joe"}"#);
    }

    #[test]
    fn invalid_registrations() {
        let mapper = Mapper::new();
        assert!(matches!(
            mapper.register_filter::<Bean>("", ["name"]),
            Err(MapperError::InvalidRegistration { .. })
        ));
        assert!(matches!(
            mapper.register_filter::<i32>("f", ["name"]),
            Err(MapperError::InvalidRegistration { .. })
        ));
        assert!(matches!(
            mapper.set_overlay::<Bean>(OverlaySpec::new("o").rename("nope", "x")),
            Err(MapperError::InvalidRegistration { .. })
        ));
        assert!(mapper.resolve_overlay::<Bean>().is_none());
    }

    #[test]
    fn dates_use_the_configured_pattern() {
        let at = NaiveDate::from_ymd_opt(2020, 1, 31)
            .unwrap()
            .and_hms_opt(13, 45, 0)
            .unwrap();
        let event = Event {
            title: "launch".into(),
            at,
        };

        let mapper = Mapper::new();
        let json = mapper.serialize(&event).unwrap();
        assert_eq!(json, r#"{"title":"launch","at":"31/01/2020"}"#);

        let text = mapper.deserialize_untyped(&json).unwrap();
        assert_eq!(text.get("at"), Some(&Value::from("31/01/2020")));

        let back = mapper.deserialize::<Event>(&json).unwrap();
        assert_eq!(back.at, at.date().and_hms_opt(0, 0, 0).unwrap());

        let precise = Mapper::builder().date_format("%Y-%m-%dT%H:%M:%S").build().unwrap();
        let json = precise.serialize(&event).unwrap();
        assert_eq!(json, r#"{"title":"launch","at":"2020-01-31T13:45:00"}"#);
        assert_eq!(precise.deserialize::<Event>(&json).unwrap(), event);
    }

    #[test]
    fn mixed_collection_with_two_overlays() {
        let mapper = Mapper::new();
        mapper.set_overlay::<Bean>(OverlaySpec::new("b").exclude("age")).unwrap();
        mapper
            .set_overlay::<Rectangle>(OverlaySpec::new("r").exclude_all(["w", "h", "size"]))
            .unwrap();

        let items: Vec<Box<dyn Introspect>> = vec![
            Box::new(bean("joe", 12)),
            Box::new(rectangle(2, 3, "r1")),
            Box::new(7_i64),
        ];
        assert_eq!(
            mapper.serialize(&items).unwrap(),
            r#"[{"name":"joe"},{"name":"r1"},7]"#
        );
    }

    #[test]
    fn overlays_apply_to_input() {
        let mapper = Mapper::new();
        mapper
            .set_overlay::<Rectangle>(OverlaySpec::new("m").rename("w", "width").exclude("h"))
            .unwrap();

        let rect = mapper
            .deserialize::<Rectangle>(r#"{"width":5,"w":99,"h":10,"size":50,"name":"jim"}"#)
            .unwrap();
        assert_eq!(
            rect,
            Rectangle {
                w: 5,
                h: 0,
                size: 50,
                name: "jim".into(),
            }
        );

        let many = mapper
            .deserialize_collection::<Rectangle>(r#"[{"width":1},{"name":"b"}]"#)
            .unwrap();
        assert_eq!(many.len(), 2);
        assert_eq!(many[0].w, 1);
        assert_eq!(many[1].name, "b");
    }

    #[test]
    fn reset_restores_defaults() {
        let mapper = Mapper::new();
        mapper.register_filter::<Bean>("f", ["name"]).unwrap();
        mapper.set_overlay::<Bean>(OverlaySpec::new("o").exclude("name")).unwrap();
        mapper.register_serializer(TypeSerializer::with(|b: &Bean| b.name.clone()));
        assert_eq!(mapper.serialize(&bean("a", 1)).unwrap(), r#""a""#);

        mapper.reset();
        assert!(mapper.resolve_filter::<Bean>("f").is_none());
        assert!(mapper.resolve_overlay::<Bean>().is_none());
        assert_eq!(mapper.cache().len(), 0);
        assert_eq!(
            mapper.serialize_filtered(&bean("a", 1), "f").unwrap(),
            r#"{"name":"a","age":1}"#
        );
        assert_eq!(mapper.config().date_format, "%d/%m/%Y");
    }

    #[test]
    fn custom_serializer_takes_priority() {
        let mapper = Mapper::new();
        mapper.register_filter::<Rectangle>("f", ["w"]).unwrap();
        mapper.register_serializer(TypeSerializer::with(|rects: &Vec<Rectangle>| {
            rects
                .iter()
                .map(|r| (r.name.clone(), r.size))
                .collect::<BTreeMap<_, _>>()
        }));

        let rects = vec![rectangle(2, 3, "b"), rectangle(1, 1, "a")];
        assert_eq!(mapper.serialize_filtered(&rects, "f").unwrap(), r#"{"a":1,"b":6}"#);

        assert!(mapper.clear_serializer::<Vec<Rectangle>>());
        assert_eq!(
            mapper.serialize_filtered(&rects, "f").unwrap(),
            r#"[{"w":2},{"w":1}]"#
        );
    }

    #[test]
    fn wrap_root_and_roots() {
        let mapper = Mapper::new();
        let options = SerializeOptions {
            wrap_root: true,
            ..SerializeOptions::default()
        };
        assert_eq!(
            mapper.serialize_with_options(&bean("a", 1), &options).unwrap(),
            r#"{"Bean":{"name":"a","age":1}}"#
        );

        let roots: [&dyn Introspect; 2] = [&bean("a", 1), &rectangle(1, 1, "r")];
        assert_eq!(
            mapper.serialize_roots(&roots, &SerializeOptions::default()).unwrap(),
            r#"[{"name":"a","age":1},{"w":1,"h":1,"size":1,"name":"r"}]"#
        );

        let mut out = Vec::new();
        mapper
            .serialize_to_writer(&bean("w", 2), &SerializeOptions::default(), &mut out)
            .unwrap();
        assert_eq!(out, br#"{"name":"w","age":2}"#);

        let pretty = mapper.serialize_pretty(&bean("p", 3)).unwrap();
        assert_eq!(pretty, "{\n  \"name\": \"p\",\n  \"age\": 3\n}");
    }

    #[test]
    fn serialize_only_leaves_no_registration() {
        let mapper = Mapper::new();
        assert_eq!(
            mapper.serialize_only(&bean("a", 1), ["name"]).unwrap(),
            r#"{"name":"a"}"#
        );
        assert_eq!(mapper.serialize(&bean("a", 1)).unwrap(), r#"{"name":"a","age":1}"#);
        assert!(mapper.serialize_only(&5_i32, ["x"]).is_err());
    }

    #[test]
    fn serialize_only_yields_to_overlay() {
        let mapper = Mapper::new();
        mapper
            .set_overlay::<Rectangle>(OverlaySpec::new("mixin").rename("w", "width"))
            .unwrap();
        assert_eq!(
            mapper.serialize_only(&rectangle(2, 3, "r"), ["name"]).unwrap(),
            r#"{"width":2,"h":3,"size":6,"name":"r"}"#
        );

        mapper.clear_overlay::<Rectangle>();
        assert_eq!(
            mapper.serialize_only(&rectangle(2, 3, "r"), ["name"]).unwrap(),
            r#"{"name":"r"}"#
        );
    }

    #[test]
    fn opaque_types_are_unsupported() {
        let mapper = Mapper::new();
        assert!(matches!(
            mapper.serialize(&Handle),
            Err(MapperError::UnsupportedType { .. })
        ));
        assert!(matches!(
            mapper.deserialize_value("{}", TargetShape::of::<Handle>()),
            Err(MapperError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn reads_other_formats() {
        let mapper = Mapper::new();
        mapper.set_overlay::<Bean>(OverlaySpec::new("o").rename("age", "years")).unwrap();

        let mut de = ron::Deserializer::from_str(r#"{"name": "joe", "years": 12}"#).unwrap();
        let value: Bean = mapper.deserialize_from(&mut de).unwrap();
        assert_eq!(value, bean("joe", 12));
    }

    #[test]
    fn concurrent_calls_see_their_own_filters() {
        let mapper = Mapper::new();
        let fields = ["name", "age"];
        for (i, field) in fields.iter().enumerate() {
            mapper.register_filter::<Bean>(&format!("f{i}"), [*field]).unwrap();
        }

        std::thread::scope(|scope| {
            for t in 0..8 {
                let mapper = &mapper;
                scope.spawn(move || {
                    let id = format!("f{}", t % 2);
                    let expected = if t % 2 == 0 { r#"{"name":"joe"}"# } else { r#"{"age":12}"# };
                    for _ in 0..200 {
                        let json = mapper.serialize_filtered(&bean("joe", 12), &id).unwrap();
                        assert_eq!(json, expected);
                    }
                });
            }
            scope.spawn(|| {
                for _ in 0..50 {
                    mapper.register_filter::<Bean>("other", ["age"]).unwrap();
                    mapper.clear_filter::<Bean>("other");
                }
            });
        });
    }
}
