use veil_schema::{Describe, FromValue, Introspect, Value};

use crate::mapper::LocalOverlays;
use crate::{Mapper, MapperError, OverlaySpec, SerializeOptions, TargetShape};

// -----------------------------------------------------------------------------
// Session

/// Options and overlays for one operation, chained before running it.
///
/// Overlays added here apply on top of the registered ones, for this session
/// only. Nothing is shared with other sessions or written back to the mapper.
///
/// # Examples
///
/// ```
/// use veil_mapper::{Mapper, OverlaySpec};
/// use veil_schema::Introspect;
///
/// #[derive(Introspect, Default)]
/// struct Rectangle {
///     w: i32,
///     h: i32,
///     name: String,
/// }
///
/// let mapper = Mapper::new();
/// let rect = Rectangle { w: 5, h: 10, name: "jim".into() };
///
/// let json = mapper
///     .session()
///     .overlay::<Rectangle>(OverlaySpec::new("m").rename("w", "width").exclude("h"))
///     .unwrap()
///     .wrap_root(true)
///     .serialize(&rect)
///     .unwrap();
/// assert_eq!(json, r#"{"Rectangle":{"width":5,"name":"jim"}}"#);
///
/// // The mapper itself is untouched.
/// assert_eq!(mapper.serialize(&rect).unwrap(), r#"{"w":5,"h":10,"name":"jim"}"#);
/// ```
#[must_use]
pub struct Session<'m> {
    mapper: &'m Mapper,
    options: SerializeOptions,
    overlays: LocalOverlays,
}

impl<'m> Session<'m> {
    pub(crate) fn new(mapper: &'m Mapper) -> Self {
        Self {
            mapper,
            options: SerializeOptions::default(),
            overlays: LocalOverlays::new(),
        }
    }

    /// Applies the filter `id` when writing.
    pub fn filter(mut self, id: impl Into<String>) -> Self {
        self.options.filter_id = Some(id.into());
        self
    }

    pub fn wrap_root(mut self, wrap_root: bool) -> Self {
        self.options.wrap_root = wrap_root;
        self
    }

    pub fn roots_as_array(mut self, roots_as_array: bool) -> Self {
        self.options.roots_as_array = roots_as_array;
        self
    }

    /// Replaces all serialization options.
    pub fn options(mut self, options: SerializeOptions) -> Self {
        self.options = options;
        self
    }

    /// Overlays `T` for this session, replacing an overlay added earlier to
    /// the same session.
    ///
    /// # Errors
    ///
    /// [`MapperError::InvalidRegistration`], as for
    /// [`Mapper::set_overlay`].
    pub fn overlay<T: Describe>(mut self, overlay: OverlaySpec) -> Result<Self, MapperError> {
        let descriptor = T::type_descriptor();
        overlay.validate(descriptor)?;
        self.overlays.insert(descriptor.id(), overlay);
        Ok(self)
    }

    #[inline]
    fn overlays(&self) -> Option<&LocalOverlays> {
        (!self.overlays.is_empty()).then_some(&self.overlays)
    }

    // -------------------------------------------------------------------------
    // Operations

    pub fn serialize(&self, value: &dyn Introspect) -> Result<String, MapperError> {
        self.mapper.json(value, &self.options, self.overlays(), false)
    }

    pub fn serialize_pretty(&self, value: &dyn Introspect) -> Result<String, MapperError> {
        self.mapper.json(value, &self.options, self.overlays(), true)
    }

    pub fn serialize_roots(&self, values: &[&dyn Introspect]) -> Result<String, MapperError> {
        self.mapper.roots(values, &self.options, self.overlays())
    }

    pub fn serialize_with<S: serde::Serializer>(
        &self,
        value: &dyn Introspect,
        serializer: S,
    ) -> Result<S::Ok, MapperError> {
        self.mapper.serialize_in(value, &self.options, self.overlays(), serializer)
    }

    pub fn deserialize<T: Describe + FromValue>(&self, json: &str) -> Result<T, MapperError> {
        let value = self.deserialize_value(json, TargetShape::of::<T>())?;
        Ok(T::from_value(value)?)
    }

    pub fn deserialize_collection<T: Describe + FromValue>(&self, json: &str) -> Result<Vec<T>, MapperError> {
        let value = self.deserialize_value(json, TargetShape::collection_of::<T>())?;
        Ok(Vec::<T>::from_value(value)?)
    }

    pub fn deserialize_value(&self, json: &str, target: TargetShape) -> Result<Value, MapperError> {
        self.mapper.read_json(json, target, self.overlays())
    }
}

#[cfg(test)]
mod tests {
    use veil_schema::Introspect;

    use crate::{Mapper, OverlaySpec};

    #[derive(Introspect, Default, Debug, PartialEq)]
    struct Bean {
        name: String,
        age: i32,
    }

    #[test]
    fn session_overlay_shadows_registered_one() {
        let mapper = Mapper::new();
        mapper
            .set_overlay::<Bean>(OverlaySpec::new("global").exclude("age"))
            .unwrap();
        let bean = Bean {
            name: "joe".into(),
            age: 12,
        };

        let local = mapper
            .session()
            .overlay::<Bean>(OverlaySpec::new("local").rename("name", "n"))
            .unwrap();
        assert_eq!(local.serialize(&bean).unwrap(), r#"{"n":"joe","age":12}"#);
        assert_eq!(local.deserialize::<Bean>(r#"{"n":"joe","age":12}"#).unwrap(), bean);

        assert_eq!(mapper.serialize(&bean).unwrap(), r#"{"name":"joe"}"#);
    }

    #[test]
    fn later_session_overlay_replaces_earlier() {
        let mapper = Mapper::new();
        let session = mapper
            .session()
            .overlay::<Bean>(OverlaySpec::new("a").exclude("name"))
            .unwrap()
            .overlay::<Bean>(OverlaySpec::new("b").exclude("age"))
            .unwrap();
        let bean = Bean {
            name: "x".into(),
            age: 1,
        };
        assert_eq!(session.serialize(&bean).unwrap(), r#"{"name":"x"}"#);
    }

    #[test]
    fn roots_one_per_line() {
        let mapper = Mapper::new();
        let a = Bean {
            name: "a".into(),
            age: 1,
        };
        let json = mapper
            .session()
            .roots_as_array(false)
            .wrap_root(true)
            .serialize_roots(&[&a, &2_i32])
            .unwrap();
        assert_eq!(json, "{\"Bean\":{\"name\":\"a\",\"age\":1}}\n{\"i32\":2}");
    }

    #[test]
    fn invalid_session_overlay() {
        let mapper = Mapper::new();
        assert!(mapper.session().overlay::<Bean>(OverlaySpec::new("x").exclude("nope")).is_err());
    }
}
