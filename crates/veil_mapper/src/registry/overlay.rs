use std::any::TypeId;
use std::sync::Arc;

use log::warn;
use veil_schema::info::TypeDescriptor;
use veil_utils::TypeIdMap;
use veil_utils::hash::{HashMap, HashSet};

use super::next_stamp;
use crate::MapperError;

// -----------------------------------------------------------------------------
// FieldAction

/// What an overlay does with one field of its type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldAction {
    #[default]
    Keep,
    Rename(String),
    Exclude,
}

// -----------------------------------------------------------------------------
// OverlaySpec

/// A substitute view of a type's fields: each field is kept, renamed or
/// excluded, without touching the type itself.
///
/// Fields not mentioned are kept under their own name. An overlay never adds
/// fields; naming a field the type does not have is rejected when the
/// overlay is set.
///
/// # Examples
///
/// ```
/// use veil_mapper::{FieldAction, OverlaySpec};
///
/// let overlay = OverlaySpec::new("rectangle-view")
///     .rename("w", "width")
///     .exclude("h");
///
/// assert_eq!(overlay.action("w"), &FieldAction::Rename("width".into()));
/// assert_eq!(overlay.output_name("h"), None);
/// assert_eq!(overlay.output_name("name"), Some("name"));
/// ```
#[derive(Debug, Clone)]
pub struct OverlaySpec {
    id: String,
    actions: HashMap<String, FieldAction>,
    stamp: u64,
}

impl OverlaySpec {
    /// Creates an overlay that keeps every field.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            actions: HashMap::default(),
            stamp: next_stamp(),
        }
    }

    /// Writes and reads `field` as `to`.
    #[must_use]
    pub fn rename(self, field: impl Into<String>, to: impl Into<String>) -> Self {
        self.with_action(field, FieldAction::Rename(to.into()))
    }

    /// Never writes `field` and ignores it on input.
    #[must_use]
    pub fn exclude(self, field: impl Into<String>) -> Self {
        self.with_action(field, FieldAction::Exclude)
    }

    /// Excludes every field in `fields`.
    #[must_use]
    pub fn exclude_all<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        fields.into_iter().fold(self, |spec, field| spec.exclude(field))
    }

    /// Sets the action for `field`, replacing any earlier one.
    #[must_use]
    pub fn with_action(mut self, field: impl Into<String>, action: FieldAction) -> Self {
        self.actions.insert(field.into(), action);
        self.stamp = next_stamp();
        self
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the action for `field`.
    pub fn action(&self, field: &str) -> &FieldAction {
        static KEEP: FieldAction = FieldAction::Keep;
        self.actions.get(field).unwrap_or(&KEEP)
    }

    /// Returns the name `field` is written under, or `None` if excluded.
    pub fn output_name<'a>(&'a self, field: &'a str) -> Option<&'a str> {
        match self.action(field) {
            FieldAction::Keep => Some(field),
            FieldAction::Rename(to) => Some(to),
            FieldAction::Exclude => None,
        }
    }

    #[inline]
    pub(crate) fn stamp(&self) -> u64 {
        self.stamp
    }

    /// Checks the overlay against the type it is set for.
    pub(crate) fn validate(&self, descriptor: &TypeDescriptor) -> Result<(), MapperError> {
        let invalid = |reason: String| MapperError::invalid_registration(descriptor.path(), reason);

        if self.id.is_empty() {
            return Err(invalid("overlay id is empty".to_owned()));
        }
        let Some(shape) = descriptor.as_struct() else {
            return Err(invalid("overlays apply to types with named fields only".to_owned()));
        };

        let mut unknown: Vec<&str> = self
            .actions
            .keys()
            .map(String::as_str)
            .filter(|name| shape.field(name).is_none())
            .collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            return Err(invalid(format!("unknown fields {unknown:?}")));
        }

        let mut seen = HashSet::default();
        for name in shape.field_names() {
            if let Some(output) = self.output_name(name)
                && !seen.insert(output)
            {
                return Err(invalid(format!("two fields would be written as `{output}`")));
            }
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// OverlayRegistry

/// `type -> OverlaySpec`, last write wins.
#[derive(Default)]
pub(crate) struct OverlayRegistry {
    by_type: TypeIdMap<Arc<OverlaySpec>>,
}

impl OverlayRegistry {
    /// Sets the overlay for a type, returning the one it replaced.
    pub fn set(&mut self, descriptor: &TypeDescriptor, spec: OverlaySpec) -> Option<Arc<OverlaySpec>> {
        let previous = self.by_type.insert(descriptor.id(), Arc::new(spec));
        if let Some(previous) = &previous {
            warn!(
                "overlay `{}` for `{}` replaced by a new overlay; overlays are not merged",
                previous.id(),
                descriptor.path(),
            );
        }
        previous
    }

    pub fn resolve(&self, type_id: TypeId) -> Option<&Arc<OverlaySpec>> {
        self.by_type.get(&type_id)
    }

    pub fn remove(&mut self, type_id: TypeId) -> Option<Arc<OverlaySpec>> {
        self.by_type.remove(&type_id)
    }

    pub fn clear(&mut self) {
        self.by_type.clear();
    }
}

#[cfg(test)]
mod tests {
    use veil_schema::{Describe, Introspect};

    use super::{OverlayRegistry, OverlaySpec};
    use crate::MapperError;

    #[derive(Introspect, Default)]
    struct Rectangle {
        w: i32,
        h: i32,
        name: String,
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let spec = OverlaySpec::new("m").exclude("depth");
        let err = spec.validate(Rectangle::type_descriptor()).unwrap_err();
        assert!(matches!(err, MapperError::InvalidRegistration { .. }));
        assert!(err.to_string().contains("depth"));
    }

    #[test]
    fn colliding_names_are_rejected() {
        let spec = OverlaySpec::new("m").rename("w", "name");
        assert!(spec.validate(Rectangle::type_descriptor()).is_err());
        let swapped = OverlaySpec::new("m").rename("w", "name").rename("name", "label");
        assert!(swapped.validate(Rectangle::type_descriptor()).is_ok());
    }

    #[test]
    fn scalars_take_no_overlay() {
        assert!(OverlaySpec::new("m").validate(i32::type_descriptor()).is_err());
        assert!(OverlaySpec::new("").validate(Rectangle::type_descriptor()).is_err());
    }

    #[test]
    fn set_replaces_without_merging() {
        let mut registry = OverlayRegistry::default();
        let info = Rectangle::type_descriptor();
        registry.set(info, OverlaySpec::new("a").exclude("h"));
        let previous = registry.set(info, OverlaySpec::new("b").exclude("w"));
        assert_eq!(previous.unwrap().id(), "a");

        let current = registry.resolve(info.id()).unwrap();
        assert_eq!(current.id(), "b");
        assert_eq!(current.output_name("h"), Some("h"));
        assert_eq!(current.output_name("w"), None);
    }
}
