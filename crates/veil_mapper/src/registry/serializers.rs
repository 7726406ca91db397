use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use veil_schema::Describe;
use veil_schema::info::TypeDescriptor;
use veil_utils::TypeIdMap;

type Project = Arc<dyn Fn(&dyn Any) -> Option<Box<dyn erased_serde::Serialize>> + Send + Sync>;

enum Projection {
    /// The value is written through its own `Serialize` impl.
    Borrowed(for<'a> fn(&'a dyn Any) -> Option<&'a dyn erased_serde::Serialize>),
    /// The value is mapped to another serializable value first.
    Owned(Project),
}

// -----------------------------------------------------------------------------
// TypeSerializer

/// Replaces field resolution for every value of one runtime type.
///
/// A registered serializer takes priority over filters and overlays: the
/// value is handed to `serde` as is, or through a mapping function.
///
/// # Examples
///
/// ```
/// use veil_mapper::{Mapper, TypeSerializer};
/// use veil_schema::Introspect;
///
/// #[derive(Introspect, Default)]
/// struct Celsius {
///     degrees: f64,
/// }
///
/// let mapper = Mapper::new();
/// mapper.register_serializer(TypeSerializer::with(|c: &Celsius| format!("{}°C", c.degrees)));
///
/// let json = mapper.serialize(&Celsius { degrees: 21.5 }).unwrap();
/// assert_eq!(json, r#""21.5°C""#);
/// ```
pub struct TypeSerializer {
    descriptor: &'static TypeDescriptor,
    projection: Projection,
}

impl TypeSerializer {
    /// Writes values of `T` with their `serde::Serialize` impl.
    pub fn serde<T: Describe + Serialize + Send + Sync>() -> Self {
        Self {
            descriptor: T::type_descriptor(),
            projection: Projection::Borrowed(|value| {
                value
                    .downcast_ref::<T>()
                    .map(|value| value as &dyn erased_serde::Serialize)
            }),
        }
    }

    /// Writes values of `T` as whatever `f` returns.
    pub fn with<T, R, F>(f: F) -> Self
    where
        T: Describe,
        R: Serialize + 'static,
        F: Fn(&T) -> R + Send + Sync + 'static,
    {
        Self {
            descriptor: T::type_descriptor(),
            projection: Projection::Owned(Arc::new(move |value: &dyn Any| {
                value
                    .downcast_ref::<T>()
                    .map(|value| Box::new(f(value)) as Box<dyn erased_serde::Serialize>)
            })),
        }
    }

    /// Returns the descriptor of the type this serializer handles.
    #[inline]
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.descriptor
    }

    /// Writes `value`, or returns the serializer back if `value` is not of
    /// the handled type.
    pub(crate) fn serialize<S: Serializer>(
        &self,
        value: &dyn Any,
        serializer: S,
    ) -> Result<Result<S::Ok, S::Error>, S> {
        match &self.projection {
            Projection::Borrowed(project) => match project(value) {
                Some(projected) => Ok(projected.serialize(serializer)),
                None => Err(serializer),
            },
            Projection::Owned(project) => match project(value) {
                Some(projected) => Ok(projected.serialize(serializer)),
                None => Err(serializer),
            },
        }
    }
}

impl fmt::Debug for TypeSerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.projection {
            Projection::Borrowed(_) => "serde",
            Projection::Owned(_) => "mapped",
        };
        f.debug_struct("TypeSerializer")
            .field("type", &self.descriptor.path())
            .field("kind", &kind)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// SerializerRegistry

/// `type -> TypeSerializer`.
#[derive(Default)]
pub(crate) struct SerializerRegistry {
    by_type: TypeIdMap<Arc<TypeSerializer>>,
}

impl SerializerRegistry {
    pub fn register(&mut self, serializer: TypeSerializer) -> Option<Arc<TypeSerializer>> {
        self.by_type.insert(serializer.descriptor.id(), Arc::new(serializer))
    }

    pub fn get(&self, type_id: TypeId) -> Option<&Arc<TypeSerializer>> {
        self.by_type.get(&type_id)
    }

    pub fn remove(&mut self, type_id: TypeId) -> Option<Arc<TypeSerializer>> {
        self.by_type.remove(&type_id)
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_type.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::TypeSerializer;

    #[test]
    fn projections_write_through_serde() {
        let plain = TypeSerializer::serde::<i32>();
        let out = plain
            .serialize(&7_i32 as &dyn Any, serde_json::value::Serializer)
            .ok()
            .unwrap()
            .unwrap();
        assert_eq!(out, serde_json::json!(7));

        let mapped = TypeSerializer::with(|v: &i32| [*v, *v + 1]);
        let out = mapped
            .serialize(&7_i32 as &dyn Any, serde_json::value::Serializer)
            .ok()
            .unwrap()
            .unwrap();
        assert_eq!(out, serde_json::json!([7, 8]));
    }

    #[test]
    fn other_types_are_handed_back() {
        let plain = TypeSerializer::serde::<i32>();
        assert!(plain.serialize(&"x" as &dyn Any, serde_json::value::Serializer).is_err());
    }
}
