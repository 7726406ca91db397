use std::any::Any;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::BuildHasher;

use crate::impls::generic_names;
use crate::info::{GenericDescriptorCell, Shape, TypeDescriptor};
use crate::{Describe, FromValue, FromValueError, Inspect, Introspect, Value};

// -----------------------------------------------------------------------------
// Option

impl<T: Describe> Describe for Option<T> {
    fn type_descriptor() -> &'static TypeDescriptor {
        static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
        CELL.get_or_insert::<Self>(|| {
            let (path, name) = generic_names("core::option::Option", "Option", &[T::type_descriptor()]);
            TypeDescriptor::new::<Self>(path, name, "Option", Shape::Optional(T::type_descriptor))
        })
    }
}

impl<T: Describe + Introspect> Introspect for Option<T> {
    #[inline]
    fn descriptor(&self) -> &'static TypeDescriptor {
        Self::type_descriptor()
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn inspect(&self) -> Inspect<'_> {
        match self {
            Some(value) => value.inspect(),
            None => Inspect::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, FromValueError> {
        match value {
            Value::Null => Ok(None),
            value => T::from_value(value).map(Some),
        }
    }
}

// -----------------------------------------------------------------------------
// Sequences

macro_rules! impl_sequence {
    ($ty:ident, $path:literal) => {
        impl<T: Describe> Describe for $ty<T> {
            fn type_descriptor() -> &'static TypeDescriptor {
                static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
                CELL.get_or_insert::<Self>(|| {
                    let (path, name) = generic_names($path, stringify!($ty), &[T::type_descriptor()]);
                    TypeDescriptor::new::<Self>(path, name, stringify!($ty), Shape::Sequence(T::type_descriptor))
                })
            }
        }

        impl<T: Describe + Introspect> Introspect for $ty<T> {
            #[inline]
            fn descriptor(&self) -> &'static TypeDescriptor {
                Self::type_descriptor()
            }

            #[inline]
            fn as_any(&self) -> &dyn Any {
                self
            }

            fn inspect(&self) -> Inspect<'_> {
                Inspect::Seq(Box::new(self.iter().map(|e| e as &dyn Introspect)))
            }
        }

        impl<T: FromValue> FromValue for $ty<T> {
            fn from_value(value: Value) -> Result<Self, FromValueError> {
                match value {
                    Value::Seq(items) => items
                        .into_iter()
                        .enumerate()
                        .map(|(i, item)| T::from_value(item).map_err(|e| e.at_index(i)))
                        .collect(),
                    other => Err(FromValueError::unexpected($path, "sequence", &other)),
                }
            }
        }
    };
}

impl_sequence!(Vec, "alloc::vec::Vec");
impl_sequence!(VecDeque, "alloc::collections::VecDeque");

// -----------------------------------------------------------------------------
// Mappings

fn entries_from_value<V: FromValue>(
    type_path: &'static str,
    value: Value,
) -> Result<impl Iterator<Item = Result<(String, V), FromValueError>>, FromValueError> {
    match value {
        Value::Map(map) => Ok(map.into_iter().map(|(key, value)| {
            let value = V::from_value(value).map_err(|e| e.in_field(&key))?;
            Ok((key, value))
        })),
        other => Err(FromValueError::unexpected(type_path, "mapping", &other)),
    }
}

macro_rules! impl_mapping {
    ($ty:ident < $($extra:ident : $bound:path)? >, $path:literal) => {
        impl<V: Describe $(, $extra: $bound + Default + Send + Sync + 'static)?> Describe for $ty<String, V $(, $extra)?> {
            fn type_descriptor() -> &'static TypeDescriptor {
                static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
                CELL.get_or_insert::<Self>(|| {
                    let (path, name) = generic_names(
                        $path,
                        stringify!($ty),
                        &[String::type_descriptor(), V::type_descriptor()],
                    );
                    TypeDescriptor::new::<Self>(path, name, stringify!($ty), Shape::Mapping(V::type_descriptor))
                })
            }
        }

        impl<V: Describe + Introspect $(, $extra: $bound + Default + Send + Sync + 'static)?> Introspect
            for $ty<String, V $(, $extra)?>
        {
            #[inline]
            fn descriptor(&self) -> &'static TypeDescriptor {
                Self::type_descriptor()
            }

            #[inline]
            fn as_any(&self) -> &dyn Any {
                self
            }

            fn inspect(&self) -> Inspect<'_> {
                Inspect::Map(Box::new(self.iter().map(|(k, v)| (k.as_str(), v as &dyn Introspect))))
            }
        }

        impl<V: FromValue $(, $extra: $bound + Default)?> FromValue for $ty<String, V $(, $extra)?> {
            fn from_value(value: Value) -> Result<Self, FromValueError> {
                entries_from_value::<V>($path, value)?.collect()
            }
        }
    };
}

impl_mapping!(HashMap<S: BuildHasher>, "std::collections::HashMap");
impl_mapping!(BTreeMap<>, "alloc::collections::BTreeMap");

mod hashbrown_map {
    use std::any::Any;
    use std::hash::BuildHasher;

    use veil_utils::hash::hashbrown::HashMap;

    use super::entries_from_value;
    use crate::impls::generic_names;
    use crate::info::{GenericDescriptorCell, Shape, TypeDescriptor};
    use crate::{Describe, FromValue, FromValueError, Inspect, Introspect, Value};

    impl_mapping!(HashMap<S: BuildHasher>, "hashbrown::HashMap");
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, VecDeque};

    use crate::info::{Shape, ValueKind};
    use crate::{Describe, FromValue, Inspect, Introspect, Value, ValueMap};

    #[test]
    fn generic_names_follow_parameters() {
        let info = <Option<Vec<u8>>>::type_descriptor();
        assert_eq!(info.name(), "Option<Vec<u8>>");
        assert_eq!(info.path(), "core::option::Option<alloc::vec::Vec<u8>>");
        assert_eq!(info.ident(), "Option");
        assert_eq!(info.kind(), ValueKind::Sequence);

        let map = <BTreeMap<String, bool>>::type_descriptor();
        assert_eq!(map.name(), "BTreeMap<String, bool>");
        assert!(matches!(map.shape(), Shape::Mapping(v) if v().is::<bool>()));
    }

    #[test]
    fn sequence_errors_carry_index() {
        let value = Value::Seq(vec![Value::Int(1), Value::from("x")]);
        let err = Vec::<i32>::from_value(value).unwrap_err();
        assert_eq!(err.path().to_string(), "$[1]");

        let ok = VecDeque::<i32>::from_value(Value::Seq(vec![Value::Int(4)])).unwrap();
        assert_eq!(ok, [4]);
    }

    #[test]
    fn mapping_round_trip_through_value() {
        let map: ValueMap = [("a", Value::Int(1)), ("b", Value::Null)].into_iter().collect();
        let parsed = BTreeMap::<String, Option<u8>>::from_value(Value::Map(map)).unwrap();
        assert_eq!(parsed["a"], Some(1));
        assert_eq!(parsed["b"], None);

        let Inspect::Map(entries) = parsed.inspect() else {
            panic!("expected mapping");
        };
        let keys: Vec<_> = entries.map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn none_inspects_as_null() {
        assert!(matches!(Introspect::inspect(&None::<i32>), Inspect::Null));
        assert!(matches!(Introspect::inspect(&Some(3i32)), Inspect::Int(3)));
    }
}
