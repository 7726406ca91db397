use std::any::Any;
use std::sync::{Arc, OnceLock};

use crate::impls::generic_names;
use crate::info::{DescriptorCell, GenericDescriptorCell, Shape, TypeDescriptor};
use crate::{Describe, FromValue, FromValueError, Inspect, Introspect, Value};

// -----------------------------------------------------------------------------
// Box, Arc

// Transparent: the pointer describes and exposes its pointee, so that a value
// reached through different pointers keeps one address.
macro_rules! impl_transparent_pointer {
    ($ty:ident) => {
        impl<T: Describe> Describe for $ty<T> {
            #[inline]
            fn type_descriptor() -> &'static TypeDescriptor {
                T::type_descriptor()
            }
        }

        impl<T: Introspect + ?Sized> Introspect for $ty<T> {
            #[inline]
            fn descriptor(&self) -> &'static TypeDescriptor {
                (**self).descriptor()
            }

            #[inline]
            fn as_any(&self) -> &dyn Any {
                (**self).as_any()
            }

            #[inline]
            fn inspect(&self) -> Inspect<'_> {
                (**self).inspect()
            }
        }

        impl<T: FromValue> FromValue for $ty<T> {
            #[inline]
            fn from_value(value: Value) -> Result<Self, FromValueError> {
                T::from_value(value).map($ty::new)
            }
        }
    };
}

impl_transparent_pointer!(Box);
impl_transparent_pointer!(Arc);

// -----------------------------------------------------------------------------
// Box<dyn Introspect>

/// Any value; read back as an untyped [`Value`] tree.
impl Describe for Box<dyn Introspect> {
    fn type_descriptor() -> &'static TypeDescriptor {
        static CELL: DescriptorCell = DescriptorCell::new();
        CELL.get_or_init(|| {
            TypeDescriptor::new::<Self>(
                "alloc::boxed::Box<dyn veil_schema::Introspect>",
                "Box<dyn Introspect>",
                "Box",
                Shape::Any,
            )
        })
    }
}

impl FromValue for Box<dyn Introspect> {
    #[inline]
    fn from_value(value: Value) -> Result<Self, FromValueError> {
        Ok(Box::new(value))
    }
}

// -----------------------------------------------------------------------------
// OnceLock

impl<T: Describe> Describe for OnceLock<T> {
    fn type_descriptor() -> &'static TypeDescriptor {
        static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
        CELL.get_or_insert::<Self>(|| {
            let (path, name) = generic_names("std::sync::OnceLock", "OnceLock", &[T::type_descriptor()]);
            TypeDescriptor::new::<Self>(path, name, "OnceLock", Shape::Optional(T::type_descriptor))
        })
    }
}

impl<T: Describe + Introspect> Introspect for OnceLock<T> {
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
        match self.get() {
            Some(value) => value.inspect(),
            None => Inspect::Null,
        }
    }
}

impl<T: FromValue> FromValue for OnceLock<T> {
    fn from_value(value: Value) -> Result<Self, FromValueError> {
        match value {
            Value::Null => Ok(OnceLock::new()),
            value => T::from_value(value).map(OnceLock::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, OnceLock};

    use crate::info::Shape;
    use crate::{Describe, FromValue, Inspect, Introspect, Value};

    #[test]
    fn pointers_are_transparent() {
        assert!(Box::<i32>::type_descriptor().is::<i32>());
        let shared = Arc::new(String::from("joe"));
        assert!(shared.descriptor().is::<String>());
        assert!(matches!(shared.inspect(), Inspect::Str("joe")));
    }

    #[test]
    fn boxed_dyn_reads_untyped() {
        assert!(matches!(<Box<dyn Introspect>>::type_descriptor().shape(), Shape::Any));
        let boxed = <Box<dyn Introspect>>::from_value(Value::Int(4)).unwrap();
        assert!(boxed.descriptor().is::<Value>());
        assert!(matches!(boxed.inspect(), Inspect::Int(4)));
    }

    #[test]
    fn once_lock_is_optional() {
        let empty = OnceLock::<u8>::from_value(Value::Null).unwrap();
        assert!(matches!(empty.inspect(), Inspect::Null));
        let set = OnceLock::<u8>::from_value(Value::Int(2)).unwrap();
        assert_eq!(set.get(), Some(&2));
        assert_eq!(OnceLock::<u8>::type_descriptor().name(), "OnceLock<u8>");
    }
}
