use std::any::Any;

use crate::info::{DescriptorCell, ScalarKind, TypeDescriptor};
use crate::{Describe, FromValue, FromValueError, Inspect, Introspect, Value};

macro_rules! impl_scalar_describe {
    ($ty:ident, $kind:ident) => {
        impl Describe for $ty {
            fn type_descriptor() -> &'static TypeDescriptor {
                static CELL: DescriptorCell = DescriptorCell::new();
                CELL.get_or_init(|| TypeDescriptor::scalar::<Self>(stringify!($ty), ScalarKind::$kind))
            }
        }
    };
}

macro_rules! impl_integer {
    ($variant:ident as $wide:ty: $($ty:ident)*) => {$(
        impl_scalar_describe!($ty, Integer);

        impl Introspect for $ty {
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
                Inspect::$variant(*self as $wide)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self, FromValueError> {
                let converted = match value {
                    Value::Int(v) => <$ty>::try_from(v).ok(),
                    Value::UInt(v) => <$ty>::try_from(v).ok(),
                    other => {
                        return Err(FromValueError::unexpected(stringify!($ty), "integer", &other));
                    }
                };
                converted.ok_or_else(|| {
                    FromValueError::new(stringify!($ty), "integer out of range")
                })
            }
        }
    )*};
}

impl_integer!(Int as i64: i8 i16 i32 i64 isize);
impl_integer!(UInt as u64: u8 u16 u32 u64 usize);

macro_rules! impl_float {
    ($($ty:ident)*) => {$(
        impl_scalar_describe!($ty, Float);

        impl Introspect for $ty {
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
                Inspect::Float(f64::from(*self))
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self, FromValueError> {
                match value.as_f64() {
                    Some(v) => Ok(v as $ty),
                    None => Err(FromValueError::unexpected(stringify!($ty), "float", &value)),
                }
            }
        }
    )*};
}

impl_float!(f32 f64);

impl_scalar_describe!(bool, Bool);

impl Introspect for bool {
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
        Inspect::Bool(*self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, FromValueError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(FromValueError::unexpected("bool", "bool", &other)),
        }
    }
}

impl_scalar_describe!(String, String);

impl Introspect for String {
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
        Inspect::Str(self)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, FromValueError> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(FromValueError::unexpected("String", "string", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::info::ValueKind;
    use crate::{Describe, FromValue, Inspect, Introspect, Value};

    #[test]
    fn integer_ranges_are_checked() {
        assert_eq!(u8::from_value(Value::Int(255)), Ok(255));
        assert!(u8::from_value(Value::Int(256)).is_err());
        assert!(u32::from_value(Value::Int(-1)).is_err());
        assert_eq!(i64::from_value(Value::UInt(9)), Ok(9));
        assert!(i32::from_value(Value::Float(1.0)).is_err());
    }

    #[test]
    fn views_widen() {
        assert!(matches!(7u16.inspect(), Inspect::UInt(7)));
        assert!(matches!((-7i8).inspect(), Inspect::Int(-7)));
        assert!(matches!(0.5f32.inspect(), Inspect::Float(v) if v == 0.5));
        assert_eq!(usize::type_descriptor().kind(), ValueKind::Integer);
        assert_eq!(f32::type_descriptor().name(), "f32");
    }

    #[test]
    fn floats_accept_integers() {
        assert_eq!(f64::from_value(Value::Int(3)), Ok(3.0));
        assert!(f64::from_value(Value::Str("3".into())).is_err());
    }
}
