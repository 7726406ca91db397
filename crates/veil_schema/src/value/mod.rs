//! The untyped value tree.
//!
//! A [`Value`] is what the deserialization engine reads from a token stream
//! before handing it to [`FromValue`](crate::FromValue). It is also a valid
//! target on its own: `Value` and [`ValueMap`] implement
//! [`Introspect`](crate::Introspect), so a tree can be serialized again.

mod value_map;

pub use value_map::ValueMap;

use chrono::NaiveDateTime;

use crate::{Describe, FromValue, FromValueError};

// -----------------------------------------------------------------------------
// Value

/// An untyped value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Date(NaiveDateTime),
    Seq(Vec<Value>),
    Map(ValueMap),
}

impl Value {
    /// Lower-case name of the variant, used in error messages.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) | Self::UInt(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Date(_) => "date",
            Self::Seq(_) => "sequence",
            Self::Map(_) => "mapping",
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as `i64` if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Returns the value as `f64` if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::UInt(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Self::Seq(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` if this is a mapping.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?.get(key)
    }

    /// Unwraps the mapping that makes up a struct of type `T`.
    ///
    /// Used by derived [`FromValue`] impls.
    pub fn into_object<T: Describe>(self) -> Result<ValueMap, FromValueError> {
        match self {
            Self::Map(map) => Ok(map),
            other => Err(FromValueError::unexpected(
                T::type_descriptor().path().to_owned(),
                "object",
                &other,
            )),
        }
    }

    /// Unwraps the variant name of a unit-only enum of type `T`.
    ///
    /// Used by derived [`FromValue`] impls.
    pub fn into_variant<T: Describe>(self) -> Result<String, FromValueError> {
        match self {
            Self::Str(name) => Ok(name),
            other => Err(FromValueError::unexpected(
                T::type_descriptor().path().to_owned(),
                "variant name",
                &other,
            )),
        }
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

impl_from_for_value! {
    bool => Bool,
    i32 => Int,
    i64 => Int,
    u32 => UInt,
    u64 => UInt,
    f64 => Float,
    String => Str,
    &str => Str,
    NaiveDateTime => Date,
    Vec<Value> => Seq,
    ValueMap => Map,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl FromValue for Value {
    #[inline]
    fn from_value(value: Value) -> Result<Self, FromValueError> {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{Value, ValueMap};

    #[test]
    fn kind_names() {
        assert_eq!(Value::Null.kind_name(), "null");
        assert_eq!(Value::UInt(3).kind_name(), "integer");
        assert_eq!(Value::from("x").kind_name(), "string");
        assert_eq!(Value::Seq(vec![]).kind_name(), "sequence");
        assert_eq!(Value::from(Some(1.5)).kind_name(), "float");
        assert_eq!(Value::from(None::<bool>), Value::Null);
    }

    #[test]
    fn numeric_views() {
        assert_eq!(Value::UInt(u64::MAX).as_i64(), None);
        assert_eq!(Value::UInt(7).as_i64(), Some(7));
        assert_eq!(Value::Int(-2).as_f64(), Some(-2.0));
        assert_eq!(Value::Str("1".into()).as_f64(), None);
    }

    #[test]
    fn lookup_in_mapping() {
        let map: ValueMap = [("name", Value::from("joe"))].into_iter().collect();
        let value = Value::Map(map);
        assert_eq!(value.get("name").and_then(Value::as_str), Some("joe"));
        assert!(value.get("age").is_none());
        assert!(Value::Null.get("name").is_none());
    }
}
