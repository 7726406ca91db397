use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use veil_schema::info::Shape;
use veil_schema::{Inspect, Introspect};

use super::object::ObjectSerializer;
use crate::MapperError;
use crate::context::CallContext;

// -----------------------------------------------------------------------------
// SerializeDriver

/// Writes one value of any shape.
///
/// # Serialization Rules
///
/// 1. A [`TypeSerializer`] registered for the runtime type writes the value.
/// 2. Otherwise the value is written from its [`Inspect`] view:
///    scalars directly, dates with the configured pattern, sequences as
///    arrays, mappings and objects as maps.
///
/// [`TypeSerializer`]: crate::TypeSerializer
pub(crate) struct SerializeDriver<'v, 'c, 'a> {
    pub value: &'v dyn Introspect,
    pub ctx: &'c CallContext<'a>,
}

impl<'v, 'c, 'a> SerializeDriver<'v, 'c, 'a> {
    #[inline]
    pub const fn new(value: &'v dyn Introspect, ctx: &'c CallContext<'a>) -> Self {
        Self { value, ctx }
    }
}

impl Serialize for SerializeDriver<'_, '_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ctx = self.ctx;
        let descriptor = self.value.descriptor();

        let serializer = match ctx.custom_serializer(descriptor.id()) {
            Some(custom) => match custom.serialize(self.value.as_any(), serializer) {
                Ok(Ok(ok)) => return Ok(ok),
                Ok(Err(err)) => {
                    ctx.record(MapperError::Custom {
                        type_path: descriptor.path().to_owned(),
                        message: err.to_string(),
                    });
                    return Err(err);
                }
                Err(serializer) => serializer,
            },
            None => serializer,
        };

        if let Shape::Opaque = descriptor.shape() {
            ctx.fields_of(descriptor).map_err(|err| ctx.fail_ser(err))?;
        }

        match self.value.inspect() {
            Inspect::Null => serializer.serialize_none(),
            Inspect::Bool(v) => serializer.serialize_bool(v),
            Inspect::Int(v) => serializer.serialize_i64(v),
            Inspect::UInt(v) => serializer.serialize_u64(v),
            Inspect::Float(v) => serializer.serialize_f64(v),
            Inspect::Str(v) => serializer.serialize_str(v),
            Inspect::Date(date) => serializer.serialize_str(&ctx.date_format().format(&date)),
            Inspect::Seq(elements) => {
                let _depth = ctx.descend().map_err(|err| ctx.fail_ser(err))?;
                let (lower, upper) = elements.size_hint();
                let len = (Some(lower) == upper).then_some(lower);

                let mut seq = serializer.serialize_seq(len)?;
                for (index, element) in elements.enumerate() {
                    let _path = ctx.enter_index(index);
                    seq.serialize_element(&SerializeDriver::new(element, ctx))?;
                }
                seq.end()
            }
            Inspect::Map(entries) => {
                let _depth = ctx.descend().map_err(|err| ctx.fail_ser(err))?;
                let (lower, upper) = entries.size_hint();
                let len = (Some(lower) == upper).then_some(lower);

                let mut map = serializer.serialize_map(len)?;
                for (key, value) in entries {
                    let _path = ctx.enter_field(key);
                    map.serialize_entry(key, &SerializeDriver::new(value, ctx))?;
                }
                map.end()
            }
            Inspect::Object(object) => ObjectSerializer { object, ctx }.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use veil_schema::{Introspect, Value, ValueMap};

    use crate::{Mapper, MapperError};

    #[derive(Introspect, Default)]
    struct Tagged {
        tags: Vec<String>,
        scores: BTreeMap<String, f64>,
        note: Option<String>,
    }

    #[test]
    fn scalars_and_containers() {
        let mapper = Mapper::new();
        let value = Tagged {
            tags: vec!["a".into(), "b".into()],
            scores: BTreeMap::from([("x".to_owned(), 1.5), ("y".to_owned(), -2.0)]),
            note: None,
        };
        assert_eq!(
            mapper.serialize(&value).unwrap(),
            r#"{"tags":["a","b"],"scores":{"x":1.5,"y":-2.0},"note":null}"#
        );
        assert_eq!(mapper.serialize(&u64::MAX).unwrap(), "18446744073709551615");
        assert_eq!(mapper.serialize(&Some(true)).unwrap(), "true");
    }

    #[test]
    fn untyped_values_keep_insertion_order() {
        let mapper = Mapper::new();
        let tree = Value::Map(ValueMap::from_iter([
            ("z", Value::Int(1)),
            ("a", Value::Seq(vec![Value::Null, Value::from("s")])),
        ]));
        assert_eq!(mapper.serialize(&tree).unwrap(), r#"{"z":1,"a":[null,"s"]}"#);
    }

    #[test]
    fn depth_limit() {
        let mapper = Mapper::builder().max_depth(2).build().unwrap();
        let nested = vec![vec![vec![1]]];
        let err = mapper.serialize(&nested).unwrap_err();
        assert!(
            matches!(&err, MapperError::DepthLimitExceeded { max_depth: 2, path } if path == "$[0][0]"),
            "{err}"
        );
        assert!(mapper.serialize(&vec![vec![1]]).is_ok());
    }
}
