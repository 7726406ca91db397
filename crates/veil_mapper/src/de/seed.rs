use std::fmt;

use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use veil_schema::info::{Shape, TypeDescriptor};
use veil_schema::{Describe, Value, ValueMap};

use super::coerce::{Token, coerce};
use crate::context::CallContext;
use crate::{MapperError, TargetShape};

/// Looks through optional layers; `null` is accepted at any depth anyway.
fn unwrap_optional(mut descriptor: &'static TypeDescriptor) -> &'static TypeDescriptor {
    while let Shape::Optional(element) = descriptor.shape() {
        descriptor = element();
    }
    descriptor
}

// -----------------------------------------------------------------------------
// ShapeSeed

/// Reads one value of the target shape.
pub(crate) struct ShapeSeed<'c, 'a> {
    target: TargetShape,
    ctx: &'c CallContext<'a>,
}

impl<'c, 'a> ShapeSeed<'c, 'a> {
    pub fn new(target: TargetShape, ctx: &'c CallContext<'a>) -> Self {
        let target = match target.normalize() {
            TargetShape::Type(descriptor) => TargetShape::Type(unwrap_optional(descriptor)),
            other => other,
        };
        Self { target, ctx }
    }

    #[inline]
    fn of(descriptor: &'static TypeDescriptor, ctx: &'c CallContext<'a>) -> Self {
        Self::new(TargetShape::Type(descriptor), ctx)
    }
}

impl<'de> DeserializeSeed<'de> for ShapeSeed<'_, '_> {
    type Value = Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        if let TargetShape::Type(descriptor) = self.target
            && let Shape::Opaque = descriptor.shape()
        {
            self.ctx
                .fields_of(descriptor)
                .map_err(|err| self.ctx.fail_de::<D::Error>(err))?;
        }

        deserializer.deserialize_any(ShapeVisitor {
            target: self.target,
            ctx: self.ctx,
        })
    }
}

// -----------------------------------------------------------------------------
// ShapeVisitor

struct ShapeVisitor<'c, 'a> {
    target: TargetShape,
    ctx: &'c CallContext<'a>,
}

impl ShapeVisitor<'_, '_> {
    fn mismatch<E: de::Error>(&self, expected: String, found: impl fmt::Display) -> E {
        self.ctx.fail_de(MapperError::TypeMismatch {
            path: self.ctx.path(),
            expected,
            found: found.to_string(),
        })
    }

    fn expected(&self) -> String {
        match self.target {
            TargetShape::Type(descriptor) => descriptor.kind().to_string(),
            TargetShape::CollectionOf(_) | TargetShape::Untyped => "sequence".to_owned(),
        }
    }

    fn scalar<E: de::Error>(&self, token: Token<'_>) -> Result<Value, E> {
        match self.target {
            TargetShape::Type(descriptor) => coerce(token, descriptor, self.ctx.date_format())
                .map_err(|mismatch| self.mismatch(mismatch.expected, token)),
            _ => Err(self.mismatch(self.expected(), token)),
        }
    }

    fn read_object<'de, A: MapAccess<'de>>(
        &self,
        descriptor: &'static TypeDescriptor,
        mut map: A,
    ) -> Result<Value, A::Error> {
        let ctx = self.ctx;
        let resolution = ctx.resolve_input(descriptor).map_err(|err| ctx.fail_de(err))?;

        let mut object = ValueMap::with_capacity(resolution.fields().len());
        while let Some(key) = map.next_key::<String>()? {
            let Some(field) = resolution.input(&key) else {
                map.next_value::<IgnoredAny>()?;
                continue;
            };
            let _path = ctx.enter_field(&key);
            let value = map.next_value_seed(ShapeSeed::of(field.descriptor.type_descriptor(), ctx))?;
            object.insert(field.descriptor.name(), value);
        }
        Ok(Value::Map(object))
    }

    fn read_entries<'de, A: MapAccess<'de>>(
        &self,
        value: &'static TypeDescriptor,
        mut map: A,
    ) -> Result<Value, A::Error> {
        let ctx = self.ctx;
        let mut entries = ValueMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(key) = map.next_key::<String>()? {
            let _path = ctx.enter_field(&key);
            let value = map.next_value_seed(ShapeSeed::of(value, ctx))?;
            entries.insert(key, value);
        }
        Ok(Value::Map(entries))
    }
}

impl<'de> Visitor<'de> for ShapeVisitor<'_, '_> {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self.target {
            TargetShape::Type(descriptor) => write!(formatter, "a value of `{}`", descriptor.path()),
            TargetShape::CollectionOf(element) => {
                write!(formatter, "a sequence of `{}`", element.path())
            }
            TargetShape::Untyped => formatter.write_str("any value"),
        }
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        self.scalar(Token::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        self.scalar(Token::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        self.scalar(Token::UInt(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        self.scalar(Token::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        self.scalar(Token::Str(v))
    }

    // `null` reads as absent, whatever the target.
    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let element = match self.target {
            TargetShape::CollectionOf(element) => element,
            TargetShape::Type(descriptor) => match descriptor.shape() {
                Shape::Sequence(element) => element(),
                Shape::Any => descriptor,
                _ => return Err(self.mismatch(self.expected(), "sequence")),
            },
            TargetShape::Untyped => Value::type_descriptor(),
        };

        let ctx = self.ctx;
        let _depth = ctx.descend().map_err(|err| ctx.fail_de(err))?;
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        loop {
            let _path = ctx.enter_index(items.len());
            match seq.next_element_seed(ShapeSeed::of(element, ctx))? {
                Some(item) => items.push(item),
                None => break,
            }
        }
        Ok(Value::Seq(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        let ctx = self.ctx;
        let TargetShape::Type(descriptor) = self.target else {
            return Err(self.mismatch(self.expected(), "mapping"));
        };

        let _depth = ctx.descend().map_err(|err| ctx.fail_de(err))?;
        match descriptor.shape() {
            Shape::Struct(_) => self.read_object(descriptor, map),
            Shape::Mapping(value) => self.read_entries(value(), map),
            Shape::Any => self.read_entries(descriptor, map),
            _ => Err(self.mismatch(self.expected(), "mapping")),
        }
    }
}
