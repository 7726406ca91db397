use std::any::Any;

use crate::info::{DescriptorCell, Shape, TypeDescriptor};
use crate::{Describe, Inspect, Introspect, Value, ValueMap};

impl Describe for Value {
    fn type_descriptor() -> &'static TypeDescriptor {
        static CELL: DescriptorCell = DescriptorCell::new();
        CELL.get_or_init(|| TypeDescriptor::new::<Self>("veil_schema::Value", "Value", "Value", Shape::Any))
    }
}

impl Introspect for Value {
    #[inline]
    fn descriptor(&self) -> &'static TypeDescriptor {
        Self::type_descriptor()
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn inspect(&self) -> Inspect<'_> {
        match self {
            Value::Null => Inspect::Null,
            Value::Bool(v) => Inspect::Bool(*v),
            Value::Int(v) => Inspect::Int(*v),
            Value::UInt(v) => Inspect::UInt(*v),
            Value::Float(v) => Inspect::Float(*v),
            Value::Str(v) => Inspect::Str(v),
            Value::Date(v) => Inspect::Date(*v),
            Value::Seq(items) => Inspect::Seq(Box::new(items.iter().map(|e| e as &dyn Introspect))),
            Value::Map(map) => map.inspect(),
        }
    }
}

impl Describe for ValueMap {
    fn type_descriptor() -> &'static TypeDescriptor {
        static CELL: DescriptorCell = DescriptorCell::new();
        CELL.get_or_init(|| {
            TypeDescriptor::new::<Self>(
                "veil_schema::ValueMap",
                "ValueMap",
                "ValueMap",
                Shape::Mapping(Value::type_descriptor),
            )
        })
    }
}

impl Introspect for ValueMap {
    #[inline]
    fn descriptor(&self) -> &'static TypeDescriptor {
        Self::type_descriptor()
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn inspect(&self) -> Inspect<'_> {
        Inspect::Map(Box::new(self.iter().map(|(k, v)| (k, v as &dyn Introspect))))
    }
}

#[cfg(test)]
mod tests {
    use crate::info::ValueKind;
    use crate::{Describe, Inspect, Introspect, Value, ValueMap};

    #[test]
    fn map_entries_keep_order() {
        let map: ValueMap = [("z", Value::Int(1)), ("a", Value::Bool(true))].into_iter().collect();
        let value = Value::Map(map);
        let Inspect::Map(entries) = value.inspect() else {
            panic!("expected mapping");
        };
        let keys: Vec<_> = entries.map(|(k, _)| k).collect();
        assert_eq!(keys, ["z", "a"]);
        assert_eq!(Value::type_descriptor().kind(), ValueKind::Any);
        assert_eq!(ValueMap::type_descriptor().kind(), ValueKind::Mapping);
    }
}
