use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use veil_schema::Introspect;

use super::SerializeDriver;
use crate::context::CallContext;

// -----------------------------------------------------------------------------
// RootSerializer

/// Writes a root value, optionally wrapped as `{"<TypeName>": value}`.
pub(crate) struct RootSerializer<'v, 'c, 'a> {
    pub value: &'v dyn Introspect,
    pub ctx: &'c CallContext<'a>,
    pub wrap_root: bool,
}

impl Serialize for RootSerializer<'_, '_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let driver = SerializeDriver::new(self.value, self.ctx);
        if !self.wrap_root {
            return driver.serialize(serializer);
        }

        let name = self.value.descriptor().ident();
        let mut map = serializer.serialize_map(Some(1))?;
        let _path = self.ctx.enter_field(name);
        map.serialize_entry(name, &driver)?;
        map.end()
    }
}

// -----------------------------------------------------------------------------
// RootsSerializer

/// Writes several roots as one array.
pub(crate) struct RootsSerializer<'v, 'c, 'a> {
    pub values: &'v [&'v dyn Introspect],
    pub ctx: &'c CallContext<'a>,
    pub wrap_root: bool,
}

impl Serialize for RootsSerializer<'_, '_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.values.len()))?;
        for (index, &value) in self.values.iter().enumerate() {
            let _path = self.ctx.enter_index(index);
            seq.serialize_element(&RootSerializer {
                value,
                ctx: self.ctx,
                wrap_root: self.wrap_root,
            })?;
        }
        seq.end()
    }
}
