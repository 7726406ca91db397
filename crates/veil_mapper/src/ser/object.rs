use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use veil_schema::ObjectRef;

use super::SerializeDriver;
use crate::context::CallContext;
use crate::{CyclePolicy, MapperError};

/// Writes an object as a map of its effective fields.
pub(super) struct ObjectSerializer<'v, 'c, 'a> {
    pub object: ObjectRef<'v>,
    pub ctx: &'c CallContext<'a>,
}

impl Serialize for ObjectSerializer<'_, '_, '_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ctx = self.ctx;
        let descriptor = self.object.descriptor();

        let Some(_visit) = ctx.visit(self.object.address(), descriptor) else {
            return match ctx.cycle_policy() {
                CyclePolicy::Fail => Err(ctx.fail_ser(MapperError::CircularReference {
                    type_path: descriptor.path().to_owned(),
                    path: ctx.path(),
                })),
                CyclePolicy::WriteNull => serializer.serialize_none(),
            };
        };
        let _depth = ctx.descend().map_err(|err| ctx.fail_ser(err))?;
        let resolution = ctx.resolve(descriptor).map_err(|err| ctx.fail_ser(err))?;

        let mut map = serializer.serialize_map(Some(resolution.output().count()))?;
        for field in resolution.output() {
            let Some(value) = self.object.field(field.descriptor) else {
                return Err(ctx.fail_ser(MapperError::Message(format!(
                    "field `{}` of `{}` could not be read",
                    field.descriptor.name(),
                    descriptor.path(),
                ))));
            };
            let _path = ctx.enter_field(&field.name);
            map.serialize_entry(&*field.name, &SerializeDriver::new(value, ctx))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, OnceLock};

    use veil_schema::Introspect;

    use crate::{CyclePolicy, Mapper, MapperError};

    #[derive(Introspect, Default)]
    struct Node {
        name: String,
        next: OnceLock<Arc<Node>>,
    }

    fn node(name: &str) -> Arc<Node> {
        Arc::new(Node {
            name: name.to_owned(),
            next: OnceLock::new(),
        })
    }

    #[derive(Introspect, Default)]
    struct Inner {
        id: i32,
    }

    #[derive(Introspect, Default)]
    struct Outer {
        inner: Inner,
        twice: Vec<Arc<Inner>>,
    }

    #[test]
    fn cycles_fail_by_default() {
        let a = node("a");
        let b = node("b");
        let _ = a.next.set(Arc::clone(&b));
        let _ = b.next.set(Arc::clone(&a));

        let err = Mapper::new().serialize(&a).unwrap_err();
        assert!(
            matches!(&err, MapperError::CircularReference { path, .. } if path == "$.next.next"),
            "{err}"
        );

        let lenient = Mapper::builder()
            .cycle_policy(CyclePolicy::WriteNull)
            .build()
            .unwrap();
        assert_eq!(
            lenient.serialize(&a).unwrap(),
            r#"{"name":"a","next":{"name":"b","next":null}}"#
        );
    }

    #[test]
    fn shared_values_are_not_cycles() {
        let shared = Arc::new(Inner { id: 7 });
        let outer = Outer {
            inner: Inner { id: 1 },
            twice: vec![Arc::clone(&shared), shared],
        };
        // `inner` sits at the same address as `outer` in some layouts.
        assert_eq!(
            Mapper::new().serialize(&outer).unwrap(),
            r#"{"inner":{"id":1},"twice":[{"id":7},{"id":7}]}"#
        );
    }
}
