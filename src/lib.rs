#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use veil_mapper as mapper;
pub use veil_schema as schema;
pub use veil_utils as utils;

/// The types most programs need.
pub mod prelude {
    pub use veil_mapper::{
        CyclePolicy, FieldAction, Mapper, MapperConfig, MapperError, OverlaySpec, SerializeOptions,
        Session, TargetShape, TypeSerializer,
    };
    pub use veil_schema::{Describe, FromValue, Introspect, Value, ValueMap};
}
