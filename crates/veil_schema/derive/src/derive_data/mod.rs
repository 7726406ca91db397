//! Provide some tools for parsing token stream.

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod introspect_derive;
mod type_meta;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use attributes::{FieldAttributes, TypeAttributes};
pub(crate) use introspect_derive::{EnumVariant, IntrospectDerive, StructField};
pub(crate) use type_meta::TypeMeta;
