//! The data model of `veil`: type descriptors, the introspection capability and
//! the untyped value tree.
//!
//! # Overview
//!
//! - [`Describe`]: static access to a type's [`TypeDescriptor`](info::TypeDescriptor).
//! - [`Introspect`]: runtime view of a value, used by the serialization engine.
//! - [`FromValue`]: rebuilds a typed value from the untyped [`Value`] tree.
//! - [`FieldCatalog`]: cached, ordered field lists per type, produced by an
//!   injectable [`FieldEnumerator`].
//!
//! All three traits are implemented for the common scalar, string, date,
//! optional, sequence, mapping and pointer types, and can be derived for named
//! structs and unit-only enums:
//!
//! ```
//! use veil_schema::{Describe, Introspect, info::ValueKind};
//!
//! #[derive(Introspect, Default)]
//! struct Bean {
//!     name: String,
//!     age: i32,
//! }
//!
//! let info = Bean::type_descriptor().as_struct().unwrap();
//! assert_eq!(info.field_names().collect::<Vec<_>>(), ["name", "age"]);
//! assert_eq!(info.field("age").unwrap().kind(), ValueKind::Integer);
//! ```

// Generated code names this crate through its absolute path.
extern crate self as veil_schema;

// -----------------------------------------------------------------------------
// Modules

mod catalog;
mod error;
mod introspect;
mod path;

pub mod impls;
pub mod info;
pub mod value;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use catalog::{DeclaredFields, FieldCatalog, FieldEnumerator};
pub use error::{FromValueError, SchemaError};
pub use introspect::{Describe, FromValue, Inspect, Introspect, ObjectRef};
pub use path::{FieldPath, PathSegment};
pub use value::{Value, ValueMap};

/// `#[derive(Introspect)]`, implementing [`Describe`], [`Introspect`] and [`FromValue`].
///
/// Supported on structs with named fields (and unit structs) and on enums whose
/// variants carry no data.
///
/// Container attributes:
/// - `#[veil(rename = "Name")]`: type name used when wrapping a root value.
/// - `#[veil(from_value = false)]`: skip the [`FromValue`] impl (field types then
///   need neither `FromValue` nor `Default`).
///
/// Field / variant attributes:
/// - `#[veil(rename = "name")]`: name used in the token stream.
/// - `#[veil(skip)]`: never serialized, never read.
/// - `#[veil(skip_serializing)]` / `#[veil(skip_deserializing)]`.
///
/// With `FromValue`, every field type must implement `Default`: absent fields
/// take their default value.
pub use veil_schema_derive::Introspect;
