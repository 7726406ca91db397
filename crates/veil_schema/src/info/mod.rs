//! Static descriptions of types and their fields.
//!
//! A [`TypeDescriptor`] is created once per type and lives for the rest of the
//! process. Descriptors refer to element and field types through
//! [`DescriptorFn`] pointers, so recursive types can be described.

// -----------------------------------------------------------------------------
// Modules

mod cell;
mod field_descriptor;
mod shape;
mod type_descriptor;

// -----------------------------------------------------------------------------
// Exports

pub use cell::{DescriptorCell, GenericCell, GenericDescriptorCell, GenericNameCell};
pub use field_descriptor::{FieldAccessor, FieldDescriptor, FieldFlags};
pub use shape::{EnumShape, ScalarKind, Shape, StructShape, ValueKind};
pub use type_descriptor::{DescriptorFn, TypeDescriptor};
