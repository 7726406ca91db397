//! The serialization engine.
//!
//! Values are walked through [`Introspect`](veil_schema::Introspect) and
//! written to any `serde::Serializer`. Objects write the fields resolved for
//! their runtime type; everything else maps directly onto the serde data
//! model.

// -----------------------------------------------------------------------------
// Modules

mod driver;
mod object;
mod roots;

// -----------------------------------------------------------------------------
// Exports

pub(crate) use driver::SerializeDriver;
pub(crate) use roots::{RootSerializer, RootsSerializer};
