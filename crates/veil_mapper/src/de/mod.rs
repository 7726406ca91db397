//! The deserialization engine.
//!
//! Input is read through `deserialize_any` into an untyped
//! [`Value`](veil_schema::Value) shaped after the target descriptor: struct
//! fields are matched through their overlay names, scalars are coerced to the
//! declared kind. The typed value is then built with
//! [`FromValue`](veil_schema::FromValue).

// -----------------------------------------------------------------------------
// Modules

mod coerce;
mod seed;

// -----------------------------------------------------------------------------
// Exports

pub(crate) use seed::ShapeSeed;
