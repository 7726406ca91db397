//! Selective JSON serialization: per-call field filters, per-type overlays and
//! a cache that is never stale.
//!
//! # Overview
//!
//! - [`Mapper`]: the shared service. Owns the filter, overlay and custom
//!   serializer registries, the field catalog and the resolution cache.
//! - [`FilterSpec`]: an allow-list of fields for one type, registered under a
//!   filter id and applied when a call names that id.
//! - [`OverlaySpec`]: keeps, renames or excludes fields of one type for every
//!   call, on output and on input. Overlays win over filters.
//! - [`Session`]: a chained, single-use call with its own options and
//!   overlays.
//! - [`TypeSerializer`]: writes every value of one type through `serde`.
//!
//! Values are walked through [`Introspect`](veil_schema::Introspect) and
//! written to any `serde::Serializer`; JSON through `serde_json` is the
//! default.
//!
//! ```
//! use veil_mapper::{Mapper, OverlaySpec};
//! use veil_schema::Introspect;
//!
//! #[derive(Introspect, Default)]
//! struct Rectangle {
//!     w: i32,
//!     h: i32,
//!     size: i32,
//!     name: String,
//! }
//!
//! let mapper = Mapper::new();
//! mapper
//!     .set_overlay::<Rectangle>(
//!         OverlaySpec::new("rectangle").rename("w", "width").exclude_all(["h", "size"]),
//!     )
//!     .unwrap();
//!
//! let rect = Rectangle { w: 5, h: 10, size: 50, name: "jim".into() };
//! assert_eq!(mapper.serialize(&rect).unwrap(), r#"{"width":5,"name":"jim"}"#);
//! ```
//!
//! # Logging
//!
//! Registry mutations are logged at `debug`, cache misses at `trace` and an
//! overlay replacing another one at `warn`, through the `log` facade.

// -----------------------------------------------------------------------------
// Modules

mod cache;
mod config;
mod context;
mod date;
mod de;
mod error;
mod mapper;
mod options;
mod registry;
mod ser;
mod session;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use cache::Strategy;
pub use config::{CyclePolicy, MapperBuilder, MapperConfig};
pub use date::DateFormat;
pub use error::MapperError;
pub use mapper::Mapper;
pub use options::{SerializeOptions, TargetShape};
pub use registry::{FieldAction, FilterSpec, OverlaySpec, TypeSerializer};
pub use session::Session;
