//! Shared utilities for the `veil` crates.
//!
//! - [`hash`]: hash containers with a fixed, process-stable seed.
//! - [`TypeIdMap`]: a map keyed by [`TypeId`](core::any::TypeId) with a pass-through hasher.

// -----------------------------------------------------------------------------
// Modules

mod typeid_map;

pub mod hash;

// -----------------------------------------------------------------------------
// Top-level exports

pub use typeid_map::TypeIdMap;
