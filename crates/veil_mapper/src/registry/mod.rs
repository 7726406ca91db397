//! Filter, overlay and custom serializer registries.
//!
//! Every registered [`FilterSpec`] and [`OverlaySpec`] carries a stamp that is
//! unique for the whole process. Resolutions are cached under the stamps they
//! were computed from, so a replaced registration can never be served from an
//! older cache entry.

// -----------------------------------------------------------------------------
// Modules

mod filter;
mod overlay;
mod serializers;

// -----------------------------------------------------------------------------
// Exports

pub use filter::FilterSpec;
pub use overlay::{FieldAction, OverlaySpec};
pub use serializers::TypeSerializer;

pub(crate) use filter::FilterRegistry;
pub(crate) use overlay::OverlayRegistry;
pub(crate) use serializers::SerializerRegistry;

use std::sync::atomic::{AtomicU64, Ordering};

/// Stamp of "no registration"; never handed out.
pub(crate) const NO_STAMP: u64 = 0;

pub(crate) fn next_stamp() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(NO_STAMP + 1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

/// All registries of one mapper, guarded together.
#[derive(Default)]
pub(crate) struct Registries {
    pub filters: FilterRegistry,
    pub overlays: OverlayRegistry,
    pub serializers: SerializerRegistry,
}

impl Registries {
    pub fn clear(&mut self) {
        self.filters.clear();
        self.overlays.clear();
        self.serializers.clear();
    }
}
