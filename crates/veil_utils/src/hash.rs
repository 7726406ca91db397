//! Hash containers based on *hashbrown*, hashed with a fixed *foldhash* seed.
//!
//! Registries and caches in `veil` never hash attacker-controlled keys, so a
//! fixed seed is used: the iteration order of a map depends only on its content.

use core::hash::{BuildHasher, Hasher};

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// Re-export crates

pub use foldhash;
pub use hashbrown;

// -----------------------------------------------------------------------------
// FixedHashState

const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x7C3A_91D5_0B6E_F248);

/// Hasher produced by [`FixedHashState`].
pub type FixedHasher = FoldHasher<'static>;

/// Build hasher with a fixed seed.
///
/// # Examples
///
/// ```
/// use core::hash::{BuildHasher, Hash, Hasher};
/// use veil_utils::hash::FixedHashState;
///
/// let hash = |v: &str| {
///     let mut hasher = FixedHashState.build_hasher();
///     v.hash(&mut hasher);
///     hasher.finish()
/// };
///
/// assert_eq!(hash("name"), hash("name"));
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// NoOpHashState

/// A hasher passing a single `u64` straight through.
///
/// Used for keys that are already well distributed, such as `TypeId`.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHasher {
    hash: u64,
}

impl Hasher for NoOpHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes.iter().rev() {
            self.hash = self.hash.rotate_left(8).wrapping_add(*byte as u64);
        }
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }
}

/// Build hasher for [`NoOpHasher`].
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHashState;

impl BuildHasher for NoOpHashState {
    type Hasher = NoOpHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        NoOpHasher { hash: 0 }
    }
}

// -----------------------------------------------------------------------------
// Containers

/// A [`hashbrown::HashMap`] using [`FixedHashState`].
pub type HashMap<K, V> = hashbrown::HashMap<K, V, FixedHashState>;

/// A [`hashbrown::HashSet`] using [`FixedHashState`].
pub type HashSet<T> = hashbrown::HashSet<T, FixedHashState>;

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::hash::{BuildHasher, Hash, Hasher};

    use super::{FixedHashState, HashMap, HashSet, NoOpHashState};

    #[test]
    fn noop_hasher_passes_u64_through() {
        let mut hasher = NoOpHashState.build_hasher();
        42_u64.hash(&mut hasher);
        assert_eq!(hasher.finish(), 42);
    }

    #[test]
    fn fixed_state_is_stable_across_builders() {
        let a = {
            let mut h = FixedHashState.build_hasher();
            "overlay".hash(&mut h);
            h.finish()
        };
        let b = {
            let mut h = FixedHashState.build_hasher();
            "overlay".hash(&mut h);
            h.finish()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn containers_use_fixed_state() {
        let mut map: HashMap<&str, i32> = HashMap::with_hasher(FixedHashState);
        map.insert("w", 5);
        assert_eq!(map.get("w"), Some(&5));

        let mut set: HashSet<&str> = HashSet::default();
        assert!(set.insert("name"));
        assert!(!set.insert("name"));
    }
}
