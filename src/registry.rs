//! HashRegistry: a shared, swappable hash strategy.
//!
//! Maps built with `DigestMap::with_registry` hash through whatever
//! function the registry holds at call time. Swapping the function does not
//! touch digests already cached in records; call `DigestMap::rehash` on each
//! attached map afterwards, or lookups will miss.
//!
//! The slot is an `Rc<Cell<_>>`, so a registry and every map attached to it
//! are `!Send`/`!Sync`.

use crate::hash::{djb2, FnHasher, HashFn};
use core::cell::Cell;
use core::fmt;
use core::hash::BuildHasher;
use std::rc::Rc;

#[derive(Copy, Clone)]
enum Strategy {
    Djb2,
    Custom(HashFn),
}

impl Strategy {
    fn func(self) -> HashFn {
        match self {
            Strategy::Djb2 => djb2,
            Strategy::Custom(f) => f,
        }
    }
}

#[derive(Clone)]
pub struct HashRegistry {
    active: Rc<Cell<Strategy>>,
}

impl HashRegistry {
    /// A registry holding the default djb2 strategy.
    pub fn new() -> Self {
        Self {
            active: Rc::new(Cell::new(Strategy::Djb2)),
        }
    }

    /// Replace the strategy for every attached map, from the next hash on.
    pub fn set_hash_function(&self, func: HashFn) {
        log::debug!(
            "hash registry: custom strategy installed ({} attached handles)",
            Rc::strong_count(&self.active)
        );
        self.active.set(Strategy::Custom(func));
    }

    pub fn reset_to_default(&self) {
        log::debug!("hash registry: reset to djb2");
        self.active.set(Strategy::Djb2);
    }

    /// The active strategy, for callers that recompute digests themselves.
    pub fn current_hash_function(&self) -> HashFn {
        self.active.get().func()
    }

    pub fn is_default(&self) -> bool {
        matches!(self.active.get(), Strategy::Djb2)
    }

    /// A `BuildHasher` that follows this registry.
    pub fn build_hasher(&self) -> RegistryHasher {
        RegistryHasher {
            active: Rc::clone(&self.active),
        }
    }
}

impl Default for HashRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HashRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRegistry")
            .field("default", &self.is_default())
            .finish()
    }
}

/// Strategy handle held by a registry-attached map.
#[derive(Clone)]
pub struct RegistryHasher {
    active: Rc<Cell<Strategy>>,
}

impl BuildHasher for RegistryHasher {
    type Hasher = FnHasher;
    fn build_hasher(&self) -> Self::Hasher {
        FnHasher::new(self.active.get().func())
    }
}

impl fmt::Debug for RegistryHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RegistryHasher")
    }
}
