//! digest-map: a flat, insertion-ordered map of hash-tagged records with
//! pluggable hashing.
//!
//! Internal Design:
//!
//! Summary
//! - Storage: one `Vec` of `(key, value, digest)` records. Every lookup
//!   hashes the query once and scans records comparing cached digests.
//! - Layers:
//!   - hash: djb2 (the default) as a streaming `Hasher`, plus an adapter
//!     turning any `fn(&[u8]) -> u64` into a `BuildHasher`.
//!   - HashRegistry: a shared, swappable strategy slot that maps can be
//!     attached to at construction.
//!   - RecordDescriptor: sizes and offsets of the record fields for a
//!     concrete key/value pair, captured once per map.
//!   - DigestMap<K, V, S>: set/get/erase/exists/iterate over the records.
//!
//! Identity
//! - Records are identified by digest alone; keys are never compared. Two
//!   distinct keys whose digests are equal are the same entry: the second
//!   `set` overwrites the first's value and the first key stays stored.
//!   This is part of the contract, covered by tests, and is the main way
//!   this map differs from `std::collections::HashMap`.
//!
//! Digest caching
//! - Each record stores the digest computed when it was inserted.
//!   Changing a registry's function afterwards leaves old digests in place;
//!   `DigestMap::rehash` recomputes them and drops later duplicates.
//!
//! Growth and order
//! - Capacity starts at 5 and grows by half when full (5, 7, 10, 15, ...).
//! - `erase` shifts later records forward, so iteration order is insertion
//!   order minus erased records.
//! - All operations are O(n) in the record count.
//!
//! Borrowing
//! - `get`, `get_mut` and the iterators borrow the map; the borrow checker
//!   rejects holding them across `set`, `erase`, `rehash` or `clear`, any of
//!   which may move records.
//!
//! Notes and non-goals
//! - Single-threaded: a registry-attached map is `!Send`/`!Sync`.
//! - No bucket index, no persistence, no ordering by key.

pub mod descriptor;
mod digest_map;
mod digest_map_proptest;
pub mod error;
pub mod hash;
pub mod registry;

// Public surface
pub use descriptor::RecordDescriptor;
pub use digest_map::{DigestMap, IntoIter, Iter, IterMut, DEFAULT_CAPACITY};
pub use error::StoreError;
pub use hash::{djb2, BuildDjb2, BuildFnHasher, Djb2Hasher, FnHasher, HashFn};
pub use registry::{HashRegistry, RegistryHasher};
