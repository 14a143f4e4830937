//! Hash strategies: the djb2 default and an adapter for plain byte-hash functions.
//!
//! A key reaches a strategy as the bytes its `Hash` impl writes. For the
//! primitive integers that is their native-endian representation, so
//! hashing a `u32` key is hashing its four raw bytes.

use core::hash::{BuildHasher, Hasher};

/// A byte-hash function: raw key bytes in, digest out.
pub type HashFn = fn(&[u8]) -> u64;

const DJB2_SEED: u64 = 5381;

#[inline]
fn djb2_step(hash: u64, bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(hash, |h, &b| h.wrapping_mul(33).wrapping_add(u64::from(b)))
}

/// djb2 over `bytes`: seed 5381, then `hash * 33 + b` per byte, wrapping.
pub fn djb2(bytes: &[u8]) -> u64 {
    djb2_step(DJB2_SEED, bytes)
}

/// Streaming djb2. Feeding bytes in several writes yields the same digest
/// as one `djb2` call over their concatenation.
#[derive(Clone, Debug)]
pub struct Djb2Hasher {
    hash: u64,
}

impl Default for Djb2Hasher {
    fn default() -> Self {
        Self { hash: DJB2_SEED }
    }
}

impl Hasher for Djb2Hasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.hash = djb2_step(self.hash, bytes);
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }
}

/// Default strategy for `DigestMap`.
#[derive(Copy, Clone, Debug, Default)]
pub struct BuildDjb2;

impl BuildHasher for BuildDjb2 {
    type Hasher = Djb2Hasher;
    fn build_hasher(&self) -> Self::Hasher {
        Djb2Hasher::default()
    }
}

/// Buffers every byte written and applies the wrapped function in `finish`.
#[derive(Clone, Debug)]
pub struct FnHasher {
    func: HashFn,
    buf: Vec<u8>,
}

impl FnHasher {
    pub fn new(func: HashFn) -> Self {
        Self {
            func,
            buf: Vec::new(),
        }
    }
}

impl Hasher for FnHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn finish(&self) -> u64 {
        (self.func)(&self.buf)
    }
}

/// Turns any `HashFn` into a strategy a map can own.
#[derive(Copy, Clone, Debug)]
pub struct BuildFnHasher {
    func: HashFn,
}

impl BuildFnHasher {
    pub fn new(func: HashFn) -> Self {
        Self { func }
    }

    pub fn func(&self) -> HashFn {
        self.func
    }
}

impl Default for BuildFnHasher {
    fn default() -> Self {
        Self::new(djb2)
    }
}

impl BuildHasher for BuildFnHasher {
    type Hasher = FnHasher;
    fn build_hasher(&self) -> Self::Hasher {
        FnHasher::new(self.func)
    }
}
