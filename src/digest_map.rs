//! DigestMap: a growable flat buffer of hash-tagged records, scanned linearly.
//!
//! Identity is the cached digest, not the key: two keys with equal digests
//! address the same record. A second `set` under a colliding key overwrites
//! the stored value and keeps the stored key.

use crate::descriptor::{Record, RecordDescriptor};
use crate::error::StoreError;
use crate::hash::BuildDjb2;
use crate::registry::{HashRegistry, RegistryHasher};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;

/// Records allocated by `new` and `with_hasher`.
pub const DEFAULT_CAPACITY: usize = 5;

#[derive(Clone)]
pub struct DigestMap<K, V, S = BuildDjb2> {
    hasher: S,
    records: Vec<Record<K, V>>,
    descriptor: RecordDescriptor,
}

impl<K, V> DigestMap<K, V> {
    pub fn new() -> Self {
        Self::with_hasher(BuildDjb2)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, BuildDjb2)
    }
}

impl<K, V> DigestMap<K, V, RegistryHasher> {
    /// A map that hashes through `registry`'s strategy at call time.
    pub fn with_registry(registry: &HashRegistry) -> Self {
        Self::with_hasher(registry.build_hasher())
    }

    pub fn with_capacity_and_registry(capacity: usize, registry: &HashRegistry) -> Self {
        Self::with_capacity_and_hasher(capacity, registry.build_hasher())
    }
}

impl<K, V, S: Default> Default for DigestMap<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> DigestMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            records: Vec::with_capacity(capacity),
            descriptor: RecordDescriptor::of::<K, V>(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Allocated record slots; always `>= len()`.
    pub fn capacity(&self) -> usize {
        self.records.capacity()
    }

    /// Drops every record. Capacity is kept.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn descriptor(&self) -> &RecordDescriptor {
        &self.descriptor
    }

    /// Calls `f` once per record in storage order.
    pub fn iterate<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        for r in &self.records {
            f(&r.key, &r.value);
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.records.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.records.iter_mut(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.records.iter().map(|r| &r.key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.records.iter().map(|r| &r.value)
    }

    /// Next capacity when the buffer is full: ×1.5, at least one more slot.
    fn grown_capacity(&self) -> usize {
        let cap = self.records.capacity();
        cap.saturating_add((cap / 2).max(1))
    }

    fn grow(&mut self) {
        let target = self.grown_capacity();
        log::trace!(
            "digest map: growing {} -> {} records",
            self.records.capacity(),
            target
        );
        self.records.reserve_exact(target - self.records.len());
    }

    fn position(&self, hash: u64) -> Option<usize> {
        self.records.iter().position(|r| r.hash == hash)
    }

    /// Overwrites the value of the record tagged `hash`, handing `value`
    /// back when there is none.
    fn update(&mut self, hash: u64, value: V) -> Result<V, V> {
        match self.position(hash) {
            Some(i) => Ok(core::mem::replace(&mut self.records[i].value, value)),
            None => Err(value),
        }
    }
}

impl<K, V, S> DigestMap<K, V, S>
where
    K: Hash,
    S: BuildHasher,
{
    /// Digest of `q` under the map's current strategy.
    pub fn digest_of<Q>(&self, q: &Q) -> u64
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Associates `value` with `key`'s digest. Returns the replaced value if
    /// a record with that digest already existed; its key is kept.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.digest_of(&key);
        let value = match self.update(hash, value) {
            Ok(old) => return Some(old),
            Err(value) => value,
        };
        if self.records.len() == self.records.capacity() {
            self.grow();
        }
        self.records.push(Record { key, value, hash });
        None
    }

    /// `set` that reports allocation failure instead of aborting.
    pub fn try_set(&mut self, key: K, value: V) -> Result<Option<V>, StoreError> {
        let hash = self.digest_of(&key);
        let value = match self.update(hash, value) {
            Ok(old) => return Ok(Some(old)),
            Err(value) => value,
        };
        if self.records.len() == self.records.capacity() {
            let additional = self.grown_capacity() - self.records.len();
            self.try_reserve(additional)?;
        }
        self.records.push(Record { key, value, hash });
        Ok(None)
    }

    /// Ensures room for `additional` more records without aborting on failure.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), StoreError> {
        let records = self
            .records
            .len()
            .checked_add(additional)
            .ok_or(StoreError::CapacityOverflow)?;
        let bytes = records
            .checked_mul(self.descriptor.record_size)
            .ok_or(StoreError::CapacityOverflow)?;
        if bytes > isize::MAX as usize {
            return Err(StoreError::CapacityOverflow);
        }
        self.records
            .try_reserve_exact(additional)
            .map_err(|source| StoreError::AllocFailed { records, source })
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        let i = self.position(self.digest_of(q))?;
        Some(&self.records[i].value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        let i = self.position(self.digest_of(q))?;
        Some(&mut self.records[i].value)
    }

    /// The stored key and value that `q`'s digest resolves to. Under a
    /// collision the stored key may differ from `q`.
    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        let i = self.position(self.digest_of(q))?;
        let r = &self.records[i];
        Some((&r.key, &r.value))
    }

    /// Removes the record `q`'s digest resolves to; later records move one
    /// slot forward, keeping their order. `None` on a miss.
    pub fn erase<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        let i = self.position(self.digest_of(q))?;
        let r = self.records.remove(i);
        Some((r.key, r.value))
    }

    pub fn exists<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        self.position(self.digest_of(q)).is_some()
    }

    /// Recomputes every cached digest with the current strategy. Where two
    /// records now share a digest, the earlier one survives. Returns the
    /// number of records dropped.
    pub fn rehash(&mut self) -> usize {
        let before = self.records.len();
        let hasher = &self.hasher;
        let mut seen = hashbrown::HashSet::with_capacity(before);
        self.records.retain_mut(|r| {
            r.hash = hasher.hash_one(&r.key);
            seen.insert(r.hash)
        });
        let dropped = before - self.records.len();
        log::debug!(
            "digest map: rehashed {} records, dropped {} duplicates",
            before,
            dropped
        );
        dropped
    }
}

impl<K, V, S> fmt::Debug for DigestMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for DigestMap<K, V, S>
where
    K: Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for DigestMap<K, V, S>
where
    K: Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Self::with_hasher(S::default());
        m.extend(iter);
        m
    }
}

/// Iterator over `(&K, &V)` in storage order.
pub struct Iter<'a, K, V> {
    it: core::slice::Iter<'a, Record<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|r| (&r.key, &r.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back().map(|r| (&r.key, &r.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over `(&K, &mut V)` in storage order.
pub struct IterMut<'a, K, V> {
    it: core::slice::IterMut<'a, Record<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|r| (&r.key, &mut r.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Owning iterator over `(K, V)` in storage order.
pub struct IntoIter<K, V> {
    it: std::vec::IntoIter<Record<K, V>>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|r| (r.key, r.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K, V, S> IntoIterator for DigestMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            it: self.records.into_iter(),
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a DigestMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut DigestMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
