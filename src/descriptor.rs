//! Record layout: one `(key, value, digest)` triple and a report of how the
//! compiler lays it out for a concrete key/value pair.

use core::mem::{align_of, offset_of, size_of};

#[derive(Clone, Debug)]
pub(crate) struct Record<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u64,
}

/// Sizes and byte offsets of the fields of one record.
///
/// Field order and padding are the compiler's choice; no field is assumed
/// to start at offset 0. Computed once when a map is built and never
/// changed afterwards.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RecordDescriptor {
    pub record_size: usize,
    pub record_align: usize,
    pub key_size: usize,
    pub value_size: usize,
    pub key_offset: usize,
    pub value_offset: usize,
    pub hash_offset: usize,
}

impl RecordDescriptor {
    pub const HASH_SIZE: usize = size_of::<u64>();

    pub fn of<K, V>() -> Self {
        Self {
            record_size: size_of::<Record<K, V>>(),
            record_align: align_of::<Record<K, V>>(),
            key_size: size_of::<K>(),
            value_size: size_of::<V>(),
            key_offset: offset_of!(Record<K, V>, key),
            value_offset: offset_of!(Record<K, V>, value),
            hash_offset: offset_of!(Record<K, V>, hash),
        }
    }

    /// Bytes of a record not covered by any field.
    pub fn padding(&self) -> usize {
        self.record_size - self.key_size - self.value_size - Self::HASH_SIZE
    }
}
