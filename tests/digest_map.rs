// DigestMap integration suite.
//
// Each test documents the behavior it verifies. The core invariants:
// - Round-trip: `set(k, v)` then `get(k)` yields `v`.
// - Update-not-duplicate: re-setting a key keeps one record.
// - Erase of an absent key is a no-op; erase keeps the order of the rest.
// - Identity is the digest: colliding keys alias one record.
use digest_map::{BuildFnHasher, DigestMap, HashRegistry, RecordDescriptor, StoreError};

fn collect<K: Copy, V: Copy, S>(m: &DigestMap<K, V, S>) -> Vec<(K, V)> {
    let mut out = Vec::new();
    m.iterate(|k, v| out.push((*k, *v)));
    out
}

// Test: the integer-to-float walkthrough.
// Verifies: storage-order iteration, erase shifting, and exists after erase.
#[test]
fn end_to_end_int_to_float() {
    let mut m: DigestMap<u32, f32> = DigestMap::new();
    m.set(1, 1.0);
    m.set(2, 2.0);
    m.set(3, 3.0);
    assert_eq!(collect(&m), vec![(1, 1.0), (2, 2.0), (3, 3.0)]);

    m.erase(&2);
    assert_eq!(collect(&m), vec![(1, 1.0), (3, 3.0)]);
    assert!(!m.exists(&2));
    assert!(m.exists(&1));
    assert!(m.exists(&3));
}

// Test: update keeps exactly one record.
#[test]
fn update_not_duplicate() {
    let mut m: DigestMap<String, Vec<u8>> = DigestMap::new();
    m.set("k".to_string(), vec![1]);
    let old = m.set("k".to_string(), vec![2, 2]);
    assert_eq!(old, Some(vec![1]));
    assert_eq!(m.len(), 1);
    assert_eq!(m.get("k"), Some(&vec![2, 2]));
}

// Test: erase of an absent key leaves length and contents untouched.
#[test]
fn erase_absent_is_idempotent() {
    let mut m: DigestMap<u64, i64> = (0..8u64).map(|k| (k, -(k as i64))).collect();
    let before = collect(&m);
    assert_eq!(m.erase(&1000), None);
    assert_eq!(m.erase(&1000), None);
    assert_eq!(collect(&m), before);
}

// Test: order preservation under erase for k1, k2, k3.
#[test]
fn erase_middle_keeps_relative_order() {
    let mut m: DigestMap<&str, u8> = DigestMap::new();
    m.set("k1", 1);
    m.set("k2", 2);
    m.set("k3", 3);
    m.erase(&"k2");
    let keys: Vec<&str> = m.keys().copied().collect();
    assert_eq!(keys, vec!["k1", "k3"]);
}

// Test: collision aliasing with an installed strategy.
// Assumes: the strategy maps every key to one digest.
// Verifies: set(kA, v1); set(kB, v2); get(kA) == v2. This is contracted
// behavior, not a defect.
#[test]
fn collision_aliasing_is_contracted() {
    fn same(_: &[u8]) -> u64 {
        0xc0ffee
    }
    let registry = HashRegistry::new();
    registry.set_hash_function(same);

    let mut m = DigestMap::with_registry(&registry);
    m.set("alpha", 1.5f64);
    m.set("beta", 2.5f64);
    assert_eq!(m.get(&"alpha"), Some(&2.5));
    assert_eq!(m.get(&"beta"), Some(&2.5));
    assert_eq!(m.len(), 1);

    // Same behavior with an owned strategy instead of a registry.
    let mut owned: DigestMap<&str, f64, BuildFnHasher> =
        DigestMap::with_hasher(BuildFnHasher::new(same));
    owned.set("alpha", 1.5);
    owned.set("beta", 2.5);
    assert_eq!(owned.get(&"alpha"), Some(&2.5));
}

// Test: changing the registry's strategy does not touch cached digests.
// Verifies: lookups miss until `rehash`, then succeed again.
#[test]
fn registry_change_requires_rehash() {
    fn shifted(bytes: &[u8]) -> u64 {
        digest_map::djb2(bytes) ^ 0xffff
    }
    let registry = HashRegistry::new();
    let mut m: DigestMap<u32, &str, _> = DigestMap::with_registry(&registry);
    m.set(10, "ten");
    m.set(20, "twenty");

    registry.set_hash_function(shifted);
    assert!(!m.exists(&10));
    assert_eq!(m.get(&20), None);

    assert_eq!(m.rehash(), 0);
    assert_eq!(m.get(&10), Some(&"ten"));
    assert_eq!(m.get(&20), Some(&"twenty"));

    registry.reset_to_default();
    assert_eq!(m.rehash(), 0);
    assert_eq!(m.get(&10), Some(&"ten"));
}

// Test: maps built before and after a registry change follow the same slot.
#[test]
fn maps_share_registry_strategy() {
    fn one(_: &[u8]) -> u64 {
        1
    }
    let registry = HashRegistry::new();
    let before: DigestMap<u8, u8, _> = DigestMap::with_registry(&registry);
    registry.set_hash_function(one);
    let after: DigestMap<u8, u8, _> = DigestMap::with_capacity_and_registry(2, &registry);
    assert_eq!(before.digest_of(&3u8), 1);
    assert_eq!(after.digest_of(&3u8), 1);
    assert_eq!(after.capacity(), 2);
}

// Test: the map's descriptor is the layout of its record type.
#[test]
fn descriptor_reported() {
    let m: DigestMap<u8, u32> = DigestMap::new();
    let d = m.descriptor();
    assert_eq!(*d, RecordDescriptor::of::<u8, u32>());
    assert_eq!(d.key_size, 1);
    assert_eq!(d.value_size, 4);
    assert!(d.record_size >= 1 + 4 + RecordDescriptor::HASH_SIZE);
}

// Test: fallible growth reports overflow with a displayable error.
#[test]
fn try_reserve_error_display() {
    let mut m: DigestMap<u64, u64> = DigestMap::new();
    let err = m.try_reserve(usize::MAX).unwrap_err();
    assert_eq!(err, StoreError::CapacityOverflow);
    assert!(err.to_string().contains("capacity overflow"));
}

// Test: many inserts grow past the initial capacity and stay readable.
// Assumes: the 200 keys have distinct djb2 digests.
#[test]
fn many_inserts_readable() {
    let mut m: DigestMap<String, usize> = DigestMap::new();
    for i in 0..200usize {
        m.set(format!("key-{i}"), i);
    }
    for i in 0..200usize {
        assert_eq!(m.get(format!("key-{i}").as_str()), Some(&i));
    }
    assert_eq!(m.len(), 200);
    assert!(m.capacity() >= m.len());
}
