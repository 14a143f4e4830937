#![cfg(test)]

// Property tests for DigestMap kept inside the crate so the model can share
// the crate's hashers without going through the public surface.

use crate::digest_map::DigestMap;
use crate::hash::{BuildDjb2, BuildFnHasher};
use core::hash::BuildHasher;
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Clone, Debug)]
enum OpI {
    Set(usize, i32),
    Erase(usize),
    Get(usize),
    Exists(String),
    Mutate(usize, i32),
    Iterate,
    Rehash,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let exists_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Set(i, v)),
            idx.clone().prop_map(OpI::Erase),
            idx.clone().prop_map(OpI::Get),
            prop_oneof![exists_pool, "[a-z]{0,5}".prop_map(|s| s)].prop_map(OpI::Exists),
            (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            Just(OpI::Iterate),
            Just(OpI::Rehash),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

/// Reference model: records keyed by digest, plus the storage order.
struct Model<S> {
    hasher: S,
    entries: HashMap<u64, (String, i32)>,
    order: Vec<u64>,
}

impl<S: BuildHasher> Model<S> {
    fn new(hasher: S) -> Self {
        Self {
            hasher,
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn digest(&self, k: &str) -> u64 {
        self.hasher.hash_one(k)
    }

    fn set(&mut self, k: String, v: i32) -> Option<i32> {
        let h = self.digest(&k);
        if let Some(e) = self.entries.get_mut(&h) {
            return Some(std::mem::replace(&mut e.1, v));
        }
        self.entries.insert(h, (k, v));
        self.order.push(h);
        None
    }

    fn erase(&mut self, k: &str) -> Option<(String, i32)> {
        let h = self.digest(k);
        let e = self.entries.remove(&h)?;
        self.order.retain(|&x| x != h);
        Some(e)
    }

    fn get(&self, k: &str) -> Option<i32> {
        self.entries.get(&self.digest(k)).map(|e| e.1)
    }

    fn pairs(&self) -> Vec<(String, i32)> {
        self.order.iter().map(|h| self.entries[h].clone()).collect()
    }
}

fn run<S: BuildHasher + Clone>(
    hasher: S,
    pool: Vec<String>,
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut sut: DigestMap<String, i32, S> = DigestMap::with_hasher(hasher.clone());
    let mut model = Model::new(hasher);

    for op in ops {
        match op {
            OpI::Set(i, v) => {
                let k = pool[i].clone();
                let expected = model.set(k.clone(), v);
                prop_assert_eq!(sut.set(k, v), expected);
            }
            OpI::Erase(i) => {
                let k = &pool[i];
                let expected = model.erase(k);
                prop_assert_eq!(sut.erase(k.as_str()), expected);
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k.as_str()).copied(), model.get(k));
            }
            OpI::Exists(s) => {
                prop_assert_eq!(sut.exists(s.as_str()), model.get(&s).is_some());
                prop_assert_eq!(sut.exists(s.as_str()), sut.get(s.as_str()).is_some());
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                if let Some(v) = sut.get_mut(k.as_str()) {
                    *v = v.saturating_add(d);
                    let h = model.digest(k);
                    let e = model.entries.get_mut(&h).expect("model tracks live digest");
                    e.1 = e.1.saturating_add(d);
                } else {
                    prop_assert!(model.get(k).is_none());
                }
            }
            OpI::Iterate => {
                let mut seen = Vec::new();
                sut.iterate(|k, v| seen.push((k.clone(), *v)));
                prop_assert_eq!(seen, model.pairs());
            }
            OpI::Rehash => {
                // Strategy unchanged, so digests are already unique.
                prop_assert_eq!(sut.rehash(), 0);
            }
        }

        prop_assert_eq!(sut.len(), model.order.len());
        prop_assert_eq!(sut.is_empty(), model.order.is_empty());
        prop_assert!(sut.len() <= sut.capacity());
    }
    Ok(())
}

// Property: state-machine equivalence against the digest-keyed model.
// - `set` returns the replaced value exactly when the digest was present.
// - `erase` returns the stored pair, which under collision may carry a
//   different key than the query.
// - `exists` and `get` agree; iteration follows storage order.
// - `len <= capacity` after every operation.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run(BuildDjb2, pool, ops)?;
    }
}

fn constant(_: &[u8]) -> u64 {
    0
}

// Property: the same invariants when every key collides. The map then never
// holds more than one record.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_all_colliding((pool, ops) in arb_scenario()) {
        let hasher = BuildFnHasher::new(constant);
        let mut probe: DigestMap<String, i32, BuildFnHasher> = DigestMap::with_hasher(hasher);
        for k in &pool {
            probe.set(k.clone(), 0);
        }
        prop_assert_eq!(probe.len(), 1);
        run(hasher, pool, ops)?;
    }
}
