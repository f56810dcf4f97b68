#![cfg(test)]

// Property tests for ChainedHashTable kept inside the crate so they can
// check the structural invariants of `Buckets` directly.

use crate::hash_table::ChainedHashTable;
use crate::{DEFAULT_CAPACITY, LOAD_THRESHOLD};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations so failures shrink to small key sets.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Get(usize),
    Remove(usize),
    Contains(String),
    ContainsValue(i32),
    Mutate(usize, i32),
    CursorRemoveEvery(usize),
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=40).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), -20i32..20).prop_map(|(i, v)| OpI::Put(i, v)),
            2 => idx.clone().prop_map(OpI::Get),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,4}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => (-20i32..20).prop_map(OpI::ContainsValue),
            1 => (idx.clone(), -5i32..5).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => (1usize..4).prop_map(OpI::CursorRemoveEvery),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants checked after every operation:
// - `len` equals the model's size and the number of traversed entries.
// - the count equals the sum of chain lengths.
// - keys are unique in traversal.
// - load factor never exceeds LOAD_THRESHOLD.
// - capacity is always DEFAULT_CAPACITY grown by zero or more 2C+1 steps.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: ChainedHashTable<String, i32> = ChainedHashTable::new();
        let mut model: HashMap<String, i32> = HashMap::new();

        for op in ops {
            match op {
                OpI::Put(i, v) => {
                    let k = pool[i].clone();
                    prop_assert_eq!(sut.put(k.clone(), v), model.insert(k, v));
                }
                OpI::Get(i) => {
                    prop_assert_eq!(sut.get(pool[i].as_str()), model.get(&pool[i]));
                }
                OpI::Remove(i) => {
                    prop_assert_eq!(sut.remove(pool[i].as_str()), model.remove(&pool[i]));
                }
                OpI::Contains(s) => {
                    prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(&s));
                }
                OpI::ContainsValue(v) => {
                    prop_assert_eq!(sut.contains_value(&v), model.values().any(|mv| *mv == v));
                }
                OpI::Mutate(i, d) => {
                    let k = &pool[i];
                    match (sut.get_mut(k.as_str()), model.get_mut(k)) {
                        (Some(sv), Some(mv)) => {
                            *sv = sv.saturating_add(d);
                            *mv = mv.saturating_add(d);
                        }
                        (None, None) => {}
                        _ => prop_assert!(false, "presence mismatch for {:?}", k),
                    }
                }
                OpI::CursorRemoveEvery(n) => {
                    let mut removed = Vec::new();
                    {
                        let mut cursor = sut.cursor();
                        let mut i = 0usize;
                        while cursor.has_next() {
                            let (k, _) = cursor.next().expect("has_next was true");
                            let k = k.clone();
                            if i % n == 0 {
                                let (rk, rv) = cursor.remove().expect("entry just yielded");
                                prop_assert_eq!(&rk, &k);
                                removed.push((rk, rv));
                            }
                            i += 1;
                        }
                    }
                    for (k, v) in removed {
                        prop_assert_eq!(model.remove(&k), Some(v));
                    }
                }
                OpI::Clear => {
                    sut.clear();
                    model.clear();
                    prop_assert_eq!(sut.capacity(), DEFAULT_CAPACITY);
                }
                OpI::Iterate => {
                    let s_keys: BTreeSet<_> = sut.iter().map(|(k, _)| k.clone()).collect();
                    let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                    prop_assert_eq!(s_keys, m_keys);
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            prop_assert_eq!(sut.buckets_for_test().chain_lengths_sum(), model.len());
            let traversed: Vec<&String> = sut.iter().map(|(k, _)| k).collect();
            let unique: BTreeSet<&String> = traversed.iter().copied().collect();
            prop_assert_eq!(traversed.len(), sut.len());
            prop_assert_eq!(unique.len(), traversed.len());
            prop_assert!(sut.load_factor() <= LOAD_THRESHOLD);

            let mut cap = DEFAULT_CAPACITY;
            while cap < sut.capacity() {
                cap = cap * 2 + 1;
            }
            prop_assert_eq!(cap, sut.capacity());
        }

        for (k, v) in &model {
            prop_assert_eq!(sut.get(k.as_str()), Some(v));
        }
    }
}
