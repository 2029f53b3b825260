// HashTable property tests against an insertion-ordered Vec model.
//
// Model: Vec<(key bytes, value)> in first-insertion order.
//  - set: overwrite value in place or append.
//  - get_or_insert: append if absent; never touches an existing value.
//  - set_with_eviction: like set; eviction sees the old value exactly once
//    and only when the key was present.
// Invariants after every step: len() == model.len(), load factor holds.
// Final check: iteration order equals the model order.
use proptest::prelude::*;
use seq_hash::HashTable;
use seq_hash::TableConfig;

#[derive(Debug, Clone)]
enum Op {
    Set(Vec<u8>, usize),
    GetOrInsert(Vec<u8>, usize),
    SetWithEviction(Vec<u8>, usize),
    Get(Vec<u8>),
}

// Small alphabet and short keys so that overwrites are common.
fn key() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(0u8..4, 0..5)
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (key(), any::<usize>()).prop_map(|(k, v)| Op::Set(k, v)),
        (key(), any::<usize>()).prop_map(|(k, v)| Op::GetOrInsert(k, v)),
        (key(), any::<usize>()).prop_map(|(k, v)| Op::SetWithEviction(k, v)),
        key().prop_map(Op::Get),
    ]
}

fn position(model: &[(&[u8], usize)], key: &[u8]) -> Option<usize> {
    model.iter().position(|(k, _)| *k == key)
}

proptest! {
    #[test]
    fn prop_matches_ordered_model(
        ops in proptest::collection::vec(op(), 1..300),
        initial_capacity in 1usize..16,
        max_load_factor in 0.1f64..0.95,
        growth_factor in 2usize..5,
    ) {
        let config = TableConfig::default()
            .with_initial_capacity(initial_capacity)
            .with_max_load_factor(max_load_factor)
            .with_growth_factor(growth_factor);
        let mut table = HashTable::with_config(config).unwrap();
        let mut model: Vec<(&[u8], usize)> = Vec::new();

        for op in &ops {
            match op {
                Op::Set(key, value) => {
                    table.set(key, *value);
                    match position(&model, key) {
                        Some(i) => model[i].1 = *value,
                        None => model.push((key.as_slice(), *value)),
                    }
                }
                Op::GetOrInsert(key, value) => {
                    let result = table.get_or_insert(key, *value);
                    match position(&model, key) {
                        Some(i) => prop_assert_eq!(result, (model[i].1, true)),
                        None => {
                            prop_assert_eq!(result, (*value, false));
                            model.push((key.as_slice(), *value));
                        }
                    }
                }
                Op::SetWithEviction(key, value) => {
                    let mut evicted = Vec::new();
                    table.set_with_eviction(key, *value, |k, v| evicted.push((k.to_vec(), v)));
                    match position(&model, key) {
                        Some(i) => {
                            prop_assert_eq!(evicted, vec![(key.clone(), model[i].1)]);
                            model[i].1 = *value;
                        }
                        None => {
                            prop_assert!(evicted.is_empty());
                            model.push((key.as_slice(), *value));
                        }
                    }
                }
                Op::Get(key) => {
                    let expected = position(&model, key).map(|i| model[i].1);
                    prop_assert_eq!(table.get(key), expected);
                }
            }

            prop_assert_eq!(table.len(), model.len());
            prop_assert!(table.len() as f64 <= max_load_factor * table.capacity() as f64);
        }

        let entries: Vec<(&[u8], usize)> = table.iter().collect();
        prop_assert_eq!(entries, model);
    }

    #[test]
    fn prop_last_set_wins(entries in proptest::collection::vec((key(), any::<usize>()), 1..200)) {
        let mut table = HashTable::new();
        for (key, value) in &entries {
            table.set(key, *value);
        }

        for (key, _) in &entries {
            let latest = entries.iter().rev().find(|(k, _)| k == key).map(|(_, v)| *v);
            prop_assert_eq!(table.get(key), latest);
        }
    }
}
