use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

/// Upper bound on AVL height for `n` keys.
fn avl_height_bound(n: usize) -> f64 {
    1.44 * ((n + 2) as f64).log2()
}

fn validate_avl<K: Ord, V>(t: &Avl<K, V>) {
    assert_eq!(t.check_invariants(), Ok(()));
    assert!(
        (t.height() as f64) <= avl_height_bound(t.len()),
        "height {} too large for {} keys",
        t.height(),
        t.len()
    );
}

// Keys come from a small range so puts collide and deletes hit.
#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 3)]
    Put(#[proptest(strategy = "0u8..64")] u8, u32),
    #[proptest(weight = 2)]
    Delete(#[proptest(strategy = "0u8..64")] u8),
    Contains(#[proptest(strategy = "0u8..64")] u8),
}

/// `BTreeMap` with first-write-wins puts, the behaviour every tree here has.
fn model_put(m: &mut BTreeMap<u8, u32>, key: u8, value: u32) -> bool {
    if m.contains_key(&key) {
        return false;
    }
    m.insert(key, value);
    true
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(any::<Op>(), 0..=500)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_avl_equivalence(ops in ops_strategy()) {
        let mut t: Avl<u8, u32> = Avl::new();
        let mut m: BTreeMap<u8, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Put(key, value) => {
                    prop_assert_eq!(t.put(key, value), model_put(&mut m, key, value));
                }
                Op::Delete(key) => {
                    prop_assert_eq!(t.delete(&key), m.remove(&key).is_some());
                }
                Op::Contains(key) => {
                    prop_assert_eq!(t.contains(&key), m.contains_key(&key));
                    prop_assert_eq!(t.get(&key), m.get(&key));
                }
            }

            prop_assert_eq!(t.len(), m.len());
            prop_assert_eq!(t.check_invariants(), Ok(()));
            prop_assert!((t.height() as f64) <= avl_height_bound(t.len()));
        }

        let got: Vec<(u8, u32)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u8, u32)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_bst_equivalence(ops in ops_strategy()) {
        let mut t: Bst<u8, u32> = Bst::new();
        let mut m: BTreeMap<u8, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Put(key, value) => {
                    prop_assert_eq!(t.put(key, value), model_put(&mut m, key, value));
                }
                Op::Delete(key) => {
                    prop_assert_eq!(t.delete(&key), m.remove(&key).is_some());
                }
                Op::Contains(key) => {
                    prop_assert_eq!(t.get(&key), m.get(&key));
                }
            }

            prop_assert_eq!(t.len(), m.len());
            prop_assert_eq!(t.check_invariants(), Ok(()));
        }

        let got: Vec<(u8, u32)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u8, u32)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_keyless_matches_keyed(values in prop::collection::vec(any::<u16>(), 0..=300)) {
        let mut keyless = Keyless::new(|v: &u16| v % 97);
        let mut keyed: Avl<u16, u16> = Avl::new();

        for v in values {
            if v % 3 == 0 {
                prop_assert_eq!(keyless.delete(&v), keyed.delete(&(v % 97)));
            } else {
                prop_assert_eq!(keyless.put(v), keyed.put(v % 97, v));
            }
            prop_assert_eq!(keyless.len(), keyed.len());
        }

        prop_assert_eq!(keyless.to_string(), keyed.to_string());
    }

    #[test]
    fn prop_delete_all_in_any_order(
        (keys, order) in prop::collection::btree_set(any::<i32>(), 0..=200)
            .prop_flat_map(|set| {
                let keys: Vec<i32> = set.into_iter().collect();
                (Just(keys.clone()), Just(keys).prop_shuffle())
            })
    ) {
        let mut t = Avl::new();
        for &k in &keys {
            prop_assert!(t.put(k, ()));
        }
        prop_assert_eq!(t.len(), keys.len());

        for (i, k) in order.iter().enumerate() {
            prop_assert!(t.contains(k));
            prop_assert!(t.delete(k));
            prop_assert!(!t.contains(k));
            prop_assert!(!t.delete(k));
            prop_assert_eq!(t.len(), keys.len() - i - 1);
            prop_assert_eq!(t.check_invariants(), Ok(()));
        }
        prop_assert!(t.is_empty());
        prop_assert_eq!(t.height(), 0);
    }

    #[test]
    fn prop_duplicate_put_is_noop(keys in prop::collection::vec(any::<u32>(), 1..=100), pick in any::<prop::sample::Index>()) {
        let mut t: Avl<u32, usize> = Avl::new();
        for (i, &k) in keys.iter().enumerate() {
            t.put(k, i);
        }
        let before: Vec<(u32, usize)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let height = t.height();

        let key = keys[pick.index(keys.len())];
        prop_assert!(!t.put(key, usize::MAX));

        let after: Vec<(u32, usize)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(t.height(), height);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys = [1, 2, 3, 4, 5, 6, 7];

    for_each_permutation(&keys, |perm| {
        let mut t = Avl::new();
        for (i, &k) in perm.iter().enumerate() {
            assert!(t.put(k, i));
            validate_avl(&t);
        }
        assert!(t.height() <= 4);
        assert_eq!(t.keys().copied().collect::<Vec<_>>(), keys);
    });
}

#[test]
fn exhaustive_delete_order_small_set() {
    let keys = [4, 2, 6, 1, 3, 5, 7];

    // Insert in a fixed order, then remove in all permutations.
    let base: Avl<i32, usize> = keys.iter().enumerate().map(|(i, &k)| (k, i)).collect();
    validate_avl(&base);

    for_each_permutation(&keys, |perm| {
        let mut t = base.clone();
        for (removed, k) in perm.iter().enumerate() {
            assert!(t.delete(k));
            assert!(!t.contains(k));
            assert_eq!(t.len(), keys.len() - removed - 1);
            validate_avl(&t);
        }
        assert!(t.is_empty());
    });
}

#[test]
fn exhaustive_bst_delete_order_small_set() {
    let keys = [4, 2, 6, 1, 3, 5, 7];
    let base: Bst<i32, ()> = keys.iter().map(|&k| (k, ())).collect();

    for_each_permutation(&keys, |perm| {
        let mut t = base.clone();
        for k in &perm {
            assert!(t.delete(k));
            assert_eq!(t.check_invariants(), Ok(()));
        }
        assert!(t.is_empty());
    });
}

#[test]
fn randomized_against_model() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(2);
    let mut t: Avl<u16, u64> = Avl::new();
    let mut m: BTreeMap<u16, u64> = BTreeMap::new();

    for _ in 0..50_000 {
        let key: u16 = rng.gen_range(0..2048);
        match rng.gen_range(0..100) {
            0..=49 => {
                let v: u64 = rng.gen();
                let fresh = !m.contains_key(&key);
                if fresh {
                    m.insert(key, v);
                }
                assert_eq!(t.put(key, v), fresh);
            }
            50..=74 => {
                assert_eq!(t.delete(&key), m.remove(&key).is_some());
            }
            _ => {
                assert_eq!(t.get(&key), m.get(&key));
            }
        }
    }

    assert_eq!(t.len(), m.len());
    validate_avl(&t);
    let got: Vec<(u16, u64)> = t.iter().map(|(k, v)| (*k, *v)).collect();
    let expected: Vec<(u16, u64)> = m.into_iter().collect();
    assert_eq!(got, expected);
}
