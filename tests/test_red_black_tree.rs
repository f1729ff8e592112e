extern crate rand;
extern crate rb_ordered_map;
extern crate simplelog;

use rand::{Rng, SeedableRng, XorShiftRng};
use rb_ordered_map::red_black_tree::RedBlackMap;
use simplelog::{Config, LevelFilter, TestLogger};
use std::collections::BTreeMap;

fn init_logging() {
    let _ = TestLogger::init(LevelFilter::Debug, Config::default());
}

#[test]
fn int_test_red_black_map() {
    init_logging();
    let mut rng: XorShiftRng = SeedableRng::from_seed([1, 1, 1, 1]);
    let mut map = RedBlackMap::new();
    let mut expected = Vec::new();
    for _ in 0..100_000 {
        let key = rng.gen::<u32>();
        let val = rng.gen::<u32>();

        map.insert(key, val);
        expected.push((key, val));
    }

    expected.reverse();
    expected.sort_by(|l, r| l.0.cmp(&r.0));
    expected.dedup_by_key(|pair| pair.0);

    assert_eq!(map.len(), expected.len());
    assert_eq!(map.capacity(), expected.len());

    assert_eq!(map.min(), Some(&expected[0].0));
    assert_eq!(map.max(), Some(&expected[expected.len() - 1].0));

    for entry in &expected {
        assert!(map.contains_key(&entry.0));
        assert_eq!(map.get(&entry.0), Some(&entry.1));
        assert_eq!(map.ceil(&entry.0), Some(&entry.0));
        assert_eq!(map.floor(&entry.0), Some(&entry.0));
    }
    assert_eq!(map.collect_pairs(), expected);

    for entry in &mut expected {
        let val_1 = rng.gen::<u32>();
        let val_2 = rng.gen::<u32>();

        let old_val = map.insert(entry.0, val_1);
        assert_eq!(old_val, Some(entry.1));
        {
            let old_val = map.get_mut(&entry.0);
            *old_val.unwrap() = val_2;
        }
        *entry = (entry.0, val_2);
        assert_eq!(map.get(&entry.0), Some(&val_2));
    }

    let mut expected_len = expected.len();
    for entry in expected {
        let old_entry = map.remove(&entry.0);
        expected_len -= 1;
        assert_eq!(old_entry, Some((entry.0, entry.1)));
        assert_eq!(map.len(), expected_len);
    }
    assert!(map.is_empty());
}

#[test]
fn int_test_red_black_map_against_btree_map() {
    init_logging();
    let mut rng: XorShiftRng = SeedableRng::from_seed([2, 3, 5, 7]);
    let mut map = RedBlackMap::new();
    let mut expected = BTreeMap::new();
    let mut distinct_inserts = 0;
    let mut successful_removes = 0;

    for _ in 0..20_000 {
        let key = rng.gen_range(0u32, 2_000);
        match rng.gen_range(0, 3) {
            0 | 1 => {
                let val = rng.gen::<u64>();
                let old_val = map.insert(key, val);
                if old_val.is_none() {
                    distinct_inserts += 1;
                }
                assert_eq!(old_val, expected.insert(key, val));
            },
            _ => {
                let old_entry = map.remove(&key);
                if old_entry.is_some() {
                    successful_removes += 1;
                }
                assert_eq!(old_entry.map(|pair| pair.1), expected.remove(&key));
            },
        }
        assert_eq!(map.len(), distinct_inserts - successful_removes);
    }

    assert_eq!(map.collect_keys(), expected.keys().cloned().collect::<Vec<u32>>());
    assert_eq!(map.collect_values(), expected.values().cloned().collect::<Vec<u64>>());
    assert!(map.iter().eq(expected.iter()));

    for _ in 0..1_000 {
        let a = rng.gen_range(0u32, 2_100);
        let b = rng.gen_range(0u32, 2_100);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        let mut seen = Vec::new();
        map.visit_between(&a, &b, |key, value| {
            seen.push((*key, *value));
            true
        });
        let wanted: Vec<(u32, u64)> = expected.range(lo..=hi).map(|(k, v)| (*k, *v)).collect();
        assert_eq!(seen, wanted);

        let from: Vec<&u32> = map.range(lo..).map(|pair| pair.0).collect();
        assert_eq!(from, expected.range(lo..).map(|pair| pair.0).collect::<Vec<&u32>>());
    }
}

#[test]
fn int_test_red_black_map_ascending_and_descending() {
    init_logging();
    let mut map = RedBlackMap::new();
    for key in 0..1_000u32 {
        map.insert(key, ());
    }
    for key in (0..1_000u32).rev().filter(|key| key % 2 == 0) {
        assert_eq!(map.remove(&key), Some((key, ())));
    }
    for key in (1_000..2_000u32).rev() {
        map.insert(key, ());
    }
    for key in (1_000..2_000u32).filter(|key| key % 2 == 1) {
        assert_eq!(map.remove(&key), Some((key, ())));
    }

    let keys = map.collect_keys();
    assert_eq!(keys.len(), 1_000);
    assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(keys.iter().take(500).all(|key| key % 2 == 1));
    assert!(keys.iter().skip(500).all(|key| key % 2 == 0));
}
