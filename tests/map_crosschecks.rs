use cursor_bst::TreeMap;
use proptest::prelude::*;
use std::collections::BTreeMap as StdMap;
use std::ops::Bound::*;

mod common;
use common::*;

// A std map plus the key the cursor should be on.
struct Model {
    map: StdMap<u16, u16>,
    cursor: Option<u16>,
}

impl Model {
    fn entry(&self, k: Option<u16>) -> Option<(u16, u16)> {
        k.and_then(|k| self.map.get_key_value(&k)).map(|(k, v)| (*k, *v))
    }
}

fn owned<K: Copy, V: Copy>(e: Option<(&K, &V)>) -> Option<(K, V)> {
    e.map(|(k, v)| (*k, *v))
}

fn check_ops(ops: Vec<Op>) {
    init_tracing();

    let mut tm = TreeMap::new();
    let mut model = Model {
        map: StdMap::new(),
        cursor: None,
    };

    for op in ops {
        match op {
            Op::Insert(k, v) => {
                assert_eq!(tm.insert(k, v), model.map.insert(k, v));
                model.cursor = Some(k);
            }

            Op::Erase(k) => {
                let expect = model.map.remove(&k).map(|v| (k, v));
                assert_eq!(tm.erase(&k), expect);
                model.cursor = None;
            }

            Op::Search(k) => {
                let expect = model.entry(Some(k));
                assert_eq!(owned(tm.search(&k)), expect);
                if expect.is_some() {
                    model.cursor = Some(k);
                }
            }

            Op::Next => {
                model.cursor = model.cursor.and_then(|c| {
                    model.map.range((Excluded(c), Unbounded)).next().map(|e| *e.0)
                });
                assert_eq!(owned(tm.next()), model.entry(model.cursor));
            }

            Op::First => {
                model.cursor = model.map.keys().next().copied();
                assert_eq!(owned(tm.first()), model.entry(model.cursor));
            }
        }

        tm.check().unwrap();
        assert_eq!(tm.len(), model.map.len());
        assert_eq!(owned(tm.current()), model.entry(model.cursor));
        assert_eq_iters(tm.iter(), model.map.iter());
    }
}

fn check_upper_bound(v: SmallIntPairs, probes: Vec<u16>) {
    let tm: TreeMap<_, _> = v.iter().copied().collect();
    let sm: StdMap<_, _> = v.into_iter().collect();

    for k in probes {
        assert_eq!(tm.upper_bound(&k), sm.range(k..).next());
    }
}

fn check_size_conservation(v: SmallIntPairs, drop_every: usize) {
    let mut tm: TreeMap<_, _> = v.iter().copied().collect();
    let distinct: Vec<u16> = tm.keys().copied().collect();

    let mut erased = 0;
    for k in distinct.iter().step_by(drop_every) {
        assert!(tm.erase(k).is_some());
        erased += 1;
    }
    tm.check().unwrap();

    let mut walked = 0;
    let mut e = tm.first().map(|e| *e.0);
    while let Some(k) = e {
        assert!(tm.search(&k).is_some());
        walked += 1;
        e = tm.next().map(|e| *e.0);
    }

    assert_eq!(walked, distinct.len() - erased);
    assert_eq!(tm.len(), walked);
}

fn check_round_trip(v: Vec<(String, u16)>) {
    let mut tm = TreeMap::new();
    let mut sm = StdMap::new();
    for (k, x) in v.iter() {
        tm.insert(k.as_str(), x);
        sm.insert(k.as_str(), x);
    }

    for (k, x) in sm.iter() {
        assert_eq!(tm.get(k), Some(x));
    }

    for k in sm.keys() {
        assert!(tm.erase(k).is_some());
        assert_eq!(tm.search(k), None);
        tm.check().unwrap();
    }

    assert!(tm.is_empty());
}

#[test]
fn ops_regr_erase_between_searches() {
    check_ops(vec![
        Op::Insert(5, 0),
        Op::Insert(3, 0),
        Op::Insert(8, 0),
        Op::Search(3),
        Op::Erase(5),
        Op::Next,
        Op::First,
        Op::Next,
        Op::Next,
        Op::Next,
    ]);
}

proptest! {
    #[test]
    fn test_ops(ops in ops()) {
        check_ops(ops);
    }

    #[test]
    fn test_upper_bound(v in small_int_pairs(), probes in prop::collection::vec(0u16..1100, 0..64)) {
        check_upper_bound(v, probes);
    }

    #[test]
    fn test_size_conservation(v in small_int_pairs(), drop_every in 1usize..5) {
        check_size_conservation(v, drop_every);
    }

    #[test]
    fn test_round_trip(v in string_u16_pairs()) {
        check_round_trip(v);
    }
}
