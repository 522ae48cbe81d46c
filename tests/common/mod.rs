use proptest::prelude::*;
use std::sync::Once;

#[allow(dead_code)]
pub(super) fn assert_eq_iters<I: Iterator, J: Iterator<Item = I::Item>>(
    mut i: I,
    mut j: J,
) where
    I::Item: std::fmt::Debug + Eq, // same inferred for J::Item
{
    loop {
        match (i.next(), j.next()) {
            (None, None) => return,
            (a, b) => assert_eq!(a, b),
        }
    }
}

// Routes the map's trace events to the test output.  Filter with RUST_LOG,
// e.g. `RUST_LOG=cursor_bst=trace`.
#[allow(dead_code)]
pub(super) fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[allow(dead_code)]
pub(super) type SmallIntPairs = Vec<(u16, u16)>;

#[allow(dead_code)]
pub(super) fn small_int_pairs() -> impl Strategy<Value = SmallIntPairs> {
    prop::collection::vec((0u16..1024u16, 0u16..1024u16), 0..512)
}

#[allow(dead_code)]
pub(super) fn string_u16_pairs() -> impl Strategy<Value = Vec<(String, u16)>> {
    prop::collection::vec(("[a-z]{0,2}", 0u16..1024u16), 0..512)
}

/// One step of a random workload.
#[derive(Clone, Debug)]
#[allow(dead_code)]
pub(super) enum Op {
    Insert(u16, u16),
    Erase(u16),
    Search(u16),
    Next,
    First,
}

// Keys are drawn from a narrow range so that erases and searches often hit.
#[allow(dead_code)]
pub(super) fn ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        4 => (0u16..64, any::<u16>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => (0u16..64).prop_map(Op::Erase),
        1 => (0u16..64).prop_map(Op::Search),
        2 => Just(Op::Next),
        1 => Just(Op::First),
    ];
    prop::collection::vec(op, 0..256)
}
