use avl_collection::AvlCollection;
use proptest::prelude::*;

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

// Asserts the tree invariants along with the properties that callers can
// observe without looking inside the tree.
#[allow(dead_code)]
pub(super) fn assert_well_formed<K: Ord, V>(c: &AvlCollection<K, V>) {
    c.check().unwrap();
    assert_eq!(c.iter().count(), c.len());
    assert!(c.keys().zip(c.keys().skip(1)).all(|(a, b)| a < b));

    // an AVL tree with n nodes is no taller than 1.44 log2(n + 2)
    let bound = 1.45 * ((c.len() + 2) as f64).log2();
    assert!((c.height() as f64) <= bound, "too tall: {}", c.height());
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

// Keys to remove, drawn from the same space as small_int_pairs so that most
// of them hit.
#[allow(dead_code)]
pub(super) fn small_int_keys() -> impl Strategy<Value = Vec<u16>> {
    prop::collection::vec(0u16..1024u16, 0..512)
}

#[allow(dead_code)]
pub(super) fn closed_interval_1k() -> impl Strategy<Value = (u16, u16)> {
    // mostly well-formed intervals, with some inverted ones
    prop_oneof![
        4 => (0u16..1024).prop_flat_map(|lo| (Just(lo), lo..1024)),
        1 => (0u16..1024, 0u16..1024),
    ]
}
