mod common;

use common::{minus, plus, row, tagged, Harness};
use tributary::stream::operators::{JoinKind, JoinSide};

#[test]
fn test_joins_on_shared_variable() {
    let mut h = Harness::new(JoinKind::NestedLoop, &[]);
    assert!(h.add_left(row(&[("a", 1), ("b", 2)])).is_empty());
    assert!(h.add_left(row(&[("a", 2), ("b", 2)])).is_empty());

    let out = h.add_right(row(&[("a", 1), ("c", 4)]));
    assert_eq!(tagged(&out), vec![plus(row(&[("a", 1), ("b", 2), ("c", 4)]))]);

    h.end(JoinSide::Left);
    h.end(JoinSide::Right);
    assert!(h.join.is_ended());
    assert_eq!(h.emitted.len(), 1);
}

#[test]
fn test_each_pair_emitted_once() {
    let mut h = Harness::new(JoinKind::NestedLoop, &[]);
    h.add_left(row(&[("a", 1), ("b", 1)]));
    h.add_right(row(&[("a", 1), ("c", 1)]));
    h.add_left(row(&[("a", 1), ("b", 2)]));
    h.add_right(row(&[("a", 1), ("c", 2)]));

    // 2 left x 2 right, every pair exactly once
    assert_eq!(h.emitted.len(), 4);
    assert_eq!(h.view.len(), 4);
    for (_, count) in h.view.iter() {
        assert_eq!(count, 1);
    }
}

#[test]
fn test_retraction_emits_retracted_pairs() {
    let mut h = Harness::new(JoinKind::NestedLoop, &[]);
    h.add_left(row(&[("a", 1), ("b", 2)]));
    h.add_right(row(&[("a", 1), ("c", 4)]));
    h.add_right(row(&[("a", 1), ("c", 5)]));

    let mut out = tagged(&h.retract_left(row(&[("a", 1), ("b", 2)])));
    out.sort_by_key(|(_, r)| r.to_string());
    assert_eq!(
        out,
        vec![
            minus(row(&[("a", 1), ("b", 2), ("c", 4)])),
            minus(row(&[("a", 1), ("b", 2), ("c", 5)])),
        ]
    );
    assert!(h.view.is_empty());
}

#[test]
fn test_retraction_of_unknown_row_is_ignored() {
    let mut h = Harness::new(JoinKind::NestedLoop, &[]);
    h.add_right(row(&[("a", 1)]));
    assert!(h.retract_left(row(&[("a", 1)])).is_empty());
    assert_eq!(h.join.stats().ignored_retractions, 1);

    // the ignored retraction must not cancel a later addition
    let out = h.add_left(row(&[("a", 1)]));
    assert_eq!(tagged(&out), vec![plus(row(&[("a", 1)]))]);
}

#[test]
fn test_duplicate_rows_are_a_multiset() {
    let mut h = Harness::new(JoinKind::NestedLoop, &[]);
    h.add_left(row(&[("a", 1)]));
    h.add_left(row(&[("a", 1)]));
    h.add_right(row(&[("a", 1), ("c", 3)]));
    assert_eq!(h.view.multiplicity(&row(&[("a", 1), ("c", 3)])), 2);

    h.retract_left(row(&[("a", 1)]));
    assert_eq!(h.view.multiplicity(&row(&[("a", 1), ("c", 3)])), 1);
}

#[test]
fn test_incompatible_rows_do_not_join() {
    let mut h = Harness::new(JoinKind::NestedLoop, &[]);
    h.add_left(row(&[("a", 1), ("b", 1)]));
    assert!(h.add_right(row(&[("a", 1), ("b", 2)])).is_empty());
    assert!(h.add_right(row(&[("a", 2), ("c", 1)])).is_empty());
}

#[test]
fn test_disjoint_rows_form_cross_product() {
    let mut h = Harness::new(JoinKind::NestedLoop, &[]);
    h.add_left(row(&[("a", 1)]));
    h.add_left(row(&[("a", 2)]));
    let out = h.add_right(row(&[("z", 9)]));
    assert_eq!(out.len(), 2);
}
