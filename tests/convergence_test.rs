//! Property-based checks that the emitted deltas always sum to the batch join of both
//! inputs' alive rows, whatever the interleaving of additions and retractions.

mod common;

use common::{reference_join, Harness, SideState};
use oxigraph::model::{Literal, Term, Variable};
use proptest::prelude::*;
use tributary::core::{Bindings, JoinVariables};
use tributary::stream::operators::{JoinKind, JoinSide};

#[derive(Debug, Clone)]
struct Event {
    side: JoinSide,
    retract: bool,
    key: Option<i64>,
    value: i64,
}

impl Event {
    fn row(&self) -> Bindings {
        let payload = match self.side {
            JoinSide::Left => "b",
            JoinSide::Right => "c",
        };
        let value = Term::from(Literal::from(self.value));
        let mut pairs = vec![(Variable::new(payload).unwrap(), value)];
        if let Some(key) = self.key {
            pairs.push((Variable::new("a").unwrap(), Term::from(Literal::from(key))));
        }
        let row = Bindings::from_pairs(pairs);
        if self.retract {
            row.retracted()
        } else {
            row
        }
    }
}

/// Drops the key of right rows, so no right row shares a variable with a left row.
fn without_right_keys(events: Vec<Event>) -> Vec<Event> {
    events
        .into_iter()
        .map(|e| match e.side {
            JoinSide::Right => Event { key: None, ..e },
            JoinSide::Left => e,
        })
        .collect()
}

fn event_strategy() -> impl Strategy<Value = Event> {
    (
        prop_oneof![Just(JoinSide::Left), Just(JoinSide::Right)],
        prop::bool::weighted(0.35),
        prop::option::weighted(0.9, 0..3i64),
        0..2i64,
    )
        .prop_map(|(side, retract, key, value)| Event { side, retract, key, value })
}

fn kind_strategy() -> impl Strategy<Value = JoinKind> {
    prop_oneof![
        Just(JoinKind::NestedLoop),
        Just(JoinKind::Hash),
        Just(JoinKind::Optional),
        Just(JoinKind::Minus),
    ]
}

fn check_convergence(kind: JoinKind, join_variables: &[&str], events: &[Event]) {
    let mut h = Harness::new(kind, join_variables);
    let mut left = SideState::default();
    let mut right = SideState::default();
    let vars = JoinVariables::from_names(join_variables).unwrap();

    for (step, event) in events.iter().enumerate() {
        let row = event.row();
        match event.side {
            JoinSide::Left => left.apply(&row),
            // presence counts cannot tell rows of one key apart
            JoinSide::Right if kind == JoinKind::Minus => right.apply_keyed(&row, &vars),
            JoinSide::Right => right.apply(&row),
        }
        h.push(event.side, row);

        let expected = reference_join(kind, &left.0, &right.0);
        assert!(h.view.is_consistent(), "{} join went negative at step {}", kind, step);
        assert_eq!(h.view, expected, "{} join diverged at step {}", kind, step);
    }

    h.end(JoinSide::Left);
    h.end(JoinSide::Right);
    assert!(h.join.is_ended());
}

#[test]
fn test_retraction_before_addition_sequence() {
    let events = vec![
        Event { side: JoinSide::Right, retract: true, key: Some(1), value: 0 },
        Event { side: JoinSide::Left, retract: false, key: Some(1), value: 0 },
        Event { side: JoinSide::Right, retract: false, key: Some(1), value: 0 },
        Event { side: JoinSide::Right, retract: false, key: Some(1), value: 1 },
        Event { side: JoinSide::Right, retract: true, key: Some(1), value: 0 },
        Event { side: JoinSide::Right, retract: true, key: Some(1), value: 1 },
        Event { side: JoinSide::Left, retract: true, key: Some(1), value: 0 },
    ];
    for kind in [JoinKind::NestedLoop, JoinKind::Hash, JoinKind::Optional, JoinKind::Minus] {
        check_convergence(kind, &["a"], &events);
    }
}

#[test]
fn test_unbound_join_variable_sequence() {
    let events = vec![
        Event { side: JoinSide::Left, retract: false, key: None, value: 0 },
        Event { side: JoinSide::Right, retract: false, key: None, value: 1 },
        Event { side: JoinSide::Right, retract: false, key: Some(2), value: 1 },
        Event { side: JoinSide::Right, retract: true, key: None, value: 1 },
    ];
    for kind in [JoinKind::NestedLoop, JoinKind::Hash, JoinKind::Optional, JoinKind::Minus] {
        check_convergence(kind, &["a"], &events);
    }
}

#[test]
fn test_keyed_left_against_unbound_right_sequence() {
    let events = vec![
        Event { side: JoinSide::Left, retract: false, key: Some(1), value: 0 },
        Event { side: JoinSide::Left, retract: false, key: Some(2), value: 1 },
        Event { side: JoinSide::Right, retract: false, key: None, value: 0 },
        Event { side: JoinSide::Right, retract: false, key: Some(1), value: 0 },
        Event { side: JoinSide::Left, retract: false, key: None, value: 1 },
        Event { side: JoinSide::Right, retract: true, key: Some(1), value: 0 },
        Event { side: JoinSide::Right, retract: true, key: None, value: 0 },
        Event { side: JoinSide::Left, retract: true, key: Some(2), value: 1 },
    ];
    for kind in [JoinKind::NestedLoop, JoinKind::Hash, JoinKind::Optional, JoinKind::Minus] {
        check_convergence(kind, &["a"], &events);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn test_view_matches_batch_join(
        kind in kind_strategy(),
        events in prop::collection::vec(event_strategy(), 0..40),
    ) {
        check_convergence(kind, &["a"], &events);
    }

    #[test]
    fn test_minus_without_join_variables(
        events in prop::collection::vec(event_strategy(), 0..30),
    ) {
        check_convergence(JoinKind::Minus, &[], &without_right_keys(events));
    }

    #[test]
    fn test_optional_without_join_variables(
        events in prop::collection::vec(event_strategy(), 0..30),
    ) {
        check_convergence(JoinKind::Optional, &[], &events);
    }
}
