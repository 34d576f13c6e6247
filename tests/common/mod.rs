#![allow(dead_code)]

use oxigraph::model::{Literal, Term, Variable};
use tributary::core::{Bindings, JoinVariables};
use tributary::sources::{self, BindingsSender};
use tributary::stream::operators::{DynIncrementalJoin, JoinBuilder, JoinKind, JoinSide};
use tributary::{MaterializedView, Polarity};

/// Row binding each named variable to an integer literal.
pub fn row(pairs: &[(&str, i64)]) -> Bindings {
    Bindings::from_pairs(
        pairs.iter().map(|(n, v)| (Variable::new(*n).unwrap(), Term::from(Literal::from(*v)))),
    )
}

/// Drives a join through channel sources, one event at a time, draining after each.
pub struct Harness {
    left: Option<BindingsSender>,
    right: Option<BindingsSender>,
    pub join: DynIncrementalJoin,
    pub view: MaterializedView,
    pub emitted: Vec<Bindings>,
}

impl Harness {
    pub fn new(kind: JoinKind, join_variables: &[&str]) -> Self {
        let (left, left_rx) = sources::channel();
        let (right, right_rx) = sources::channel();
        let join = JoinBuilder::new(kind)
            .join_variables(JoinVariables::from_names(join_variables).unwrap())
            .build(sources::boxed(left_rx), sources::boxed(right_rx))
            .unwrap();
        Harness {
            left: Some(left),
            right: Some(right),
            join,
            view: MaterializedView::new(),
            emitted: Vec::new(),
        }
    }

    /// Pushes one event and returns the deltas it produced.
    pub fn push(&mut self, side: JoinSide, row: Bindings) -> Vec<Bindings> {
        let sender = match side {
            JoinSide::Left => self.left.as_ref(),
            JoinSide::Right => self.right.as_ref(),
        };
        sender.expect("source already ended").send(row).unwrap();
        self.drain()
    }

    pub fn add_left(&mut self, row: Bindings) -> Vec<Bindings> {
        self.push(JoinSide::Left, row)
    }

    pub fn retract_left(&mut self, row: Bindings) -> Vec<Bindings> {
        self.push(JoinSide::Left, row.retracted())
    }

    pub fn add_right(&mut self, row: Bindings) -> Vec<Bindings> {
        self.push(JoinSide::Right, row)
    }

    pub fn retract_right(&mut self, row: Bindings) -> Vec<Bindings> {
        self.push(JoinSide::Right, row.retracted())
    }

    pub fn end(&mut self, side: JoinSide) -> Vec<Bindings> {
        match side {
            JoinSide::Left => self.left.take(),
            JoinSide::Right => self.right.take(),
        };
        self.drain()
    }

    pub fn drain(&mut self) -> Vec<Bindings> {
        let deltas = self.join.drain_available().unwrap();
        self.view.apply_all(&deltas);
        self.emitted.extend(deltas.iter().cloned());
        deltas
    }
}

/// Deltas paired with their polarity, since row equality ignores it.
pub fn tagged(deltas: &[Bindings]) -> Vec<(Polarity, Bindings)> {
    deltas.iter().map(|d| (d.polarity(), d.clone())).collect()
}

pub fn plus(row: Bindings) -> (Polarity, Bindings) {
    (Polarity::Addition, row)
}

pub fn minus(row: Bindings) -> (Polarity, Bindings) {
    (Polarity::Retraction, row)
}

/// Alive multiset of one side after a sequence of events. Retractions of absent rows
/// are dropped, as the join strategies do.
#[derive(Debug, Default, Clone)]
pub struct SideState(pub Vec<Bindings>);

impl SideState {
    pub fn apply(&mut self, event: &Bindings) {
        if event.is_addition() {
            self.0.push(event.with_polarity(Polarity::Addition));
        } else if let Some(pos) = self.0.iter().position(|r| r == event) {
            self.0.swap_remove(pos);
        }
    }

    /// Like [`apply`](Self::apply), but a retraction removes any alive row with the same
    /// key. Mirrors a side that only keeps presence counts.
    pub fn apply_keyed(&mut self, event: &Bindings, join_variables: &JoinVariables) {
        if event.is_addition() {
            self.apply(event);
            return;
        }
        let key = join_variables.fingerprint(event);
        if let Some(pos) = self.0.iter().position(|r| join_variables.fingerprint(r) == key) {
            self.0.swap_remove(pos);
        }
    }
}

/// Batch evaluation of `kind` over two materialized inputs, with SPARQL semantics:
/// compatibility is decided on every shared variable, never on a key.
pub fn reference_join(kind: JoinKind, left: &[Bindings], right: &[Bindings]) -> MaterializedView {
    let mut view = MaterializedView::new();
    for l in left {
        let merges: Vec<Bindings> = right.iter().filter_map(|r| l.merge(r)).collect();
        match kind {
            JoinKind::NestedLoop | JoinKind::Hash => view.apply_all(&merges),
            JoinKind::Optional if merges.is_empty() => view.apply(l),
            JoinKind::Optional => view.apply_all(&merges),
            JoinKind::Minus => {
                let excluded = right
                    .iter()
                    .any(|r| l.is_compatible(r) && l.variables().any(|v| r.contains(v)));
                if !excluded {
                    view.apply(l);
                }
            }
        }
    }
    view
}
