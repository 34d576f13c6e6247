use super::join::{Consumed, JoinStrategy};
use super::memory::{Groups, Rows};
use super::replay::{ReplayCursor, ReplayTarget};
use super::{JoinSide, MergeFn};
use crate::core::{Bindings, JoinVariables, Polarity};

/// Symmetric hash join: the inner join of [`NestedLoopJoin`](super::NestedLoopJoin),
/// with both sides partitioned by fingerprint so an event only meets its own group.
/// Rows leaving a join variable unbound meet every group of the other side.
#[derive(Debug)]
pub struct SymmetricHashJoin {
    join_variables: JoinVariables,
    left: Groups,
    right: Groups,
}

impl SymmetricHashJoin {
    pub fn new(join_variables: JoinVariables) -> Self {
        Self { join_variables, left: Groups::new(), right: Groups::new() }
    }

    fn side(&self, side: JoinSide) -> &Groups {
        match side {
            JoinSide::Left => &self.left,
            JoinSide::Right => &self.right,
        }
    }
}

impl JoinStrategy for SymmetricHashJoin {
    fn name(&self) -> &'static str {
        "symmetric-hash"
    }

    fn consume(&mut self, side: JoinSide, row: Bindings, _merge: &MergeFn) -> Consumed {
        let key = self.join_variables.fingerprint(&row);
        let memory = match side {
            JoinSide::Left => &mut self.left,
            JoinSide::Right => &mut self.right,
        };
        match row.polarity() {
            Polarity::Addition => memory.insert(key.clone(), &row),
            Polarity::Retraction => {
                if memory.remove(&key, &row).is_none() {
                    return Consumed::Ignored;
                }
            }
        }

        let opposite = self.side(side.opposite());
        if !opposite.has_candidates(&key) {
            return Consumed::Absorbed;
        }
        Consumed::Replay(ReplayCursor::merge(row, side, opposite.scan(side.opposite(), &key)))
    }

    fn rows(&self, target: &ReplayTarget, segment: usize) -> Option<&Rows> {
        self.side(target.side()).segment(target, segment)
    }

    fn memory_size(&self) -> (usize, usize) {
        (self.left.row_count(), self.right.row_count())
    }

    fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
    }
}
