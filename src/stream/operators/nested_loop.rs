use super::join::{Consumed, JoinStrategy};
use super::memory::Rows;
use super::replay::{ReplayCursor, ReplayTarget};
use super::{JoinSide, MergeFn};
use crate::core::{Bindings, Polarity};

/// All-pairs incremental join.
///
/// Each side keeps a flat multiset of alive rows. Every accepted event is merged against
/// the whole opposite side, so each matching pair is emitted once, by whichever of its two
/// rows arrived last. Needs no join variables: compatibility is decided by the merge.
#[derive(Debug, Default)]
pub struct NestedLoopJoin {
    left: Rows,
    right: Rows,
}

impl NestedLoopJoin {
    pub fn new() -> Self {
        Self::default()
    }

    fn side_mut(&mut self, side: JoinSide) -> &mut Rows {
        match side {
            JoinSide::Left => &mut self.left,
            JoinSide::Right => &mut self.right,
        }
    }
}

impl JoinStrategy for NestedLoopJoin {
    fn name(&self) -> &'static str {
        "nested-loop"
    }

    fn consume(&mut self, side: JoinSide, row: Bindings, _merge: &MergeFn) -> Consumed {
        let memory = self.side_mut(side);
        match row.polarity() {
            Polarity::Addition => memory.insert(&row),
            Polarity::Retraction => {
                if memory.remove(&row).is_none() {
                    return Consumed::Ignored;
                }
            }
        }
        Consumed::Replay(ReplayCursor::merge(row, side, ReplayTarget::Side(side.opposite())))
    }

    fn rows(&self, target: &ReplayTarget, segment: usize) -> Option<&Rows> {
        match (target, segment) {
            (ReplayTarget::Side(JoinSide::Left), 0) => Some(&self.left),
            (ReplayTarget::Side(JoinSide::Right), 0) => Some(&self.right),
            _ => None,
        }
    }

    fn memory_size(&self) -> (usize, usize) {
        (self.left.len(), self.right.len())
    }

    fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
    }
}
