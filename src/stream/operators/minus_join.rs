//! Anti-join (SPARQL MINUS) over fingerprint groups.
//!
//! The output is every alive left row that no alive right row excludes. A right row
//! excludes a left row when both bind at least one common join variable and agree on
//! every join variable they both bind. The right side only needs that much, so it keeps
//! counts per key instead of rows. Each left row counts the right rows excluding it; it is
//! hidden when its count goes from zero to one and shown again only when the count returns
//! to exactly zero.
//!
//! Rows sharing no bound variable are never excluded, so a join without join variables
//! ignores the right side altogether.

use super::join::{Consumed, JoinStrategy};
use super::memory::{Groups, PresenceCounts, Rows};
use super::replay::{ReplayCursor, ReplayTarget};
use super::{JoinSide, MergeFn};
use crate::core::{Bindings, Fingerprint, JoinVariables, Polarity};

#[derive(Debug)]
pub struct MinusHashJoin {
    join_variables: JoinVariables,
    left: Groups,
    right: PresenceCounts,
    epoch: u64,
}

impl MinusHashJoin {
    pub fn new(join_variables: JoinVariables) -> Self {
        Self { join_variables, left: Groups::new(), right: PresenceCounts::new(), epoch: 0 }
    }

    fn consume_left(&mut self, row: Bindings, key: Fingerprint) -> Consumed {
        let exclusions = match row.polarity() {
            Polarity::Addition => {
                let exclusions = self.right.overlapping(&key);
                self.left.insert_with(key, &row, exclusions);
                exclusions
            }
            Polarity::Retraction => match self.left.remove(&key, &row) {
                Some(state) => state.matches,
                None => return Consumed::Ignored,
            },
        };

        if exclusions == 0 {
            Consumed::Replay(ReplayCursor::emit(row))
        } else {
            Consumed::Absorbed
        }
    }

    fn consume_right(&mut self, row: Bindings, key: Fingerprint) -> Consumed {
        let polarity = row.polarity();
        match polarity {
            Polarity::Addition => {
                self.right.increment(key.clone());
            }
            Polarity::Retraction => {
                if self.right.decrement(&key).is_none() {
                    return Consumed::Ignored;
                }
            }
        }

        self.epoch += 1;
        let epoch = self.epoch;
        let join_variables = &self.join_variables;
        let mut flipped = false;
        self.left.for_each_candidate(&key, |left, state| {
            if join_variables.fingerprint(left).overlaps(&key) {
                flipped |= state.record(polarity, epoch);
            }
        });
        if !flipped {
            return Consumed::Absorbed;
        }

        let target = self.left.scan(JoinSide::Left, &key);
        let shown = polarity.flipped();
        Consumed::Replay(ReplayCursor::flipped(row, JoinSide::Right, target, shown, epoch))
    }
}

impl JoinStrategy for MinusHashJoin {
    fn name(&self) -> &'static str {
        "minus-hash"
    }

    fn consume(&mut self, side: JoinSide, row: Bindings, _merge: &MergeFn) -> Consumed {
        if side == JoinSide::Right && self.join_variables.is_empty() {
            return Consumed::Absorbed;
        }
        let key = self.join_variables.fingerprint(&row);
        match side {
            JoinSide::Left => self.consume_left(row, key),
            JoinSide::Right => self.consume_right(row, key),
        }
    }

    fn rows(&self, target: &ReplayTarget, segment: usize) -> Option<&Rows> {
        match target.side() {
            JoinSide::Left => self.left.segment(target, segment),
            JoinSide::Right => None,
        }
    }

    fn memory_size(&self) -> (usize, usize) {
        (self.left.row_count(), self.right.total())
    }

    fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
        self.epoch = 0;
    }
}
