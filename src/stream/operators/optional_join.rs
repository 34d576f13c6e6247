//! Left-outer join (SPARQL OPTIONAL) over fingerprint groups.
//!
//! Every left row tracks how many alive right rows it merges with. A left row with no
//! match is visible on its own. When a right event moves a left row's count from zero to
//! one, the lone row is retracted before the merges show up; when the count drops back to
//! zero, the merges are retracted before the lone row comes back. The transition is read
//! from the counts each event actually changed, so rows leaving a join variable unbound
//! follow the same rules as fully keyed rows.

use super::join::{Consumed, JoinStrategy};
use super::memory::{Groups, Rows};
use super::replay::{ReplayCursor, ReplayPhase, ReplayTarget};
use super::{JoinSide, MergeFn};
use crate::core::{Bindings, Fingerprint, JoinVariables, Polarity};

#[derive(Debug)]
pub struct OptionalHashJoin {
    join_variables: JoinVariables,
    left: Groups,
    right: Groups,
    epoch: u64,
}

impl OptionalHashJoin {
    pub fn new(join_variables: JoinVariables) -> Self {
        Self { join_variables, left: Groups::new(), right: Groups::new(), epoch: 0 }
    }

    fn consume_left(&mut self, row: Bindings, key: Fingerprint, merge: &MergeFn) -> Consumed {
        let matches = match row.polarity() {
            Polarity::Addition => {
                let matches = self
                    .right
                    .candidates(&key)
                    .filter(|&right| merge(&row, right).is_some())
                    .count();
                self.left.insert_with(key.clone(), &row, matches);
                matches
            }
            Polarity::Retraction => match self.left.remove(&key, &row) {
                Some(state) => state.matches,
                None => return Consumed::Ignored,
            },
        };

        if matches == 0 {
            Consumed::Replay(ReplayCursor::emit(row))
        } else {
            let target = self.right.scan(JoinSide::Right, &key);
            Consumed::Replay(ReplayCursor::merge(row, JoinSide::Left, target))
        }
    }

    fn consume_right(&mut self, row: Bindings, key: Fingerprint, merge: &MergeFn) -> Consumed {
        match row.polarity() {
            Polarity::Addition => self.right.insert(key.clone(), &row),
            Polarity::Retraction => {
                if self.right.remove(&key, &row).is_none() {
                    return Consumed::Ignored;
                }
            }
        }

        self.epoch += 1;
        let epoch = self.epoch;
        let polarity = row.polarity();
        let mut matched = false;
        self.left.for_each_candidate(&key, |left, state| {
            if merge(left, &row).is_some() {
                matched = true;
                state.record(polarity, epoch);
            }
        });
        if !matched {
            return Consumed::Absorbed;
        }

        let target = self.left.scan(JoinSide::Left, &key);
        let cursor = match polarity {
            // Lone left rows disappear before their first merges show up.
            Polarity::Addition => {
                ReplayCursor::flipped(row, JoinSide::Right, target, Polarity::Retraction, epoch)
                    .then(ReplayPhase::Merge)
            }
            // The last merges are retracted before the lone left rows come back.
            Polarity::Retraction => ReplayCursor::merge(row, JoinSide::Right, target)
                .then(ReplayPhase::Flipped { polarity: Polarity::Addition, epoch }),
        };
        Consumed::Replay(cursor)
    }
}

impl JoinStrategy for OptionalHashJoin {
    fn name(&self) -> &'static str {
        "optional-hash"
    }

    fn consume(&mut self, side: JoinSide, row: Bindings, merge: &MergeFn) -> Consumed {
        let key = self.join_variables.fingerprint(&row);
        match side {
            JoinSide::Left => self.consume_left(row, key, merge),
            JoinSide::Right => self.consume_right(row, key, merge),
        }
    }

    fn rows(&self, target: &ReplayTarget, segment: usize) -> Option<&Rows> {
        match target.side() {
            JoinSide::Left => self.left.segment(target, segment),
            JoinSide::Right => self.right.segment(target, segment),
        }
    }

    fn memory_size(&self) -> (usize, usize) {
        (self.left.row_count(), self.right.row_count())
    }

    fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
        self.epoch = 0;
    }
}
