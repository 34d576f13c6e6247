//! Replay cursor: the emission set triggered by one consumed event.
//!
//! A cursor is created when an event is consumed and stepped once per read until it is
//! exhausted. It never outlives that emission set, and no event is consumed while one is
//! active, so the memory it walks cannot change underneath it.

use super::join::JoinStrategy;
use super::{JoinSide, MergeFn};
use crate::core::{Bindings, Fingerprint, Polarity};

/// The memory collection a cursor walks, as a sequence of segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayTarget {
    /// Every alive row of one side, in a single segment.
    Side(JoinSide),
    /// The group of one side under a fully bound fingerprint, then that side's rows
    /// leaving a join variable unbound.
    Candidates(JoinSide, Fingerprint),
    /// The listed groups of one side in order, then its rows leaving a join variable
    /// unbound.
    All(JoinSide, Box<[Fingerprint]>),
}

impl ReplayTarget {
    pub fn side(&self) -> JoinSide {
        match self {
            ReplayTarget::Side(side)
            | ReplayTarget::Candidates(side, _)
            | ReplayTarget::All(side, _) => *side,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayPhase {
    /// Merge the active row with each target row; incompatible pairs yield nothing.
    Merge,
    /// Emit with `polarity` each target row whose match count moved at `epoch`.
    Flipped { polarity: Polarity, epoch: u64 },
}

#[derive(Debug, Clone)]
pub enum ReplayCursor {
    /// A single row, emitted unchanged.
    Emit(Option<Bindings>),
    Walk {
        active: Bindings,
        active_side: JoinSide,
        target: ReplayTarget,
        segment: usize,
        index: usize,
        phase: ReplayPhase,
        then: Option<ReplayPhase>,
    },
}

impl ReplayCursor {
    pub fn emit(row: Bindings) -> Self {
        ReplayCursor::Emit(Some(row))
    }

    fn walk(
        active: Bindings,
        active_side: JoinSide,
        target: ReplayTarget,
        phase: ReplayPhase,
    ) -> Self {
        ReplayCursor::Walk {
            active,
            active_side,
            target,
            segment: 0,
            index: 0,
            phase,
            then: None,
        }
    }

    /// Merges `active` against every row of `target`.
    pub fn merge(active: Bindings, active_side: JoinSide, target: ReplayTarget) -> Self {
        Self::walk(active, active_side, target, ReplayPhase::Merge)
    }

    /// Re-emits with `polarity` the rows of `target` that flipped at `epoch`.
    pub fn flipped(
        active: Bindings,
        active_side: JoinSide,
        target: ReplayTarget,
        polarity: Polarity,
        epoch: u64,
    ) -> Self {
        Self::walk(active, active_side, target, ReplayPhase::Flipped { polarity, epoch })
    }

    /// Walks the same target a second time in `phase` once the first pass is done.
    pub fn then(mut self, phase: ReplayPhase) -> Self {
        if let ReplayCursor::Walk { then, .. } = &mut self {
            *then = Some(phase);
        }
        self
    }

    /// Produces the next row of the emission set, or `None` when it is exhausted.
    pub fn step<S>(&mut self, memory: &S, merge: &MergeFn) -> Option<Bindings>
    where
        S: JoinStrategy + ?Sized,
    {
        match self {
            ReplayCursor::Emit(row) => row.take(),
            ReplayCursor::Walk {
                active,
                active_side,
                target,
                segment,
                index,
                phase,
                then,
            } => loop {
                let Some(rows) = memory.rows(target, *segment) else {
                    *phase = then.take()?;
                    *segment = 0;
                    *index = 0;
                    continue;
                };
                let Some(other) = rows.as_slice().get(*index) else {
                    *segment += 1;
                    *index = 0;
                    continue;
                };
                let state = rows.state(*index);
                *index += 1;

                match *phase {
                    ReplayPhase::Merge => {
                        let merged = match active_side {
                            JoinSide::Left => merge(active, other),
                            JoinSide::Right => merge(other, active),
                        };
                        if merged.is_some() {
                            return merged;
                        }
                    }
                    ReplayPhase::Flipped { polarity, epoch } => {
                        if state.flipped_at == epoch {
                            return Some(other.with_polarity(polarity));
                        }
                    }
                }
            },
        }
    }
}
