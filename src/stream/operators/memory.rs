//! Per-side join memories.
//!
//! Memories only hold rows that are currently alive on their side. Stored rows are
//! normalized to additions; the polarity of the consumed event travels separately.
//!
//! Hash memories partition rows by fingerprint. A row leaving some join variable unbound
//! can be compatible with rows under any key, so it is kept in a separate bucket that
//! every lookup on that side also walks.

use super::replay::ReplayTarget;
use super::JoinSide;
use crate::core::{Bindings, Fingerprint, Polarity};
use std::collections::HashMap;

static NO_ROWS: Rows = Rows::new();

/// Bookkeeping stored next to each alive row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowState {
    /// Alive rows of the other side this row matches.
    pub matches: usize,
    /// Event number at which `matches` last moved between zero and one.
    pub flipped_at: u64,
}

impl RowState {
    /// Applies one matching event of `polarity` and stamps `epoch` when the count moves
    /// between zero and one. Returns whether it did.
    pub fn record(&mut self, polarity: Polarity, epoch: u64) -> bool {
        let flipped = match polarity {
            Polarity::Addition => {
                self.matches += 1;
                self.matches == 1
            }
            Polarity::Retraction => {
                self.matches = self.matches.saturating_sub(1);
                self.matches == 0
            }
        };
        if flipped {
            self.flipped_at = epoch;
        }
        flipped
    }
}

/// Flat multiset of alive rows. Removal swaps with the last row, so order is not kept.
#[derive(Debug, Default, Clone)]
pub struct Rows {
    rows: Vec<Bindings>,
    states: Vec<RowState>,
}

impl Rows {
    pub const fn new() -> Self {
        Self { rows: Vec::new(), states: Vec::new() }
    }

    pub fn insert(&mut self, row: &Bindings) {
        self.insert_with(row, 0);
    }

    /// Inserts `row` already matching `matches` rows of the other side.
    pub fn insert_with(&mut self, row: &Bindings, matches: usize) {
        self.rows.push(row.with_polarity(Polarity::Addition));
        self.states.push(RowState { matches, flipped_at: 0 });
    }

    /// Removes one structurally equal row and returns its state, or `None` if no such row
    /// is alive.
    pub fn remove(&mut self, row: &Bindings) -> Option<RowState> {
        let pos = self.rows.iter().position(|alive| alive == row)?;
        self.rows.swap_remove(pos);
        Some(self.states.swap_remove(pos))
    }

    pub fn as_slice(&self) -> &[Bindings] {
        &self.rows
    }

    pub fn state(&self, index: usize) -> RowState {
        self.states.get(index).copied().unwrap_or_default()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Bindings, &mut RowState)> {
        self.rows.iter().zip(self.states.iter_mut())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.states.clear();
    }
}

/// Alive rows partitioned by fingerprint. A key exists only while its group is non-empty.
/// Rows whose key has an unbound slot live in one shared bucket instead.
#[derive(Debug, Default, Clone)]
pub struct Groups {
    groups: HashMap<Fingerprint, Rows>,
    unbound: Rows,
    rows: usize,
}

impl Groups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: Fingerprint, row: &Bindings) {
        self.insert_with(key, row, 0);
    }

    pub fn insert_with(&mut self, key: Fingerprint, row: &Bindings, matches: usize) {
        let bucket = if key.has_unbound() {
            &mut self.unbound
        } else {
            self.groups.entry(key).or_default()
        };
        bucket.insert_with(row, matches);
        self.rows += 1;
    }

    /// Removes one copy of `row` stored under `key`; `None` when it is not alive.
    pub fn remove(&mut self, key: &Fingerprint, row: &Bindings) -> Option<RowState> {
        let removed = if key.has_unbound() {
            self.unbound.remove(row)
        } else {
            let group = self.groups.get_mut(key)?;
            let removed = group.remove(row);
            if group.is_empty() {
                self.groups.remove(key);
            }
            removed
        };
        if removed.is_some() {
            self.rows -= 1;
        }
        removed
    }

    /// Rows stored under exactly `key`.
    pub fn group(&self, key: &Fingerprint) -> &Rows {
        if key.has_unbound() {
            &self.unbound
        } else {
            self.groups.get(key).unwrap_or(&NO_ROWS)
        }
    }

    /// True if some stored row may be compatible with a row keyed `key`.
    pub fn has_candidates(&self, key: &Fingerprint) -> bool {
        if key.has_unbound() {
            self.rows > 0
        } else {
            !self.group(key).is_empty() || !self.unbound.is_empty()
        }
    }

    /// Stored rows that may be compatible with a row keyed `key`: its own group and the
    /// unbound bucket, or every row when `key` itself has an unbound slot.
    pub fn candidates<'a>(&'a self, key: &Fingerprint) -> impl Iterator<Item = &'a Bindings> + 'a {
        let buckets: Vec<&'a Rows> = if key.has_unbound() {
            self.groups.values().collect()
        } else {
            self.groups.get(key).into_iter().collect()
        };
        buckets.into_iter().chain(std::iter::once(&self.unbound)).flat_map(Rows::as_slice)
    }

    /// Visits the same rows as [`candidates`](Self::candidates), with their state.
    pub fn for_each_candidate<F>(&mut self, key: &Fingerprint, mut visit: F)
    where
        F: FnMut(&Bindings, &mut RowState),
    {
        if key.has_unbound() {
            for group in self.groups.values_mut() {
                group.iter_mut().for_each(|(row, state)| visit(row, state));
            }
        } else if let Some(group) = self.groups.get_mut(key) {
            group.iter_mut().for_each(|(row, state)| visit(row, state));
        }
        self.unbound.iter_mut().for_each(|(row, state)| visit(row, state));
    }

    /// The replay target walking [`candidates`](Self::candidates) of `key` on `side`.
    pub fn scan(&self, side: JoinSide, key: &Fingerprint) -> ReplayTarget {
        if key.has_unbound() {
            ReplayTarget::All(side, self.groups.keys().cloned().collect())
        } else {
            ReplayTarget::Candidates(side, key.clone())
        }
    }

    /// One segment of a target built by [`scan`](Self::scan); `None` past the last one.
    pub fn segment(&self, target: &ReplayTarget, segment: usize) -> Option<&Rows> {
        match target {
            ReplayTarget::Candidates(_, key) => match segment {
                0 => Some(self.group(key)),
                1 => Some(&self.unbound),
                _ => None,
            },
            ReplayTarget::All(_, keys) => match keys.get(segment) {
                Some(key) => Some(self.group(key)),
                None if segment == keys.len() => Some(&self.unbound),
                None => None,
            },
            ReplayTarget::Side(_) => None,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.unbound.clear();
        self.rows = 0;
    }
}

/// Live row counts per fingerprint, for sides whose row contents are never replayed.
#[derive(Debug, Default, Clone)]
pub struct PresenceCounts {
    bound: HashMap<Fingerprint, usize>,
    unbound: HashMap<Fingerprint, usize>,
    total: usize,
}

impl PresenceCounts {
    pub fn new() -> Self {
        Self::default()
    }

    fn counts_mut(&mut self, key: &Fingerprint) -> &mut HashMap<Fingerprint, usize> {
        if key.has_unbound() {
            &mut self.unbound
        } else {
            &mut self.bound
        }
    }

    /// Records one more live row under `key` and returns the new count.
    pub fn increment(&mut self, key: Fingerprint) -> usize {
        self.total += 1;
        let count = self.counts_mut(&key).entry(key).or_insert(0);
        *count += 1;
        *count
    }

    /// Records one fewer live row under `key` and returns the new count, or `None` when the
    /// key had no recorded presence. The key is deleted once it reaches zero.
    pub fn decrement(&mut self, key: &Fingerprint) -> Option<usize> {
        let counts = self.counts_mut(key);
        let count = counts.get_mut(key)?;
        *count -= 1;
        let remaining = *count;
        if remaining == 0 {
            counts.remove(key);
        }
        self.total -= 1;
        Some(remaining)
    }

    /// Live rows whose key [overlaps](Fingerprint::overlaps) `key`.
    pub fn overlapping(&self, key: &Fingerprint) -> usize {
        let sum = |counts: &HashMap<Fingerprint, usize>| -> usize {
            counts.iter().filter(|(k, _)| k.overlaps(key)).map(|(_, c)| *c).sum()
        };
        let bound = if key.has_unbound() {
            sum(&self.bound)
        } else {
            self.bound.get_key_value(key).filter(|(k, _)| k.overlaps(key)).map_or(0, |(_, c)| *c)
        };
        bound + sum(&self.unbound)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn clear(&mut self) {
        self.bound.clear();
        self.unbound.clear();
        self.total = 0;
    }
}
