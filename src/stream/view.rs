//! Materialized view over a stream of output deltas.

use crate::core::{Bindings, BindingsRecord, Polarity};
use std::collections::HashMap;

/// Multiset of rows obtained by summing deltas by polarity.
///
/// Rows whose multiplicity returns to zero are dropped. A retraction of a row that is not
/// in the view drives its multiplicity negative; [`is_consistent`](Self::is_consistent)
/// reports whether that ever left a trace.
#[derive(Debug, Default, Clone)]
pub struct MaterializedView {
    counts: HashMap<Bindings, i64>,
    applied: u64,
}

impl MaterializedView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, delta: &Bindings) {
        let key = delta.with_polarity(Polarity::Addition);
        let count = self.counts.entry(key).or_insert(0);
        *count += delta.polarity().sign();
        if *count == 0 {
            self.counts.remove(&delta.with_polarity(Polarity::Addition));
        }
        self.applied += 1;
    }

    pub fn apply_all<'a, I: IntoIterator<Item = &'a Bindings>>(&mut self, deltas: I) {
        for delta in deltas {
            self.apply(delta);
        }
    }

    pub fn multiplicity(&self, row: &Bindings) -> i64 {
        self.counts.get(row).copied().unwrap_or(0)
    }

    pub fn contains(&self, row: &Bindings) -> bool {
        self.multiplicity(row) > 0
    }

    /// True when no row has a negative multiplicity.
    pub fn is_consistent(&self) -> bool {
        self.counts.values().all(|&count| count > 0)
    }

    /// Total number of rows, counting duplicates.
    pub fn len(&self) -> usize {
        self.counts.values().filter(|&&c| c > 0).map(|&c| c as usize).sum()
    }

    /// True when no row is present. Rows driven negative are not present.
    pub fn is_empty(&self) -> bool {
        self.counts.values().all(|&count| count <= 0)
    }

    pub fn deltas_applied(&self) -> u64 {
        self.applied
    }

    /// Distinct rows and their multiplicities.
    pub fn iter(&self) -> impl Iterator<Item = (&Bindings, i64)> {
        self.counts.iter().map(|(row, &count)| (row, count))
    }

    /// Rows in a stable order (by their wire form), each repeated by its multiplicity.
    pub fn to_records(&self) -> Vec<BindingsRecord> {
        let mut records: Vec<BindingsRecord> = self
            .counts
            .iter()
            .flat_map(|(row, &count)| {
                std::iter::repeat(BindingsRecord::from(row)).take(count.max(0) as usize)
            })
            .collect();
        records.sort_by(|a, b| a.bindings.cmp(&b.bindings));
        records
    }
}

impl PartialEq for MaterializedView {
    fn eq(&self, other: &Self) -> bool {
        self.counts == other.counts
    }
}
