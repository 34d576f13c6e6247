//! Join keys over the variables shared by both join inputs

use super::Bindings;
use crate::error::Result;
use oxigraph::model::{Term, Variable};
use std::sync::Arc;

/// The exact tuple of terms a row binds for the join variables, in join-variable order.
///
/// Unbound join variables are recorded as `None`. Since the key holds the terms
/// themselves, two rows share a fingerprint iff they agree on every join variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(Box<[Option<Term>]>);

impl Fingerprint {
    /// True when the row that produced this key left some join variable unbound.
    ///
    /// Such a row may be compatible with rows under many other keys, so hash memories
    /// keep it outside the per-key groups.
    pub fn has_unbound(&self) -> bool {
        self.0.iter().any(Option::is_none)
    }

    /// True when both keys bind at least one join variable in common and agree on every
    /// join variable they both bind.
    pub fn overlaps(&self, other: &Fingerprint) -> bool {
        let mut shared = false;
        for (mine, theirs) in self.0.iter().zip(other.0.iter()) {
            if let (Some(mine), Some(theirs)) = (mine, theirs) {
                if mine != theirs {
                    return false;
                }
                shared = true;
            }
        }
        shared
    }
}

/// The ordered set of variables two join inputs have in common.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JoinVariables(Arc<[Variable]>);

impl JoinVariables {
    /// Explicit join variables. Duplicates are dropped, first occurrence wins.
    pub fn new<I: IntoIterator<Item = Variable>>(variables: I) -> Self {
        let mut unique: Vec<Variable> = Vec::new();
        for variable in variables {
            if !unique.contains(&variable) {
                unique.push(variable);
            }
        }
        Self(Arc::from(unique))
    }

    /// Parses variable names, with or without a leading `?`.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let variables = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                Variable::new(name.strip_prefix('?').unwrap_or(name))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::new(variables))
    }

    /// Variables of `left` that also appear in `right`, in `left` order.
    pub fn shared(left: &[Variable], right: &[Variable]) -> Self {
        Self::new(left.iter().filter(|v| right.contains(v)).cloned())
    }

    pub fn as_slice(&self) -> &[Variable] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fingerprint(&self, row: &Bindings) -> Fingerprint {
        Fingerprint(self.0.iter().map(|v| row.get(v).cloned()).collect())
    }
}
