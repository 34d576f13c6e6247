//! Binding rows flowing through the join operators.

use super::Polarity;
use oxigraph::model::{Term, Variable};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// One solution row: variables bound to RDF terms, plus the polarity of the event carrying it.
///
/// Entries are kept sorted by variable name, so two rows binding the same variables to the
/// same terms are structurally equal regardless of construction order. Equality and hashing
/// ignore the polarity; use [`Bindings::polarity`] to tell an addition from a retraction.
///
/// Cloning is cheap: the entries are shared behind an `Arc`.
#[derive(Clone)]
pub struct Bindings {
    entries: Arc<[(Variable, Term)]>,
    polarity: Polarity,
}

impl Bindings {
    /// An empty row (the join identity), as an addition.
    pub fn empty() -> Self {
        Self { entries: Arc::from(Vec::new()), polarity: Polarity::Addition }
    }

    /// Builds an addition row from `(variable, term)` pairs. A later pair for an already
    /// bound variable replaces the earlier one.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Variable, Term)>,
    {
        let mut entries: Vec<(Variable, Term)> = Vec::new();
        for (variable, term) in pairs {
            match entries.binary_search_by(|(v, _)| v.as_str().cmp(variable.as_str())) {
                Ok(pos) => entries[pos].1 = term,
                Err(pos) => entries.insert(pos, (variable, term)),
            }
        }
        Self { entries: Arc::from(entries), polarity: Polarity::Addition }
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn is_addition(&self) -> bool {
        self.polarity == Polarity::Addition
    }

    pub fn is_retraction(&self) -> bool {
        self.polarity == Polarity::Retraction
    }

    /// The same row carrying a different polarity.
    pub fn with_polarity(&self, polarity: Polarity) -> Self {
        Self { entries: Arc::clone(&self.entries), polarity }
    }

    pub fn retracted(&self) -> Self {
        self.with_polarity(Polarity::Retraction)
    }

    pub fn get(&self, variable: &Variable) -> Option<&Term> {
        self.get_by_name(variable.as_str())
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Term> {
        self.entries
            .binary_search_by(|(v, _)| v.as_str().cmp(name))
            .ok()
            .map(|pos| &self.entries[pos].1)
    }

    pub fn contains(&self, variable: &Variable) -> bool {
        self.get(variable).is_some()
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.entries.iter().map(|(v, _)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.entries.iter().map(|(v, t)| (v, t))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Two rows are compatible when every variable they both bind has the same term.
    pub fn is_compatible(&self, other: &Bindings) -> bool {
        let (mut i, mut j) = (0, 0);
        while i < self.entries.len() && j < other.entries.len() {
            let (lv, lt) = &self.entries[i];
            let (rv, rt) = &other.entries[j];
            match lv.as_str().cmp(rv.as_str()) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    if lt != rt {
                        return false;
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        true
    }

    /// Merges two compatible rows into their union.
    ///
    /// Returns `None` when a shared variable is bound to different terms. The merged row
    /// is a retraction if either input is a retraction.
    pub fn merge(&self, other: &Bindings) -> Option<Bindings> {
        let mut merged = Vec::with_capacity(self.entries.len() + other.entries.len());
        let (mut i, mut j) = (0, 0);
        while i < self.entries.len() && j < other.entries.len() {
            let (lv, lt) = &self.entries[i];
            let (rv, rt) = &other.entries[j];
            match lv.as_str().cmp(rv.as_str()) {
                std::cmp::Ordering::Less => {
                    merged.push((lv.clone(), lt.clone()));
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    merged.push((rv.clone(), rt.clone()));
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    if lt != rt {
                        return None;
                    }
                    merged.push((lv.clone(), lt.clone()));
                    i += 1;
                    j += 1;
                }
            }
        }
        merged.extend(self.entries[i..].iter().cloned());
        merged.extend(other.entries[j..].iter().cloned());

        Some(Bindings {
            entries: Arc::from(merged),
            polarity: self.polarity.combine(other.polarity),
        })
    }
}

impl Default for Bindings {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Bindings {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries) || self.entries == other.entries
    }
}

impl Eq for Bindings {}

impl Hash for Bindings {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entries.hash(state);
    }
}

impl FromIterator<(Variable, Term)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (Variable, Term)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.polarity)?;
        for (i, (variable, term)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", variable, term)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigraph::model::{Literal, NamedNode};

    fn var(name: &str) -> Variable {
        Variable::new(name).unwrap()
    }

    fn int(value: i64) -> Term {
        Literal::from(value).into()
    }

    #[test]
    fn test_construction_order_is_irrelevant() {
        let a = Bindings::from_pairs([(var("b"), int(2)), (var("a"), int(1))]);
        let b = Bindings::from_pairs([(var("a"), int(1)), (var("b"), int(2))]);
        assert_eq!(a, b);
        assert_eq!(a.variables().map(|v| v.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_equality_ignores_polarity() {
        let a = Bindings::from_pairs([(var("a"), int(1))]);
        assert_eq!(a, a.retracted());
        assert!(a.retracted().is_retraction());
    }

    #[test]
    fn test_merge_compatible_rows() {
        let left = Bindings::from_pairs([(var("a"), int(1)), (var("b"), int(2))]);
        let right = Bindings::from_pairs([(var("a"), int(1)), (var("c"), int(4))]);
        let merged = left.merge(&right).unwrap();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get_by_name("c"), Some(&int(4)));
        assert!(merged.is_addition());
    }

    #[test]
    fn test_merge_conflicting_rows() {
        let left = Bindings::from_pairs([(var("a"), int(1))]);
        let right = Bindings::from_pairs([(var("a"), int(2))]);
        assert!(!left.is_compatible(&right));
        assert!(left.merge(&right).is_none());
    }

    #[test]
    fn test_merge_retraction_wins() {
        let left = Bindings::from_pairs([(var("a"), int(1))]);
        let right = Bindings::from_pairs([(var("c"), int(3))]).retracted();
        assert!(left.merge(&right).unwrap().is_retraction());
        assert!(right.merge(&left).unwrap().is_retraction());
    }

    #[test]
    fn test_term_kinds_distinguish_rows() {
        let iri: Term = NamedNode::new("http://example.org/1").unwrap().into();
        let lit: Term = Literal::new_simple_literal("http://example.org/1").into();
        let a = Bindings::from_pairs([(var("x"), iri)]);
        let b = Bindings::from_pairs([(var("x"), lit)]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_display() {
        let row = Bindings::from_pairs([(var("a"), int(1))]).retracted();
        assert!(row.to_string().starts_with("-{?a: "));
    }
}
