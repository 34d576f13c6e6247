//! Core data structures: binding rows, their polarity and join fingerprints

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a row event adds the row to, or retracts it from, the logical result multiset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    #[default]
    #[serde(alias = "+")]
    Addition,
    #[serde(alias = "-")]
    Retraction,
}

impl Polarity {
    /// Polarity of a merged row: a retraction on either input retracts the pair.
    pub fn combine(self, other: Polarity) -> Polarity {
        if self == Polarity::Retraction || other == Polarity::Retraction {
            Polarity::Retraction
        } else {
            Polarity::Addition
        }
    }

    /// The opposite polarity, used to compensate an earlier emission.
    pub fn flipped(self) -> Polarity {
        match self {
            Polarity::Addition => Polarity::Retraction,
            Polarity::Retraction => Polarity::Addition,
        }
    }

    /// Signed multiplicity contributed by one event of this polarity.
    pub fn sign(self) -> i64 {
        match self {
            Polarity::Addition => 1,
            Polarity::Retraction => -1,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Addition => write!(f, "+"),
            Polarity::Retraction => write!(f, "-"),
        }
    }
}

pub mod bindings;
pub mod encoding;
pub mod fingerprint;

pub use bindings::Bindings;
pub use encoding::BindingsRecord;
pub use fingerprint::{Fingerprint, JoinVariables};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polarity_combine() {
        assert_eq!(Polarity::Addition.combine(Polarity::Addition), Polarity::Addition);
        assert_eq!(Polarity::Addition.combine(Polarity::Retraction), Polarity::Retraction);
        assert_eq!(Polarity::Retraction.combine(Polarity::Addition), Polarity::Retraction);
        assert_eq!(Polarity::Retraction.combine(Polarity::Retraction), Polarity::Retraction);
    }

    #[test]
    fn test_polarity_flipped_cancels_sign() {
        for p in [Polarity::Addition, Polarity::Retraction] {
            assert_eq!(p.sign() + p.flipped().sign(), 0);
            assert_eq!(p.flipped().flipped(), p);
        }
    }

    #[test]
    fn test_polarity_defaults_to_addition() {
        assert_eq!(Polarity::default(), Polarity::Addition);
    }

    #[test]
    fn test_polarity_serde_aliases() {
        let p: Polarity = serde_json::from_str("\"-\"").unwrap();
        assert_eq!(p, Polarity::Retraction);
        let p: Polarity = serde_json::from_str("\"addition\"").unwrap();
        assert_eq!(p, Polarity::Addition);
        assert_eq!(serde_json::to_string(&Polarity::Retraction).unwrap(), "\"retraction\"");
    }
}
