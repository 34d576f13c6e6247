//! JSON wire form of binding rows
//!
//! A row travels as its polarity plus a map from variable name to the N-Triples
//! rendering of the bound term:
//!
//! ```json
//! {"polarity": "addition", "bindings": {"a": "<http://example.org/1>", "b": "\"2\""}}
//! ```

use super::{Bindings, Polarity};
use crate::error::{Error, Result};
use oxigraph::model::{Term, Variable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Serializable mirror of [`Bindings`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingsRecord {
    #[serde(default)]
    pub polarity: Polarity,
    pub bindings: BTreeMap<String, String>,
}

impl BindingsRecord {
    pub fn from_json(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<&Bindings> for BindingsRecord {
    fn from(row: &Bindings) -> Self {
        Self {
            polarity: row.polarity(),
            bindings: row.iter().map(|(v, t)| (v.as_str().to_string(), t.to_string())).collect(),
        }
    }
}

impl TryFrom<BindingsRecord> for Bindings {
    type Error = Error;

    fn try_from(record: BindingsRecord) -> Result<Self> {
        let pairs = record
            .bindings
            .iter()
            .map(|(name, term)| {
                let variable = Variable::new(name.strip_prefix('?').unwrap_or(name))?;
                let term = Term::from_str(term)?;
                Ok((variable, term))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Bindings::from_pairs(pairs).with_polarity(record.polarity))
    }
}
