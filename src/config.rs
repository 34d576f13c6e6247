//! Join configuration

use crate::core::JoinVariables;
use crate::error::{Error, Result};
use crate::stream::operators::{JoinBuilder, JoinKind};
use oxigraph::model::Variable;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Declarative description of one join, loadable from JSON.
///
/// ```json
/// {"kind": "optional", "left_variables": ["a", "b"], "right_variables": ["a", "c"]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinConfig {
    pub kind: JoinKind,
    /// Explicit join variables. Takes precedence over the schemas.
    pub join_variables: Option<Vec<String>>,
    /// Variables the left input may bind.
    pub left_variables: Vec<String>,
    /// Variables the right input may bind.
    pub right_variables: Vec<String>,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            kind: JoinKind::NestedLoop,
            join_variables: None,
            left_variables: Vec::new(),
            right_variables: Vec::new(),
        }
    }
}

impl JoinConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!("Cannot read {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_json_str(&content)
    }

    fn parse_variables(names: &[String]) -> Result<Vec<Variable>> {
        names
            .iter()
            .map(|name| Ok(Variable::new(name.strip_prefix('?').unwrap_or(name))?))
            .collect()
    }

    /// Join variables, explicit or derived from the schemas.
    pub fn resolve_join_variables(&self) -> Result<JoinVariables> {
        self.builder()?.resolve_join_variables()
    }

    pub fn builder(&self) -> Result<JoinBuilder> {
        let mut builder = JoinBuilder::new(self.kind);
        if let Some(names) = &self.join_variables {
            builder = builder.join_variables(JoinVariables::from_names(names)?);
        }
        if !self.left_variables.is_empty() || !self.right_variables.is_empty() {
            builder = builder.schemas(
                Self::parse_variables(&self.left_variables)?,
                Self::parse_variables(&self.right_variables)?,
            );
        }
        Ok(builder)
    }
}
