use super::join::{DynIncrementalJoin, IncrementalJoin, JoinStrategy};
use super::{
    structural_merge, MergeFn, MinusHashJoin, NestedLoopJoin, OptionalHashJoin, SymmetricHashJoin,
};
use crate::core::JoinVariables;
use crate::error::{Error, Result};
use crate::sources::BindingsStream;
use oxigraph::model::Variable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The join operator to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JoinKind {
    /// Inner join, all pairs.
    #[default]
    NestedLoop,
    /// Inner join, partitioned by join variables.
    Hash,
    /// Left-outer join (OPTIONAL).
    Optional,
    /// Anti-join (MINUS).
    Minus,
}

impl JoinKind {
    pub fn needs_join_variables(self) -> bool {
        !matches!(self, JoinKind::NestedLoop)
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::NestedLoop => write!(f, "nested-loop"),
            JoinKind::Hash => write!(f, "hash"),
            JoinKind::Optional => write!(f, "optional"),
            JoinKind::Minus => write!(f, "minus"),
        }
    }
}

impl FromStr for JoinKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "nested-loop" | "nestedloop" | "nested_loop" | "inner" => Ok(JoinKind::NestedLoop),
            "hash" | "symmetric-hash" => Ok(JoinKind::Hash),
            "optional" | "left-outer" => Ok(JoinKind::Optional),
            "minus" | "anti" => Ok(JoinKind::Minus),
            other => Err(Error::Config(format!("Unknown join kind '{}'", other))),
        }
    }
}

/// Assembles an [`IncrementalJoin`] for a [`JoinKind`].
///
/// Join variables are taken from [`join_variables`](Self::join_variables) when given,
/// otherwise derived from the two input [`schemas`](Self::schemas). The hash-partitioned
/// kinds fail to build without either.
pub struct JoinBuilder {
    kind: JoinKind,
    join_variables: Option<JoinVariables>,
    schemas: Option<(Vec<Variable>, Vec<Variable>)>,
    merge: MergeFn,
}

impl JoinBuilder {
    pub fn new(kind: JoinKind) -> Self {
        JoinBuilder { kind, join_variables: None, schemas: None, merge: structural_merge() }
    }

    pub fn join_variables(mut self, join_variables: JoinVariables) -> Self {
        self.join_variables = Some(join_variables);
        self
    }

    /// Declares the variables each input may bind.
    pub fn schemas(mut self, left: Vec<Variable>, right: Vec<Variable>) -> Self {
        self.schemas = Some((left, right));
        self
    }

    /// Replaces the structural row merge.
    pub fn merge_with(mut self, merge: MergeFn) -> Self {
        self.merge = merge;
        self
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    pub fn resolve_join_variables(&self) -> Result<JoinVariables> {
        if let Some(vars) = &self.join_variables {
            return Ok(vars.clone());
        }
        if let Some((left, right)) = &self.schemas {
            return Ok(JoinVariables::shared(left, right));
        }
        if self.kind.needs_join_variables() {
            return Err(Error::Config(format!(
                "{} join needs join variables or input schemas",
                self.kind
            )));
        }
        Ok(JoinVariables::default())
    }

    pub fn strategy(&self) -> Result<Box<dyn JoinStrategy + Send>> {
        let join_variables = self.resolve_join_variables()?;
        log::debug!("Building {} join on {:?}", self.kind, join_variables.as_slice());
        Ok(match self.kind {
            JoinKind::NestedLoop => Box::new(NestedLoopJoin::new()),
            JoinKind::Hash => Box::new(SymmetricHashJoin::new(join_variables)),
            JoinKind::Optional => Box::new(OptionalHashJoin::new(join_variables)),
            JoinKind::Minus => Box::new(MinusHashJoin::new(join_variables)),
        })
    }

    pub fn build(self, left: BindingsStream, right: BindingsStream) -> Result<DynIncrementalJoin> {
        let strategy = self.strategy()?;
        Ok(IncrementalJoin::with_merge(strategy, left, right, self.merge))
    }
}
