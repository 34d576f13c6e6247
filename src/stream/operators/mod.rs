//! Incremental Join Operators
//!
//! This module provides binary join operators over two streams of binding rows, where
//! every row is either an addition or a retraction. Each operator emits the deltas that
//! keep a downstream materialized view equal to the join of both inputs' current state.
//!
//! # Strategies
//!
//! - **NestedLoopJoin** - Flat per-side memory, merges against every row of the other side
//! - **SymmetricHashJoin** - Inner join with per-key groups on both sides
//! - **OptionalHashJoin** - Left-outer join (SPARQL OPTIONAL) tracking matches per left row
//! - **MinusHashJoin** - Anti-join (SPARQL MINUS) using presence counts on the right
//!
//! All strategies plug into [`IncrementalJoin`], which owns the two upstream sources and
//! the replay cursor, and implements the same `Stream` contract as its inputs.
//!
//! # Example
//!
//! ```ignore
//! use tributary::sources::{channel, boxed};
//! use tributary::stream::operators::{JoinBuilder, JoinKind};
//!
//! let (left_tx, left_rx) = channel();
//! let (right_tx, right_rx) = channel();
//! let mut join = JoinBuilder::new(JoinKind::Optional)
//!     .join_variables(join_vars)
//!     .build(boxed(left_rx), boxed(right_rx))?;
//!
//! left_tx.add(&row)?;
//! while let ReadResult::Row(delta) = join.try_read()? {
//!     println!("{}", delta);
//! }
//! ```

use crate::core::Bindings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub mod builder;
pub mod hash_join;
pub mod join;
pub mod memory;
pub mod minus_join;
pub mod nested_loop;
pub mod optional_join;
pub mod replay;

pub use builder::{JoinBuilder, JoinKind};
pub use hash_join::SymmetricHashJoin;
pub use join::{
    Consumed, DynIncrementalJoin, IncrementalJoin, JoinStats, JoinStrategy, ReadResult,
};
pub use memory::{RowState, Rows};
pub use minus_join::MinusHashJoin;
pub use nested_loop::NestedLoopJoin;
pub use optional_join::OptionalHashJoin;
pub use replay::{ReplayCursor, ReplayPhase, ReplayTarget};

/// Which input of a binary join an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinSide {
    Left,
    Right,
}

impl JoinSide {
    pub fn opposite(self) -> JoinSide {
        match self {
            JoinSide::Left => JoinSide::Right,
            JoinSide::Right => JoinSide::Left,
        }
    }
}

impl fmt::Display for JoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinSide::Left => write!(f, "left"),
            JoinSide::Right => write!(f, "right"),
        }
    }
}

/// Combines a left row with a right row, or returns `None` when they are incompatible.
/// Always called with the left row first.
pub type MergeFn = Arc<dyn Fn(&Bindings, &Bindings) -> Option<Bindings> + Send + Sync>;

/// Structural merge: union of both rows when every shared variable agrees.
pub fn structural_merge() -> MergeFn {
    Arc::new(|left: &Bindings, right: &Bindings| left.merge(right))
}
