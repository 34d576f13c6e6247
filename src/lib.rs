//! # Tributary
//!
//! Tributary evaluates SPARQL-style join operators incrementally over two unbounded
//! streams of binding rows, where each row is either an addition or a retraction.
//!
//! The name reflects what the engine does: two streams flow into one. At every point
//! the deltas emitted so far sum to the join of both inputs' current state, and no
//! already-seen row is ever scanned again.
//!
//! ## Features
//!
//! - Nested-loop and symmetric hash inner joins
//! - Left-outer (OPTIONAL) join with compensation when a key gains or loses its matches
//! - Anti-join (MINUS) with presence counting
//! - Pull-based operators that compose: every join is itself a row source
//!
//! ## Example
//!
//! ```rust
//! use tributary::core::Bindings;
//! use tributary::sources;
//! use tributary::stream::operators::{JoinBuilder, JoinKind, ReadResult};
//! use oxigraph::model::{Literal, Term, Variable};
//!
//! fn example() -> tributary::Result<()> {
//!     let a = Variable::new("a").unwrap();
//!     let left = Bindings::from_pairs([(a.clone(), Term::from(Literal::from(1)))]);
//!     let right = Bindings::from_pairs([(a.clone(), Term::from(Literal::from(1)))]);
//!
//!     let mut join = JoinBuilder::new(JoinKind::NestedLoop)
//!         .build(sources::from_rows(vec![left]), sources::from_rows(vec![right]))?;
//!
//!     while let ReadResult::Row(row) = join.try_read()? {
//!         println!("{}", row);
//!     }
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::new_without_default)]
#![allow(clippy::return_self_not_must_use)]

/// Core data structures and types
pub mod core;

/// Join configuration
pub mod config;

pub mod error;

/// Upstream row sources
pub mod sources;

/// Join operators and materialized views
pub mod stream;

// Re-export commonly used types
pub use crate::core::{Bindings, Polarity};
pub use config::JoinConfig;
pub use error::{Error, Result};
pub use stream::operators::{IncrementalJoin, JoinBuilder, JoinKind, ReadResult};
pub use stream::MaterializedView;
