//! Incremental stream processing: join operators and materialized views

pub mod operators;
pub mod view;

pub use view::MaterializedView;
