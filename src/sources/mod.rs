//! Upstream row sources for the join operators

pub mod channel_source;
pub mod stream_source;

pub use channel_source::{channel, BindingsReceiver, BindingsSender};
pub use stream_source::{boxed, empty, from_rows, BindingsStream};
