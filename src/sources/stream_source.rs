//! The row-source contract consumed and exposed by every join operator.
//!
//! A source is a `Stream` of binding rows:
//! - `Poll::Ready(Some(Ok(row)))` is one event,
//! - `Poll::Pending` means "nothing right now", with the task's waker registered so the
//!   source can signal that it became readable,
//! - `Poll::Ready(None)` means the source has terminated,
//! - `Poll::Ready(Some(Err(e)))` reports a failure.
//!
//! Join operators implement the same contract, so they compose.

use crate::core::Bindings;
use crate::error::Result;
use futures_util::stream::{self, Stream};
use std::pin::Pin;

/// A boxed row source.
pub type BindingsStream = Pin<Box<dyn Stream<Item = Result<Bindings>> + Send>>;

/// A finite source yielding `rows` in order, then terminating.
pub fn from_rows<I>(rows: I) -> BindingsStream
where
    I: IntoIterator<Item = Bindings>,
    I::IntoIter: Send + 'static,
{
    Box::pin(stream::iter(rows.into_iter().map(Ok)))
}

/// A source that terminates immediately.
pub fn empty() -> BindingsStream {
    Box::pin(stream::empty())
}

/// Boxes any compatible stream, including another join operator.
pub fn boxed<S>(source: S) -> BindingsStream
where
    S: Stream<Item = Result<Bindings>> + Send + 'static,
{
    Box::pin(source)
}
