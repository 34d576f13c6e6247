//! In-memory push source backed by an unbounded tokio channel.
//!
//! The producer half pushes additions, retractions or a failure; dropping it (or calling
//! [`BindingsSender::end`]) terminates the source. The receiving half is a
//! [`BindingsStream`](super::BindingsStream) that never blocks: while the channel is empty
//! but still open it returns `Poll::Pending` and is woken on the next push.

use crate::core::{Bindings, Polarity};
use crate::error::{Error, Result};
use futures_util::stream::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Creates a connected sender/receiver pair.
pub fn channel() -> (BindingsSender, BindingsReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (BindingsSender { tx }, BindingsReceiver { rx })
}

/// Producer half of a channel source.
#[derive(Debug, Clone)]
pub struct BindingsSender {
    tx: UnboundedSender<Result<Bindings>>,
}

impl BindingsSender {
    /// Pushes `row` with the polarity it already carries.
    pub fn send(&self, row: Bindings) -> Result<()> {
        self.tx
            .send(Ok(row))
            .map_err(|_| Error::Upstream("channel source was released".to_string()))
    }

    pub fn add(&self, row: &Bindings) -> Result<()> {
        self.send(row.with_polarity(Polarity::Addition))
    }

    pub fn retract(&self, row: &Bindings) -> Result<()> {
        self.send(row.with_polarity(Polarity::Retraction))
    }

    /// Reports a failure to the consumer; the source is finished afterwards.
    pub fn fail(self, error: Error) -> Result<()> {
        self.tx
            .send(Err(error))
            .map_err(|_| Error::Upstream("channel source was released".to_string()))
    }

    /// Terminates the source once every clone of this sender is gone.
    pub fn end(self) {}

    /// True once the consumer dropped the receiving half.
    pub fn is_released(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half of a channel source.
#[derive(Debug)]
pub struct BindingsReceiver {
    rx: UnboundedReceiver<Result<Bindings>>,
}

impl Stream for BindingsReceiver {
    type Item = Result<Bindings>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
