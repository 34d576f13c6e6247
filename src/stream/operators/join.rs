//! The pull-based state machine shared by every join strategy.

use super::memory::Rows;
use super::replay::{ReplayCursor, ReplayTarget};
use super::{structural_merge, JoinSide, MergeFn};
use crate::core::{Bindings, Polarity};
use crate::error::Result;
use crate::sources::BindingsStream;
use futures_util::stream::Stream;
use futures_util::task::noop_waker_ref;
use futures_util::StreamExt;
use log::{debug, trace, warn};
use serde::Serialize;
use std::pin::Pin;
use std::task::{Context, Poll};

/// What a strategy did with one consumed event.
#[derive(Debug)]
pub enum Consumed {
    /// Memory changed and these rows must be emitted.
    Replay(ReplayCursor),
    /// Memory changed but nothing is visible downstream.
    Absorbed,
    /// A retraction for a row (or key) that is not alive; memory is unchanged.
    Ignored,
}

/// Per-side memory plus the rules deciding what one event emits.
pub trait JoinStrategy {
    fn name(&self) -> &'static str;

    /// Applies one event from `side` to memory and describes what it emits. `merge` is
    /// the join's merge function, for strategies that count compatible rows.
    fn consume(&mut self, side: JoinSide, row: Bindings, merge: &MergeFn) -> Consumed;

    /// One segment of the rows a replay cursor walks for `target`; `None` past the last.
    fn rows(&self, target: &ReplayTarget, segment: usize) -> Option<&Rows>;

    /// Number of alive rows (or presence entries) held per side.
    fn memory_size(&self) -> (usize, usize);

    fn clear(&mut self);
}

impl<S: JoinStrategy + ?Sized> JoinStrategy for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn consume(&mut self, side: JoinSide, row: Bindings, merge: &MergeFn) -> Consumed {
        (**self).consume(side, row, merge)
    }

    fn rows(&self, target: &ReplayTarget, segment: usize) -> Option<&Rows> {
        (**self).rows(target, segment)
    }

    fn memory_size(&self) -> (usize, usize) {
        (**self).memory_size()
    }

    fn clear(&mut self) {
        (**self).clear();
    }
}

/// Counters kept by a running join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JoinStats {
    pub left_events: u64,
    pub right_events: u64,
    pub emitted_additions: u64,
    pub emitted_retractions: u64,
    pub ignored_retractions: u64,
}

impl JoinStats {
    pub fn emitted(&self) -> u64 {
        self.emitted_additions + self.emitted_retractions
    }
}

/// Result of a non-blocking [`IncrementalJoin::try_read`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReadResult {
    Row(Bindings),
    /// No row is available now; a source will signal when there may be more.
    Pending,
    /// Both sources terminated and every replay finished. Final.
    Ended,
}

/// A join whose strategy is chosen at runtime.
pub type DynIncrementalJoin = IncrementalJoin<Box<dyn JoinStrategy + Send>>;

/// Binary join over two row sources.
///
/// Each read either steps the active replay cursor, or consumes one upstream event and
/// starts a new cursor, or reports that neither source has data. The sides are polled
/// alternately. A source is released as soon as it terminates; the join ends once both
/// are released and no cursor is active. An upstream error releases both sources, drops
/// all memory and is returned unchanged; the join is ended afterwards.
pub struct IncrementalJoin<S> {
    left: Option<BindingsStream>,
    right: Option<BindingsStream>,
    strategy: S,
    merge: MergeFn,
    cursor: Option<ReplayCursor>,
    poll_left_first: bool,
    ended: bool,
    stats: JoinStats,
}

impl<S: JoinStrategy> IncrementalJoin<S> {
    pub fn new(strategy: S, left: BindingsStream, right: BindingsStream) -> Self {
        Self::with_merge(strategy, left, right, structural_merge())
    }

    pub fn with_merge(
        strategy: S,
        left: BindingsStream,
        right: BindingsStream,
        merge: MergeFn,
    ) -> Self {
        debug!("Starting {} join", strategy.name());
        IncrementalJoin {
            left: Some(left),
            right: Some(right),
            strategy,
            merge,
            cursor: None,
            poll_left_first: true,
            ended: false,
            stats: JoinStats::default(),
        }
    }

    /// True while more rows may still be produced.
    pub fn is_readable(&self) -> bool {
        !self.ended
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn stats(&self) -> JoinStats {
        self.stats
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Reads one row without a task context.
    ///
    /// `Pending` carries no wake-up registration; callers driving the join this way poll
    /// again after they push new data into a source.
    pub fn try_read(&mut self) -> Result<ReadResult> {
        let mut cx = Context::from_waker(noop_waker_ref());
        match self.poll_read(&mut cx) {
            Poll::Ready(Some(Ok(row))) => Ok(ReadResult::Row(row)),
            Poll::Ready(Some(Err(e))) => Err(e),
            Poll::Ready(None) => Ok(ReadResult::Ended),
            Poll::Pending => Ok(ReadResult::Pending),
        }
    }

    /// Reads every row available right now. Stops at `Pending` or at the end.
    pub fn drain_available(&mut self) -> Result<Vec<Bindings>> {
        let mut rows = Vec::new();
        while let ReadResult::Row(row) = self.try_read()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Cancels the join: both sources are released and all memory is discarded.
    pub fn close(&mut self) {
        if self.left.take().is_some() {
            debug!("Released left source");
        }
        if self.right.take().is_some() {
            debug!("Released right source");
        }
        self.cursor = None;
        self.strategy.clear();
        self.ended = true;
    }

    fn poll_read(&mut self, cx: &mut Context<'_>) -> Poll<Option<Result<Bindings>>> {
        if self.ended {
            return Poll::Ready(None);
        }

        loop {
            if let Some(row) = self.step_cursor() {
                match row.polarity() {
                    Polarity::Addition => self.stats.emitted_additions += 1,
                    Polarity::Retraction => self.stats.emitted_retractions += 1,
                }
                trace!("{} join emits {}", self.strategy.name(), row);
                return Poll::Ready(Some(Ok(row)));
            }

            match self.pull(cx) {
                Poll::Ready(Some(Ok((side, row)))) => self.consume(side, row),
                Poll::Ready(Some(Err(e))) => {
                    warn!("{} join failed: {}", self.strategy.name(), e);
                    self.close();
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => {
                    self.ended = true;
                    debug!("{} join ended: {:?}", self.strategy.name(), self.stats);
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }

    fn step_cursor(&mut self) -> Option<Bindings> {
        let cursor = self.cursor.as_mut()?;
        match cursor.step(&self.strategy, &self.merge) {
            Some(row) => Some(row),
            None => {
                self.cursor = None;
                None
            }
        }
    }

    fn consume(&mut self, side: JoinSide, row: Bindings) {
        match side {
            JoinSide::Left => self.stats.left_events += 1,
            JoinSide::Right => self.stats.right_events += 1,
        }
        trace!("{} join consumes {} from {} source", self.strategy.name(), row, side);

        match self.strategy.consume(side, row, &self.merge) {
            Consumed::Replay(cursor) => self.cursor = Some(cursor),
            Consumed::Absorbed => {}
            Consumed::Ignored => {
                self.stats.ignored_retractions += 1;
                debug!(
                    "{} join ignored retraction of an absent row on the {} side",
                    self.strategy.name(),
                    side
                );
            }
        }
    }

    fn source_mut(&mut self, side: JoinSide) -> &mut Option<BindingsStream> {
        match side {
            JoinSide::Left => &mut self.left,
            JoinSide::Right => &mut self.right,
        }
    }

    /// Pulls one event from whichever side has one, preferring the side not used last.
    /// `Pending` is only returned after every open source returned `Pending`, so each of
    /// them holds the waker.
    fn pull(&mut self, cx: &mut Context<'_>) -> Poll<Option<Result<(JoinSide, Bindings)>>> {
        let order = if self.poll_left_first {
            [JoinSide::Left, JoinSide::Right]
        } else {
            [JoinSide::Right, JoinSide::Left]
        };

        for side in order {
            let polled = match self.source_mut(side) {
                Some(source) => source.poll_next_unpin(cx),
                None => continue,
            };
            match polled {
                Poll::Ready(Some(Ok(row))) => {
                    self.poll_left_first = side == JoinSide::Right;
                    return Poll::Ready(Some(Ok((side, row))));
                }
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => {
                    debug!("{} source of {} join ended", side, self.strategy.name());
                    *self.source_mut(side) = None;
                }
                Poll::Pending => {}
            }
        }

        if self.left.is_none() && self.right.is_none() {
            Poll::Ready(None)
        } else {
            Poll::Pending
        }
    }
}

impl<S: JoinStrategy + Unpin> Stream for IncrementalJoin<S> {
    type Item = Result<Bindings>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().poll_read(cx)
    }
}
