//! Order-preserving "all-of" aggregation.
//!
//! [`aggregate`] waits for every task in a list and yields their values in
//! input order, or fails with the first error any task produces. Each call
//! owns its own result buffer and settled counter.

use crate::future::pending::Pending;
use crate::seq::Seq;
use futures::future::{self, BoxFuture, Either, FusedFuture, FutureExt, TryFutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::{debug, trace};

/// One entry of a task list.
pub enum Task<T, E> {
    /// A plain value, available immediately.
    Ready(T),
    /// A computation that settles later.
    Pending(BoxFuture<'static, Result<T, E>>),
}

impl<T, E> Task<T, E> {
    pub fn ready(value: T) -> Self {
        Task::Ready(value)
    }

    /// Wraps any future resolving to `Result<T, E>`.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        Task::Pending(future.boxed())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Task::Pending(_))
    }
}

impl<T, E> From<Pending<T, E>> for Task<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn from(pending: Pending<T, E>) -> Self {
        Task::Pending(Box::pin(pending))
    }
}

impl<T: fmt::Debug, E> fmt::Debug for Task<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Task::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// A subscribed task that reports its position when it settles.
struct Indexed<T, E> {
    index: usize,
    inner: BoxFuture<'static, Result<T, E>>,
}

impl<T, E> Future for Indexed<T, E> {
    type Output = (usize, Result<T, E>);

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let index = self.index;
        self.inner.as_mut().poll(cx).map(|outcome| (index, outcome))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Pending,
    Succeeded,
    Failed,
}

/// Future returned by [`aggregate`].
#[must_use = "futures do nothing unless polled"]
pub struct Aggregate<T, E> {
    slots: Seq<T>,
    in_flight: FuturesUnordered<Indexed<T, E>>,
    settled: usize,
    total: usize,
    state: State,
}

// `Vec<Option<T>>` is only auto-`Unpin` when `T` is. Values are moved out
// by value and never pinned, so the aggregate is `Unpin` for any `T`.
impl<T, E> Unpin for Aggregate<T, E> {}

/// Waits on every task and yields their values in input order.
///
/// Plain values land in their slot immediately; pending tasks are
/// subscribed to and fill their slot when they succeed. The first failure
/// settles the aggregate with that task's own error.
pub fn aggregate<T, E, I>(tasks: I) -> Aggregate<T, E>
where
    I: IntoIterator<Item = Task<T, E>>,
{
    let mut slots = Vec::new();
    let in_flight = FuturesUnordered::new();
    let mut settled = 0;

    for (index, task) in tasks.into_iter().enumerate() {
        match task {
            Task::Ready(value) => {
                slots.push(Some(value));
                settled += 1;
            }
            Task::Pending(inner) => {
                slots.push(None);
                in_flight.push(Indexed { index, inner });
            }
        }
    }

    let total = slots.len();
    debug!(
        "Aggregating {} tasks ({} already available, {} in flight)",
        total,
        settled,
        in_flight.len()
    );

    Aggregate {
        slots: Seq::from_slots(slots),
        in_flight,
        settled,
        total,
        state: State::Pending,
    }
}

/// Like [`aggregate`], but an absent task list is echoed back as `None`.
pub fn aggregate_optional<T, E>(
    tasks: Option<Vec<Task<T, E>>>,
) -> impl Future<Output = Result<Option<Vec<T>>, E>> {
    match tasks {
        None => Either::Left(future::ready(Ok(None))),
        Some(tasks) => Either::Right(aggregate(tasks).map_ok(Some)),
    }
}

impl<T, E> Aggregate<T, E> {
    /// Number of tasks in the list.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of tasks that have settled successfully so far.
    pub fn settled(&self) -> usize {
        self.settled
    }

    fn record(&mut self, index: usize, value: T) {
        let previous = self.slots.set(index, value);
        debug_assert!(
            matches!(previous, Ok(None)),
            "slot {} written twice or out of range",
            index
        );
        self.settled += 1;
        trace!("Task {} settled ({}/{})", index, self.settled, self.total);
    }
}

impl<T, E> Future for Aggregate<T, E> {
    type Output = Result<Vec<T>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if this.state != State::Pending {
            return Poll::Pending;
        }

        while this.settled < this.total {
            match this.in_flight.poll_next_unpin(cx) {
                Poll::Ready(Some((index, Ok(value)))) => this.record(index, value),
                Poll::Ready(Some((index, Err(err)))) => {
                    debug!(
                        "Task {} failed after {}/{} settled; failing aggregate",
                        index, this.settled, this.total
                    );
                    this.state = State::Failed;
                    this.in_flight.clear();
                    return Poll::Ready(Err(err));
                }
                Poll::Ready(None) => break,
                Poll::Pending => return Poll::Pending,
            }
        }

        debug_assert_eq!(this.settled, this.total);
        this.state = State::Succeeded;
        let slots = mem::take(&mut this.slots);
        Poll::Ready(Ok(slots.into_slots().into_iter().flatten().collect()))
    }
}

impl<T, E> FusedFuture for Aggregate<T, E> {
    fn is_terminated(&self) -> bool {
        self.state != State::Pending
    }
}

impl<T, E> fmt::Debug for Aggregate<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregate")
            .field("total", &self.total)
            .field("settled", &self.settled)
            .field("state", &self.state)
            .finish()
    }
}
