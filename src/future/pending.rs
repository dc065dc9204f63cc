//! Single-fire pending computations.
//!
//! A [`Pending`] settles exactly once, either with `Ok(T)` or `Err(E)`. It
//! can start out already settled, adopt an arbitrary future, or be settled
//! from elsewhere through the [`Resolver`] half of [`channel`].

use futures::future::{BoxFuture, FusedFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, trace};

/// A value that becomes available later, exactly once.
#[must_use = "futures do nothing unless polled"]
pub struct Pending<T, E> {
    state: State<T, E>,
}

enum State<T, E> {
    /// Outcome known; `None` once it has been handed out.
    Settled(Option<Result<T, E>>),
    /// Waiting on a [`Resolver`].
    Waiting(oneshot::Receiver<Result<T, E>>),
    /// Driving an adopted future.
    Running(BoxFuture<'static, Result<T, E>>),
    /// The resolver was dropped without settling; this never completes.
    Abandoned,
}

/// A cloneable handle to a [`Pending`]; every clone sees the same outcome.
pub type SharedPending<T, E> = Shared<Pending<T, E>>;

// No pin projection into `T` or `E` ever happens.
impl<T, E> Unpin for Pending<T, E> {}

impl<T, E> Pending<T, E> {
    /// An already successful computation.
    pub fn resolved(value: T) -> Self {
        Self {
            state: State::Settled(Some(Ok(value))),
        }
    }

    /// An already failed computation.
    pub fn rejected(error: E) -> Self {
        Self {
            state: State::Settled(Some(Err(error))),
        }
    }

    /// Adopts `future`; the computation settles when it completes.
    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            state: State::Running(future.boxed()),
        }
    }

    /// Settles with `outcome` once `delay` has elapsed.
    ///
    /// Must be polled from within a tokio runtime.
    pub fn after(delay: Duration, outcome: Result<T, E>) -> Self
    where
        T: Send + 'static,
        E: Send + 'static,
    {
        Self::from_future(async move {
            tokio::time::sleep(delay).await;
            outcome
        })
    }

    /// True when the outcome is known and has not been taken yet.
    ///
    /// This never polls the underlying source.
    pub fn is_settled(&self) -> bool {
        matches!(self.state, State::Settled(Some(_)))
    }

    /// Converts into a cloneable handle.
    pub fn shared(self) -> SharedPending<T, E>
    where
        T: Clone,
        E: Clone,
    {
        FutureExt::shared(self)
    }
}

impl<T, E> Future for Pending<T, E> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;

        match &mut this.state {
            State::Settled(outcome) => match outcome.take() {
                Some(outcome) => Poll::Ready(outcome),
                None => Poll::Pending,
            },
            State::Waiting(rx) => match ready!(Pin::new(rx).poll(cx)) {
                Ok(outcome) => {
                    this.state = State::Settled(None);
                    Poll::Ready(outcome)
                }
                Err(_) => {
                    debug!("resolver dropped before settling; computation will never complete");
                    this.state = State::Abandoned;
                    Poll::Pending
                }
            },
            State::Running(future) => {
                let outcome = ready!(future.as_mut().poll(cx));
                this.state = State::Settled(None);
                Poll::Ready(outcome)
            }
            State::Abandoned => Poll::Pending,
        }
    }
}

impl<T, E> FusedFuture for Pending<T, E> {
    fn is_terminated(&self) -> bool {
        matches!(self.state, State::Settled(None))
    }
}

impl<T, E> fmt::Debug for Pending<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            State::Settled(Some(Ok(_))) => "resolved",
            State::Settled(Some(Err(_))) => "rejected",
            State::Settled(None) => "taken",
            State::Waiting(_) => "waiting",
            State::Running(_) => "running",
            State::Abandoned => "abandoned",
        };
        f.debug_struct("Pending").field("state", &state).finish()
    }
}

/// The settling half of [`channel`].
///
/// Settling consumes the resolver, so a computation can only settle once.
pub struct Resolver<T, E> {
    tx: oneshot::Sender<Result<T, E>>,
}

impl<T, E> Resolver<T, E> {
    pub fn resolve(self, value: T) {
        self.settle(Ok(value));
    }

    pub fn reject(self, error: E) {
        self.settle(Err(error));
    }

    /// Settles with `outcome`. If the pending side is gone the outcome is
    /// discarded.
    pub fn settle(self, outcome: Result<T, E>) {
        if self.tx.send(outcome).is_err() {
            trace!("pending computation dropped before it was settled");
        }
    }

    /// True when nobody is waiting for the outcome anymore.
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<T, E> fmt::Debug for Resolver<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("abandoned", &self.is_abandoned())
            .finish()
    }
}

/// Creates an unsettled computation and the resolver that settles it.
pub fn channel<T, E>() -> (Pending<T, E>, Resolver<T, E>) {
    let (tx, rx) = oneshot::channel();
    let pending = Pending {
        state: State::Waiting(rx),
    };
    (pending, Resolver { tx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::task;
    use tokio_test::{assert_pending, assert_ready, assert_ready_eq};

    #[test]
    fn test_resolved_is_ready_on_first_poll() {
        let pending: Pending<u32, String> = Pending::resolved(3);
        assert!(pending.is_settled());

        let mut fut = task::spawn(pending);
        assert_ready_eq!(fut.poll(), Ok(3));
        assert!(fut.is_terminated());
    }

    #[test]
    fn test_rejected_is_ready_on_first_poll() {
        let mut fut = task::spawn(Pending::<u32, &str>::rejected("boom"));
        assert_ready_eq!(fut.poll(), Err("boom"));
    }

    #[test]
    fn test_channel_settles_once_resolved() {
        let (pending, resolver) = channel::<&str, ()>();
        assert!(!pending.is_settled());

        let mut fut = task::spawn(pending);
        assert_pending!(fut.poll());

        resolver.resolve("foo");
        assert!(fut.is_woken());
        assert_ready_eq!(fut.poll(), Ok("foo"));

        // Terminal: a second poll never yields another outcome.
        assert_pending!(fut.poll());
    }

    #[test]
    fn test_channel_reject() {
        let (pending, resolver) = channel::<u8, &str>();
        resolver.reject("nope");
        assert_eq!(tokio_test::block_on(pending), Err("nope"));
    }

    #[test]
    fn test_dropped_resolver_never_settles() {
        let (pending, resolver) = channel::<u8, ()>();
        let mut fut = task::spawn(pending);
        assert_pending!(fut.poll());

        drop(resolver);
        assert_pending!(fut.poll());
        assert_pending!(fut.poll());
        assert!(!fut.is_terminated());
    }

    #[test]
    fn test_resolver_sees_abandoned_pending() {
        let (pending, resolver) = channel::<u8, ()>();
        assert!(!resolver.is_abandoned());
        drop(pending);
        assert!(resolver.is_abandoned());
        resolver.resolve(1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_waits_for_delay() {
        let start = tokio::time::Instant::now();
        let outcome = Pending::<_, ()>::after(Duration::from_millis(250), Ok(7)).await;
        assert_eq!(outcome, Ok(7));
        assert!(start.elapsed() >= Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_shared_clones_observe_same_outcome() {
        let (pending, resolver) = channel::<String, String>();
        let shared = pending.shared();
        let other = shared.clone();

        resolver.resolve("same".to_string());
        assert_eq!(shared.await, Ok("same".to_string()));
        assert_eq!(other.await, Ok("same".to_string()));
    }

    #[test]
    fn test_debug_reports_state() {
        let pending: Pending<u8, ()> = Pending::resolved(1);
        assert_eq!(format!("{:?}", pending), "Pending { state: \"resolved\" }");
        let (pending, _resolver) = channel::<u8, ()>();
        assert_eq!(format!("{:?}", pending), "Pending { state: \"waiting\" }");
    }

    #[test]
    fn test_from_future_adopts_outcome() {
        let mut fut = task::spawn(Pending::<u8, ()>::from_future(async { Ok(5) }));
        let outcome = assert_ready!(fut.poll());
        assert_eq!(outcome, Ok(5));
    }
}
