//! Turns a set of already-spawned tasks into a lazy stream of their
//! successful results.

use futures::Stream;
use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::task::{JoinError, JoinHandle};
use tracing::warn;

/// What to do when a task is observed to have failed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Yield the failure to the consumer and stop
    #[default]
    Strict,
    /// Log the failure, drop it, keep going
    Lenient,
}

/// Stream of task results in completion order, filtered by a [`FailurePolicy`].
///
/// Single pass. Dropping it detaches the remaining tasks; they are not aborted.
pub struct Checked<T, E> {
    pending: FuturesUnordered<JoinHandle<Result<T, E>>>,
    policy: FailurePolicy,
    finished: bool,
}

/// Wraps `tasks` according to `policy`.
pub fn check<T, E, I>(tasks: I, policy: FailurePolicy) -> Checked<T, E>
where
    I: IntoIterator<Item = JoinHandle<Result<T, E>>>,
{
    Checked {
        pending: tasks.into_iter().collect(),
        policy,
        finished: false,
    }
}

impl<T, E> Checked<T, E> {
    /// Number of tasks not yet observed
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl<T, E> Stream for Checked<T, E>
where
    E: From<JoinError> + Display,
{
    type Item = Result<T, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        loop {
            let outcome = match this.pending.poll_next_unpin(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(None) => {
                    this.finished = true;
                    return Poll::Ready(None);
                }
                Poll::Ready(Some(joined)) => joined.map_err(E::from).and_then(|r| r),
            };

            match (outcome, this.policy) {
                (Ok(value), _) => return Poll::Ready(Some(Ok(value))),
                (Err(err), FailurePolicy::Strict) => {
                    this.finished = true;
                    return Poll::Ready(Some(Err(err)));
                }
                (Err(err), FailurePolicy::Lenient) => {
                    warn!(error = %err, "Dropping result of failed task");
                }
            }
        }
    }
}
