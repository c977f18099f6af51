//! Bounded, cancellable waiting on long-running remote operations
//!
//! Google's long-audio synthesis and long-running recognition both hand
//! back an operation name that has to be polled until `done`. The wait is
//! capped by `max_wait` and can be abandoned through a
//! [`CancellationToken`].

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// How often to poll and when to give up
#[derive(Debug, Clone, Copy)]
pub struct PollSchedule {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl PollSchedule {
    pub const fn new(interval: Duration, max_wait: Duration) -> Self {
        Self { interval, max_wait }
    }
}

/// Result of a single status check
#[derive(Debug)]
pub enum PollOutcome<T> {
    Pending,
    Done(T),
}

/// Why waiting stopped without a result
#[derive(Debug, thiserror::Error)]
pub enum WaitError<E> {
    #[error("operation did not complete within {0:?}")]
    TimedOut(Duration),

    #[error("operation wait was cancelled")]
    Cancelled,

    /// The status check itself failed
    #[error(transparent)]
    Poll(E),
}

/// Poll `check` until it reports completion, the schedule runs out, or
/// `cancel` fires
///
/// The first check happens immediately. Between checks the task sleeps
/// for `schedule.interval`, never past the deadline.
///
/// # Errors
///
/// Returns [`WaitError::TimedOut`] once `max_wait` has elapsed,
/// [`WaitError::Cancelled`] when the token is cancelled, and
/// [`WaitError::Poll`] when a status check fails
pub async fn wait_for<T, E, F, Fut>(
    schedule: PollSchedule,
    cancel: &CancellationToken,
    mut check: F,
) -> Result<T, WaitError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollOutcome<T>, E>>,
{
    let deadline = Instant::now() + schedule.max_wait;
    let mut checks: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(WaitError::Cancelled);
        }

        checks += 1;

        if let PollOutcome::Done(value) = check().await.map_err(WaitError::Poll)? {
            tracing::debug!(checks, "operation completed");
            return Ok(value);
        }

        let now = Instant::now();
        if now >= deadline {
            tracing::warn!(checks, max_wait = ?schedule.max_wait, "operation wait timed out");
            return Err(WaitError::TimedOut(schedule.max_wait));
        }

        let nap = schedule.interval.min(deadline - now);
        tracing::debug!(checks, next_check_in = ?nap, "operation still running");

        tokio::select! {
            () = cancel.cancelled() => return Err(WaitError::Cancelled),
            () = tokio::time::sleep(nap) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn schedule() -> PollSchedule {
        PollSchedule::new(Duration::from_secs(10), Duration::from_secs(60))
    }

    #[tokio::test(start_paused = true)]
    async fn returns_once_done() {
        let calls = Cell::new(0);
        let token = CancellationToken::new();

        let value = wait_for(schedule(), &token, || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 {
                    Ok::<_, ()>(PollOutcome::Pending)
                } else {
                    Ok(PollOutcome::Done("finished"))
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value, "finished");
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_instead_of_blocking_forever() {
        let token = CancellationToken::new();
        let started = Instant::now();

        let err = wait_for(schedule(), &token, || async { Ok::<PollOutcome<()>, ()>(PollOutcome::Pending) })
            .await
            .unwrap_err();

        assert!(matches!(err, WaitError::TimedOut(d) if d == Duration::from_secs(60)));
        assert!(started.elapsed() >= Duration::from_secs(60));
        assert!(started.elapsed() < Duration::from_secs(70));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_the_wait() {
        let token = CancellationToken::new();
        let trigger = token.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(15)).await;
            trigger.cancel();
        });

        let err = wait_for(schedule(), &token, || async { Ok::<PollOutcome<()>, ()>(PollOutcome::Pending) })
            .await
            .unwrap_err();

        assert!(matches!(err, WaitError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn check_failure_is_surfaced() {
        let token = CancellationToken::new();

        let err = wait_for(schedule(), &token, || async { Err::<PollOutcome<()>, _>("boom") })
            .await
            .unwrap_err();

        assert!(matches!(err, WaitError::Poll("boom")));
    }
}
