//! Bounded-concurrency admission gate for publish operations.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::oneshot;

/// Raised when a caller is not admitted within the configured timeout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Timed out waiting for an upload slot after {0:?}")]
pub struct AcquireTimeout(pub Duration);

/// Admits at most `max_concurrent` operations; excess callers wait in FIFO
/// order until a slot frees up or their timeout fires.
///
/// The lock is only held for queue bookkeeping, never across an await.
pub struct ConnectionLimiter {
    max_concurrent: usize,
    acquire_timeout: Duration,
    state: Mutex<LimiterState>,
}

struct LimiterState {
    active: usize,
    waiters: VecDeque<oneshot::Sender<()>>,
}

impl ConnectionLimiter {
    /// Create a new limiter.
    pub fn new(max_concurrent: usize, acquire_timeout: Duration) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
            acquire_timeout,
            state: Mutex::new(LimiterState {
                active: 0,
                waiters: VecDeque::new(),
            }),
        }
    }

    /// Acquire a slot, queueing behind earlier callers when at capacity.
    pub async fn acquire(&self) -> Result<(), AcquireTimeout> {
        let mut rx = {
            let mut state = self.state.lock().unwrap();
            if state.active < self.max_concurrent {
                state.active += 1;
                return Ok(());
            }
            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(tx);
            rx
        };

        tokio::select! {
            admitted = &mut rx => match admitted {
                Ok(()) => Ok(()),
                // Sender dropped without admitting us: the limiter is gone.
                Err(_) => Err(AcquireTimeout(self.acquire_timeout)),
            },
            _ = tokio::time::sleep(self.acquire_timeout) => {
                // A release may have admitted us right at the deadline.
                match rx.try_recv() {
                    Ok(()) => Ok(()),
                    Err(_) => Err(AcquireTimeout(self.acquire_timeout)),
                }
            }
        }
    }

    /// Release a slot, handing it to the next live waiter if any.
    ///
    /// Safe to call more times than `acquire` succeeded. Waiters whose
    /// timeout already fired are skipped in favor of the next in line.
    pub fn release(&self) {
        let mut state = self.state.lock().unwrap();
        while let Some(waiter) = state.waiters.pop_front() {
            if waiter.send(()).is_ok() {
                // Slot transferred; the active count is unchanged.
                return;
            }
        }
        state.active = state.active.saturating_sub(1);
    }

    /// Currently admitted operations.
    pub fn active(&self) -> usize {
        self.state.lock().unwrap().active
    }

    /// Callers waiting for a slot (including any whose timeout has fired but
    /// has not been swept by a release yet).
    pub fn queued(&self) -> usize {
        self.state.lock().unwrap().waiters.len()
    }

    /// Configured concurrency bound.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_acquire_up_to_capacity() {
        let limiter = ConnectionLimiter::new(2, Duration::from_secs(5));

        limiter.acquire().await.unwrap();
        limiter.acquire().await.unwrap();
        assert_eq!(limiter.active(), 2);
        assert_eq!(limiter.queued(), 0);
    }

    #[tokio::test]
    async fn test_third_caller_times_out() {
        let limiter = ConnectionLimiter::new(2, Duration::from_millis(100));

        limiter.acquire().await.unwrap();
        limiter.acquire().await.unwrap();

        let err = limiter.acquire().await.unwrap_err();
        assert_eq!(err, AcquireTimeout(Duration::from_millis(100)));
        assert_eq!(limiter.active(), 2);
    }

    #[tokio::test]
    async fn test_waiter_admitted_on_release() {
        let limiter = Arc::new(ConnectionLimiter::new(1, Duration::from_secs(5)));
        limiter.acquire().await.unwrap();

        let waiter = {
            let limiter = Arc::clone(&limiter);
            tokio::spawn(async move { limiter.acquire().await })
        };

        // Let the waiter queue up before releasing.
        sleep(Duration::from_millis(50)).await;
        assert_eq!(limiter.queued(), 1);

        limiter.release();
        waiter.await.unwrap().unwrap();
        assert_eq!(limiter.active(), 1);
        assert_eq!(limiter.queued(), 0);
    }

    #[tokio::test]
    async fn test_fifo_admission_order() {
        let limiter = Arc::new(ConnectionLimiter::new(1, Duration::from_secs(5)));
        limiter.acquire().await.unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handles = Vec::new();
        for i in 0..3u32 {
            let limiter = Arc::clone(&limiter);
            let tx = tx.clone();
            handles.push(tokio::spawn(async move {
                limiter.acquire().await.unwrap();
                tx.send(i).unwrap();
                limiter.release();
            }));
            // Fix the queue order before spawning the next waiter.
            sleep(Duration::from_millis(20)).await;
        }

        limiter.release();
        for handle in handles {
            handle.await.unwrap();
        }

        let mut order = Vec::new();
        while let Ok(i) = rx.try_recv() {
            order.push(i);
        }
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_over_release_does_not_corrupt_state() {
        let limiter = ConnectionLimiter::new(1, Duration::from_millis(100));

        limiter.release();
        limiter.release();
        assert_eq!(limiter.active(), 0);

        // The bound still holds after the spurious releases.
        limiter.acquire().await.unwrap();
        assert_eq!(limiter.active(), 1);
        let err = limiter.acquire().await.unwrap_err();
        assert_eq!(err, AcquireTimeout(Duration::from_millis(100)));
    }

    #[tokio::test]
    async fn test_release_skips_timed_out_waiter() {
        let limiter = Arc::new(ConnectionLimiter::new(1, Duration::from_millis(40)));
        limiter.acquire().await.unwrap();

        // First waiter times out and leaves a dead queue entry behind.
        assert!(limiter.acquire().await.is_err());
        assert_eq!(limiter.queued(), 1);

        // Second waiter queues behind the dead entry.
        let patient = {
            let limiter = Arc::clone(&limiter);
            tokio::spawn(async move { limiter.acquire().await })
        };
        sleep(Duration::from_millis(10)).await;
        assert_eq!(limiter.queued(), 2);

        // The release must skip the dead waiter and admit the live one.
        limiter.release();
        patient.await.unwrap().unwrap();
        assert_eq!(limiter.active(), 1);
        assert_eq!(limiter.queued(), 0);
    }

    #[tokio::test]
    async fn test_minimum_capacity_is_one() {
        let limiter = ConnectionLimiter::new(0, Duration::from_secs(1));
        assert_eq!(limiter.max_concurrent(), 1);
        limiter.acquire().await.unwrap();
    }
}
