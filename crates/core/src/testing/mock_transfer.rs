//! Mock byte-transfer target for testing.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::hosting::{ByteTransfer, HostingError};

/// A recorded transfer attempt for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedTransfer {
    /// Target URL of the attempt.
    pub url: String,
    /// Body size of the attempt.
    pub content_length: u64,
    /// When the attempt happened (tokio clock, so paused-time tests can
    /// assert on exact backoff delays).
    pub at: Instant,
}

/// Mock implementation of the ByteTransfer trait.
///
/// Queued failures are emitted in order, one per attempt; once the queue is
/// drained every attempt succeeds.
pub struct MockByteTransfer {
    failures: Arc<RwLock<VecDeque<HostingError>>>,
    transfers: Arc<RwLock<Vec<RecordedTransfer>>>,
    /// Simulated duration of each attempt.
    delay: Arc<RwLock<Option<Duration>>>,
}

impl Default for MockByteTransfer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockByteTransfer {
    /// Create a mock transfer target that always succeeds.
    pub fn new() -> Self {
        Self {
            failures: Arc::new(RwLock::new(VecDeque::new())),
            transfers: Arc::new(RwLock::new(Vec::new())),
            delay: Arc::new(RwLock::new(None)),
        }
    }

    /// Make every attempt take the given duration.
    pub async fn set_transfer_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Queue a failure for the next unconsumed attempt.
    pub async fn fail_with(&self, error: HostingError) {
        self.failures.write().await.push_back(error);
    }

    /// Queue the same status failure `count` times.
    pub async fn fail_times_with_status(&self, count: u32, status: u16) {
        let mut failures = self.failures.write().await;
        for _ in 0..count {
            failures.push_back(HostingError::Api {
                status,
                message: format!("simulated HTTP {}", status),
            });
        }
    }

    /// Get all recorded transfer attempts.
    pub async fn transfers(&self) -> Vec<RecordedTransfer> {
        self.transfers.read().await.clone()
    }

    /// Number of attempts made so far.
    pub async fn attempt_count(&self) -> usize {
        self.transfers.read().await.len()
    }
}

#[async_trait]
impl ByteTransfer for MockByteTransfer {
    async fn put(&self, url: &str, body: Bytes) -> Result<(), HostingError> {
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.transfers.write().await.push(RecordedTransfer {
            url: url.to_string(),
            content_length: body.len() as u64,
            at: Instant::now(),
        });

        match self.failures.write().await.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failures_are_consumed_in_order() {
        let mock = MockByteTransfer::new();
        mock.fail_times_with_status(2, 503).await;

        assert!(mock.put("https://u.example", Bytes::from_static(b"x")).await.is_err());
        assert!(mock.put("https://u.example", Bytes::from_static(b"x")).await.is_err());
        assert!(mock.put("https://u.example", Bytes::from_static(b"x")).await.is_ok());
        assert_eq!(mock.attempt_count().await, 3);
    }

    #[tokio::test]
    async fn test_records_url_and_length() {
        let mock = MockByteTransfer::new();
        mock.put("https://u.example/signed", Bytes::from_static(b"abcd"))
            .await
            .unwrap();

        let transfers = mock.transfers().await;
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].url, "https://u.example/signed");
        assert_eq!(transfers[0].content_length, 4);
    }
}
