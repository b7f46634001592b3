//! Asset readiness polling with deduplicated background tasks.
//!
//! Each asset id gets at most one live query loop; concurrent callers share
//! its result through the in-flight registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::hosting::{AssetRecord, AssetStatus, HostingApi};

use super::classify::{classify, ErrorClass};
use super::config::PublisherConfig;

/// Consecutive failed or unparseable status queries tolerated before a poll
/// gives up.
const MAX_CONSECUTIVE_STATUS_ERRORS: u32 = 5;

/// Upper bound on the wait after a transient mid-poll failure.
const TRANSIENT_RETRY_WAIT: Duration = Duration::from_secs(2);

/// Bounds for the overall poll deadline.
const MIN_POLL_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_POLL_TIMEOUT: Duration = Duration::from_secs(1_800);

/// Errors surfaced by a readiness wait.
#[derive(Debug, Clone, Error)]
pub enum PollError {
    #[error("Asset {asset_id} not ready after {timeout:?}")]
    Timeout { asset_id: String, timeout: Duration },

    #[error("Asset {asset_id} failed processing: {message}")]
    AssetErrored { asset_id: String, message: String },

    #[error("Gave up polling asset {asset_id} after {count} consecutive status errors: {last_error}")]
    TooManyConsecutiveErrors {
        asset_id: String,
        count: u32,
        last_error: String,
    },

    #[error("Readiness poll task failed: {0}")]
    TaskFailed(String),
}

/// Per-call overrides for a readiness wait.
#[derive(Debug, Clone, Copy, Default)]
pub struct PollOptions {
    /// Overall deadline; falls back to the configured poll timeout.
    pub timeout: Option<Duration>,
    /// Fixed poll interval; falls back to the configured interval, or the
    /// progressive schedule when neither is set.
    pub interval: Option<Duration>,
}

type PollResult = Result<AssetRecord, PollError>;
type SharedPoll = Shared<BoxFuture<'static, PollResult>>;

/// Polls the hosting platform until an asset reaches a terminal state.
pub struct ReadinessPoller {
    hosting: Arc<dyn HostingApi>,
    default_timeout: Duration,
    default_interval: Option<Duration>,
    in_flight: Arc<Mutex<HashMap<String, SharedPoll>>>,
}

impl ReadinessPoller {
    /// Create a new poller.
    pub fn new(hosting: Arc<dyn HostingApi>, config: &PublisherConfig) -> Self {
        let config = config.normalized();
        Self {
            hosting,
            default_timeout: config.poll_timeout(),
            default_interval: config.poll_interval(),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Wait until `asset_id` reaches a terminal state, joining an in-flight
    /// poll for the same asset when one exists.
    pub async fn wait_until_ready(&self, asset_id: &str, options: PollOptions) -> PollResult {
        self.poll_future(asset_id, options).await
    }

    /// Number of assets currently being polled.
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().unwrap().len()
    }

    fn poll_future(&self, asset_id: &str, options: PollOptions) -> SharedPoll {
        let mut in_flight = self.in_flight.lock().unwrap();
        if let Some(existing) = in_flight.get(asset_id) {
            debug!(asset_id, "Joining in-flight readiness poll");
            return existing.clone();
        }

        let timeout = clamp_poll_timeout(options.timeout.unwrap_or(self.default_timeout));
        let interval = options.interval.or(self.default_interval);
        let hosting = Arc::clone(&self.hosting);
        let registry = Arc::clone(&self.in_flight);
        let id = asset_id.to_string();

        // The loop runs as its own task so the registry entry is cleared on
        // every exit path, even when all callers stop waiting.
        let task = tokio::spawn(async move {
            let result = poll_until_terminal(hosting.as_ref(), &id, timeout, interval).await;
            registry.lock().unwrap().remove(&id);
            result
        });

        let fut: SharedPoll = async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(PollError::TaskFailed(e.to_string())),
            }
        }
        .boxed()
        .shared();

        in_flight.insert(asset_id.to_string(), fut.clone());
        fut
    }
}

async fn poll_until_terminal(
    hosting: &dyn HostingApi,
    asset_id: &str,
    timeout: Duration,
    fixed_interval: Option<Duration>,
) -> PollResult {
    let started = Instant::now();
    let deadline = started + timeout;
    let mut consecutive_errors: u32 = 0;

    loop {
        let wait = match hosting.get_asset(asset_id).await {
            Ok(record) => match record.status {
                AssetStatus::Ready => {
                    debug!(asset_id, playback_id = ?record.playback_id, "Asset ready");
                    return Ok(record);
                }
                AssetStatus::Errored => {
                    return Err(PollError::AssetErrored {
                        asset_id: asset_id.to_string(),
                        message: record
                            .error_message
                            .unwrap_or_else(|| "unspecified platform error".to_string()),
                    });
                }
                AssetStatus::Preparing | AssetStatus::Processing => {
                    consecutive_errors = 0;
                    current_interval(started.elapsed(), fixed_interval)
                }
            },
            Err(e) => {
                consecutive_errors += 1;
                if consecutive_errors >= MAX_CONSECUTIVE_STATUS_ERRORS {
                    return Err(PollError::TooManyConsecutiveErrors {
                        asset_id: asset_id.to_string(),
                        count: consecutive_errors,
                        last_error: e.to_string(),
                    });
                }

                let interval = current_interval(started.elapsed(), fixed_interval);
                match classify(&e) {
                    ErrorClass::Transient => {
                        warn!(asset_id, consecutive_errors, "Transient status query failure: {}", e);
                        interval.min(TRANSIENT_RETRY_WAIT)
                    }
                    // Unparseable responses advance nothing; keep the cadence.
                    ErrorClass::Fatal => {
                        warn!(asset_id, consecutive_errors, "Unusable status response: {}", e);
                        interval
                    }
                }
            }
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(PollError::Timeout {
                asset_id: asset_id.to_string(),
                timeout,
            });
        }
        tokio::time::sleep(wait.min(remaining)).await;
        if Instant::now() >= deadline {
            return Err(PollError::Timeout {
                asset_id: asset_id.to_string(),
                timeout,
            });
        }
    }
}

fn clamp_poll_timeout(timeout: Duration) -> Duration {
    timeout.clamp(MIN_POLL_TIMEOUT, MAX_POLL_TIMEOUT)
}

fn current_interval(elapsed: Duration, fixed: Option<Duration>) -> Duration {
    match fixed {
        Some(interval) => interval,
        None => progressive_interval(elapsed),
    }
}

/// Progressive polling schedule: young assets are polled often, long-running
/// ones back off.
fn progressive_interval(elapsed: Duration) -> Duration {
    const ONE_MINUTE: Duration = Duration::from_secs(60);
    const FIVE_MINUTES: Duration = Duration::from_secs(300);
    const FIFTEEN_MINUTES: Duration = Duration::from_secs(900);

    if elapsed < ONE_MINUTE {
        Duration::from_secs(5)
    } else if elapsed < FIVE_MINUTES {
        Duration::from_secs(10)
    } else if elapsed < FIFTEEN_MINUTES {
        Duration::from_secs(30)
    } else {
        Duration::from_secs(60)
    }
}
