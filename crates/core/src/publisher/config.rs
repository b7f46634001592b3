use serde::{Deserialize, Serialize};
use std::time::Duration;

const MIN_UPLOAD_ATTEMPTS: u32 = 3;
const MIN_UPLOAD_BASE_DELAY_MS: u64 = 500;
const MIN_TRANSFER_TIMEOUT_MS: u64 = 60_000;
const MIN_POLL_TIMEOUT_MS: u64 = 10_000;
const MAX_POLL_TIMEOUT_MS: u64 = 1_800_000;

/// Publisher tuning knobs.
///
/// All fields are optional in configuration; out-of-bounds values are pulled
/// back into range by [`PublisherConfig::normalized`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublisherConfig {
    /// Max concurrent publish operations (default: 2)
    #[serde(default = "default_max_concurrent_uploads")]
    pub max_concurrent_uploads: usize,
    /// How long a publish call may wait for a slot, in ms (default: 30000)
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
    /// Byte-transfer attempts (default: 5, min: 3)
    #[serde(default = "default_upload_max_attempts")]
    pub upload_max_attempts: u32,
    /// Base retry delay in ms, doubled on every attempt (default: 1000, min: 500)
    #[serde(default = "default_upload_base_delay_ms")]
    pub upload_base_delay_ms: u64,
    /// Per-attempt byte-transfer timeout in ms (default: 120000, min: 60000)
    #[serde(default = "default_transfer_timeout_ms")]
    pub transfer_timeout_ms: u64,
    /// Overall readiness-poll deadline in ms (default: 300000, clamped to [10000, 1800000])
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
    /// Fixed poll interval in ms; unset means the progressive schedule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            max_concurrent_uploads: default_max_concurrent_uploads(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
            upload_max_attempts: default_upload_max_attempts(),
            upload_base_delay_ms: default_upload_base_delay_ms(),
            transfer_timeout_ms: default_transfer_timeout_ms(),
            poll_timeout_ms: default_poll_timeout_ms(),
            poll_interval_ms: None,
        }
    }
}

fn default_max_concurrent_uploads() -> usize {
    2
}

fn default_acquire_timeout_ms() -> u64 {
    30_000
}

fn default_upload_max_attempts() -> u32 {
    5
}

fn default_upload_base_delay_ms() -> u64 {
    1_000
}

fn default_transfer_timeout_ms() -> u64 {
    120_000
}

fn default_poll_timeout_ms() -> u64 {
    300_000
}

impl PublisherConfig {
    /// Return a copy with every tunable pulled into its documented bounds.
    pub fn normalized(&self) -> Self {
        Self {
            max_concurrent_uploads: self.max_concurrent_uploads.max(1),
            acquire_timeout_ms: self.acquire_timeout_ms.max(1),
            upload_max_attempts: self.upload_max_attempts.max(MIN_UPLOAD_ATTEMPTS),
            upload_base_delay_ms: self.upload_base_delay_ms.max(MIN_UPLOAD_BASE_DELAY_MS),
            transfer_timeout_ms: self.transfer_timeout_ms.max(MIN_TRANSFER_TIMEOUT_MS),
            poll_timeout_ms: self
                .poll_timeout_ms
                .clamp(MIN_POLL_TIMEOUT_MS, MAX_POLL_TIMEOUT_MS),
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    pub fn upload_base_delay(&self) -> Duration {
        Duration::from_millis(self.upload_base_delay_ms)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_millis(self.transfer_timeout_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PublisherConfig::default();
        assert_eq!(config.max_concurrent_uploads, 2);
        assert_eq!(config.acquire_timeout_ms, 30_000);
        assert_eq!(config.upload_max_attempts, 5);
        assert_eq!(config.upload_base_delay_ms, 1_000);
        assert_eq!(config.transfer_timeout_ms, 120_000);
        assert_eq!(config.poll_timeout_ms, 300_000);
        assert!(config.poll_interval_ms.is_none());
    }

    #[test]
    fn test_defaults_survive_normalization() {
        let config = PublisherConfig::default();
        let normalized = config.normalized();
        assert_eq!(normalized.max_concurrent_uploads, config.max_concurrent_uploads);
        assert_eq!(normalized.upload_max_attempts, config.upload_max_attempts);
        assert_eq!(normalized.poll_timeout_ms, config.poll_timeout_ms);
    }

    #[test]
    fn test_normalized_applies_minimums() {
        let config = PublisherConfig {
            max_concurrent_uploads: 0,
            upload_max_attempts: 1,
            upload_base_delay_ms: 10,
            transfer_timeout_ms: 1_000,
            ..Default::default()
        };

        let normalized = config.normalized();
        assert_eq!(normalized.max_concurrent_uploads, 1);
        assert_eq!(normalized.upload_max_attempts, 3);
        assert_eq!(normalized.upload_base_delay_ms, 500);
        assert_eq!(normalized.transfer_timeout_ms, 60_000);
    }

    #[test]
    fn test_normalized_clamps_poll_timeout() {
        let too_short = PublisherConfig {
            poll_timeout_ms: 1_000,
            ..Default::default()
        };
        assert_eq!(too_short.normalized().poll_timeout_ms, 10_000);

        let too_long = PublisherConfig {
            poll_timeout_ms: 7_200_000,
            ..Default::default()
        };
        assert_eq!(too_long.normalized().poll_timeout_ms, 1_800_000);
    }

    #[test]
    fn test_deserialization_fills_defaults() {
        let config: PublisherConfig = toml::from_str("upload_max_attempts = 7").unwrap();
        assert_eq!(config.upload_max_attempts, 7);
        assert_eq!(config.max_concurrent_uploads, 2);
        assert_eq!(config.poll_timeout_ms, 300_000);
    }

    #[test]
    fn test_duration_accessors() {
        let config = PublisherConfig::default();
        assert_eq!(config.acquire_timeout(), Duration::from_secs(30));
        assert_eq!(config.upload_base_delay(), Duration::from_secs(1));
        assert_eq!(config.transfer_timeout(), Duration::from_secs(120));
        assert_eq!(config.poll_timeout(), Duration::from_secs(300));
        assert_eq!(config.poll_interval(), None);
    }
}
