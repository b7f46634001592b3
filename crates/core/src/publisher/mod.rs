//! Asynchronous media-publishing pipeline.
//!
//! A publish call moves through three stages:
//! - **Admission**: bounded by the [`ConnectionLimiter`] (FIFO, timed)
//! - **Upload**: [`UploadCoordinator`] creates a session and transfers the
//!   bytes with retry/backoff, holding the slot
//! - **Readiness**: [`ReadinessPoller`] watches the asset in the background
//!   after the slot is released

mod classify;
mod config;
mod limiter;
mod pipeline;
mod poller;
mod upload;

pub use classify::{classify, classify_status, ErrorClass};
pub use config::PublisherConfig;
pub use limiter::{AcquireTimeout, ConnectionLimiter};
pub use pipeline::{PublishError, PublishOutcome, PublishingPipeline};
pub use poller::{PollError, PollOptions, ReadinessPoller};
pub use upload::{PublishedUpload, UploadCoordinator, UploadError};
