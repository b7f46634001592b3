//! nimbuscast core: publishes locally rendered forecast narration videos to
//! a remote hosting platform and tracks their readiness.

pub mod config;
pub mod hosting;
pub mod publisher;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, HostingBackend,
    PlaybackConfig, SanitizedConfig,
};
pub use hosting::{
    create_hosting_client, AssetRecord, AssetStatus, ByteTransfer, DirectHostingClient,
    HostingApi, HostingError, HttpByteTransfer, NewUploadOptions, PlaybackPolicy,
    RpcHostingClient, UploadSession,
};
pub use publisher::{
    AcquireTimeout, ConnectionLimiter, ErrorClass, PollError, PollOptions, PublishError,
    PublishOutcome, PublishedUpload, PublisherConfig, PublishingPipeline, ReadinessPoller,
    UploadCoordinator, UploadError,
};
