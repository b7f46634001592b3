//! Mock collaborators for testing.
//!
//! Exported from the crate so integration tests and downstream consumers can
//! drive the pipeline without a network.

mod mock_hosting;
mod mock_transfer;

pub use mock_hosting::{MockHostingApi, RecordedCreateUpload};
pub use mock_transfer::{MockByteTransfer, RecordedTransfer};
