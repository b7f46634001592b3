//! Hosting platform boundary: transports, byte transfer and domain types.

mod direct;
mod rpc;
mod traits;
mod transfer;
mod types;
mod wire;

pub use direct::DirectHostingClient;
pub use rpc::RpcHostingClient;
pub use traits::*;
pub use transfer::HttpByteTransfer;
pub use types::*;

use std::sync::Arc;

use crate::config::{ConfigError, HostingBackend, HostingConfig};

/// Factory function to create a hosting client from config
pub fn create_hosting_client(config: &HostingConfig) -> Result<Arc<dyn HostingApi>, ConfigError> {
    match config.backend {
        HostingBackend::Direct => {
            let direct = config.direct.clone().ok_or_else(|| {
                ConfigError::ValidationError(
                    "[hosting.direct] must be set when backend = \"direct\"".to_string(),
                )
            })?;
            Ok(Arc::new(DirectHostingClient::new(direct)))
        }
        HostingBackend::Rpc => {
            let rpc = config.rpc.clone().ok_or_else(|| {
                ConfigError::ValidationError(
                    "[hosting.rpc] must be set when backend = \"rpc\"".to_string(),
                )
            })?;
            Ok(Arc::new(RpcHostingClient::new(rpc)))
        }
    }
}
