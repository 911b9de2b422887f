pub mod http_client;
pub mod in_memory;
pub mod static_files;

pub use http_client::HttpSheetTransport;
pub use in_memory::InMemoryTransport;
pub use static_files::StaticFilesTransport;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::app::ports::SheetTransport;
use crate::config::{TransportConfig, TransportKind};
use crate::error::TransportError;

/// Build the transport selected by the startup configuration
pub fn transport_from_config(
    config: &TransportConfig,
) -> Result<Arc<dyn SheetTransport>, TransportError> {
    match config.kind {
        TransportKind::Http => {
            let timeout = Duration::from_secs(config.timeout_seconds);
            Ok(Arc::new(HttpSheetTransport::with_timeout(timeout)?))
        }
        TransportKind::Static => {
            // Config::validate rejects a static transport without a root
            let root = config
                .static_root
                .clone()
                .unwrap_or_else(|| PathBuf::from("."));
            Ok(Arc::new(StaticFilesTransport::new(root)))
        }
    }
}
