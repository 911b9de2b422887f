pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod types;

// Layered boundaries: ports in app, adapters in infra, orchestration in pipeline
pub mod app;
pub mod infra;
pub mod pipeline;

pub use config::{Config, SourcesConfig};
pub use error::{BootstrapError, ConfigError, Result, TransportError};
pub use pipeline::orchestrator::{Bootstrap, Bootstrapper};
