use thiserror::Error;

/// Failures raised by a transport adapter while reading a sheet or locator.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// Failures of a bootstrap run, tagged with the stage that produced them.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Failed to resolve source locator {locator}: {source}")]
    SourceResolution {
        locator: String,
        source: TransportError,
    },

    #[error("Source locator {locator} resolved to an empty value")]
    EmptyLocator { locator: String },

    #[error("Failed to fetch config sheet '{table}': {source}")]
    ConfigFetch {
        table: &'static str,
        source: TransportError,
    },

    #[error("Failed to assemble model branch '{branch}': {source}")]
    ModelAssembly {
        branch: &'static str,
        source: TransportError,
    },
}

impl BootstrapError {
    /// Pipeline stage the error belongs to, used as a metric label.
    pub fn stage(&self) -> &'static str {
        match self {
            BootstrapError::SourceResolution { .. } | BootstrapError::EmptyLocator { .. } => {
                "resolve"
            }
            BootstrapError::ConfigFetch { .. } => "config",
            BootstrapError::ModelAssembly { .. } => "model",
        }
    }
}

/// Startup configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

pub type Result<T> = std::result::Result<T, BootstrapError>;
