use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;
use tracing::{debug, instrument, warn};

use crate::app::ports::SheetTransport;
use crate::error::TransportError;
use crate::metrics;
use crate::types::{ConfigRow, SourceLocator};

const TRANSPORT_NAME: &str = "static";

/// Reads sheets exported to a local directory.
///
/// Locators are paths relative to `root`: a text locator names a file, a
/// spreadsheet locator names a directory holding one `<sheet>.json` per sheet.
/// Absolute locators and `..` components are rejected, so reads stay under `root`.
pub struct StaticFilesTransport {
    root: PathBuf,
}

impl StaticFilesTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, locator: &SourceLocator) -> Result<PathBuf, TransportError> {
        let relative = Path::new(locator.as_str());
        let escapes = relative.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(TransportError::InvalidPayload(format!(
                "locator escapes static root: {}",
                locator
            )));
        }
        Ok(self.root.join(relative))
    }

    fn sheet_path(&self, locator: &SourceLocator, sheet: &str) -> Result<PathBuf, TransportError> {
        Ok(self.resolve(locator)?.join(format!("{}.json", sheet)))
    }
}

#[async_trait]
impl SheetTransport for StaticFilesTransport {
    fn name(&self) -> &'static str {
        TRANSPORT_NAME
    }

    #[instrument(skip(self, locator), fields(locator = %locator))]
    async fn fetch_text(&self, locator: &SourceLocator) -> Result<String, TransportError> {
        let started = Instant::now();
        let path = self.resolve(locator).inspect_err(|e| {
            metrics::sources::fetch_error(TRANSPORT_NAME);
            warn!("Rejected locator: {}", e);
        })?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                metrics::sources::fetch_success(TRANSPORT_NAME, started.elapsed());
                debug!("Read {} bytes from {}", text.len(), path.display());
                Ok(text)
            }
            Err(e) => {
                metrics::sources::fetch_error(TRANSPORT_NAME);
                warn!("Failed to read {}: {}", path.display(), e);
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self, locator), fields(locator = %locator))]
    async fn fetch_rows(
        &self,
        locator: &SourceLocator,
        sheet: &str,
    ) -> Result<Vec<ConfigRow>, TransportError> {
        let started = Instant::now();
        let path = self.sheet_path(locator, sheet).inspect_err(|e| {
            metrics::sources::fetch_error(TRANSPORT_NAME);
            warn!("Rejected locator: {}", e);
        })?;
        let result = async {
            let bytes = tokio::fs::read(&path).await?;
            let rows: Vec<ConfigRow> = serde_json::from_slice(&bytes)?;
            Ok::<_, TransportError>(rows)
        }
        .await;

        match &result {
            Ok(rows) => {
                metrics::sources::fetch_success(TRANSPORT_NAME, started.elapsed());
                metrics::sources::rows_fetched(sheet, rows.len());
                debug!("Read {} rows from {}", rows.len(), path.display());
            }
            Err(e) => {
                metrics::sources::fetch_error(TRANSPORT_NAME);
                warn!("Failed to read sheet {}: {}", path.display(), e);
            }
        }
        result
    }
}
