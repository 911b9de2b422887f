use async_trait::async_trait;
use reqwest::header::ACCEPT;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

use crate::app::ports::SheetTransport;
use crate::error::TransportError;
use crate::metrics;
use crate::types::{ConfigRow, SourceLocator};

const TRANSPORT_NAME: &str = "http";

/// Reads sheets published over HTTP.
///
/// Locators resolve to a base URL; each sheet is served as a JSON array of
/// row objects at `{base}/{sheet}`, keyed by the sheet's header row.
pub struct HttpSheetTransport {
    client: reqwest::Client,
}

impl Default for HttpSheetTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpSheetTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn sheet_url(locator: &SourceLocator, sheet: &str) -> String {
        format!("{}/{}", locator.as_str().trim_end_matches('/'), sheet)
    }

    async fn get(&self, url: &str, accept: &'static str) -> Result<reqwest::Response, TransportError> {
        let resp = self.client.get(url).header(ACCEPT, accept).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl SheetTransport for HttpSheetTransport {
    fn name(&self) -> &'static str {
        TRANSPORT_NAME
    }

    #[instrument(skip(self, locator), fields(locator = %locator))]
    async fn fetch_text(&self, locator: &SourceLocator) -> Result<String, TransportError> {
        let started = Instant::now();
        let result = async {
            let resp = self.get(locator.as_str(), "text/plain").await?;
            Ok::<_, TransportError>(resp.text().await?)
        }
        .await;

        match &result {
            Ok(text) => {
                metrics::sources::fetch_success(TRANSPORT_NAME, started.elapsed());
                debug!("Fetched {} bytes of text", text.len());
            }
            Err(e) => {
                metrics::sources::fetch_error(TRANSPORT_NAME);
                warn!("Text fetch failed: {}", e);
            }
        }
        result
    }

    #[instrument(skip(self, locator), fields(locator = %locator))]
    async fn fetch_rows(
        &self,
        locator: &SourceLocator,
        sheet: &str,
    ) -> Result<Vec<ConfigRow>, TransportError> {
        let started = Instant::now();
        let url = Self::sheet_url(locator, sheet);
        let result = async {
            let resp = self.get(&url, "application/json").await?;
            let bytes = resp.bytes().await?;
            let rows: Vec<ConfigRow> = serde_json::from_slice(&bytes)?;
            Ok::<_, TransportError>(rows)
        }
        .await;

        match &result {
            Ok(rows) => {
                metrics::sources::fetch_success(TRANSPORT_NAME, started.elapsed());
                metrics::sources::rows_fetched(sheet, rows.len());
                debug!("Fetched {} rows from {}", rows.len(), url);
            }
            Err(e) => {
                metrics::sources::fetch_error(TRANSPORT_NAME);
                warn!("Sheet fetch failed for {}: {}", url, e);
            }
        }
        result
    }
}
