use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use tokio::sync::Barrier;
use tracing::debug;

use crate::app::ports::SheetTransport;
use crate::error::TransportError;
use crate::types::{ConfigRow, SourceLocator};

/// In-memory transport for development and testing.
///
/// Unknown locators and sheets answer with a 404 status error. Every call is
/// recorded as `text:<locator>` or `rows:<locator>/<sheet>`.
///
/// A gated transport holds every `fetch_rows` call until `width` calls are
/// in flight at once, so callers that fetch one sheet after another stall.
#[derive(Default)]
pub struct InMemoryTransport {
    texts: HashMap<String, String>,
    sheets: HashMap<(String, String), Vec<ConfigRow>>,
    failing_sheets: HashSet<String>,
    gate: Option<Barrier>,
    calls: Mutex<Vec<String>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, locator: &str, text: &str) -> Self {
        self.texts.insert(locator.to_string(), text.to_string());
        self
    }

    pub fn with_sheet(mut self, locator: &str, sheet: &str, rows: Vec<ConfigRow>) -> Self {
        self.sheets
            .insert((locator.to_string(), sheet.to_string()), rows);
        self
    }

    /// Make every fetch of `sheet` fail, whatever the locator
    pub fn failing_sheet(mut self, sheet: &str) -> Self {
        self.failing_sheets.insert(sheet.to_string());
        self
    }

    /// Release `fetch_rows` calls only in groups of `width`
    pub fn gated(mut self, width: usize) -> Self {
        self.gate = Some(Barrier::new(width));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: String) {
        debug!("In-memory transport call: {}", call);
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn not_found(url: String) -> TransportError {
        TransportError::Status { url, status: 404 }
    }
}

#[async_trait]
impl SheetTransport for InMemoryTransport {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_text(&self, locator: &SourceLocator) -> Result<String, TransportError> {
        self.record(format!("text:{}", locator));
        // Yield so sibling fetches genuinely interleave
        tokio::task::yield_now().await;
        self.texts
            .get(locator.as_str())
            .cloned()
            .ok_or_else(|| Self::not_found(locator.to_string()))
    }

    async fn fetch_rows(
        &self,
        locator: &SourceLocator,
        sheet: &str,
    ) -> Result<Vec<ConfigRow>, TransportError> {
        let url = format!("{}/{}", locator, sheet);
        self.record(format!("rows:{}", url));
        match &self.gate {
            Some(gate) => {
                gate.wait().await;
            }
            None => tokio::task::yield_now().await,
        }
        if self.failing_sheets.contains(sheet) {
            return Err(TransportError::InvalidPayload(format!(
                "simulated failure for {}",
                url
            )));
        }
        self.sheets
            .get(&(locator.to_string(), sheet.to_string()))
            .cloned()
            .ok_or_else(|| Self::not_found(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_records_calls_and_serves_fixtures() {
        let transport = InMemoryTransport::new()
            .with_text("primary", "urlA")
            .with_sheet("urlA", "configuracion", vec![ConfigRow::new().with("key", "k")]);

        let text = transport.fetch_text(&"primary".into()).await.unwrap();
        assert_eq!(text, "urlA");

        let rows = transport
            .fetch_rows(&"urlA".into(), "configuracion")
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);

        let missing = transport.fetch_rows(&"urlA".into(), "navbar-links").await;
        assert!(matches!(missing, Err(TransportError::Status { status: 404, .. })));

        assert_eq!(
            transport.calls(),
            vec![
                "text:primary",
                "rows:urlA/configuracion",
                "rows:urlA/navbar-links"
            ]
        );
    }

    #[tokio::test]
    async fn test_failing_sheet() {
        let transport = InMemoryTransport::new()
            .with_sheet("urlA", "configuracion", vec![])
            .failing_sheet("configuracion");

        let result = transport.fetch_rows(&"urlA".into(), "configuracion").await;
        assert!(matches!(result, Err(TransportError::InvalidPayload(_))));
    }

    fn gated_fixture() -> InMemoryTransport {
        InMemoryTransport::new()
            .with_sheet("urlA", "configuracion", vec![])
            .with_sheet("urlA", "navbar-links", vec![])
            .gated(2)
    }

    #[tokio::test]
    async fn test_gate_holds_a_lone_fetch() {
        let transport = gated_fixture();

        let alone = tokio::time::timeout(
            Duration::from_millis(50),
            transport.fetch_rows(&"urlA".into(), "configuracion"),
        )
        .await;
        assert!(alone.is_err());
    }

    #[tokio::test]
    async fn test_gate_releases_concurrent_fetches() {
        let transport = gated_fixture();
        let locator: SourceLocator = "urlA".into();

        let together = tokio::time::timeout(Duration::from_secs(2), async {
            tokio::try_join!(
                transport.fetch_rows(&locator, "configuracion"),
                transport.fetch_rows(&locator, "navbar-links"),
            )
        })
        .await;
        assert!(matches!(together, Ok(Ok(_))));
    }
}
