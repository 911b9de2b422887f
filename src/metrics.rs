//! Metrics for the bootstrap pipeline.
//!
//! Recording goes through the `metrics` facade; without an installed
//! recorder every call is a no-op, so library users and tests pay nothing.

use once_cell::sync::OnceCell;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use crate::constants::METRICS_PORT_ENV;

static PROMETHEUS_INSTALLED: OnceCell<SocketAddr> = OnceCell::new();

/// All metric names used by the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Transport
    FetchSuccess,
    FetchError,
    FetchDuration,
    FetchRows,

    // Field mappings
    MappingsInstalled,
    MappingFields,

    // Bootstrap
    BootstrapSuccess,
    BootstrapError,
    BootstrapDuration,
    NavLinksDropped,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::FetchSuccess => "sheet_fetch_success_total",
            MetricName::FetchError => "sheet_fetch_error_total",
            MetricName::FetchDuration => "sheet_fetch_duration_seconds",
            MetricName::FetchRows => "sheet_fetch_rows",
            MetricName::MappingsInstalled => "sheet_mappings_installed_total",
            MetricName::MappingFields => "sheet_mapping_fields",
            MetricName::BootstrapSuccess => "sheet_bootstrap_success_total",
            MetricName::BootstrapError => "sheet_bootstrap_error_total",
            MetricName::BootstrapDuration => "sheet_bootstrap_duration_seconds",
            MetricName::NavLinksDropped => "sheet_nav_links_dropped_total",
        }
    }

    /// Get all metric names as an iterator
    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            FetchSuccess,
            FetchError,
            FetchDuration,
            FetchRows,
            MappingsInstalled,
            MappingFields,
            BootstrapSuccess,
            BootstrapError,
            BootstrapDuration,
            NavLinksDropped,
        ]
        .into_iter()
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install the Prometheus exporter, listening on `SHEET_METRICS_PORT` (default 9898).
pub fn init_metrics() {
    let port: u16 = std::env::var(METRICS_PORT_ENV)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9898);
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    if PROMETHEUS_INSTALLED.get().is_some() {
        return;
    }

    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => {
            let _ = PROMETHEUS_INSTALLED.set(addr);
            tracing::info!("Prometheus exporter listening on http://{}/metrics", addr);
        }
        Err(e) => {
            tracing::warn!("Prometheus exporter install failed: {}", e);
        }
    }
}

// ============================================================================
// Transport Metrics
// ============================================================================

pub mod sources {
    use super::MetricName;
    use std::time::Duration;

    pub fn fetch_success(transport: &'static str, duration: Duration) {
        ::metrics::counter!(MetricName::FetchSuccess.as_str(), "transport" => transport)
            .increment(1);
        ::metrics::histogram!(MetricName::FetchDuration.as_str(), "transport" => transport)
            .record(duration.as_secs_f64());
    }

    pub fn fetch_error(transport: &'static str) {
        ::metrics::counter!(MetricName::FetchError.as_str(), "transport" => transport).increment(1);
    }

    pub fn rows_fetched(sheet: &str, rows: usize) {
        ::metrics::histogram!(MetricName::FetchRows.as_str(), "sheet" => sheet.to_string())
            .record(rows as f64);
    }
}

// ============================================================================
// Field Mapping Metrics
// ============================================================================

pub mod mappings {
    use super::MetricName;

    pub fn installed(sheet: &'static str, fields: usize) {
        ::metrics::counter!(MetricName::MappingsInstalled.as_str(), "sheet" => sheet).increment(1);
        ::metrics::gauge!(MetricName::MappingFields.as_str(), "sheet" => sheet).set(fields as f64);
    }
}

// ============================================================================
// Bootstrap Metrics
// ============================================================================

pub mod bootstrap {
    use super::MetricName;
    use std::time::Duration;

    pub fn success(duration: Duration) {
        ::metrics::counter!(MetricName::BootstrapSuccess.as_str()).increment(1);
        ::metrics::histogram!(MetricName::BootstrapDuration.as_str())
            .record(duration.as_secs_f64());
    }

    pub fn error(stage: &'static str) {
        ::metrics::counter!(MetricName::BootstrapError.as_str(), "stage" => stage).increment(1);
    }

    pub fn nav_links_dropped(count: usize) {
        ::metrics::counter!(MetricName::NavLinksDropped.as_str()).increment(count as u64);
    }
}

/// Seconds elapsed, rounded for log output
pub fn seconds(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 1000.0).round() / 1000.0
}
