use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::TransportError;
use crate::types::{ConfigRow, RecordType, SourceLocator};

/// Reads published sheets. Implementations must allow concurrent outstanding calls.
#[async_trait]
pub trait SheetTransport: Send + Sync {
    /// Name used in logs and metric labels
    fn name(&self) -> &'static str;

    /// Fetch the raw text behind a locator (used to resolve indirection)
    async fn fetch_text(&self, locator: &SourceLocator) -> Result<String, TransportError>;

    /// Fetch every row of one sheet of the spreadsheet at `locator`
    async fn fetch_rows(
        &self,
        locator: &SourceLocator,
        sheet: &str,
    ) -> Result<Vec<ConfigRow>, TransportError>;

    /// Fetch the raw rows of every record of `record_type`
    async fn fetch_all(
        &self,
        locator: &SourceLocator,
        record_type: RecordType,
    ) -> Result<Vec<ConfigRow>, TransportError> {
        self.fetch_rows(locator, record_type.sheet_name()).await
    }
}

/// Answers whether the application shell can render a route
pub trait RouteOracle: Send + Sync {
    fn has_route(&self, route: &str) -> bool;
}

impl<F> RouteOracle for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn has_route(&self, route: &str) -> bool {
        self(route)
    }
}

/// Route oracle backed by a fixed set of route names
#[derive(Debug, Clone, Default)]
pub struct KnownRoutes(HashSet<String>);

impl KnownRoutes {
    pub fn new<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(routes.into_iter().map(Into::into).collect())
    }
}

impl RouteOracle for KnownRoutes {
    fn has_route(&self, route: &str) -> bool {
        self.0.contains(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_routes() {
        let routes = KnownRoutes::new(["perfil", "home"]);
        assert!(routes.has_route("perfil"));
        assert!(routes.has_route("home"));
        assert!(!routes.has_route("ghost"));
    }

    #[test]
    fn test_closure_oracle() {
        let oracle = |route: &str| route.starts_with("perfil");
        assert!(oracle.has_route("perfil.frente-a-frente"));
        assert!(!oracle.has_route("home"));
    }
}
