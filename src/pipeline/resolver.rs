use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::app::ports::SheetTransport;
use crate::config::SourcesConfig;
use crate::error::{BootstrapError, Result};
use crate::types::{ResolvedSources, SourceLocator};

/// Steps of source resolution
#[derive(Debug)]
enum ResolutionState {
    ResolvingPrimary,
    ResolvingSecondary {
        data_locator: SourceLocator,
        secondary: SourceLocator,
    },
    Resolved(ResolvedSources),
    Failed(BootstrapError),
}

/// Resolves the published source locators into the data and config sheet locators.
///
/// The primary locator publishes the data sheet's locator as text. A declared,
/// non-blank secondary locator publishes a distinct config sheet locator;
/// otherwise the config sheet is the data sheet.
pub struct SourceResolver {
    transport: Arc<dyn SheetTransport>,
}

impl SourceResolver {
    pub fn new(transport: Arc<dyn SheetTransport>) -> Self {
        Self { transport }
    }

    #[instrument(skip_all, fields(primary = %sources.data_source_url))]
    pub async fn resolve(&self, sources: &SourcesConfig) -> Result<ResolvedSources> {
        let mut state = ResolutionState::ResolvingPrimary;

        loop {
            state = match state {
                ResolutionState::ResolvingPrimary => {
                    match self.fetch_locator(&sources.data_source()).await {
                        Ok(data_locator) => match sources.config_source() {
                            Some(secondary) => ResolutionState::ResolvingSecondary {
                                data_locator,
                                secondary,
                            },
                            None => {
                                debug!("No config source declared, using the data sheet");
                                ResolutionState::Resolved(ResolvedSources {
                                    config_locator: data_locator.clone(),
                                    data_locator,
                                })
                            }
                        },
                        Err(e) => ResolutionState::Failed(e),
                    }
                }
                ResolutionState::ResolvingSecondary {
                    data_locator,
                    secondary,
                } => match self.fetch_locator(&secondary).await {
                    Ok(config_locator) => ResolutionState::Resolved(ResolvedSources {
                        data_locator,
                        config_locator,
                    }),
                    Err(e) => ResolutionState::Failed(e),
                },
                ResolutionState::Resolved(resolved) => {
                    info!(
                        data = %resolved.data_locator,
                        config = %resolved.config_locator,
                        "Resolved source locators"
                    );
                    return Ok(resolved);
                }
                ResolutionState::Failed(e) => return Err(e),
            };
        }
    }

    /// Read the locator published at `source`
    async fn fetch_locator(&self, source: &SourceLocator) -> Result<SourceLocator> {
        let text = self
            .transport
            .fetch_text(source)
            .await
            .map_err(|e| BootstrapError::SourceResolution {
                locator: source.to_string(),
                source: e,
            })?;

        let locator = SourceLocator::new(text.trim());
        if locator.is_blank() {
            return Err(BootstrapError::EmptyLocator {
                locator: source.to_string(),
            });
        }
        Ok(locator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::InMemoryTransport;

    fn resolver(transport: InMemoryTransport) -> (SourceResolver, Arc<InMemoryTransport>) {
        let transport = Arc::new(transport);
        (SourceResolver::new(transport.clone()), transport)
    }

    #[tokio::test]
    async fn test_config_locator_defaults_to_data_locator() {
        let (resolver, _) = resolver(InMemoryTransport::new().with_text("primary", "urlA\n"));

        let resolved = resolver
            .resolve(&SourcesConfig::new("primary", None))
            .await
            .unwrap();

        assert_eq!(resolved.data_locator.as_str(), "urlA");
        assert_eq!(resolved.config_locator, resolved.data_locator);
    }

    #[tokio::test]
    async fn test_blank_secondary_is_ignored() {
        let (resolver, transport) =
            resolver(InMemoryTransport::new().with_text("primary", "urlA"));

        let resolved = resolver
            .resolve(&SourcesConfig::new("primary", Some("  ".into())))
            .await
            .unwrap();

        assert_eq!(resolved.config_locator.as_str(), "urlA");
        assert_eq!(transport.calls(), vec!["text:primary"]);
    }

    #[tokio::test]
    async fn test_secondary_overrides_config_locator() {
        let (resolver, transport) = resolver(
            InMemoryTransport::new()
                .with_text("primary", "urlA")
                .with_text("secondary", "urlB"),
        );

        let resolved = resolver
            .resolve(&SourcesConfig::new("primary", Some("secondary".into())))
            .await
            .unwrap();

        assert_eq!(resolved.data_locator.as_str(), "urlA");
        assert_eq!(resolved.config_locator.as_str(), "urlB");
        assert_eq!(transport.calls(), vec!["text:primary", "text:secondary"]);
    }

    #[tokio::test]
    async fn test_primary_failure_skips_secondary() {
        let (resolver, transport) =
            resolver(InMemoryTransport::new().with_text("secondary", "urlB"));

        let err = resolver
            .resolve(&SourcesConfig::new("primary", Some("secondary".into())))
            .await
            .unwrap_err();

        assert!(matches!(err, BootstrapError::SourceResolution { ref locator, .. } if locator == "primary"));
        assert_eq!(transport.calls(), vec!["text:primary"]);
    }

    #[tokio::test]
    async fn test_secondary_failure_is_fatal() {
        let (resolver, _) = resolver(InMemoryTransport::new().with_text("primary", "urlA"));

        let err = resolver
            .resolve(&SourcesConfig::new("primary", Some("secondary".into())))
            .await
            .unwrap_err();

        assert!(matches!(err, BootstrapError::SourceResolution { ref locator, .. } if locator == "secondary"));
    }

    #[tokio::test]
    async fn test_empty_published_locator_fails() {
        let (resolver, _) = resolver(InMemoryTransport::new().with_text("primary", " \n"));

        let err = resolver
            .resolve(&SourcesConfig::new("primary", None))
            .await
            .unwrap_err();

        assert!(matches!(err, BootstrapError::EmptyLocator { .. }));
    }
}
