use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument};

use crate::app::ports::{RouteOracle, SheetTransport};
use crate::config::SourcesConfig;
use crate::error::{BootstrapError, Result};
use crate::metrics;
use crate::pipeline::config_fan_out::ConfigFanOutAssembler;
use crate::pipeline::model::ModelAssembler;
use crate::pipeline::resolver::SourceResolver;
use crate::pipeline::serializer::{DeputySerializer, ProfileSerializer, SerializerMappings};
use crate::types::{CompositeModel, ResolvedSources};

/// Result of a complete bootstrap run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootstrap {
    pub sources: ResolvedSources,
    pub mappings: SerializerMappings,
    pub model: CompositeModel,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl Bootstrap {
    /// Profile serializer carrying this run's mappings, for records loaded later
    pub fn profile_serializer(&self) -> ProfileSerializer {
        ProfileSerializer::new(self.mappings.profile.clone())
    }

    pub fn deputy_serializer(&self) -> DeputySerializer {
        DeputySerializer::new(self.mappings.deputy.clone())
    }

    pub fn duration(&self) -> chrono::Duration {
        self.completed_at - self.started_at
    }
}

/// Runs the bootstrap stages in order: resolve sources, load the field
/// mappings, then assemble the model.
///
/// Each stage starts only after the previous one finished; the model stage
/// receives the mappings by value, so records are never serialized without
/// them. Any failure aborts the run and nothing is kept.
pub struct Bootstrapper {
    resolver: SourceResolver,
    config_fan_out: ConfigFanOutAssembler,
    model_assembler: ModelAssembler,
}

impl Bootstrapper {
    pub fn new(transport: Arc<dyn SheetTransport>) -> Self {
        Self {
            resolver: SourceResolver::new(transport.clone()),
            config_fan_out: ConfigFanOutAssembler::new(transport.clone()),
            model_assembler: ModelAssembler::new(transport),
        }
    }

    /// Stage 1 only
    pub async fn resolve_sources(&self, sources: &SourcesConfig) -> Result<ResolvedSources> {
        self.resolver.resolve(sources).await
    }

    /// Stages 1 and 2
    pub async fn load_mappings(
        &self,
        sources: &SourcesConfig,
    ) -> Result<(ResolvedSources, SerializerMappings)> {
        let resolved = self.resolver.resolve(sources).await?;
        let mappings = self
            .config_fan_out
            .run_bootstrap(&resolved.config_locator)
            .await?;
        Ok((resolved, mappings))
    }

    #[instrument(skip_all)]
    pub async fn bootstrap_and_assemble(
        &self,
        sources: &SourcesConfig,
        routes: &dyn RouteOracle,
    ) -> Result<Bootstrap> {
        let started_at = Utc::now();
        let timer = Instant::now();
        info!("🚀 Starting bootstrap");

        let result = async {
            let (resolved, mappings) = self.load_mappings(sources).await?;
            let model = self
                .model_assembler
                .assemble_model(&resolved, &mappings, routes)
                .await?;
            Ok::<_, BootstrapError>((resolved, mappings, model))
        }
        .await;

        match result {
            Ok((sources, mappings, model)) => {
                let elapsed = timer.elapsed();
                metrics::bootstrap::success(elapsed);
                info!("✅ Bootstrap completed in {}s", metrics::seconds(elapsed));
                Ok(Bootstrap {
                    sources,
                    mappings,
                    model,
                    started_at,
                    completed_at: Utc::now(),
                })
            }
            Err(e) => {
                metrics::bootstrap::error(e.stage());
                error!("❌ Bootstrap failed at {} stage: {}", e.stage(), e);
                Err(e)
            }
        }
    }
}
