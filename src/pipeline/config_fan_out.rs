use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::app::ports::SheetTransport;
use crate::constants::{
    DIPUTADO_INFORMACION_GENERAL_CONFIG, PERFIL_FRENTE_A_FRENTE_CONFIG,
    PERFIL_INFORMACION_GENERAL_CONFIG, PERFIL_RECUADROS_CONFIG,
};
use crate::error::{BootstrapError, Result};
use crate::metrics;
use crate::pipeline::mapper::{build_field_mapping, MappingShape};
use crate::pipeline::serializer::{MappingTarget, SerializerMappings};
use crate::types::{FieldMappingRule, SourceLocator};

/// A field-mapping sheet and the serializer field it feeds
#[derive(Debug, Clone, Copy)]
pub struct MappingSheet {
    pub sheet: &'static str,
    pub shape: MappingShape,
    pub target: MappingTarget,
}

pub const MAPPING_SHEETS: [MappingSheet; 4] = [
    MappingSheet {
        sheet: PERFIL_INFORMACION_GENERAL_CONFIG,
        shape: MappingShape::Basic,
        target: MappingTarget::ProfileInformacionGeneral,
    },
    MappingSheet {
        sheet: PERFIL_RECUADROS_CONFIG,
        shape: MappingShape::Basic,
        target: MappingTarget::ProfileRecuadros,
    },
    MappingSheet {
        sheet: PERFIL_FRENTE_A_FRENTE_CONFIG,
        shape: MappingShape::Sectioned,
        target: MappingTarget::ProfileFrenteAFrente,
    },
    MappingSheet {
        sheet: DIPUTADO_INFORMACION_GENERAL_CONFIG,
        shape: MappingShape::Basic,
        target: MappingTarget::DeputyInformacionGeneral,
    },
];

/// Loads every field-mapping sheet concurrently and builds the serializer mappings.
///
/// All-or-nothing: the first failing sheet fails the whole call and the
/// remaining fetches are dropped, so a partial mapping set never escapes.
pub struct ConfigFanOutAssembler {
    transport: Arc<dyn SheetTransport>,
}

impl ConfigFanOutAssembler {
    pub fn new(transport: Arc<dyn SheetTransport>) -> Self {
        Self { transport }
    }

    #[instrument(skip_all, fields(config = %config_locator))]
    pub async fn run_bootstrap(&self, config_locator: &SourceLocator) -> Result<SerializerMappings> {
        let [general, recuadros, frente, diputado] = &MAPPING_SHEETS;

        let rules = tokio::try_join!(
            self.fetch_mapping(config_locator, general),
            self.fetch_mapping(config_locator, recuadros),
            self.fetch_mapping(config_locator, frente),
            self.fetch_mapping(config_locator, diputado),
        )?;

        let mut mappings = SerializerMappings::default();
        for (sheet, rule) in [
            (general, rules.0),
            (recuadros, rules.1),
            (frente, rules.2),
            (diputado, rules.3),
        ] {
            metrics::mappings::installed(sheet.sheet, rule.len());
            mappings.install(sheet.target, rule);
        }

        info!("Loaded {} field-mapping sheets", MAPPING_SHEETS.len());
        Ok(mappings)
    }

    async fn fetch_mapping(
        &self,
        config_locator: &SourceLocator,
        sheet: &MappingSheet,
    ) -> Result<FieldMappingRule> {
        let rows = self
            .transport
            .fetch_rows(config_locator, sheet.sheet)
            .await
            .map_err(|source| BootstrapError::ConfigFetch {
                table: sheet.sheet,
                source,
            })?;

        let rule = build_field_mapping(&rows, sheet.shape);
        debug!(sheet = sheet.sheet, fields = rule.len(), "Built field mapping");
        Ok(rule)
    }
}
