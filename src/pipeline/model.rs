use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::app::ports::{RouteOracle, SheetTransport};
use crate::constants::{
    DEPUTIES_BRANCH, KEY_CELL, NAV_LINKS_BRANCH, NAV_LINKS_SHEET, PARTIES_BRANCH,
    PROFILES_BRANCH, SETTINGS_BRANCH, SETTINGS_SHEET, VALUE_CELL,
};
use crate::error::{BootstrapError, Result};
use crate::metrics;
use crate::pipeline::serializer::{
    DeputySerializer, PassThroughSerializer, ProfileSerializer, RecordSerializer,
    SerializerMappings,
};
use crate::types::{
    CompositeModel, ConfigRow, NavLink, Record, RecordType, ResolvedSources, SettingsMap,
    SourceLocator,
};

/// Fold `key`/`value` rows into settings; a later duplicate key wins.
pub fn fold_settings(rows: &[ConfigRow]) -> SettingsMap {
    let mut settings = SettingsMap::default();
    for row in rows {
        match row.cell(KEY_CELL) {
            Some(key) => settings.insert(key, row.cell(VALUE_CELL).unwrap_or_default()),
            None => warn!("Skipping settings row without a key: {:?}", row),
        }
    }
    settings
}

/// Keep the links whose route the application can render, in sheet order.
pub fn filter_nav_links(rows: &[ConfigRow], routes: &dyn RouteOracle) -> Vec<NavLink> {
    let links: Vec<NavLink> = rows
        .iter()
        .map(NavLink::from_row)
        .filter(|link| {
            link.route
                .as_deref()
                .is_some_and(|route| routes.has_route(route))
        })
        .collect();

    let dropped = rows.len() - links.len();
    if dropped > 0 {
        debug!("Dropped {} nav links with unknown routes", dropped);
        metrics::bootstrap::nav_links_dropped(dropped);
    }
    links
}

/// Assembles the composite application model from five concurrent branches.
///
/// Record branches read the data sheet, settings and nav links read the
/// config sheet. The model is only produced when every branch succeeds.
pub struct ModelAssembler {
    transport: Arc<dyn SheetTransport>,
}

impl ModelAssembler {
    pub fn new(transport: Arc<dyn SheetTransport>) -> Self {
        Self { transport }
    }

    #[instrument(skip_all, fields(data = %sources.data_locator, config = %sources.config_locator))]
    pub async fn assemble_model(
        &self,
        sources: &ResolvedSources,
        mappings: &SerializerMappings,
        routes: &dyn RouteOracle,
    ) -> Result<CompositeModel> {
        let parties = PassThroughSerializer::new(RecordType::Party);
        let profiles = ProfileSerializer::new(mappings.profile.clone());
        let deputies = DeputySerializer::new(mappings.deputy.clone());

        let (parties, profiles, deputies, settings, nav_links) = tokio::try_join!(
            self.find_all(&sources.data_locator, &parties, PARTIES_BRANCH),
            self.find_all(&sources.data_locator, &profiles, PROFILES_BRANCH),
            self.find_all(&sources.data_locator, &deputies, DEPUTIES_BRANCH),
            self.fetch_settings(&sources.config_locator),
            self.fetch_nav_links(&sources.config_locator, routes),
        )?;

        info!(
            parties = parties.len(),
            profiles = profiles.len(),
            deputies = deputies.len(),
            settings = settings.len(),
            nav_links = nav_links.len(),
            "Assembled application model"
        );

        Ok(CompositeModel {
            parties,
            profiles,
            deputies,
            settings,
            nav_links,
        })
    }

    async fn find_all(
        &self,
        data_locator: &SourceLocator,
        serializer: &dyn RecordSerializer,
        branch: &'static str,
    ) -> Result<Vec<Record>> {
        let rows = self
            .transport
            .fetch_all(data_locator, serializer.record_type())
            .await
            .map_err(|source| BootstrapError::ModelAssembly { branch, source })?;
        Ok(serializer.serialize_all(rows))
    }

    async fn fetch_settings(&self, config_locator: &SourceLocator) -> Result<SettingsMap> {
        let rows = self.fetch_config(config_locator, SETTINGS_SHEET, SETTINGS_BRANCH).await?;
        Ok(fold_settings(&rows))
    }

    async fn fetch_nav_links(
        &self,
        config_locator: &SourceLocator,
        routes: &dyn RouteOracle,
    ) -> Result<Vec<NavLink>> {
        let rows = self
            .fetch_config(config_locator, NAV_LINKS_SHEET, NAV_LINKS_BRANCH)
            .await?;
        Ok(filter_nav_links(&rows, routes))
    }

    async fn fetch_config(
        &self,
        config_locator: &SourceLocator,
        sheet: &str,
        branch: &'static str,
    ) -> Result<Vec<ConfigRow>> {
        self.transport
            .fetch_rows(config_locator, sheet)
            .await
            .map_err(|source| BootstrapError::ModelAssembly { branch, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::KnownRoutes;
    use crate::constants::{DEPUTIES_SHEET, INFORMACION_GENERAL_GROUP, PARTIES_SHEET, PROFILES_SHEET};
    use crate::infra::InMemoryTransport;
    use crate::types::FieldMapping;
    use std::time::Duration;

    fn kv(key: &str, value: &str) -> ConfigRow {
        ConfigRow::new().with("key", key).with("value", value)
    }

    fn link(route: &str) -> ConfigRow {
        ConfigRow::new().with("label", route.to_uppercase()).with("route", route)
    }

    fn sources(data: &str, config: &str) -> ResolvedSources {
        ResolvedSources {
            data_locator: data.into(),
            config_locator: config.into(),
        }
    }

    fn fixture(data: &str, config: &str) -> InMemoryTransport {
        InMemoryTransport::new()
            .with_sheet(data, PARTIES_SHEET, vec![ConfigRow::new().with("id", "p1")])
            .with_sheet(
                data,
                PROFILES_SHEET,
                vec![ConfigRow::new().with("id", "m1").with("nombre", "Ana")],
            )
            .with_sheet(data, DEPUTIES_SHEET, vec![])
            .with_sheet(config, SETTINGS_SHEET, vec![kv("titulo", "Observatorio")])
            .with_sheet(config, NAV_LINKS_SHEET, vec![link("perfil"), link("ghost")])
    }

    #[test]
    fn test_settings_last_duplicate_wins() {
        let rows = vec![kv("a", "1"), kv("b", "2"), kv("a", "3")];
        let settings = fold_settings(&rows);

        assert_eq!(settings.len(), 2);
        assert_eq!(settings.get("a"), Some("3"));
        assert_eq!(settings.get("b"), Some("2"));
    }

    #[test]
    fn test_settings_row_without_value_is_empty_string() {
        let rows = vec![ConfigRow::new().with("key", "vacio"), ConfigRow::new().with("value", "x")];
        let settings = fold_settings(&rows);

        assert_eq!(settings.len(), 1);
        assert_eq!(settings.get("vacio"), Some(""));
    }

    #[test]
    fn test_nav_links_filtered_in_source_order() {
        let rows = vec![link("perfil"), link("ghost"), link("home")];
        let routes = |route: &str| route == "perfil" || route == "home";

        let links = filter_nav_links(&rows, &routes);
        let kept: Vec<&str> = links.iter().filter_map(|l| l.route.as_deref()).collect();
        assert_eq!(kept, vec!["perfil", "home"]);
    }

    #[test]
    fn test_nav_link_without_route_is_dropped() {
        let rows = vec![ConfigRow::new().with("label", "Sin ruta"), link("home")];
        let links = filter_nav_links(&rows, &KnownRoutes::new(["home"]));
        assert_eq!(links.len(), 1);
    }

    #[tokio::test]
    async fn test_branches_read_their_own_locator() {
        let assembler = ModelAssembler::new(Arc::new(fixture("urlA", "urlB")));
        let mut mappings = SerializerMappings::default();
        mappings.profile.informacion_general_fields = vec![FieldMapping {
            field: Some("nombre".into()),
            label: Some("Nombre".into()),
            section: None,
        }]
        .into();

        let model = assembler
            .assemble_model(&sources("urlA", "urlB"), &mappings, &KnownRoutes::new(["perfil"]))
            .await
            .unwrap();

        assert_eq!(model.parties.len(), 1);
        assert_eq!(model.parties[0].record_type, RecordType::Party);
        assert_eq!(model.deputies.len(), 0);
        assert_eq!(model.settings.get("titulo"), Some("Observatorio"));
        assert_eq!(model.nav_links.len(), 1);

        let general = model.profiles[0].group(INFORMACION_GENERAL_GROUP).unwrap();
        assert_eq!(general[0].value.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn test_branches_run_concurrently() {
        // parties, profiles, deputies, settings and nav links all wait at the gate
        let assembler = ModelAssembler::new(Arc::new(fixture("urlA", "urlB").gated(5)));

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            assembler.assemble_model(
                &sources("urlA", "urlB"),
                &SerializerMappings::default(),
                &KnownRoutes::default(),
            ),
        )
        .await;

        assert!(matches!(result, Ok(Ok(_))), "model branches were not fetched concurrently");
    }

    #[tokio::test]
    async fn test_branch_failure_fails_model() {
        let transport = fixture("urlA", "urlA").failing_sheet(NAV_LINKS_SHEET);
        let assembler = ModelAssembler::new(Arc::new(transport));

        let err = assembler
            .assemble_model(
                &sources("urlA", "urlA"),
                &SerializerMappings::default(),
                &KnownRoutes::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BootstrapError::ModelAssembly { branch, .. } if branch == NAV_LINKS_BRANCH
        ));
    }
}
