use anyhow::Result;
use std::sync::Arc;

use sheet_bootstrap::app::ports::KnownRoutes;
use sheet_bootstrap::constants::*;
use sheet_bootstrap::infra::InMemoryTransport;
use sheet_bootstrap::pipeline::config_fan_out::MAPPING_SHEETS;
use sheet_bootstrap::types::{CompositeModel, ConfigRow};
use sheet_bootstrap::{BootstrapError, Bootstrapper, SourcesConfig};

fn mapping_row(field: &str, label: &str) -> ConfigRow {
    ConfigRow::new()
        .with("field", field)
        .with("label", label)
        .with("section", "General")
}

/// Transport where every sheet the bootstrap touches exists under `locator`
fn transport_for(locator: &str) -> InMemoryTransport {
    let mut transport = InMemoryTransport::new().with_text("primary", locator);
    for sheet in MAPPING_SHEETS.iter().map(|s| s.sheet) {
        transport = transport.with_sheet(locator, sheet, vec![mapping_row("nombre", "Nombre")]);
    }
    for sheet in [
        PARTIES_SHEET,
        PROFILES_SHEET,
        DEPUTIES_SHEET,
        SETTINGS_SHEET,
        NAV_LINKS_SHEET,
    ] {
        transport = transport.with_sheet(locator, sheet, vec![]);
    }
    transport
}

#[tokio::test]
async fn test_end_to_end_with_empty_tables() -> Result<()> {
    let transport = Arc::new(transport_for("urlA"));
    let bootstrapper = Bootstrapper::new(transport.clone());

    let bootstrap = bootstrapper
        .bootstrap_and_assemble(&SourcesConfig::new("primary", None), &KnownRoutes::default())
        .await?;

    assert_eq!(bootstrap.sources.data_locator.as_str(), "urlA");
    assert_eq!(bootstrap.sources.config_locator.as_str(), "urlA");

    let profile = &bootstrap.mappings.profile;
    assert_eq!(profile.informacion_general_fields.len(), 1);
    assert_eq!(profile.recuadros_fields.len(), 1);
    assert_eq!(profile.frente_a_frente_fields.len(), 1);
    assert_eq!(bootstrap.mappings.deputy.informacion_general_fields.len(), 1);

    assert_eq!(bootstrap.model, CompositeModel::default());
    assert_eq!(
        serde_json::to_value(&bootstrap.model)?,
        serde_json::json!({"parties": [], "profiles": [], "deputies": [], "settings": {}, "navLinks": []})
    );

    // Every fetch after resolution went to the resolved locator
    let calls = transport.calls();
    assert_eq!(calls[0], "text:primary");
    assert!(calls[1..].iter().all(|call| call.starts_with("rows:urlA/")));
    assert_eq!(calls.len(), 1 + MAPPING_SHEETS.len() + 5);
    Ok(())
}

#[tokio::test]
async fn test_bootstrap_is_idempotent() -> Result<()> {
    let transport = transport_for("urlA")
        .with_sheet(
            "urlA",
            SETTINGS_SHEET,
            vec![
                ConfigRow::new().with("key", "titulo").with("value", "Uno"),
                ConfigRow::new().with("key", "titulo").with("value", "Dos"),
            ],
        )
        .with_sheet(
            "urlA",
            PROFILES_SHEET,
            vec![ConfigRow::new().with("id", "m1").with("nombre", "Ana")],
        );
    let bootstrapper = Bootstrapper::new(Arc::new(transport));
    let sources = SourcesConfig::new("primary", None);
    let routes = KnownRoutes::new(["perfil"]);

    let first = bootstrapper.bootstrap_and_assemble(&sources, &routes).await?;
    let second = bootstrapper.bootstrap_and_assemble(&sources, &routes).await?;

    assert_eq!(first.mappings, second.mappings);
    assert_eq!(first.model, second.model);
    assert_eq!(first.model.settings.get("titulo"), Some("Dos"));
    Ok(())
}

#[tokio::test]
async fn test_config_failure_never_reaches_model_stage() {
    let transport = Arc::new(transport_for("urlA").failing_sheet(DIPUTADO_INFORMACION_GENERAL_CONFIG));
    let bootstrapper = Bootstrapper::new(transport.clone());

    let err = bootstrapper
        .bootstrap_and_assemble(&SourcesConfig::new("primary", None), &KnownRoutes::default())
        .await
        .unwrap_err();

    assert!(matches!(err, BootstrapError::ConfigFetch { table, .. } if table == DIPUTADO_INFORMACION_GENERAL_CONFIG));

    let model_sheets = [
        PARTIES_SHEET,
        PROFILES_SHEET,
        DEPUTIES_SHEET,
        SETTINGS_SHEET,
        NAV_LINKS_SHEET,
    ];
    for call in transport.calls() {
        assert!(
            !model_sheets.iter().any(|sheet| call.ends_with(&format!("/{}", sheet))),
            "model fetch issued after config failure: {}",
            call
        );
    }
}

#[tokio::test]
async fn test_secondary_config_locator_drives_config_sheets() -> Result<()> {
    // Config sheets only exist under urlB, records only under urlA
    let mut transport = InMemoryTransport::new()
        .with_text("primary", "urlA")
        .with_text("secondary", "urlB");
    for sheet in MAPPING_SHEETS.iter().map(|s| s.sheet) {
        transport = transport.with_sheet("urlB", sheet, vec![]);
    }
    transport = transport
        .with_sheet("urlB", SETTINGS_SHEET, vec![ConfigRow::new().with("key", "k").with("value", "v")])
        .with_sheet(
            "urlB",
            NAV_LINKS_SHEET,
            vec![
                ConfigRow::new().with("route", "perfil"),
                ConfigRow::new().with("route", "ghost"),
                ConfigRow::new().with("route", "home"),
            ],
        )
        .with_sheet("urlA", PARTIES_SHEET, vec![ConfigRow::new().with("id", "p1")])
        .with_sheet("urlA", PROFILES_SHEET, vec![])
        .with_sheet("urlA", DEPUTIES_SHEET, vec![]);

    let bootstrapper = Bootstrapper::new(Arc::new(transport));
    let routes = |route: &str| route == "perfil" || route == "home";

    let bootstrap = bootstrapper
        .bootstrap_and_assemble(
            &SourcesConfig::new("primary", Some("secondary".to_string())),
            &routes,
        )
        .await?;

    assert_eq!(bootstrap.sources.data_locator.as_str(), "urlA");
    assert_eq!(bootstrap.sources.config_locator.as_str(), "urlB");
    assert_eq!(bootstrap.model.parties.len(), 1);
    assert_eq!(bootstrap.model.settings.get("k"), Some("v"));

    let kept: Vec<&str> = bootstrap
        .model
        .nav_links
        .iter()
        .filter_map(|link| link.route.as_deref())
        .collect();
    assert_eq!(kept, vec!["perfil", "home"]);
    Ok(())
}

#[tokio::test]
async fn test_model_branch_failure_fails_bootstrap() {
    let transport = transport_for("urlA").failing_sheet(PARTIES_SHEET);
    let bootstrapper = Bootstrapper::new(Arc::new(transport));

    let err = bootstrapper
        .bootstrap_and_assemble(&SourcesConfig::new("primary", None), &KnownRoutes::default())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), "model");
    assert!(matches!(err, BootstrapError::ModelAssembly { branch, .. } if branch == PARTIES_BRANCH));
}
