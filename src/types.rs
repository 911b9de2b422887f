use crate::constants::{
    DEPUTIES_SHEET, ID_CELL, LABEL_CELL, PARTIES_SHEET, PROFILES_SHEET, ROUTE_CELL,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque address of a published sheet source (URL or, for static files, a path)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceLocator(String);

impl SourceLocator {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceLocator {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SourceLocator {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Data and config locators produced by source resolution.
/// When no distinct config source is declared both point at the same sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSources {
    pub data_locator: SourceLocator,
    pub config_locator: SourceLocator,
}

/// One row of a published sheet, keyed by header cell.
///
/// Cells are loosely typed: the publishing endpoint may emit numbers or
/// booleans, which are read back as their textual form. `null` is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigRow(Map<String, Value>);

impl ConfigRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by adapters and tests to populate a row cell by cell
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn cell(&self, name: &str) -> Option<String> {
        match self.0.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn cells(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Copy of the row without the named cells
    pub fn without(&self, names: &[&str]) -> ConfigRow {
        let cells = self
            .0
            .iter()
            .filter(|(name, _)| !names.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        ConfigRow(cells)
    }
}

impl From<Map<String, Value>> for ConfigRow {
    fn from(cells: Map<String, Value>) -> Self {
        Self(cells)
    }
}

/// Projection of one source column into a labeled display field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub field: Option<String>,
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

/// Ordered field mappings; the order is the display order of the fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMappingRule(Vec<FieldMapping>);

impl FieldMappingRule {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldMapping> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[FieldMapping] {
        &self.0
    }
}

impl From<Vec<FieldMapping>> for FieldMappingRule {
    fn from(mappings: Vec<FieldMapping>) -> Self {
        Self(mappings)
    }
}

impl FromIterator<FieldMapping> for FieldMappingRule {
    fn from_iter<I: IntoIterator<Item = FieldMapping>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Flat application settings folded from the `key`/`value` settings sheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SettingsMap(BTreeMap<String, String>);

impl SettingsMap {
    /// Later inserts for the same key overwrite earlier ones
    pub fn insert(&mut self, key: String, value: String) {
        self.0.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Navigation bar entry declared in the `navbar-links` sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavLink {
    pub label: Option<String>,
    pub route: Option<String>,
    #[serde(flatten)]
    pub extra: ConfigRow,
}

impl NavLink {
    pub fn from_row(row: &ConfigRow) -> Self {
        Self {
            label: row.cell(LABEL_CELL),
            route: row.cell(ROUTE_CELL),
            extra: row.without(&[LABEL_CELL, ROUTE_CELL]),
        }
    }
}

/// Kinds of domain records held in the data sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Party,
    Profile,
    Deputy,
}

impl RecordType {
    /// Tab of the data spreadsheet holding records of this type
    pub fn sheet_name(&self) -> &'static str {
        match self {
            RecordType::Party => PARTIES_SHEET,
            RecordType::Profile => PROFILES_SHEET,
            RecordType::Deputy => DEPUTIES_SHEET,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordType::Party => "party",
            RecordType::Profile => "profile",
            RecordType::Deputy => "deputy",
        };
        f.write_str(name)
    }
}

/// A record cell projected through a field mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledField {
    pub field: Option<String>,
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub value: Option<String>,
}

/// A domain record as handed to the view layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub record_type: RecordType,
    pub id: Option<String>,
    pub attributes: ConfigRow,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub groups: BTreeMap<&'static str, Vec<LabeledField>>,
}

impl Record {
    pub fn from_row(record_type: RecordType, row: ConfigRow) -> Self {
        Self {
            record_type,
            id: row.cell(ID_CELL),
            attributes: row,
            groups: BTreeMap::new(),
        }
    }

    pub fn group(&self, name: &str) -> Option<&[LabeledField]> {
        self.groups.get(name).map(Vec::as_slice)
    }
}

/// The application model assembled at the end of a bootstrap
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeModel {
    pub parties: Vec<Record>,
    pub profiles: Vec<Record>,
    pub deputies: Vec<Record>,
    pub settings: SettingsMap,
    pub nav_links: Vec<NavLink>,
}
