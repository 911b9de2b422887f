use serde::Serialize;
use std::collections::BTreeMap;

use crate::constants::{FRENTE_A_FRENTE_GROUP, INFORMACION_GENERAL_GROUP, RECUADROS_GROUP};
use crate::types::{ConfigRow, FieldMappingRule, LabeledField, Record, RecordType};

/// Field mappings of the profile ("magistrate") serializer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFieldMappings {
    pub informacion_general_fields: FieldMappingRule,
    pub recuadros_fields: FieldMappingRule,
    pub frente_a_frente_fields: FieldMappingRule,
}

/// Field mappings of the commission deputy serializer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeputyFieldMappings {
    pub informacion_general_fields: FieldMappingRule,
}

/// Every rule set produced by one bootstrap
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SerializerMappings {
    pub profile: ProfileFieldMappings,
    pub deputy: DeputyFieldMappings,
}

/// Serializer field that a mapping sheet feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingTarget {
    ProfileInformacionGeneral,
    ProfileRecuadros,
    ProfileFrenteAFrente,
    DeputyInformacionGeneral,
}

impl SerializerMappings {
    /// Replace the rule of one target wholesale
    pub fn install(&mut self, target: MappingTarget, rule: FieldMappingRule) {
        match target {
            MappingTarget::ProfileInformacionGeneral => {
                self.profile.informacion_general_fields = rule
            }
            MappingTarget::ProfileRecuadros => self.profile.recuadros_fields = rule,
            MappingTarget::ProfileFrenteAFrente => self.profile.frente_a_frente_fields = rule,
            MappingTarget::DeputyInformacionGeneral => {
                self.deputy.informacion_general_fields = rule
            }
        }
    }
}

/// Turns raw sheet rows into domain records
pub trait RecordSerializer: Send + Sync {
    fn record_type(&self) -> RecordType;

    fn serialize(&self, row: ConfigRow) -> Record;

    fn serialize_all(&self, rows: Vec<ConfigRow>) -> Vec<Record> {
        rows.into_iter().map(|row| self.serialize(row)).collect()
    }
}

/// Project the cells named by `rule` out of `row`, in rule order
fn project(rule: &FieldMappingRule, row: &ConfigRow) -> Vec<LabeledField> {
    rule.iter()
        .map(|mapping| LabeledField {
            field: mapping.field.clone(),
            label: mapping.label.clone(),
            section: mapping.section.clone(),
            value: mapping.field.as_deref().and_then(|field| row.cell(field)),
        })
        .collect()
}

/// Records that need no field mapping (parties)
pub struct PassThroughSerializer {
    record_type: RecordType,
}

impl PassThroughSerializer {
    pub fn new(record_type: RecordType) -> Self {
        Self { record_type }
    }
}

impl RecordSerializer for PassThroughSerializer {
    fn record_type(&self) -> RecordType {
        self.record_type
    }

    fn serialize(&self, row: ConfigRow) -> Record {
        Record::from_row(self.record_type, row)
    }
}

pub struct ProfileSerializer {
    mappings: ProfileFieldMappings,
}

impl ProfileSerializer {
    pub fn new(mappings: ProfileFieldMappings) -> Self {
        Self { mappings }
    }

    /// Replace the installed mappings; a new bootstrap never merges into old ones
    pub fn install(&mut self, mappings: ProfileFieldMappings) {
        self.mappings = mappings;
    }

    pub fn mappings(&self) -> &ProfileFieldMappings {
        &self.mappings
    }
}

impl RecordSerializer for ProfileSerializer {
    fn record_type(&self) -> RecordType {
        RecordType::Profile
    }

    fn serialize(&self, row: ConfigRow) -> Record {
        let mut groups = BTreeMap::new();
        groups.insert(
            INFORMACION_GENERAL_GROUP,
            project(&self.mappings.informacion_general_fields, &row),
        );
        groups.insert(RECUADROS_GROUP, project(&self.mappings.recuadros_fields, &row));
        groups.insert(
            FRENTE_A_FRENTE_GROUP,
            project(&self.mappings.frente_a_frente_fields, &row),
        );

        Record {
            groups,
            ..Record::from_row(RecordType::Profile, row)
        }
    }
}

pub struct DeputySerializer {
    mappings: DeputyFieldMappings,
}

impl DeputySerializer {
    pub fn new(mappings: DeputyFieldMappings) -> Self {
        Self { mappings }
    }

    pub fn install(&mut self, mappings: DeputyFieldMappings) {
        self.mappings = mappings;
    }

    pub fn mappings(&self) -> &DeputyFieldMappings {
        &self.mappings
    }
}

impl RecordSerializer for DeputySerializer {
    fn record_type(&self) -> RecordType {
        RecordType::Deputy
    }

    fn serialize(&self, row: ConfigRow) -> Record {
        let mut groups = BTreeMap::new();
        groups.insert(
            INFORMACION_GENERAL_GROUP,
            project(&self.mappings.informacion_general_fields, &row),
        );

        Record {
            groups,
            ..Record::from_row(RecordType::Deputy, row)
        }
    }
}
