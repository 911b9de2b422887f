use crate::constants::{FIELD_CELL, LABEL_CELL, SECTION_CELL};
use crate::types::{ConfigRow, FieldMapping, FieldMappingRule};

/// Which cells of a mapping sheet are projected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingShape {
    /// `field` and `label`
    Basic,
    /// `field`, `label` and `section`
    Sectioned,
}

/// Turn the rows of a field-mapping sheet into a mapping rule.
///
/// Row order is kept. Rows are not validated: a missing cell becomes `None`
/// in the mapping rather than an error.
pub fn build_field_mapping(rows: &[ConfigRow], shape: MappingShape) -> FieldMappingRule {
    rows.iter()
        .map(|row| FieldMapping {
            field: row.cell(FIELD_CELL),
            label: row.cell(LABEL_CELL),
            section: match shape {
                MappingShape::Basic => None,
                MappingShape::Sectioned => row.cell(SECTION_CELL),
            },
        })
        .collect()
}
