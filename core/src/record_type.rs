//! Record type descriptors: the declarative shape of one report row.
//!
//! A `RecordType` is built once at startup and validated then. After
//! `build()` it is immutable and shared by reference across workers.

use crate::{
    error::{ReportError, ReportResult},
    field::FieldMapping,
    types::ReportType,
};
use std::collections::{HashMap, HashSet};

/// Storage column holding the derived record id (primary key).
pub const ID_COLUMN: &str = "ID";
pub const TOP_ACCOUNT_COLUMN: &str = "TOP_ACCOUNT_ID";
pub const ACCOUNT_COLUMN: &str = "ACCOUNT_ID";

const RESERVED_COLUMNS: [&str; 3] = [ID_COLUMN, TOP_ACCOUNT_COLUMN, ACCOUNT_COLUMN];

#[derive(Debug, Clone)]
pub struct RecordType {
    name: &'static str,
    report_type: ReportType,
    table: &'static str,
    fields: Vec<FieldMapping>,
    identity_components: Vec<&'static str>,
    optional_dimensions: Vec<&'static str>,
    by_semantic: HashMap<&'static str, usize>,
    by_external_key: HashMap<&'static str, usize>,
    by_csv_header: HashMap<&'static str, usize>,
}

impl RecordType {
    pub fn builder(
        name: &'static str,
        report_type: ReportType,
        table: &'static str,
    ) -> RecordTypeBuilder {
        RecordTypeBuilder {
            name,
            report_type,
            table,
            fields: Vec::new(),
            identity_components: Vec::new(),
            optional_dimensions: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn report_type(&self) -> ReportType {
        self.report_type
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    /// All fields, in declaration order.
    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    /// Required id components, in key order.
    pub fn identity_components(&self) -> &[&'static str] {
        &self.identity_components
    }

    /// Optional id dimensions, in key order. Part of the versioned key
    /// contract: reordering changes every historical id.
    pub fn optional_dimensions(&self) -> &[&'static str] {
        &self.optional_dimensions
    }

    pub fn field(&self, semantic_name: &str) -> Option<&FieldMapping> {
        self.by_semantic.get(semantic_name).map(|&i| &self.fields[i])
    }

    pub fn csv_header_for(&self, semantic_name: &str) -> Option<&'static str> {
        self.field(semantic_name).map(|f| f.csv_header)
    }

    pub fn storage_column_for(&self, semantic_name: &str) -> Option<&'static str> {
        self.field(semantic_name).map(|f| f.storage_column)
    }

    pub fn field_by_external_key(&self, key: &str) -> Option<&FieldMapping> {
        self.by_external_key.get(key).map(|&i| &self.fields[i])
    }

    pub fn field_by_csv_header(&self, header: &str) -> Option<&FieldMapping> {
        self.by_csv_header.get(header).map(|&i| &self.fields[i])
    }

    /// Resolve a CSV column title that may be either the display header or
    /// the upstream field key, returning the upstream key.
    pub fn resolve_column(&self, title: &str) -> Option<&'static str> {
        self.field_by_csv_header(title)
            .or_else(|| self.field_by_external_key(title))
            .map(|f| f.external_field_key)
    }
}

pub struct RecordTypeBuilder {
    name: &'static str,
    report_type: ReportType,
    table: &'static str,
    fields: Vec<FieldMapping>,
    identity_components: Vec<&'static str>,
    optional_dimensions: Vec<&'static str>,
}

impl RecordTypeBuilder {
    pub fn field(mut self, mapping: FieldMapping) -> Self {
        self.fields.push(mapping);
        self
    }

    pub fn fields(mut self, mappings: impl IntoIterator<Item = FieldMapping>) -> Self {
        self.fields.extend(mappings);
        self
    }

    pub fn identity(mut self, components: &[&'static str]) -> Self {
        self.identity_components.extend_from_slice(components);
        self
    }

    pub fn optional_dimensions(mut self, dimensions: &[&'static str]) -> Self {
        self.optional_dimensions.extend_from_slice(dimensions);
        self
    }

    /// Validate the declaration. Any violation is a `ConfigurationError`.
    pub fn build(self) -> ReportResult<RecordType> {
        let name = self.name;
        let err = |reason: String| ReportError::configuration(name, reason);

        if self.table.is_empty() {
            return Err(err("table name is empty".into()));
        }

        let mut by_semantic = HashMap::with_capacity(self.fields.len());
        let mut by_external_key = HashMap::with_capacity(self.fields.len());
        let mut by_csv_header = HashMap::with_capacity(self.fields.len());
        let mut storage_columns = HashSet::with_capacity(self.fields.len());

        for (i, f) in self.fields.iter().enumerate() {
            if f.semantic_name.is_empty() || f.storage_column.is_empty() {
                return Err(err(format!("field #{i} has an empty name or storage column")));
            }
            if by_semantic.insert(f.semantic_name, i).is_some() {
                return Err(err(format!("duplicate semantic name '{}'", f.semantic_name)));
            }
            // SQLite column names are case-insensitive.
            let column = f.storage_column.to_ascii_uppercase();
            if RESERVED_COLUMNS.contains(&column.as_str()) {
                return Err(err(format!(
                    "field '{}' uses reserved storage column '{}'",
                    f.semantic_name, f.storage_column
                )));
            }
            if !storage_columns.insert(column) {
                return Err(err(format!("duplicate storage column '{}'", f.storage_column)));
            }
            if by_external_key.insert(f.external_field_key, i).is_some() {
                return Err(err(format!("duplicate external field key '{}'", f.external_field_key)));
            }
            if by_csv_header.insert(f.csv_header, i).is_some() {
                return Err(err(format!("duplicate CSV header '{}'", f.csv_header)));
            }
        }

        let mut seen = HashSet::new();
        for component in self.identity_components.iter().chain(&self.optional_dimensions) {
            if !by_semantic.contains_key(component) {
                return Err(err(format!("identity references undeclared field '{component}'")));
            }
            if !seen.insert(*component) {
                return Err(err(format!("field '{component}' appears twice in the identity")));
            }
        }

        Ok(RecordType {
            name,
            report_type: self.report_type,
            table: self.table,
            fields: self.fields,
            identity_components: self.identity_components,
            optional_dimensions: self.optional_dimensions,
            by_semantic,
            by_external_key,
            by_csv_header,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::field::ValueKind;

    fn builder() -> RecordTypeBuilder {
        RecordType::builder("Probe", ReportType::CampaignPerformanceReport, "AW_Probe")
            .field(FieldMapping::new("campaign_id", "Campaign ID", "CampaignId", "CAMPAIGN_ID", ValueKind::Integer))
            .field(FieldMapping::new("device", "Device", "Device", "DEVICE", ValueKind::Text))
    }

    #[test]
    fn lookups_share_one_entry() {
        let rt = builder().identity(&["campaign_id"]).build().unwrap();
        assert_eq!(rt.csv_header_for("campaign_id"), Some("Campaign ID"));
        assert_eq!(rt.storage_column_for("campaign_id"), Some("CAMPAIGN_ID"));
        assert_eq!(rt.field_by_external_key("Device").map(|f| f.semantic_name), Some("device"));
        assert_eq!(rt.resolve_column("Campaign ID"), Some("CampaignId"));
        assert_eq!(rt.resolve_column("CampaignId"), Some("CampaignId"));
        assert_eq!(rt.resolve_column("Nope"), None);
        let order: Vec<_> = rt.fields().iter().map(|f| f.semantic_name).collect();
        assert_eq!(order, ["campaign_id", "device"]);
    }

    #[test]
    fn duplicate_semantic_name_is_rejected() {
        let err = builder()
            .field(FieldMapping::new("device", "Device 2", "Device2", "DEVICE_2", ValueKind::Text))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn duplicate_storage_column_is_rejected_case_insensitively() {
        let err = builder()
            .field(FieldMapping::new("device_type", "Device type", "DeviceType", "device", ValueKind::Text))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("duplicate storage column"), "{err}");
    }

    #[test]
    fn reserved_columns_are_rejected() {
        let err = builder()
            .field(FieldMapping::new("acct", "Account", "ExternalCustomerId", "ACCOUNT_ID", ValueKind::Integer))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn identity_must_reference_declared_fields() {
        let err = builder().identity(&["ad_group_id"]).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = builder()
            .identity(&["campaign_id"])
            .optional_dimensions(&["campaign_id"])
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
