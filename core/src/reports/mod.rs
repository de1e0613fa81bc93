//! Concrete record types and the registry that serves them by report tag.
//!
//! RULE: a record type is declared once, here, and every path (CSV in,
//! storage out, CSV export) reads that one declaration.

pub mod ad_group;
pub mod campaign;

use crate::{error::ReportResult, record_type::RecordType, types::ReportType};

/// Every known record type, validated together at startup.
#[derive(Debug, Clone)]
pub struct RecordRegistry {
    types: Vec<RecordType>,
}

impl RecordRegistry {
    /// Build and validate all record types. A `ConfigurationError` here is
    /// fatal: the process must not start ingesting.
    pub fn build() -> ReportResult<Self> {
        let types = vec![ad_group::record_type()?, campaign::record_type()?];
        for rt in &types {
            log::debug!(
                "registered record type {} ({}, {} fields)",
                rt.name(),
                rt.report_type(),
                rt.fields().len()
            );
        }
        Ok(Self { types })
    }

    pub fn get(&self, report_type: ReportType) -> Option<&RecordType> {
        self.types.iter().find(|rt| rt.report_type() == report_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordType> {
        self.types.iter()
    }
}
