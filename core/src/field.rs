//! Per-field mapping metadata and populated field values.
//!
//! One `FieldMapping` binds a semantic field to both its CSV column and its
//! storage column. The CSV path and the storage path read the same entry.

use crate::{
    decimal::{DualDecimal, NOT_APPLICABLE},
    error::{ReportError, ReportResult},
};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Date encoding used by report CSVs for `Day`, `Month` and range columns.
pub const CSV_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// 64-bit integer: ids and counters.
    Integer,
    Text,
    /// Exact decimal delivered as plain text.
    Decimal,
    /// Exact decimal delivered as grouped display text.
    DualDecimal,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub semantic_name: &'static str,
    pub csv_header: &'static str,
    pub external_field_key: &'static str,
    pub storage_column: &'static str,
    pub kind: ValueKind,
    /// Storage length limit for text columns.
    pub max_length: Option<u32>,
}

impl FieldMapping {
    pub const fn new(
        semantic_name: &'static str,
        csv_header: &'static str,
        external_field_key: &'static str,
        storage_column: &'static str,
        kind: ValueKind,
    ) -> Self {
        Self {
            semantic_name,
            csv_header,
            external_field_key,
            storage_column,
            kind,
            max_length: None,
        }
    }

    pub const fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Parse one CSV cell under this field's kind.
    ///
    /// Empty cells and the `--` marker become `FieldValue::Absent`.
    pub fn parse(&self, raw: &str) -> ReportResult<FieldValue> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == NOT_APPLICABLE {
            return Ok(match self.kind {
                ValueKind::DualDecimal => FieldValue::Dual(DualDecimal::absent()),
                _ => FieldValue::Absent,
            });
        }

        let bad = || ReportError::format(self.semantic_name, raw);
        match self.kind {
            ValueKind::Text => Ok(FieldValue::Text(trimmed.to_string())),
            ValueKind::Integer => {
                let number = DualDecimal::parse(trimmed).map_err(|_| bad())?;
                number
                    .raw()
                    .filter(|d| d.scale() == 0)
                    .and_then(|d| d.to_i64())
                    .map(FieldValue::Integer)
                    .ok_or_else(bad)
            }
            ValueKind::Decimal => DualDecimal::parse(trimmed)
                .map_err(|_| bad())?
                .raw()
                .map(FieldValue::Decimal)
                .ok_or_else(bad),
            ValueKind::DualDecimal => DualDecimal::parse(trimmed)
                .map(FieldValue::Dual)
                .map_err(|_| bad()),
            ValueKind::Date => NaiveDate::parse_from_str(trimmed, CSV_DATE_FORMAT)
                .map(FieldValue::Date)
                .map_err(|_| bad()),
        }
    }
}

/// A populated field. `Absent` is explicit: never confused with zero or "".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Absent,
    Integer(i64),
    Text(String),
    Decimal(Decimal),
    Dual(DualDecimal),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn is_absent(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Text(s) => s.is_empty(),
            Self::Dual(d) => d.is_absent(),
            _ => false,
        }
    }

    /// Text used inside record ids. `None` when the value is absent.
    pub fn identity_token(&self) -> Option<String> {
        if self.is_absent() {
            return None;
        }
        Some(self.to_csv_text())
    }

    /// CSV cell text. Absent values render as `""`.
    pub fn to_csv_text(&self) -> String {
        match self {
            Self::Absent => String::new(),
            Self::Integer(v) => v.to_string(),
            Self::Text(s) => s.clone(),
            Self::Decimal(d) => d.to_string(),
            Self::Dual(d) => d.formatted(),
            Self::Date(d) => d.format(CSV_DATE_FORMAT).to_string(),
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Exact numeric value of decimal and dual fields.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(d) => Some(*d),
            Self::Dual(d) => d.raw(),
            _ => None,
        }
    }
}
