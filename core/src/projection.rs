//! Projections of a record onto its two external shapes.
//!
//! Both functions walk the same `FieldMapping` table, so the CSV layout and
//! the storage layout cannot drift apart.

use crate::{
    error::{IdentityError, ReportResult},
    field::FieldValue,
    record::Record,
    record_type::{RecordType, ACCOUNT_COLUMN, ID_COLUMN, TOP_ACCOUNT_COLUMN},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A value as handed to the persistence layer. Decimals stay exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageValue {
    Null,
    Integer(i64),
    Text(String),
    Decimal(Decimal),
    Date(NaiveDate),
}

impl From<&FieldValue> for StorageValue {
    fn from(value: &FieldValue) -> Self {
        if value.is_absent() {
            return Self::Null;
        }
        match value {
            FieldValue::Integer(v) => Self::Integer(*v),
            FieldValue::Text(s) => Self::Text(s.clone()),
            FieldValue::Decimal(d) => Self::Decimal(*d),
            FieldValue::Dual(d) => d.raw().map_or(Self::Null, Self::Decimal),
            FieldValue::Date(d) => Self::Date(*d),
            FieldValue::Absent => Self::Null,
        }
    }
}

/// `storage column -> value`, led by the id and the owning accounts.
///
/// Records without an id cannot be projected for storage.
pub fn to_storage_row(
    record_type: &RecordType,
    record: &Record,
) -> ReportResult<Vec<(&'static str, StorageValue)>> {
    let id = record.id().ok_or(IdentityError::Unassigned)?;
    let mut row = Vec::with_capacity(record_type.fields().len() + 3);
    row.push((ID_COLUMN, StorageValue::Text(id.to_string())));
    row.push((TOP_ACCOUNT_COLUMN, StorageValue::Integer(record.top_account_id())));
    row.push((ACCOUNT_COLUMN, StorageValue::Integer(record.account_id())));
    row.extend(
        record_type
            .fields()
            .iter()
            .map(|f| (f.storage_column, StorageValue::from(record.get(f.semantic_name)))),
    );
    Ok(row)
}

/// `CSV header -> formatted text`, in declaration order.
pub fn to_csv_row(record_type: &RecordType, record: &Record) -> Vec<(&'static str, String)> {
    record_type
        .fields()
        .iter()
        .map(|f| (f.csv_header, record.get(f.semantic_name).to_csv_text()))
        .collect()
}

/// The header line matching `to_csv_row`.
pub fn csv_headers(record_type: &RecordType) -> Vec<&'static str> {
    record_type.fields().iter().map(|f| f.csv_header).collect()
}
