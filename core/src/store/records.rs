use super::ReportStore;
use crate::{
    error::{ReportError, ReportResult},
    field::{ValueKind, CSV_DATE_FORMAT},
    projection::{to_storage_row, StorageValue},
    record::Record,
    record_type::{RecordType, ACCOUNT_COLUMN, ID_COLUMN, TOP_ACCOUNT_COLUMN},
};
use chrono::NaiveDate;
use rusqlite::{
    params, params_from_iter,
    types::{ToSqlOutput, Type, Value, ValueRef},
    OptionalExtension, Row, ToSql,
};
use rust_decimal::Decimal;

impl ToSql for StorageValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Owned(Value::Null),
            Self::Integer(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            Self::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            // Exact text, never REAL.
            Self::Decimal(d) => ToSqlOutput::Owned(Value::Text(d.to_string())),
            Self::Date(d) => ToSqlOutput::Owned(Value::Text(d.format(CSV_DATE_FORMAT).to_string())),
        })
    }
}

/// DDL for a record type's table, generated from its field mappings.
///
/// Decimal columns are declared TEXT so SQLite's type affinity never
/// converts them to floating point.
pub fn create_table_sql(record_type: &RecordType) -> String {
    let mut columns = vec![
        format!("\"{ID_COLUMN}\" TEXT PRIMARY KEY"),
        format!("\"{TOP_ACCOUNT_COLUMN}\" INTEGER NOT NULL"),
        format!("\"{ACCOUNT_COLUMN}\" INTEGER NOT NULL"),
    ];
    for f in record_type.fields() {
        let sql_type = match (f.kind, f.max_length) {
            (ValueKind::Integer, _) => "INTEGER".to_string(),
            (ValueKind::Text, Some(n)) => format!("VARCHAR({n})"),
            (ValueKind::Text, None) => "TEXT".to_string(),
            (ValueKind::Decimal | ValueKind::DualDecimal | ValueKind::Date, _) => "TEXT".to_string(),
        };
        columns.push(format!("\"{}\" {sql_type}", f.storage_column));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS \"{}\" (\n    {}\n)",
        record_type.table(),
        columns.join(",\n    ")
    )
}

fn upsert_sql(record_type: &RecordType, row: &[(&'static str, StorageValue)]) -> String {
    let columns: Vec<String> = row.iter().map(|(c, _)| format!("\"{c}\"")).collect();
    let placeholders: Vec<String> = (1..=row.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT OR REPLACE INTO \"{}\" ({}) VALUES ({})",
        record_type.table(),
        columns.join(", "),
        placeholders.join(", ")
    )
}

impl ReportStore {
    // ── Record tables ─────────────────────────────────────────

    pub fn ensure_table(&self, record_type: &RecordType) -> ReportResult<()> {
        self.conn.execute_batch(&create_table_sql(record_type))?;
        Ok(())
    }

    /// Insert or replace a record keyed by its id.
    /// Records without an id are refused.
    pub fn upsert_record(&self, record_type: &RecordType, record: &Record) -> ReportResult<()> {
        let row = to_storage_row(record_type, record)?;
        let mut stmt = self.conn.prepare_cached(&upsert_sql(record_type, &row))?;
        stmt.execute(params_from_iter(row.iter().map(|(_, v)| v)))?;
        Ok(())
    }

    pub fn record_count(&self, record_type: &RecordType) -> ReportResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", record_type.table());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }

    /// Ids of all stored records, sorted.
    pub fn record_ids(&self, record_type: &RecordType) -> ReportResult<Vec<String>> {
        let sql = format!(
            "SELECT \"{ID_COLUMN}\" FROM \"{}\" ORDER BY \"{ID_COLUMN}\" ASC",
            record_type.table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    /// One stored cell rendered as text. `Ok(None)` when the record does
    /// not exist or the cell is NULL.
    pub fn stored_value(
        &self,
        record_type: &RecordType,
        id: &str,
        storage_column: &str,
    ) -> ReportResult<Option<String>> {
        let known = [ID_COLUMN, TOP_ACCOUNT_COLUMN, ACCOUNT_COLUMN].contains(&storage_column)
            || record_type
                .fields()
                .iter()
                .any(|f| f.storage_column == storage_column);
        if !known {
            return Err(ReportError::configuration(
                record_type.name(),
                format!("no storage column '{storage_column}'"),
            ));
        }
        let sql = format!(
            "SELECT CAST(\"{storage_column}\" AS TEXT) FROM \"{}\" WHERE \"{ID_COLUMN}\" = ?1",
            record_type.table()
        );
        let value: Option<Option<String>> = self
            .conn
            .query_row(&sql, params![id], |row| row.get(0))
            .optional()?;
        Ok(value.flatten())
    }

    /// Read a whole stored record back as `storage column -> value`, in the
    /// same order and shape `to_storage_row` produced it.
    pub fn load_row(
        &self,
        record_type: &RecordType,
        id: &str,
    ) -> ReportResult<Option<Vec<(&'static str, StorageValue)>>> {
        let mut columns = vec![ID_COLUMN, TOP_ACCOUNT_COLUMN, ACCOUNT_COLUMN];
        columns.extend(record_type.fields().iter().map(|f| f.storage_column));
        let select: Vec<String> = columns.iter().map(|c| format!("\"{c}\"")).collect();
        let sql = format!(
            "SELECT {} FROM \"{}\" WHERE \"{ID_COLUMN}\" = ?1",
            select.join(", "),
            record_type.table()
        );

        let row = self
            .conn
            .query_row(&sql, params![id], |row| {
                let mut values = Vec::with_capacity(columns.len());
                values.push((ID_COLUMN, StorageValue::Text(row.get(0)?)));
                values.push((TOP_ACCOUNT_COLUMN, StorageValue::Integer(row.get(1)?)));
                values.push((ACCOUNT_COLUMN, StorageValue::Integer(row.get(2)?)));
                for (i, f) in record_type.fields().iter().enumerate() {
                    values.push((f.storage_column, read_cell(row, i + 3, f.kind)?));
                }
                Ok(values)
            })
            .optional()?;
        Ok(row)
    }
}

fn read_cell(row: &Row<'_>, idx: usize, kind: ValueKind) -> rusqlite::Result<StorageValue> {
    let conversion = |e: Box<dyn std::error::Error + Send + Sync>| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e)
    };
    if kind == ValueKind::Integer {
        return Ok(row
            .get::<_, Option<i64>>(idx)?
            .map_or(StorageValue::Null, StorageValue::Integer));
    }
    let Some(text) = row.get::<_, Option<String>>(idx)? else {
        return Ok(StorageValue::Null);
    };
    Ok(match kind {
        ValueKind::Decimal | ValueKind::DualDecimal => StorageValue::Decimal(
            Decimal::from_str_exact(&text).map_err(|e| conversion(Box::new(e)))?,
        ),
        ValueKind::Date => StorageValue::Date(
            NaiveDate::parse_from_str(&text, CSV_DATE_FORMAT).map_err(|e| conversion(Box::new(e)))?,
        ),
        ValueKind::Integer | ValueKind::Text => StorageValue::Text(text),
    })
}
