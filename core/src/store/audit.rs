use super::ReportStore;
use crate::{
    audit::{IngestEvent, IngestLogEntry},
    error::ReportResult,
    types::{AccountId, ReportType},
};
use rusqlite::{
    params,
    types::{FromSql, FromSqlError, FromSqlResult, ValueRef},
};

impl FromSql for ReportType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let tag = value.as_str()?;
        ReportType::parse(tag)
            .ok_or_else(|| FromSqlError::Other(format!("unknown report type '{tag}'").into()))
    }
}

impl ReportStore {
    // ── Ingestion audit log ───────────────────────────────────

    pub fn insert_batch(
        &self,
        batch_id: &str,
        report_type: ReportType,
        top_account_id: AccountId,
        account_id: AccountId,
        row_count: usize,
    ) -> ReportResult<()> {
        self.conn.execute(
            "INSERT INTO ingest_batch (batch_id, report_type, top_account_id, account_id, row_count)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![batch_id, report_type.as_str(), top_account_id, account_id, row_count as i64],
        )?;
        Ok(())
    }

    pub fn append_ingest_event(
        &self,
        batch_id: &str,
        report_type: ReportType,
        event: &IngestEvent,
    ) -> ReportResult<()> {
        self.conn.execute(
            "INSERT INTO ingest_log (batch_id, report_type, event_type, payload)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                batch_id,
                report_type.as_str(),
                event.type_name(),
                serde_json::to_string(event)?,
            ],
        )?;
        Ok(())
    }

    pub fn ingest_log(&self, batch_id: &str) -> ReportResult<Vec<IngestLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, batch_id, report_type, event_type, payload
             FROM ingest_log WHERE batch_id = ?1
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![batch_id], |row| {
                Ok(IngestLogEntry {
                    id: Some(row.get(0)?),
                    batch_id: row.get(1)?,
                    report_type: row.get(2)?,
                    event_type: row.get(3)?,
                    payload: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Decoded events of one batch, in the order they were logged.
    pub fn ingest_events(&self, batch_id: &str) -> ReportResult<Vec<IngestEvent>> {
        self.ingest_log(batch_id)?
            .iter()
            .map(|entry| serde_json::from_str(&entry.payload).map_err(Into::into))
            .collect()
    }
}
