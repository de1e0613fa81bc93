//! Batch ingestion: raw report rows in, identified records persisted.
//!
//! PIPELINE (per batch):
//!   1. Map every row to a record and derive its id. Rows are independent,
//!      so this runs in parallel; each record is owned by one task.
//!   2. Persist the identified records in input order through the store.
//!   3. Record every outcome in the audit log.
//!
//! FAILURE POLICY:
//!   - A cell that fails to parse leaves its field absent; the record is
//!     still persisted but flagged incomplete.
//!   - A row whose id cannot be derived is rejected; the batch continues.
//!   - A row whose id repeats an earlier row of the same batch is rejected;
//!     the first row wins.
//!   - A storage failure aborts the batch.

use crate::{
    audit::IngestEvent,
    dimension::{DATE_END, DATE_START},
    error::{ReportError, ReportResult},
    field::FieldValue,
    identity::assign_id,
    record::Record,
    record_type::RecordType,
    store::ReportStore,
    types::{AccountId, BatchId, RecordId, ReportType},
};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// `(external field key, raw text)` pairs of one CSV row.
pub type RawRow = Vec<(String, String)>;

/// Download context shared by every row of one report file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportContext {
    pub top_account_id: AccountId,
    pub account_id: AccountId,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFault {
    pub field: String,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_id: BatchId,
    pub report_type: ReportType,
    pub rows: usize,
    pub persisted: Vec<RecordId>,
    pub rejected: Vec<RejectedRow>,
    pub format_error_count: usize,
    pub incomplete_records: usize,
    /// The persisted records, in input order.
    #[serde(skip)]
    pub records: Vec<Record>,
}

/// Result of mapping a single row, before anything touches the store.
#[derive(Debug)]
pub enum RowOutcome {
    Identified { record: Record, faults: Vec<FieldFault> },
    Rejected { reason: String, faults: Vec<FieldFault> },
}

/// Pair a CSV line with its header row. Headers may be display headers or
/// upstream keys; unknown columns pass through and are ignored later.
pub fn pair_with_headers<H, C>(record_type: &RecordType, headers: &[H], cells: &[C]) -> RawRow
where
    H: AsRef<str>,
    C: AsRef<str>,
{
    headers
        .iter()
        .zip(cells)
        .map(|(h, c)| {
            let key = record_type.resolve_column(h.as_ref()).unwrap_or(h.as_ref());
            (key.to_string(), c.as_ref().to_string())
        })
        .collect()
}

/// Build, populate and identify one record. Pure: no I/O, no logging.
pub fn map_row<K, V>(
    record_type: &RecordType,
    context: &ReportContext,
    pairs: impl IntoIterator<Item = (K, V)>,
) -> RowOutcome
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut faults = Vec::new();
    match build_record(record_type, context, pairs, &mut faults) {
        Ok(record) => RowOutcome::Identified { record, faults },
        Err(e) => RowOutcome::Rejected {
            reason: e.to_string(),
            faults,
        },
    }
}

fn build_record<K, V>(
    record_type: &RecordType,
    context: &ReportContext,
    pairs: impl IntoIterator<Item = (K, V)>,
    faults: &mut Vec<FieldFault>,
) -> ReportResult<Record>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut record = Record::new(context.top_account_id, context.account_id);
    if record_type.field(DATE_START).is_some() && record_type.field(DATE_END).is_some() {
        record.set(record_type, DATE_START, FieldValue::Date(context.date_start))?;
        record.set(record_type, DATE_END, FieldValue::Date(context.date_end))?;
    }

    for e in record.populate(record_type, pairs)? {
        if let ReportError::Format { field, raw } = e {
            faults.push(FieldFault { field, raw });
        }
    }

    assign_id(record_type, &mut record)?;
    Ok(record)
}

/// Ingest one report file's rows into `store`.
pub fn ingest_batch(
    store: &ReportStore,
    record_type: &RecordType,
    context: &ReportContext,
    rows: &[RawRow],
) -> ReportResult<BatchReport> {
    let batch_id = Uuid::new_v4().to_string();
    let report_type = record_type.report_type();

    store.ensure_table(record_type)?;
    store.insert_batch(
        &batch_id,
        report_type,
        context.top_account_id,
        context.account_id,
        rows.len(),
    )?;

    let outcomes: Vec<RowOutcome> = rows
        .par_iter()
        .map(|row| map_row(record_type, context, row.iter().map(|(k, v)| (k, v))))
        .collect();

    let mut report = BatchReport {
        batch_id: batch_id.clone(),
        report_type,
        rows: rows.len(),
        persisted: Vec::new(),
        rejected: Vec::new(),
        format_error_count: 0,
        incomplete_records: 0,
        records: Vec::new(),
    };
    // Row index of the first record that claimed each id in this batch.
    let mut first_seen: HashMap<RecordId, usize> = HashMap::new();

    for (row, outcome) in outcomes.into_iter().enumerate() {
        let faults = match &outcome {
            RowOutcome::Identified { faults, .. } | RowOutcome::Rejected { faults, .. } => faults,
        };
        for fault in faults {
            log::warn!(
                "batch={batch_id} {}: row {row} field '{}' rejected {:?}",
                record_type.name(),
                fault.field,
                fault.raw
            );
            store.append_ingest_event(
                &batch_id,
                report_type,
                &IngestEvent::FieldRejected {
                    row,
                    field: fault.field.clone(),
                    raw: fault.raw.clone(),
                },
            )?;
        }
        report.format_error_count += faults.len();

        let outcome = match outcome {
            RowOutcome::Identified { record, faults } => {
                let id = record.id().unwrap_or_default().to_string();
                match first_seen.get(&id) {
                    Some(&first) => RowOutcome::Rejected {
                        reason: format!("duplicate id '{id}' (first seen at row {first})"),
                        faults,
                    },
                    None => {
                        first_seen.insert(id, row);
                        RowOutcome::Identified { record, faults }
                    }
                }
            }
            rejected => rejected,
        };

        match outcome {
            RowOutcome::Identified { record, .. } => {
                store.upsert_record(record_type, &record)?;
                let record_id = record.id().unwrap_or_default().to_string();
                if record.is_incomplete() {
                    report.incomplete_records += 1;
                }
                store.append_ingest_event(
                    &batch_id,
                    report_type,
                    &IngestEvent::RecordPersisted {
                        row,
                        record_id: record_id.clone(),
                        incomplete: record.is_incomplete(),
                    },
                )?;
                report.persisted.push(record_id);
                report.records.push(record);
            }
            RowOutcome::Rejected { reason, .. } => {
                log::warn!(
                    "batch={batch_id} {}: row {row} rejected: {reason}",
                    record_type.name()
                );
                store.append_ingest_event(
                    &batch_id,
                    report_type,
                    &IngestEvent::RecordRejected {
                        row,
                        reason: reason.clone(),
                    },
                )?;
                report.rejected.push(RejectedRow { row, reason });
            }
        }
    }

    store.append_ingest_event(
        &batch_id,
        report_type,
        &IngestEvent::BatchCompleted {
            persisted: report.persisted.len(),
            rejected: report.rejected.len(),
            format_errors: report.format_error_count,
        },
    )?;
    log::info!(
        "batch={batch_id} {}: {} rows, {} persisted ({} incomplete), {} rejected, {} format errors",
        record_type.name(),
        report.rows,
        report.persisted.len(),
        report.incomplete_records,
        report.rejected.len(),
        report.format_error_count
    );
    Ok(report)
}
