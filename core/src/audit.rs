//! Ingestion audit events.
//!
//! RULE: every row outcome of a batch is recorded. Rejected cells and
//! rejected rows are never dropped silently.

use crate::types::{BatchId, RecordId, ReportType};
use serde::{Deserialize, Serialize};

/// Variants are append-only; stored payloads must keep decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IngestEvent {
    RecordPersisted {
        row: usize,
        record_id: RecordId,
        incomplete: bool,
    },
    RecordRejected {
        row: usize,
        reason: String,
    },
    FieldRejected {
        row: usize,
        field: String,
        raw: String,
    },
    BatchCompleted {
        persisted: usize,
        rejected: usize,
        format_errors: usize,
    },
}

impl IngestEvent {
    /// Stable name for the `event_type` column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RecordPersisted { .. } => "record_persisted",
            Self::RecordRejected { .. } => "record_rejected",
            Self::FieldRejected { .. } => "field_rejected",
            Self::BatchCompleted { .. } => "batch_completed",
        }
    }
}

/// One audit row as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestLogEntry {
    pub id: Option<i64>,
    pub batch_id: BatchId,
    pub report_type: ReportType,
    pub event_type: String,
    pub payload: String, // JSON-serialized IngestEvent
}
