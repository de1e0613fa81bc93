//! Record identity derivation.
//!
//! KEY LAYOUT (versioned with the record type, never reordered):
//!   1. account id
//!   2. each required identity component, in declaration order
//!   3. the reporting period token(s)
//!   4. each optional dimension present on the row, in declaration order
//! joined with `-`. Consumers compare ids for equality only; they never
//! split them back into parts.
//!
//! Re-identifying a record is an error (`IdentityError::AlreadyAssigned`);
//! an id is never silently replaced.

use crate::{
    dimension::{DATE_END, DATE_START, DAY, MONTH},
    error::{IdentityError, ReportResult},
    record::Record,
    record_type::RecordType,
    types::RecordId,
};
use chrono::NaiveDate;

pub const KEY_DELIMITER: &str = "-";

const DAY_TOKEN_FORMAT: &str = "%Y%m%d";
const MONTH_TOKEN_FORMAT: &str = "%Y%m";

/// The period a report row aggregates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportingPeriod {
    Day(NaiveDate),
    /// Any date inside the month; only year and month are encoded.
    Month(NaiveDate),
    Range { start: NaiveDate, end: NaiveDate },
}

impl ReportingPeriod {
    /// Resolve the period from the row: `day`, then `month`, then the
    /// download's start/end range.
    pub fn of(record: &Record) -> Option<Self> {
        if let Some(day) = record.get(DAY).as_date() {
            return Some(Self::Day(day));
        }
        if let Some(month) = record.get(MONTH).as_date() {
            return Some(Self::Month(month));
        }
        let start = record.get(DATE_START).as_date()?;
        let end = record.get(DATE_END).as_date()?;
        if start == end {
            Some(Self::Day(start))
        } else {
            Some(Self::Range { start, end })
        }
    }

    /// `YYYYMMDD`, `YYYYMM`, or `YYYYMMDD-YYYYMMDD`.
    pub fn token(&self) -> String {
        match self {
            Self::Day(d) => d.format(DAY_TOKEN_FORMAT).to_string(),
            Self::Month(d) => d.format(MONTH_TOKEN_FORMAT).to_string(),
            Self::Range { start, end } => format!(
                "{}{KEY_DELIMITER}{}",
                start.format(DAY_TOKEN_FORMAT),
                end.format(DAY_TOKEN_FORMAT)
            ),
        }
    }
}

/// Derive the id of `record` without touching it.
pub fn derive_id(record_type: &RecordType, record: &Record) -> Result<RecordId, IdentityError> {
    let mut parts: Vec<String> = Vec::with_capacity(
        2 + record_type.identity_components().len() + record_type.optional_dimensions().len(),
    );
    parts.push(record.account_id().to_string());

    for &component in record_type.identity_components() {
        let token = record.get(component).identity_token().ok_or_else(|| {
            IdentityError::MissingComponent {
                field: component.to_string(),
            }
        })?;
        parts.push(token);
    }

    let period = ReportingPeriod::of(record).ok_or(IdentityError::MissingReportingPeriod)?;
    parts.push(period.token());

    parts.extend(
        record_type
            .optional_dimensions()
            .iter()
            .filter_map(|&dimension| record.get(dimension).identity_token()),
    );

    Ok(parts.join(KEY_DELIMITER))
}

/// Derive and attach the id. Fails if the record already has one.
pub fn assign_id<'r>(record_type: &RecordType, record: &'r mut Record) -> ReportResult<&'r str> {
    if let Some(existing) = record.id() {
        return Err(IdentityError::AlreadyAssigned {
            id: existing.to_string(),
        }
        .into());
    }
    let id = derive_id(record_type, record)?;
    record.identify(id)?;
    Ok(record.id().unwrap_or_default())
}
