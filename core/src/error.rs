use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Configuration error in record type '{record_type}': {reason}")]
    Configuration { record_type: String, reason: String },

    #[error("Format error in field '{field}': cannot parse {raw:?}")]
    Format { field: String, raw: String },

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Why a record could not be given (or keep) an identity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("required identity field '{field}' is not set")]
    MissingComponent { field: String },

    #[error("record has no reporting period (day, month or date range)")]
    MissingReportingPeriod,

    #[error("record already carries id '{id}'")]
    AlreadyAssigned { id: String },

    #[error("record has no id; derive one before persisting")]
    Unassigned,
}

/// Coarse classification used by the batch pipeline to decide
/// whether a failure drops a field, a record, or the whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Format,
    Identity,
    Infrastructure,
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Format { .. } => ErrorKind::Format,
            Self::Identity(_) => ErrorKind::Identity,
            Self::Database(_) | Self::Serialization(_) | Self::Other(_) => {
                ErrorKind::Infrastructure
            }
        }
    }

    pub(crate) fn configuration(record_type: &str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            record_type: record_type.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn format(field: &str, raw: &str) -> Self {
        Self::Format {
            field: field.to_string(),
            raw: raw.to_string(),
        }
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
