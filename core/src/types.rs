//! Shared primitive types used across the report model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Customer id of an AdWords account (or of its manager account).
pub type AccountId = i64;

/// The persisted, opaque record key. Compare for equality only.
pub type RecordId = String;

/// Identifier of one ingestion batch in the audit log.
pub type BatchId = String;

/// Tag of the upstream report definition a record type is fed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    AdgroupPerformanceReport,
    CampaignPerformanceReport,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdgroupPerformanceReport => "ADGROUP_PERFORMANCE_REPORT",
            Self::CampaignPerformanceReport => "CAMPAIGN_PERFORMANCE_REPORT",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "ADGROUP_PERFORMANCE_REPORT" => Some(Self::AdgroupPerformanceReport),
            "CAMPAIGN_PERFORMANCE_REPORT" => Some(Self::CampaignPerformanceReport),
            _ => None,
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
