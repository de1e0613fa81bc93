//! Campaign performance rows (`AW_ReportCampaign`).

use crate::{
    dimension::{base_fields, OPTIONAL_DIMENSIONS},
    error::ReportResult,
    field::{FieldMapping, ValueKind::*},
    record_type::RecordType,
    types::ReportType,
};

pub const CAMPAIGN_ID: &str = "campaign_id";

pub fn record_type() -> ReportResult<RecordType> {
    RecordType::builder("ReportCampaign", ReportType::CampaignPerformanceReport, "AW_ReportCampaign")
        .fields(base_fields())
        .field(FieldMapping::new(CAMPAIGN_ID, "Campaign ID", "CampaignId", "CAMPAIGN_ID", Integer))
        .field(
            FieldMapping::new("campaign_name", "Campaign", "CampaignName", "CAMPAIGN_NAME", Text)
                .with_max_length(255),
        )
        .field(
            FieldMapping::new("status", "Campaign state", "CampaignStatus", "STATUS", Text)
                .with_max_length(32),
        )
        .field(FieldMapping::new("budget", "Budget", "Amount", "BUDGET", DualDecimal))
        .field(FieldMapping::new("budget_id", "Budget ID", "BudgetId", "BUDGET_ID", Integer))
        .identity(&[CAMPAIGN_ID])
        .optional_dimensions(&OPTIONAL_DIMENSIONS)
        .build()
}
