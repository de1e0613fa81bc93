//! Ad group performance rows (`AW_ReportAdGroup`).

use crate::{
    dimension::{base_fields, OPTIONAL_DIMENSIONS},
    error::ReportResult,
    field::{FieldMapping, ValueKind::*},
    record_type::RecordType,
    types::ReportType,
};

pub const CAMPAIGN_ID: &str = "campaign_id";
pub const AD_GROUP_ID: &str = "ad_group_id";

pub fn record_type() -> ReportResult<RecordType> {
    RecordType::builder("ReportAdGroup", ReportType::AdgroupPerformanceReport, "AW_ReportAdGroup")
        .fields(base_fields())
        .field(FieldMapping::new(AD_GROUP_ID, "Ad group ID", "AdGroupId", "ADGROUP_ID", Integer))
        .field(
            FieldMapping::new("ad_group_name", "Ad group", "AdGroupName", "ADGROUP_NAME", Text)
                .with_max_length(255),
        )
        .field(FieldMapping::new(CAMPAIGN_ID, "Campaign ID", "CampaignId", "CAMPAIGN_ID", Integer))
        .field(
            FieldMapping::new("status", "Ad group state", "Status", "STATUS", Text)
                .with_max_length(32),
        )
        .field(FieldMapping::new("target_cpa", "Max. CPA (converted clicks)", "TargetCpa", "TARGETCPA", Decimal))
        .field(FieldMapping::new(
            "conversion_rate_significance",
            "Click conversion rate ACE indicator",
            "ConversionRateSignificance",
            "CONVERSIONRATESIGNIFICANCE",
            DualDecimal,
        ))
        .field(FieldMapping::new(
            "conversion_rate_many_per_click_significance",
            "Conversion rate ACE indicator",
            "ConversionRateManyPerClickSignificance",
            "CONVERSIONRATEMANYPERCLICKSIGNIFICANCE",
            DualDecimal,
        ))
        .field(FieldMapping::new(
            "conversion_many_per_click_significance",
            "Conversion ACE indicator",
            "ConversionManyPerClickSignificance",
            "CONVERSIONMANYPERCLICKSIGNIFICANCE",
            DualDecimal,
        ))
        .field(FieldMapping::new(
            "cost_per_conversion_many_per_click_significance",
            "Cost/conversion ACE indicator",
            "CostPerConversionManyPerClickSignificance",
            "COSTPERCONVERSIONMANYPERCLICKSIGNIFICANCE",
            DualDecimal,
        ))
        .field(FieldMapping::new(
            "conversion_significance",
            "Converted clicks ACE indicator",
            "ConversionSignificance",
            "CONVERSIONSIGNIFICANCE",
            DualDecimal,
        ))
        .field(FieldMapping::new(
            "cost_per_conversion_significance",
            "Cost/converted click ACE indicator",
            "CostPerConversionSignificance",
            "COSTPERCONVERSIONSIGNIFICANCE",
            DualDecimal,
        ))
        .identity(&[CAMPAIGN_ID, AD_GROUP_ID])
        .optional_dimensions(&OPTIONAL_DIMENSIONS)
        .build()
}
