//! The shared dimension set embedded in every report row shape.
//!
//! Every record type starts from `base_fields()` and appends its own
//! columns. The optional identity dimensions live here too, so all record
//! types derive their id suffix the same way.

use crate::field::{FieldMapping, ValueKind};

pub const ACCOUNT_DESCRIPTIVE_NAME: &str = "account_descriptive_name";
pub const CURRENCY_CODE: &str = "currency_code";
pub const DATE_START: &str = "date_start";
pub const DATE_END: &str = "date_end";
pub const DAY: &str = "day";
pub const MONTH: &str = "month";
pub const AD_NETWORK: &str = "ad_network";
pub const AD_NETWORK_PARTNERS: &str = "ad_network_partners";
pub const DEVICE: &str = "device";
pub const CLICK_TYPE: &str = "click_type";

/// Appended to the id, in this order, when present on a row.
pub const OPTIONAL_DIMENSIONS: [&str; 4] = [AD_NETWORK, AD_NETWORK_PARTNERS, DEVICE, CLICK_TYPE];

pub fn base_fields() -> Vec<FieldMapping> {
    use ValueKind::*;
    vec![
        FieldMapping::new(ACCOUNT_DESCRIPTIVE_NAME, "Account", "AccountDescriptiveName", "ACCOUNT_DESCRIPTIVE_NAME", Text)
            .with_max_length(255),
        FieldMapping::new(CURRENCY_CODE, "Currency", "AccountCurrencyCode", "CURRENCY_CODE", Text)
            .with_max_length(6),
        FieldMapping::new(DATE_START, "Date start", "DateStart", "DATE_START", Date),
        FieldMapping::new(DATE_END, "Date end", "DateEnd", "DATE_END", Date),
        FieldMapping::new(DAY, "Day", "Date", "DAY", Date),
        FieldMapping::new(MONTH, "Month", "Month", "MONTH", Date),
        FieldMapping::new(AD_NETWORK, "Network", "AdNetworkType1", "AD_NETWORK", Text)
            .with_max_length(32),
        FieldMapping::new(AD_NETWORK_PARTNERS, "Network (with search partners)", "AdNetworkType2", "AD_NETWORK_PARTNERS", Text)
            .with_max_length(32),
        FieldMapping::new(DEVICE, "Device", "Device", "DEVICE", Text).with_max_length(64),
        FieldMapping::new(CLICK_TYPE, "Click type", "ClickType", "CLICK_TYPE", Text)
            .with_max_length(32),
        FieldMapping::new("impressions", "Impressions", "Impressions", "IMPRESSIONS", Integer),
        FieldMapping::new("clicks", "Clicks", "Clicks", "CLICKS", Integer),
        FieldMapping::new("cost", "Cost", "Cost", "COST", DualDecimal),
        FieldMapping::new("ctr", "CTR", "Ctr", "CTR", DualDecimal),
        FieldMapping::new("avg_cpc", "Avg. CPC", "AverageCpc", "AVERAGE_CPC", DualDecimal),
        FieldMapping::new("avg_cpm", "Avg. CPM", "AverageCpm", "AVERAGE_CPM", DualDecimal),
        FieldMapping::new("avg_position", "Avg. position", "AveragePosition", "AVERAGE_POSITION", DualDecimal),
        FieldMapping::new("conversions", "Converted clicks", "Conversions", "CONVERSIONS", Integer),
    ]
}
