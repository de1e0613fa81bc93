use crate::{
    batch::ReportContext,
    types::{AccountId, ReportType},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Settings for one ingestion run, loaded from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// SQLite database file; `:memory:` for a throwaway run.
    pub db_path: String,
    pub report_type: ReportType,
    /// Manager account the report was downloaded under.
    pub top_account_id: AccountId,
    pub account_id: AccountId,
    /// Reporting period the report file covers (inclusive).
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    /// Optional CSV re-export of the persisted rows.
    #[serde(default)]
    pub export_path: Option<String>,
}

impl IngestConfig {
    /// Load from a JSON file.
    /// In tests, use IngestConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.date_start > self.date_end {
            anyhow::bail!(
                "date_start {} is after date_end {}",
                self.date_start,
                self.date_end
            );
        }
        if self.db_path.is_empty() {
            anyhow::bail!("db_path is empty");
        }
        Ok(())
    }

    pub fn context(&self) -> ReportContext {
        ReportContext {
            top_account_id: self.top_account_id,
            account_id: self.account_id,
            date_start: self.date_start,
            date_end: self.date_end,
        }
    }

    /// Single-day ad group run against an in-memory database.
    pub fn default_test() -> Self {
        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap_or(NaiveDate::MIN);
        Self {
            db_path: ":memory:".to_string(),
            top_account_id: 100,
            account_id: 111,
            date_start: day,
            date_end: day,
            ..Self::default()
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        let today = chrono::Utc::now().date_naive();
        Self {
            db_path: "reports.db".to_string(),
            report_type: ReportType::AdgroupPerformanceReport,
            top_account_id: 0,
            account_id: 0,
            date_start: today,
            date_end: today,
            export_path: None,
        }
    }
}
