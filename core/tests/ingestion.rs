//! Batch ingestion against an in-memory store.
//!
//! Tests cover: partial batch failure, incomplete records, exact decimal
//! storage, the audit trail, and CSV projection of stored rows.

use awreport_core::{
    audit::IngestEvent,
    batch::{ingest_batch, pair_with_headers, RawRow, ReportContext},
    projection::{to_csv_row, to_storage_row, StorageValue},
    record_type::RecordType,
    reports::{ad_group, RecordRegistry},
    store::ReportStore,
    types::ReportType,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn store() -> ReportStore {
    let store = ReportStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
}

fn context() -> ReportContext {
    let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
    ReportContext {
        top_account_id: 100,
        account_id: 111,
        date_start: day,
        date_end: day,
    }
}

fn row(pairs: &[(&str, &str)]) -> RawRow {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn ad_group_type() -> RecordType {
    ad_group::record_type().expect("ad group record type")
}

#[test]
fn missing_dimension_rejects_only_that_row() {
    init_logging();
    let store = store();
    let rt = ad_group_type();
    let rows = vec![
        row(&[("CampaignId", "222"), ("AdGroupId", "333"), ("Cost", "10.00")]),
        row(&[("CampaignId", "222"), ("Cost", "5.00")]),
        row(&[("CampaignId", "222"), ("AdGroupId", "334"), ("Device", "Mobile")]),
    ];

    let report = ingest_batch(&store, &rt, &context(), &rows).unwrap();

    assert_eq!(report.rows, 3);
    assert_eq!(report.persisted, vec!["111-222-333-20240105", "111-222-334-20240105-Mobile"]);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].row, 1);
    assert!(report.rejected[0].reason.contains("ad_group_id"), "{}", report.rejected[0].reason);

    assert_eq!(store.record_count(&rt).unwrap(), 2);
    assert_eq!(
        store.record_ids(&rt).unwrap(),
        vec!["111-222-333-20240105", "111-222-334-20240105-Mobile"]
    );
}

#[test]
fn bad_cell_marks_record_incomplete_but_persists_it() {
    init_logging();
    let store = store();
    let rt = ad_group_type();
    let rows = vec![row(&[
        ("CampaignId", "222"),
        ("AdGroupId", "333"),
        ("Cost", "twelve"),
        ("Clicks", "1,204"),
    ])];

    let report = ingest_batch(&store, &rt, &context(), &rows).unwrap();

    assert_eq!(report.format_error_count, 1);
    assert_eq!(report.incomplete_records, 1);
    assert_eq!(report.persisted.len(), 1);
    let record = &report.records[0];
    assert!(record.is_incomplete());
    assert_eq!(record.rejected_fields(), ["cost"]);
    assert!(record.get("cost").is_absent());

    let id = &report.persisted[0];
    assert_eq!(store.stored_value(&rt, id, "COST").unwrap(), None);
    assert_eq!(store.stored_value(&rt, id, "CLICKS").unwrap().as_deref(), Some("1204"));
}

#[test]
fn decimals_are_stored_exactly() {
    let store = store();
    let rt = ad_group_type();
    let rows = vec![row(&[
        ("CampaignId", "222"),
        ("AdGroupId", "333"),
        ("Cost", "1,234.50"),
        ("TargetCpa", "0.10"),
        ("ConversionSignificance", "--"),
    ])];

    let report = ingest_batch(&store, &rt, &context(), &rows).unwrap();
    let id = &report.persisted[0];

    assert_eq!(store.stored_value(&rt, id, "COST").unwrap().as_deref(), Some("1234.50"));
    assert_eq!(store.stored_value(&rt, id, "TARGETCPA").unwrap().as_deref(), Some("0.10"));
    assert_eq!(store.stored_value(&rt, id, "CONVERSIONSIGNIFICANCE").unwrap(), None);
    assert_eq!(store.stored_value(&rt, id, "ACCOUNT_ID").unwrap().as_deref(), Some("111"));
    assert_eq!(store.stored_value(&rt, id, "TOP_ACCOUNT_ID").unwrap().as_deref(), Some("100"));
    assert_eq!(store.stored_value(&rt, id, "DATE_START").unwrap().as_deref(), Some("2024-01-05"));
    assert!(store.stored_value(&rt, id, "NOT_A_COLUMN").is_err());
}

#[test]
fn reingesting_a_row_replaces_it() {
    let store = store();
    let rt = ad_group_type();
    let first = vec![row(&[("CampaignId", "222"), ("AdGroupId", "333"), ("Clicks", "1")])];
    let second = vec![row(&[("CampaignId", "222"), ("AdGroupId", "333"), ("Clicks", "2")])];

    let a = ingest_batch(&store, &rt, &context(), &first).unwrap();
    let b = ingest_batch(&store, &rt, &context(), &second).unwrap();

    assert_ne!(a.batch_id, b.batch_id);
    assert_eq!(a.persisted, b.persisted);
    assert_eq!(store.record_count(&rt).unwrap(), 1);
    assert_eq!(store.stored_value(&rt, &b.persisted[0], "CLICKS").unwrap().as_deref(), Some("2"));
}

#[test]
fn audit_log_records_every_outcome() {
    let store = store();
    let rt = ad_group_type();
    let rows = vec![
        row(&[("CampaignId", "222"), ("AdGroupId", "333"), ("Impressions", "x")]),
        row(&[("AdGroupId", "333")]),
    ];

    let report = ingest_batch(&store, &rt, &context(), &rows).unwrap();
    let events = store.ingest_events(&report.batch_id).unwrap();

    assert_eq!(
        events,
        vec![
            IngestEvent::FieldRejected { row: 0, field: "impressions".into(), raw: "x".into() },
            IngestEvent::RecordPersisted {
                row: 0,
                record_id: "111-222-333-20240105".into(),
                incomplete: true,
            },
            IngestEvent::RecordRejected {
                row: 1,
                reason: report.rejected[0].reason.clone(),
            },
            IngestEvent::BatchCompleted { persisted: 1, rejected: 1, format_errors: 1 },
        ]
    );

    let log = store.ingest_log(&report.batch_id).unwrap();
    assert!(log.iter().all(|e| e.report_type == ReportType::AdgroupPerformanceReport));
    assert_eq!(log[0].event_type, "field_rejected");
}

#[test]
fn range_download_uses_start_and_end_tokens() {
    let store = store();
    let rt = ad_group_type();
    let mut ctx = context();
    ctx.date_start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    ctx.date_end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();

    let rows = vec![row(&[("CampaignId", "222"), ("AdGroupId", "333")])];
    let report = ingest_batch(&store, &rt, &ctx, &rows).unwrap();
    assert_eq!(report.persisted, vec!["111-222-333-20240101-20240131"]);
}

#[test]
fn display_headers_bind_to_fields() {
    let rt = ad_group_type();
    let headers = ["Campaign ID", "Ad group ID", "Day", "Cost", "Unknown column"];
    let cells = ["222", "333", "2024-01-05", "3.50", "ignored"];
    let pairs = pair_with_headers(&rt, &headers, &cells);
    assert_eq!(pairs[0], ("CampaignId".to_string(), "222".to_string()));
    assert_eq!(pairs[2], ("Date".to_string(), "2024-01-05".to_string()));
    assert_eq!(pairs[4], ("Unknown column".to_string(), "ignored".to_string()));

    let store = store();
    let report = ingest_batch(&store, &rt, &context(), &[pairs]).unwrap();
    assert_eq!(report.persisted, vec!["111-222-333-20240105"]);
}

#[test]
fn projections_share_the_field_table() {
    let store = store();
    let rt = ad_group_type();
    let rows = vec![row(&[
        ("CampaignId", "222"),
        ("AdGroupId", "333"),
        ("AdGroupName", "Shoes"),
        ("Cost", "1234.5"),
    ])];
    let report = ingest_batch(&store, &rt, &context(), &rows).unwrap();
    let record = &report.records[0];

    let csv = to_csv_row(&rt, record);
    assert_eq!(csv.len(), rt.fields().len());
    assert!(csv.contains(&("Ad group", "Shoes".to_string())));
    assert!(csv.contains(&("Cost", "1,234.5".to_string())));
    assert!(csv.contains(&("Device", String::new())));

    let storage = to_storage_row(&rt, record).unwrap();
    assert_eq!(storage.len(), rt.fields().len() + 3);
    assert_eq!(storage[0], ("ID", StorageValue::Text("111-222-333-20240105".into())));
    assert!(storage.contains(&("COST", StorageValue::Decimal(Decimal::new(12345, 1)))));
    assert!(storage.contains(&("DEVICE", StorageValue::Null)));
}

#[test]
fn registry_serves_every_report_type() {
    let registry = RecordRegistry::build().unwrap();
    let store = store();
    for report_type in [ReportType::AdgroupPerformanceReport, ReportType::CampaignPerformanceReport] {
        let rt = registry.get(report_type).expect("registered");
        assert_eq!(rt.report_type(), report_type);
        store.ensure_table(rt).unwrap();
        assert_eq!(store.record_count(rt).unwrap(), 0);
    }

    let campaign = registry.get(ReportType::CampaignPerformanceReport).unwrap();
    let rows = vec![row(&[("CampaignId", "222"), ("Amount", "50.00"), ("Device", "Mobile")])];
    let report = ingest_batch(&store, campaign, &context(), &rows).unwrap();
    assert_eq!(report.persisted, vec!["111-222-20240105-Mobile"]);
    assert_eq!(
        store.stored_value(campaign, &report.persisted[0], "BUDGET").unwrap().as_deref(),
        Some("50.00")
    );
}

#[test]
fn duplicate_id_in_one_batch_is_rejected() {
    let store = store();
    let rt = ad_group_type();
    let rows = vec![
        row(&[("CampaignId", "222"), ("AdGroupId", "333"), ("Clicks", "1")]),
        row(&[("CampaignId", "222"), ("AdGroupId", "333"), ("Clicks", "2")]),
    ];

    let report = ingest_batch(&store, &rt, &context(), &rows).unwrap();

    assert_eq!(report.persisted, vec!["111-222-333-20240105"]);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].row, 1);
    assert!(report.rejected[0].reason.contains("duplicate id"), "{}", report.rejected[0].reason);
    assert_eq!(store.record_count(&rt).unwrap(), 1);
    assert_eq!(store.stored_value(&rt, &report.persisted[0], "CLICKS").unwrap().as_deref(), Some("1"));
}

#[test]
fn loaded_row_matches_its_storage_projection() {
    let store = store();
    let rt = ad_group_type();
    let rows = vec![row(&[
        ("CampaignId", "222"),
        ("AdGroupId", "333"),
        ("AdGroupName", "Shoes"),
        ("Date", "2024-01-05"),
        ("Cost", "1,234.50"),
        ("Clicks", "12"),
        ("TargetCpa", "--"),
    ])];
    let report = ingest_batch(&store, &rt, &context(), &rows).unwrap();
    let record = &report.records[0];

    let loaded = store.load_row(&rt, &report.persisted[0]).unwrap().expect("stored row");
    assert_eq!(loaded, to_storage_row(&rt, record).unwrap());
    assert!(loaded.contains(&("COST", StorageValue::Decimal(Decimal::new(123450, 2)))));
    assert!(loaded.contains(&("TARGETCPA", StorageValue::Null)));

    assert_eq!(store.load_row(&rt, "111-999-999-20240105").unwrap(), None);
}
