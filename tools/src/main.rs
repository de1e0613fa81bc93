//! report-ingest: load one downloaded report CSV into the report store.
//!
//! Usage:
//!   report-ingest --config data/ingest.json --csv adgroup.csv
//!   report-ingest --csv adgroup.csv --report ADGROUP_PERFORMANCE_REPORT \
//!       --top-account 100 --account 111 --from 2024-01-05 --to 2024-01-05 \
//!       --db reports.db --export out.csv [--json]

use anyhow::{Context, Result};
use awreport_core::{
    batch::{ingest_batch, pair_with_headers, BatchReport, RawRow},
    config::IngestConfig,
    projection::{csv_headers, to_csv_row},
    record_type::RecordType,
    reports::RecordRegistry,
    store::ReportStore,
    types::ReportType,
};
use std::env;

/// First cell of the summary line the report source appends.
const TOTAL_ROW_MARKER: &str = "Total";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let csv_path = arg_value(&args, "--csv").context("--csv <file> is required")?;
    let config = build_config(&args)?;

    // Record types are validated before any row is read.
    let registry = RecordRegistry::build()?;
    let record_type = registry
        .get(config.report_type)
        .with_context(|| format!("no record type for {}", config.report_type))?;

    println!("report-ingest");
    println!("  report:    {}", config.report_type);
    println!("  csv:       {csv_path}");
    println!("  db:        {}", config.db_path);
    println!("  account:   {} (top {})", config.account_id, config.top_account_id);
    println!("  period:    {} .. {}", config.date_start, config.date_end);
    println!();

    let rows = read_report_csv(record_type, csv_path)?;

    let store = ReportStore::open(&config.db_path)?;
    store.migrate()?;
    let report = ingest_batch(&store, record_type, &config.context(), &rows)?;

    if let Some(export_path) = &config.export_path {
        export_csv(record_type, &report, export_path)?;
        println!("  exported:  {export_path}");
    }

    if args.iter().any(|a| a == "--json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&store, record_type, &report)?;
    }
    Ok(())
}

fn build_config(args: &[String]) -> Result<IngestConfig> {
    let mut config = match arg_value(args, "--config") {
        Some(path) => IngestConfig::load(path)?,
        None => IngestConfig::default(),
    };

    if let Some(tag) = arg_value(args, "--report") {
        config.report_type =
            ReportType::parse(tag).with_context(|| format!("unknown report type {tag}"))?;
    }
    if let Some(db) = arg_value(args, "--db") {
        config.db_path = db.to_string();
    }
    if let Some(export) = arg_value(args, "--export") {
        config.export_path = Some(export.to_string());
    }
    if let Some(id) = parse_flag(args, "--top-account")? {
        config.top_account_id = id;
    }
    if let Some(id) = parse_flag(args, "--account")? {
        config.account_id = id;
    }
    if let Some(start) = parse_flag(args, "--from")? {
        config.date_start = start;
        config.date_end = start;
    }
    if let Some(end) = parse_flag(args, "--to")? {
        config.date_end = end;
    }
    config.validate()?;
    if config.account_id == 0 {
        anyhow::bail!("no account id: pass --account or --config");
    }
    Ok(config)
}

fn read_report_csv(record_type: &RecordType, path: &str) -> Result<Vec<RawRow>> {
    let file = std::fs::File::open(path).with_context(|| format!("Cannot open {path}"))?;
    read_report_rows(record_type, file).with_context(|| format!("Cannot read {path}"))
}

/// Read report rows. A title line before the header row and the trailing
/// total row are skipped.
fn read_report_rows<R: std::io::Read>(record_type: &RecordType, input: R) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for result in reader.records() {
        let line = result?;
        let cells: Vec<&str> = line.iter().collect();
        if headers.is_none() {
            if cells.iter().any(|c| record_type.resolve_column(c).is_some()) {
                headers = Some(cells.iter().map(|c| c.to_string()).collect());
            } else {
                log::debug!("skipping preamble line: {cells:?}");
            }
            continue;
        }
        if cells.first().is_some_and(|c| c.trim() == TOTAL_ROW_MARKER) {
            continue;
        }
        if let Some(h) = &headers {
            rows.push(pair_with_headers(record_type, h.as_slice(), cells.as_slice()));
        }
    }

    if headers.is_none() {
        anyhow::bail!("no header row matches {}", record_type.name());
    }
    Ok(rows)
}

fn export_csv(record_type: &RecordType, report: &BatchReport, path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("Cannot create {path}"))?;
    writer.write_record(csv_headers(record_type))?;
    for record in &report.records {
        writer.write_record(to_csv_row(record_type, record).into_iter().map(|(_, text)| text))?;
    }
    writer.flush()?;
    Ok(())
}

fn print_summary(store: &ReportStore, record_type: &RecordType, report: &BatchReport) -> Result<()> {
    let stored = store.record_count(record_type)?;

    println!("=== INGEST SUMMARY ===");
    println!("  batch_id:       {}", report.batch_id);
    println!("  rows read:      {}", report.rows);
    println!("  persisted:      {}", report.persisted.len());
    println!("  incomplete:     {}", report.incomplete_records);
    println!("  rejected:       {}", report.rejected.len());
    println!("  format errors:  {}", report.format_error_count);
    println!("  rows in table:  {stored}");

    if !report.rejected.is_empty() {
        println!();
        println!("=== REJECTED ROWS ===");
        for r in &report.rejected {
            println!("  row {:>5} | {}", r.row, r.reason);
        }
    }
    Ok(())
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// Parse a flag's value. A malformed value is an error, never a silent
/// fallback to the configured one.
fn parse_flag<T>(args: &[String], flag: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    arg_value(args, flag)
        .map(|raw| raw.parse().with_context(|| format!("invalid value for {flag}: {raw}")))
        .transpose()
}
