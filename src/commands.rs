use std::path::Path;
use std::time::Instant;
use ecomdb::config::{self, Config, SourceFile};
use ecomdb::ingest::{self, IngestObserver, IngestSummary, LoadStats};
use ecomdb::output::{emit_success, OutputMode};
use ecomdb::report::{self, ReportObserver, ReportSet, ReportSummary};
use ecomdb::storage::SqliteStore;
use ecomdb::ui::{self, Icons, Spinner};
use indicatif::HumanDuration;
use owo_colors::OwoColorize;

/// Prints per-file progress while the loader runs
struct ConsoleIngest {
    spinner: Option<Spinner>,
}

impl IngestObserver for ConsoleIngest {
    fn file_started(&mut self, source: &SourceFile) {
        self.spinner = Some(Spinner::new(&format!(
            "Loading {} from {}",
            source.table,
            source.path.display()
        )));
    }

    fn file_loaded(&mut self, stats: &LoadStats) {
        if let Some(spinner) = self.spinner.take() {
            spinner.clear();
        }
        ui::success(&format!("Inserted {} rows into {}", stats.rows, stats.table));
        if stats.coercion_failures > 0 {
            ui::warn(&format!(
                "{} field(s) in {} could not be parsed and were replaced",
                stats.coercion_failures,
                stats.path.display()
            ));
        }
    }
}

/// Prints the column names and leading rows of each report
struct ConsoleReport;

impl ReportObserver for ConsoleReport {
    fn report_ready(&mut self, report: &ReportSet, preview_rows: usize) {
        if ecomdb::output::is_quiet() {
            return;
        }
        ui::section(report.kind.title());
        println!("{} {}", ui::dim("Columns:"), report.columns.join(", "));
        println!("{}", ui::dim(&format!("Preview (first {preview_rows} rows):")));
        println!("{}", ui::report_preview(report, preview_rows));
    }

    fn report_written(&mut self, summary: &ReportSummary) {
        ui::success(&format!("Wrote {} rows to {}", summary.rows, summary.path.display()));
        if let Some(mismatches) = summary.mismatches.filter(|m| *m > 0) {
            ui::summary_row(
                &format!("{} Orders not reconciling:", Icons::SCALES),
                &mismatches.style(ui::theme().mismatch.clone()).to_string(),
            );
        }
    }
}

pub fn run_init(path: &Path, config: &Config, force: bool, mode: OutputMode) -> anyhow::Result<()> {
    config::write_config(path, config, force)?;
    if mode.is_human() {
        ui::success(&format!("Wrote default config to {}", path.display()));
    }
    emit_success(mode, "init", serde_json::json!({ "path": path }))
}

fn ingest_pipeline(config: &Config, mode: OutputMode) -> anyhow::Result<IngestSummary> {
    let summary = if mode.is_human() {
        ui::header("Loading CSV exports");
        ui::info("Database", &config.database.display().to_string());
        if config.ingest.atomic {
            ui::info("Mode", "atomic (single transaction)");
        }
        ingest::run(config, &mut ConsoleIngest { spinner: None })?
    } else {
        ingest::run(config, &mut ())?
    };
    Ok(summary)
}

fn report_pipeline(config: &Config, mode: OutputMode) -> anyhow::Result<Vec<ReportSummary>> {
    let summaries = if mode.is_human() {
        ui::header("Running reports");
        report::run(config, &mut ConsoleReport)?
    } else {
        report::run(config, &mut ())?
    };
    Ok(summaries)
}

pub fn run_ingest(config: &Config, mode: OutputMode) -> anyhow::Result<()> {
    let started = Instant::now();
    let summary = ingest_pipeline(config, mode)?;

    if mode.is_human() {
        ui::success(&format!("Database created at {}", summary.database.display()));
        if summary.total_coercion_failures() > 0 {
            ui::warn(&format!(
                "{} field(s) in total were replaced by fallback values",
                summary.total_coercion_failures()
            ));
        }
        ui::timing(&format!("Loaded {} rows in {}", summary.total_rows(), HumanDuration(started.elapsed())));
    }
    emit_success(mode, "ingest", &summary)
}

pub fn run_report(config: &Config, mode: OutputMode) -> anyhow::Result<()> {
    let summaries = report_pipeline(config, mode)?;
    emit_success(mode, "report", &summaries)
}

pub fn run_all(config: &Config, mode: OutputMode) -> anyhow::Result<()> {
    let started = Instant::now();
    let ingest = ingest_pipeline(config, mode)?;
    let reports = report_pipeline(config, mode)?;

    if mode.is_human() {
        ui::timing(&format!("Complete in {}", HumanDuration(started.elapsed())));
    }
    emit_success(
        mode,
        "run",
        serde_json::json!({ "ingest": ingest, "reports": reports }),
    )
}

pub fn run_stats(config: &Config, mode: OutputMode) -> anyhow::Result<()> {
    let store = SqliteStore::open_existing(&config.database)?;
    let stats = store.stats()?;

    if mode.is_human() {
        ui::header(&format!("{} ecomdb statistics ({})", Icons::STATS, config.database.display()));

        let counts: Vec<(String, String)> = stats
            .tables
            .iter()
            .map(|t| (t.table.clone(), t.rows.to_string()))
            .collect();
        let rows: Vec<(&str, &str)> = counts.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        println!("{}", ui::stats_table(&rows));

        ui::section("Referential gaps");
        ui::summary_row("Orders without customer:", &stats.orders_without_customer.to_string());
        ui::summary_row("Items without order:", &stats.items_without_order.to_string());
        ui::summary_row("Items without product:", &stats.items_without_product.to_string());
        ui::summary_row("Payments without order:", &stats.payments_without_order.to_string());
        ui::summary_row("Orders without items:", &stats.orders_without_items.to_string());
        if stats.orphans() > 0 {
            ui::warn(&format!(
                "{} {} row(s) reference missing parents and are dropped by the joins",
                Icons::LINK,
                stats.orphans()
            ));
        }
    }
    emit_success(mode, "stats", &stats)
}
