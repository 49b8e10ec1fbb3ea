//! Join reports over a populated store
//!
//! Each report is fully materialized before its output file is opened, so a
//! failing query never leaves a truncated file behind.

pub mod queries;

use std::path::{Path, PathBuf};
use rusqlite::types::Value;
use rusqlite::Connection;
use serde::Serialize;
use crate::config::Config;
use crate::storage::SqliteStore;
use crate::Result;

/// The fixed reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// One row per order line item
    Detail,
    /// One row per order with a consistency label
    Consistency,
}

impl ReportKind {
    pub const ALL: [ReportKind; 2] = [ReportKind::Detail, ReportKind::Consistency];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Detail => "detail",
            ReportKind::Consistency => "consistency",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Detail => "Detailed order join",
            ReportKind::Consistency => "Order-aggregate consistency check",
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            ReportKind::Detail => queries::DETAIL_SQL,
            ReportKind::Consistency => queries::CONSISTENCY_SQL,
        }
    }

    /// Output path for this report in `config`
    pub fn output_path<'a>(&self, config: &'a Config) -> &'a Path {
        match self {
            ReportKind::Detail => config.reports.detail.as_path(),
            ReportKind::Consistency => config.reports.consistency.as_path(),
        }
    }
}

/// A materialized result set
#[derive(Debug, Clone)]
pub struct ReportSet {
    pub kind: ReportKind,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ReportSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The first `limit` rows
    pub fn preview(&self, limit: usize) -> &[Vec<Value>] {
        &self.rows[..limit.min(self.rows.len())]
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value of `column` in row `row`
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    /// Number of rows labelled MISMATCH, when the report carries the label
    pub fn mismatches(&self) -> Option<usize> {
        let index = self.column_index("consistency_check")?;
        Some(
            self.rows
                .iter()
                .filter(|row| matches!(&row[index], Value::Text(s) if s == queries::MISMATCH))
                .count(),
        )
    }

    /// Write a header row then every data row, replacing any existing file
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::WriterBuilder::new().from_path(path)?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(format_value))?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Render a SQL value as a delimited-text field.
/// NULL is empty and whole reals keep one fractional digit.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(n) => n.to_string(),
        Value::Real(f) if f.is_finite() && f.fract() == 0.0 => format!("{f:.1}"),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => String::from_utf8_lossy(b).into_owned(),
    }
}

/// Run one report query
pub fn execute(conn: &Connection, kind: ReportKind, tolerance: f64) -> Result<ReportSet> {
    let mut stmt = conn.prepare(kind.sql())?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();

    let mut rows = match kind {
        ReportKind::Detail => stmt.query([])?,
        ReportKind::Consistency => stmt.query([tolerance])?,
    };

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(width);
        for i in 0..width {
            values.push(row.get::<_, Value>(i)?);
        }
        out.push(values);
    }
    tracing::debug!("{} report returned {} rows", kind.as_str(), out.len());

    Ok(ReportSet { kind, columns, rows: out })
}

/// Receives each report before and after it is written
pub trait ReportObserver {
    fn report_ready(&mut self, _report: &ReportSet, _preview_rows: usize) {}
    fn report_written(&mut self, _summary: &ReportSummary) {}
}

impl ReportObserver for () {}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub report: ReportKind,
    pub path: PathBuf,
    pub rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mismatches: Option<usize>,
}

/// Run every report against an existing store
pub fn run(config: &Config, observer: &mut dyn ReportObserver) -> Result<Vec<ReportSummary>> {
    let store = SqliteStore::open_existing(&config.database)?;
    tracing::info!("Opened store {} read-only", config.database.display());

    let mut summaries = Vec::with_capacity(ReportKind::ALL.len());
    for kind in ReportKind::ALL {
        let path = kind.output_path(config);
        let report = execute(store.connection(), kind, config.report.tolerance)?;
        observer.report_ready(&report, config.report.preview_rows);

        report.write_csv(path)?;
        tracing::info!("Wrote {} rows to {}", report.len(), path.display());

        let summary = ReportSummary {
            report: kind,
            path: path.to_path_buf(),
            rows: report.len(),
            mismatches: report.mismatches(),
        };
        observer.report_written(&summary);
        summaries.push(summary);
    }

    Ok(summaries)
}
