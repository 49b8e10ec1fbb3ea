use crate::report::{format_value, ReportSet};
use tabled::{builder::Builder, settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

/// Column names plus the first `limit` rows of a report
pub fn report_preview(report: &ReportSet, limit: usize) -> String {
    let mut builder = Builder::default();
    builder.push_record(report.columns.iter().cloned());
    for row in report.preview(limit) {
        builder.push_record(row.iter().map(|value| match value {
            rusqlite::types::Value::Null => "NULL".to_string(),
            other => format_value(other),
        }));
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportKind;
    use rusqlite::types::Value;

    #[test]
    fn test_stats_table_empty() {
        assert_eq!(stats_table(&[]), "");
        assert!(stats_table(&[("orders", "3")]).contains("orders"));
    }

    #[test]
    fn test_preview_limits_rows() {
        let report = ReportSet {
            kind: ReportKind::Consistency,
            columns: vec!["order_id".into(), "consistency_check".into()],
            rows: (0..12)
                .map(|i| vec![Value::Integer(i), Value::Text(format!("row-{i}"))])
                .collect(),
        };

        let rendered = report_preview(&report, 8);
        assert!(rendered.contains("consistency_check"));
        assert!(rendered.contains("row-7"));
        assert!(!rendered.contains("row-8"));
    }

    #[test]
    fn test_preview_shows_null() {
        let report = ReportSet {
            kind: ReportKind::Detail,
            columns: vec!["product_name".into()],
            rows: vec![vec![Value::Null]],
        };
        assert!(report_preview(&report, 8).contains("NULL"));
    }
}
