//! CSV row loader - bulk insert of one source file into one table

use std::path::{Path, PathBuf};
use rusqlite::Connection;
use serde::Serialize;
use crate::config::SourceFile;
use crate::storage::schema::{self, quote_ident};
use crate::{Error, Result};
use super::coerce::{coerce_field, CoercionPolicy, FieldKind};

/// Outcome of loading one source file
#[derive(Debug, Clone, Serialize)]
pub struct LoadStats {
    pub table: String,
    pub path: PathBuf,
    pub rows: usize,
    pub coercion_failures: usize,
}

/// Verify every source names a known table and exists on disk.
/// Runs before the store is touched.
pub fn check_sources(sources: &[SourceFile]) -> Result<()> {
    for source in sources {
        if schema::table(&source.table).is_none() {
            return Err(Error::UnknownTable(source.table.clone()));
        }
    }
    for source in sources {
        if !source.path.exists() {
            return Err(Error::MissingInputFile {
                table: source.table.clone(),
                path: source.path.clone(),
            });
        }
    }
    Ok(())
}

/// Delete every row of a table, returning the number removed
pub fn clear_table(conn: &Connection, table: &str) -> Result<usize> {
    let schema = schema::table(table).ok_or_else(|| Error::UnknownTable(table.to_string()))?;
    let removed = conn.execute(&format!("DELETE FROM {}", quote_ident(schema.name)), [])?;
    tracing::debug!("Cleared {} rows from {}", removed, schema.name);
    Ok(removed)
}

/// Load one delimited file into `table`.
///
/// The header row names the target columns verbatim; it is not checked
/// against the schema, so a bad header surfaces as a storage error when the
/// insert statement is prepared. Every data row is coerced and inserted
/// through `conn`, which is normally an open transaction owned by the caller.
pub fn load_table(
    conn: &Connection,
    table: &str,
    path: &Path,
    policy: &CoercionPolicy,
) -> Result<LoadStats> {
    let schema = schema::table(table).ok_or_else(|| Error::UnknownTable(table.to_string()))?;

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(Error::EmptySource(path.to_path_buf()));
    }

    let columns: Vec<String> = headers.iter().map(quote_ident).collect();
    let placeholders: Vec<String> = (1..=headers.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(schema.name),
        columns.join(", "),
        placeholders.join(", ")
    );
    tracing::debug!("{}", sql);

    let kinds: Vec<FieldKind> = headers.iter().map(FieldKind::for_column).collect();
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = 0;
    let mut coercion_failures = 0;

    for record in reader.records() {
        let record = record?;
        let mut values = Vec::with_capacity(kinds.len());

        for ((kind, column), raw) in kinds.iter().zip(headers.iter()).zip(record.iter()) {
            let coerced = coerce_field(*kind, raw, policy);
            if coerced.is_substituted() {
                coercion_failures += 1;
                tracing::warn!(
                    table = schema.name,
                    line = record.position().map(|p| p.line()).unwrap_or_default(),
                    column,
                    raw,
                    "Could not parse {} value, stored {}",
                    kind.as_str(),
                    policy.fallback_for(*kind)
                );
            }
            values.push(coerced.into_value());
        }

        stmt.execute(rusqlite::params_from_iter(values.iter()))?;
        rows += 1;
    }

    Ok(LoadStats {
        table: schema.name.to_string(),
        path: path.to_path_buf(),
        rows,
        coercion_failures,
    })
}
