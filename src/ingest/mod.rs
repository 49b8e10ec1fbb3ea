//! Ingestion pipeline
//!
//! Checks every source file up front, opens (or creates) the store, ensures
//! the schema and loads each file inside a transaction. By default each file
//! commits on its own; in atomic mode a single transaction spans all files.

pub mod coerce;
pub mod loader;

pub use coerce::{CoercionPolicy, Fallback, FieldKind};
pub use loader::{check_sources, clear_table, load_table, LoadStats};

use std::path::PathBuf;
use serde::Serialize;
use crate::config::{self, Config, IngestConfig, SourceFile};
use crate::storage::SqliteStore;
use crate::Result;

/// Receives per-file progress while the pipeline runs
pub trait IngestObserver {
    fn file_started(&mut self, _source: &SourceFile) {}
    fn file_loaded(&mut self, _stats: &LoadStats) {}
}

impl IngestObserver for () {}

/// Summary of a complete ingestion run
#[derive(Debug, Clone, Serialize)]
pub struct IngestSummary {
    pub database: PathBuf,
    pub atomic: bool,
    pub tables: Vec<LoadStats>,
}

impl IngestSummary {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }

    pub fn total_coercion_failures(&self) -> usize {
        self.tables.iter().map(|t| t.coercion_failures).sum()
    }
}

/// Run the full ingestion pipeline described by `config`
pub fn run(config: &Config, observer: &mut dyn IngestObserver) -> Result<IngestSummary> {
    check_sources(&config.sources)?;

    config::ensure_db_dir(&config.database)?;
    let mut store = SqliteStore::open(&config.database)?;
    tracing::info!("Opened store {}", config.database.display());

    let tables = load_sources(&mut store, &config.sources, &config.ingest, observer)?;

    Ok(IngestSummary {
        database: config.database.clone(),
        atomic: config.ingest.atomic,
        tables,
    })
}

/// Load `sources` into an initialized store
pub fn ingest(
    store: &mut SqliteStore,
    sources: &[SourceFile],
    options: &IngestConfig,
    observer: &mut dyn IngestObserver,
) -> Result<Vec<LoadStats>> {
    check_sources(sources)?;
    load_sources(store, sources, options, observer)
}

/// Callers must have run `check_sources` first
fn load_sources(
    store: &mut SqliteStore,
    sources: &[SourceFile],
    options: &IngestConfig,
    observer: &mut dyn IngestObserver,
) -> Result<Vec<LoadStats>> {
    store.set_foreign_keys(options.enforce_foreign_keys)?;

    let policy = options.coercion();
    let mut loaded = Vec::with_capacity(sources.len());

    if options.atomic {
        let tx = store.transaction()?;
        if options.fresh {
            for source in sources.iter().rev() {
                clear_table(&tx, &source.table)?;
            }
        }
        for source in sources {
            observer.file_started(source);
            let stats = load_table(&tx, &source.table, &source.path, &policy)?;
            tracing::info!("Queued {} rows for {}", stats.rows, stats.table);
            observer.file_loaded(&stats);
            loaded.push(stats);
        }
        tx.commit()?;
        tracing::info!("Committed {} tables", loaded.len());
    } else {
        if options.fresh {
            let tx = store.transaction()?;
            for source in sources.iter().rev() {
                clear_table(&tx, &source.table)?;
            }
            tx.commit()?;
        }
        for source in sources {
            observer.file_started(source);
            let tx = store.transaction()?;
            let stats = load_table(&tx, &source.table, &source.path, &policy)?;
            tx.commit()?;
            tracing::info!("Inserted {} rows into {}", stats.rows, stats.table);
            observer.file_loaded(&stats);
            loaded.push(stats);
        }
    }

    Ok(loaded)
}
