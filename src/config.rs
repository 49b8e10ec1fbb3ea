use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::ingest::{CoercionPolicy, Fallback};

/// One source file and the table it loads into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceFile {
    pub table: String,
    pub path: PathBuf,
}

impl SourceFile {
    pub fn new(table: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            table: table.into(),
            path: path.into(),
        }
    }
}

/// Where report output is written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportPaths {
    pub detail: PathBuf,
    pub consistency: PathBuf,
}

impl Default for ReportPaths {
    fn default() -> Self {
        Self {
            detail: PathBuf::from("join_report.csv"),
            consistency: PathBuf::from("orders_consistency.csv"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    /// Load every file inside one transaction
    pub atomic: bool,
    /// Empty the target tables before loading
    pub fresh: bool,
    pub enforce_foreign_keys: bool,
    /// Stored when an integer field does not parse
    pub integer_fallback: Fallback,
    /// Stored when a decimal field does not parse
    pub decimal_fallback: Fallback,
}

impl Default for IngestConfig {
    fn default() -> Self {
        let policy = CoercionPolicy::default();
        Self {
            atomic: false,
            fresh: false,
            enforce_foreign_keys: false,
            integer_fallback: policy.integer_fallback,
            decimal_fallback: policy.decimal_fallback,
        }
    }
}

impl IngestConfig {
    pub fn coercion(&self) -> CoercionPolicy {
        CoercionPolicy {
            integer_fallback: self.integer_fallback,
            decimal_fallback: self.decimal_fallback,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Largest difference between item sum and stored total still reported as OK
    pub tolerance: f64,
    pub preview_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            preview_rows: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub database: PathBuf,
    pub sources: Vec<SourceFile>,
    pub reports: ReportPaths,
    pub ingest: IngestConfig,
    pub report: ReportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from("ecom.db"),
            sources: default_sources(),
            reports: ReportPaths::default(),
            ingest: IngestConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Config {
    /// Resolve relative source paths against `dir`
    pub fn with_data_dir(mut self, dir: &Path) -> Self {
        for source in &mut self.sources {
            source.path = resolve(dir, &source.path);
        }
        self
    }

    /// Resolve every relative path (sources, database, reports) against `dir`
    pub fn with_base_dir(mut self, dir: &Path) -> Self {
        self.database = resolve(dir, &self.database);
        self.reports.detail = resolve(dir, &self.reports.detail);
        self.reports.consistency = resolve(dir, &self.reports.consistency);
        self.with_data_dir(dir)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// The five exports, parents before children
pub fn default_sources() -> Vec<SourceFile> {
    [
        ("customers", "customers.csv"),
        ("products", "products.csv"),
        ("orders", "orders.csv"),
        ("order_items", "order_items.csv"),
        ("payments", "payments.csv"),
    ]
    .into_iter()
    .map(|(table, path)| SourceFile::new(table, path))
    .collect()
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("ecomdb.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<Config>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &Config, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> std::io::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
