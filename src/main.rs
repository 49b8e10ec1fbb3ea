//! ecomdb CLI - load e-commerce exports into SQLite and reconcile order totals

mod commands;

use clap::{Parser, Subcommand};
use ecomdb::config::{self, Config};
use ecomdb::output::{error_json, OutputMode};
use ecomdb::ui;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ecomdb")]
#[command(version)]
#[command(about = "Load e-commerce CSV exports into SQLite and reconcile order totals")]
#[command(long_about = r#"
ecomdb loads customers, products, orders, order items and payments from CSV
exports into a SQLite database, then writes two reports:
  • join_report.csv          one row per order line item
  • orders_consistency.csv   summed line totals vs. stored order totals

Example usage:
  ecomdb init
  ecomdb ingest --data-dir ./exports
  ecomdb report
  ecomdb run --atomic --fresh
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Directory containing the CSV exports
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print machine-readable JSON summaries
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug, Default)]
struct IngestArgs {
    /// Load every file in one transaction; any failure leaves the store untouched
    #[arg(long)]
    atomic: bool,

    /// Empty the tables before loading
    #[arg(long)]
    fresh: bool,

    /// Enforce declared foreign keys while loading
    #[arg(long)]
    enforce_fk: bool,
}

#[derive(clap::Args, Debug, Default)]
struct ReportArgs {
    /// Largest difference between item sum and order total reported as OK
    #[arg(long)]
    tolerance: Option<f64>,

    /// Number of rows shown per report preview
    #[arg(long)]
    preview: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Create the schema and load the CSV exports
    Ingest {
        #[command(flatten)]
        args: IngestArgs,
    },

    /// Run the join and reconciliation reports
    Report {
        #[command(flatten)]
        args: ReportArgs,
    },

    /// Ingest then report
    Run {
        #[command(flatten)]
        ingest: IngestArgs,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Show row counts and referential gaps
    Stats,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Init { .. } => "init",
            Commands::Ingest { .. } => "ingest",
            Commands::Report { .. } => "report",
            Commands::Run { .. } => "run",
            Commands::Stats => "stats",
        }
    }
}

impl IngestArgs {
    fn apply(&self, config: &mut Config) {
        config.ingest.atomic |= self.atomic;
        config.ingest.fresh |= self.fresh;
        config.ingest.enforce_foreign_keys |= self.enforce_fk;
    }
}

impl ReportArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(tolerance) = self.tolerance {
            config.report.tolerance = tolerance;
        }
        if let Some(preview) = self.preview {
            config.report.preview_rows = preview;
        }
    }
}

fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = config::load_config(cli.config.as_deref())?.unwrap_or_default();
    if let Some(database) = &cli.database {
        config.database = database.clone();
    }
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir);
    }

    match &cli.command {
        Commands::Ingest { args } => args.apply(&mut config),
        Commands::Report { args } => args.apply(&mut config),
        Commands::Run { ingest, report } => {
            ingest.apply(&mut config);
            report.apply(&mut config);
        }
        Commands::Init { .. } | Commands::Stats => {}
    }
    Ok(config)
}

fn dispatch(cli: &Cli, mode: OutputMode) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Init { force } => {
            let path = cli.config.clone().unwrap_or_else(config::default_config_path);
            commands::run_init(&path, &Config::default(), *force, mode)
        }
        Commands::Ingest { .. } => commands::run_ingest(&resolve_config(cli)?, mode),
        Commands::Report { .. } => commands::run_report(&resolve_config(cli)?, mode),
        Commands::Run { .. } => commands::run_all(&resolve_config(cli)?, mode),
        Commands::Stats => commands::run_stats(&resolve_config(cli)?, mode),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mode = OutputMode::from_flag(cli.json);

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match dispatch(&cli, mode) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("{:?}", e);
            if mode.is_human() {
                ui::error(&format!("{e:#}"));
            } else {
                println!("{}", error_json(cli.command.name(), &format!("{e:#}")));
            }
            ExitCode::FAILURE
        }
    }
}
