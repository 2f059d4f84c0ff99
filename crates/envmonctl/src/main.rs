//! Envmon Control - CLI for seeding and inspecting sensor telemetry

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use envmon_common::seed::{DEFAULT_SEED_DAYS, DEFAULT_SEED_INTERVAL_MINUTES};
use envmon_common::store::READINGS_DB_PATH;

#[derive(Parser)]
#[command(name = "envmonctl")]
#[command(about = "Envmon - sensor telemetry tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Populate the reading store with random history
    Seed {
        /// Database file
        #[arg(long, default_value = READINGS_DB_PATH)]
        db: String,

        /// Days of history ending now
        #[arg(long, default_value_t = DEFAULT_SEED_DAYS)]
        days: i64,

        /// Minutes between readings
        #[arg(long, default_value_t = DEFAULT_SEED_INTERVAL_MINUTES)]
        interval_minutes: i64,

        /// Keep existing readings instead of clearing them first
        #[arg(long)]
        keep: bool,
    },

    /// Print a series as JSON
    Query {
        /// Metric token (temperatura, humedad, consumoKwh, corrienteRms, calidadAire)
        metric: String,

        /// hour, day, week, month or year
        #[arg(long)]
        time_frame: Option<String>,

        /// Alert threshold override
        #[arg(long)]
        threshold: Option<f64>,

        /// Database file
        #[arg(long, default_value = READINGS_DB_PATH)]
        db: String,

        /// Skip the store and synthesize
        #[arg(long)]
        synthetic: bool,
    },

    /// List supported metrics
    Catalog,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Seed {
            db,
            days,
            interval_minutes,
            keep,
        } => commands::seed(&db, days, interval_minutes, keep),
        Commands::Query {
            metric,
            time_frame,
            threshold,
            db,
            synthetic,
        } => commands::query(&metric, time_frame.as_deref(), threshold, &db, synthetic),
        Commands::Catalog => commands::catalog(),
    }
}
