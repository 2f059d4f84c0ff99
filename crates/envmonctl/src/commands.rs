//! Command implementations for envmonctl

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use envmon_common::seed::seed_store;
use envmon_common::{
    DataMode, MetricCatalog, ReadingStore, SeriesRequest, SeriesResolver,
    SqliteReadingStore, TelemetryQueryService, ThresholdSettings,
};
use std::sync::Arc;
use tracing::warn;

pub fn seed(db: &str, days: i64, interval_minutes: i64, keep: bool) -> Result<()> {
    if days <= 0 || interval_minutes <= 0 {
        bail!("--days and --interval-minutes must be positive");
    }

    let Some(step) = Duration::try_minutes(interval_minutes) else {
        bail!("--interval-minutes {} is out of range", interval_minutes);
    };

    let store = SqliteReadingStore::open_at(db)
        .with_context(|| format!("Failed to open reading store at {}", db))?;

    let inserted = seed_store(
        &store,
        days,
        step,
        Utc::now(),
        keep,
        &mut rand::thread_rng(),
    )
    .context("Failed to seed reading store")?;

    println!("Seeded {} readings into {}", inserted, db);
    Ok(())
}

pub fn query(
    metric: &str,
    time_frame: Option<&str>,
    threshold: Option<f64>,
    db: &str,
    synthetic: bool,
) -> Result<()> {
    let request = SeriesRequest::from_params(metric, time_frame, threshold)?;

    let (query, mode) = if synthetic {
        (TelemetryQueryService::detached(), DataMode::Synthetic)
    } else {
        let query = match SqliteReadingStore::open_at(db) {
            Ok(store) => {
                let store: Arc<dyn ReadingStore> = Arc::new(store);
                TelemetryQueryService::new(store)
            }
            Err(e) => {
                warn!("Could not open {}: {}", db, e);
                TelemetryQueryService::detached()
            }
        };
        (query, DataMode::Database)
    };

    let resolver = SeriesResolver::new(query, mode, ThresholdSettings::default());
    let resolved = resolver.resolve(&request, Utc::now(), &mut rand::thread_rng())?;

    eprintln!(
        "{} over {}: {} points ({}), threshold {}",
        resolved.metric,
        resolved.time_frame,
        resolved.points.len(),
        resolved.provenance.as_str(),
        resolved.threshold
    );
    println!("{}", serde_json::to_string_pretty(&resolved.points)?);
    Ok(())
}

pub fn catalog() -> Result<()> {
    for entry in MetricCatalog::entries() {
        println!(
            "{:<14} {:<18} {:>6} {:<5} range [{}, {}], threshold {}",
            entry.metric_type.as_str(),
            entry.label,
            entry.baseline,
            entry.unit,
            entry.min,
            entry.max,
            entry.default_threshold
        );
    }
    Ok(())
}
