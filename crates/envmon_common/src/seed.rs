//! Realistic raw readings for populating a store.

use crate::reading::NewReading;
use crate::store::{ReadingStore, StoreError};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::info;

/// Default span of seeded history
pub const DEFAULT_SEED_DAYS: i64 = 7;

/// Default spacing between seeded readings
pub const DEFAULT_SEED_INTERVAL_MINUTES: i64 = 5;

/// Seeding failures
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("seed span of {0} days is out of range")]
    SpanOutOfRange(i64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// One random reading at `timestamp`
pub fn random_reading<R: Rng + ?Sized>(timestamp: DateTime<Utc>, rng: &mut R) -> NewReading {
    NewReading {
        timestamp,
        temperature: round_to(15.0 + rng.gen::<f64>() * 20.0, 1),
        humidity: round_to(40.0 + rng.gen::<f64>() * 50.0, 1),
        power_consumption: round_to(1.0 + rng.gen::<f64>() * 10.0, 2),
        rms_current: round_to(5.0 + rng.gen::<f64>() * 15.0, 2),
        air_quality: (20.0 + rng.gen::<f64>() * 400.0).floor() as i64,
    }
}

/// Readings every `step` from `start` through `end` inclusive.
///
/// A non-positive step yields an empty batch.
pub fn generate_readings<R: Rng + ?Sized>(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
    rng: &mut R,
) -> Vec<NewReading> {
    if step <= Duration::zero() {
        return Vec::new();
    }

    let mut readings = Vec::new();
    let mut current = start;
    while current <= end {
        readings.push(random_reading(current, rng));
        match current.checked_add_signed(step) {
            Some(next) => current = next,
            None => break,
        }
    }
    readings
}

/// Fill `store` with `days` of history ending at `now`.
///
/// Existing readings are removed first unless `keep_existing` is set.
pub fn seed_store<R: Rng + ?Sized>(
    store: &dyn ReadingStore,
    days: i64,
    step: Duration,
    now: DateTime<Utc>,
    keep_existing: bool,
    rng: &mut R,
) -> Result<usize, SeedError> {
    let start = Duration::try_days(days)
        .and_then(|span| now.checked_sub_signed(span))
        .ok_or(SeedError::SpanOutOfRange(days))?;

    if !keep_existing {
        let removed = store.clear()?;
        info!("Removed {} existing readings", removed);
    }

    let readings = generate_readings(start, now, step, rng);
    info!("Inserting {} readings", readings.len());
    Ok(store.insert_batch(&readings)?)
}
