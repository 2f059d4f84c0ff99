//! Fallback series synthesis.
//!
//! Produces a series with the same shape a chart would get from the store:
//! a fixed number of evenly spaced points ending just before `now`. Values
//! wander around the metric baseline, and a short excursion above the alert
//! threshold is injected near the end so threshold overlays always have
//! something to show.
//!
//! Randomness only affects values. Point count, spacing and timestamps depend
//! on `(time_frame, now)` alone.

use crate::metric::{MetricCatalogEntry, MetricType};
use crate::reading::DataPoint;
use crate::time_frame::TimeFrame;
use chrono::{DateTime, Utc};
use rand::Rng;

/// Half-width of the uniform noise added to the baseline
pub const NOISE_AMPLITUDE: f64 = 10.0;

/// Excursion values sit this far above the threshold
pub const EXCURSION_FACTOR: f64 = 1.2;

/// Hard bounds applied to synthesized values, if the metric has any
pub fn clamp_bounds(metric: MetricType) -> Option<(f64, f64)> {
    match metric {
        MetricType::Humidity => Some((0.0, 100.0)),
        MetricType::AirQuality => Some((0.0, 500.0)),
        MetricType::Temperature => Some((-10.0, 50.0)),
        MetricType::PowerConsumption | MetricType::RmsCurrent => None,
    }
}

/// Whether index `i` of an `n`-point series falls in the excursion window.
///
/// The window is the open interval `(0.7n, 0.8n)`; it can be empty for small `n`.
pub fn in_excursion(i: usize, n: usize) -> bool {
    let (i, n) = (i as f64, n as f64);
    i > n * 0.7 && i < n * 0.8
}

fn round_one_decimal(value: f64) -> f64 {
    let scaled = value * 10.0;
    if scaled.is_finite() {
        scaled.round() / 10.0
    } else {
        value
    }
}

/// Excursion value for `threshold`, saturated to the finite range
fn excursion_value(threshold: f64) -> f64 {
    (threshold * EXCURSION_FACTOR).clamp(f64::MIN, f64::MAX)
}

/// Build a synthetic series for `metric` over `time_frame`.
///
/// `threshold` overrides the catalog default used for the excursion.
pub fn synthesize<R: Rng + ?Sized>(
    metric: MetricType,
    time_frame: TimeFrame,
    entry: &MetricCatalogEntry,
    threshold: Option<f64>,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<DataPoint> {
    let (count, interval) = time_frame.synthetic_shape();
    let threshold = threshold.unwrap_or(entry.default_threshold);
    let bounds = clamp_bounds(metric);

    (0..count)
        .map(|i| {
            let timestamp = now - interval * (count - i) as i32;

            let mut value = entry.baseline + rng.gen_range(-NOISE_AMPLITUDE..NOISE_AMPLITUDE);
            if in_excursion(i, count) {
                value = excursion_value(threshold);
            }
            if let Some((lo, hi)) = bounds {
                value = value.clamp(lo, hi);
            }

            DataPoint::new(timestamp, round_one_decimal(value))
        })
        .collect()
}
