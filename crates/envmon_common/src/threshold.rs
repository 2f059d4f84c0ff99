//! Alert thresholds: resolution, exceedance flags and the chart overlay line.

use crate::metric::MetricType;
use crate::reading::DataPoint;
use crate::synth::EXCURSION_FACTOR;
use serde::{Deserialize, Serialize};

/// Per-metric threshold settings supplied by the caller.
///
/// Missing values fall back to the catalog default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSettings {
    #[serde(default)]
    pub temperatura: Option<f64>,
    #[serde(default)]
    pub humedad: Option<f64>,
    #[serde(default)]
    pub consumo_kwh: Option<f64>,
    #[serde(default)]
    pub corriente_rms: Option<f64>,
    #[serde(default)]
    pub calidad_aire: Option<f64>,
}

impl ThresholdSettings {
    pub fn get(&self, metric: MetricType) -> Option<f64> {
        match metric {
            MetricType::Temperature => self.temperatura,
            MetricType::Humidity => self.humedad,
            MetricType::PowerConsumption => self.consumo_kwh,
            MetricType::RmsCurrent => self.corriente_rms,
            MetricType::AirQuality => self.calidad_aire,
        }
    }

    pub fn set(&mut self, metric: MetricType, value: Option<f64>) {
        let slot = match metric {
            MetricType::Temperature => &mut self.temperatura,
            MetricType::Humidity => &mut self.humedad,
            MetricType::PowerConsumption => &mut self.consumo_kwh,
            MetricType::RmsCurrent => &mut self.corriente_rms,
            MetricType::AirQuality => &mut self.calidad_aire,
        };
        *slot = value;
    }

    /// Effective threshold: request override, then settings, then catalog default.
    ///
    /// Values whose synthesized excursion would not be a finite number are skipped.
    pub fn resolve(&self, metric: MetricType, request_override: Option<f64>) -> f64 {
        request_override
            .filter(|v| is_usable(*v))
            .or_else(|| self.get(metric).filter(|v| is_usable(*v)))
            .unwrap_or_else(|| metric.entry().default_threshold)
    }
}

fn is_usable(threshold: f64) -> bool {
    (threshold * EXCURSION_FACTOR * 10.0).is_finite()
}

/// A series with one exceedance flag per point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotated {
    pub series: Vec<DataPoint>,
    pub exceeded: Vec<bool>,
}

impl Annotated {
    /// Number of points above the threshold
    pub fn exceeded_count(&self) -> usize {
        self.exceeded.iter().filter(|e| **e).count()
    }
}

/// Min/max/avg placeholders for chart legends
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SeriesSummary {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
}

/// Flag every point strictly above `threshold`.
pub fn annotate(series: Vec<DataPoint>, threshold: f64) -> Annotated {
    let exceeded = series.iter().map(|p| p.value > threshold).collect();
    Annotated { series, exceeded }
}

/// Constant line at `threshold`, one point per input timestamp.
pub fn threshold_line(series: &[DataPoint], threshold: f64) -> Vec<DataPoint> {
    series
        .iter()
        .map(|p| DataPoint::new(p.timestamp, threshold))
        .collect()
}

pub fn summarize(series: &[DataPoint]) -> SeriesSummary {
    if series.is_empty() {
        return SeriesSummary::default();
    }

    let (min, max, sum) = series.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(min, max, sum), p| (min.min(p.value), max.max(p.value), sum + p.value),
    );

    SeriesSummary {
        min: Some(min),
        max: Some(max),
        avg: Some(sum / series.len() as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn series(values: &[f64]) -> Vec<DataPoint> {
        let t0 = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| DataPoint::new(t0 + Duration::hours(i as i64), *v))
            .collect()
    }

    #[test]
    fn test_annotate_is_strict() {
        let annotated = annotate(series(&[29.9, 30.0, 30.1]), 30.0);
        assert_eq!(annotated.exceeded, vec![false, false, true]);
        assert_eq!(annotated.exceeded_count(), 1);
    }

    #[test]
    fn test_annotate_idempotent() {
        let s = series(&[10.0, 50.0, 90.0, 80.0]);
        let first = annotate(s.clone(), 80.0);
        let second = annotate(first.series.clone(), 80.0);
        assert_eq!(first.exceeded, second.exceeded);
        assert_eq!(first.series, s);
    }

    #[test]
    fn test_empty_series() {
        let annotated = annotate(Vec::new(), 1.0);
        assert!(annotated.exceeded.is_empty());
        assert!(threshold_line(&[], 1.0).is_empty());
        assert_eq!(summarize(&[]), SeriesSummary::default());
    }

    #[test]
    fn test_threshold_line_follows_timestamps() {
        let s = series(&[1.0, 2.0, 3.0]);
        let line = threshold_line(&s, 150.0);
        assert_eq!(line.len(), 3);
        for (point, source) in line.iter().zip(&s) {
            assert_eq!(point.timestamp, source.timestamp);
            assert_eq!(point.value, 150.0);
        }
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&series(&[2.0, 4.0, 9.0]));
        assert_eq!(summary.min, Some(2.0));
        assert_eq!(summary.max, Some(9.0));
        assert_eq!(summary.avg, Some(5.0));
    }

    #[test]
    fn test_resolve_precedence() {
        let mut settings = ThresholdSettings::default();
        assert_eq!(settings.resolve(MetricType::Humidity, None), 80.0);

        settings.set(MetricType::Humidity, Some(70.0));
        assert_eq!(settings.resolve(MetricType::Humidity, None), 70.0);
        assert_eq!(settings.resolve(MetricType::Humidity, Some(65.0)), 65.0);
        assert_eq!(settings.resolve(MetricType::Humidity, Some(f64::NAN)), 70.0);
        assert_eq!(settings.resolve(MetricType::Humidity, Some(1e308)), 70.0);

        // other metrics untouched
        assert_eq!(settings.resolve(MetricType::AirQuality, None), 150.0);
    }

    #[test]
    fn test_resolve_skips_overflowing_thresholds() {
        let mut settings = ThresholdSettings::default();
        settings.set(MetricType::PowerConsumption, Some(f64::MAX));
        assert_eq!(settings.resolve(MetricType::PowerConsumption, Some(1e308)), 10.0);
        assert_eq!(settings.resolve(MetricType::PowerConsumption, Some(-1e308)), 10.0);
        assert_eq!(settings.resolve(MetricType::PowerConsumption, Some(1e300)), 1e300);
    }

    #[test]
    fn test_settings_from_toml_shape() {
        let settings: ThresholdSettings =
            serde_json::from_str(r#"{"temperatura": 28.5, "calidad_aire": 120}"#).unwrap();
        assert_eq!(settings.get(MetricType::Temperature), Some(28.5));
        assert_eq!(settings.get(MetricType::AirQuality), Some(120.0));
        assert_eq!(settings.get(MetricType::RmsCurrent), None);
    }
}
