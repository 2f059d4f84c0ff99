//! Sensor readings and the points projected out of them.

use crate::metric::MetricType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One charted sample. Serialized as `{ "x": timestamp, "y": value }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    #[serde(rename = "x")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "y")]
    pub value: f64,
}

impl DataPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// True when timestamps never go backwards
pub fn is_ascending(points: &[DataPoint]) -> bool {
    points.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
}

/// A complete multi-metric reading ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub power_consumption: f64,
    pub rms_current: f64,
    pub air_quality: i64,
}

impl NewReading {
    /// Typed accessor for a single quantity
    pub fn value(&self, metric: MetricType) -> f64 {
        match metric {
            MetricType::Temperature => self.temperature,
            MetricType::Humidity => self.humidity,
            MetricType::PowerConsumption => self.power_consumption,
            MetricType::RmsCurrent => self.rms_current,
            MetricType::AirQuality => self.air_quality as f64,
        }
    }
}

/// Ingestion validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReadingError {
    #[error("{0} must be a finite number")]
    NotFinite(MetricType),

    #[error("{0} must be an integer")]
    NotAnInteger(MetricType),

    #[error("{0} must not be negative")]
    Negative(MetricType),
}

/// Reading as posted by a device
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingPayload {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub temperatura: f64,
    pub humedad: f64,
    pub consumo_kwh: f64,
    pub corriente_rms: f64,
    pub calidad_aire: f64,
}

impl ReadingPayload {
    /// Validate and stamp the reading, using `now` when the device sent no timestamp.
    pub fn into_reading(self, now: DateTime<Utc>) -> Result<NewReading, ReadingError> {
        let air = self.calidad_aire;
        if !air.is_finite() {
            return Err(ReadingError::NotFinite(MetricType::AirQuality));
        }
        if air.fract() != 0.0 {
            return Err(ReadingError::NotAnInteger(MetricType::AirQuality));
        }
        if air < 0.0 {
            return Err(ReadingError::Negative(MetricType::AirQuality));
        }

        let reading = NewReading {
            timestamp: self.timestamp.unwrap_or(now),
            temperature: self.temperatura,
            humidity: self.humedad,
            power_consumption: self.consumo_kwh,
            rms_current: self.corriente_rms,
            air_quality: air as i64,
        };

        for metric in MetricType::ALL {
            if !reading.value(metric).is_finite() {
                return Err(ReadingError::NotFinite(metric));
            }
        }

        Ok(reading)
    }
}
