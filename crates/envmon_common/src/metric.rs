//! Metric types and the static metric catalog.
//!
//! The set of measured quantities is closed. Each one has a catalog entry with
//! the baseline used by the fallback synthesizer, its valid range and the
//! default alert threshold drawn on charts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A measured quantity stored in every sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricType {
    #[serde(rename = "temperatura", alias = "temperature")]
    Temperature,
    #[serde(rename = "humedad", alias = "humidity")]
    Humidity,
    #[serde(rename = "consumoKwh", alias = "powerConsumption")]
    PowerConsumption,
    #[serde(rename = "corrienteRms", alias = "rmsCurrent")]
    RmsCurrent,
    #[serde(rename = "calidadAire", alias = "airQuality")]
    AirQuality,
}

/// Returned when a token does not name a known metric.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid metric type: {0}")]
pub struct InvalidMetricType(pub String);

impl MetricType {
    pub const ALL: [MetricType; 5] = [
        MetricType::Temperature,
        MetricType::Humidity,
        MetricType::PowerConsumption,
        MetricType::RmsCurrent,
        MetricType::AirQuality,
    ];

    /// Wire token used in URLs and JSON payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Temperature => "temperatura",
            MetricType::Humidity => "humedad",
            MetricType::PowerConsumption => "consumoKwh",
            MetricType::RmsCurrent => "corrienteRms",
            MetricType::AirQuality => "calidadAire",
        }
    }

    /// Column holding this metric in the readings table
    pub fn column(&self) -> &'static str {
        match self {
            MetricType::Temperature => "temperature",
            MetricType::Humidity => "humidity",
            MetricType::PowerConsumption => "power_consumption",
            MetricType::RmsCurrent => "rms_current",
            MetricType::AirQuality => "air_quality",
        }
    }

    /// Catalog entry for this metric
    pub fn entry(&self) -> &'static MetricCatalogEntry {
        MetricCatalog::entry(*self)
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = InvalidMetricType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temperatura" | "temperature" => Ok(MetricType::Temperature),
            "humedad" | "humidity" => Ok(MetricType::Humidity),
            "consumoKwh" | "powerConsumption" => Ok(MetricType::PowerConsumption),
            "corrienteRms" | "rmsCurrent" => Ok(MetricType::RmsCurrent),
            "calidadAire" | "airQuality" => Ok(MetricType::AirQuality),
            other => Err(InvalidMetricType(other.to_string())),
        }
    }
}

/// Static description of one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricCatalogEntry {
    pub metric_type: MetricType,
    /// Center value for synthesized series
    pub baseline: f64,
    pub min: f64,
    pub max: f64,
    /// Alert threshold when the caller supplies none
    pub default_threshold: f64,
    pub label: &'static str,
    pub unit: &'static str,
}

impl MetricCatalogEntry {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

static CATALOG: [MetricCatalogEntry; 5] = [
    MetricCatalogEntry {
        metric_type: MetricType::Temperature,
        baseline: 22.0,
        min: -10.0,
        max: 50.0,
        default_threshold: 30.0,
        label: "Temperatura",
        unit: "°C",
    },
    MetricCatalogEntry {
        metric_type: MetricType::Humidity,
        baseline: 60.0,
        min: 0.0,
        max: 100.0,
        default_threshold: 80.0,
        label: "Humedad",
        unit: "%",
    },
    MetricCatalogEntry {
        metric_type: MetricType::PowerConsumption,
        baseline: 5.0,
        min: 0.0,
        max: 100.0,
        default_threshold: 10.0,
        label: "Consumo",
        unit: "kW/h",
    },
    MetricCatalogEntry {
        metric_type: MetricType::RmsCurrent,
        baseline: 10.0,
        min: 0.0,
        max: 100.0,
        default_threshold: 15.0,
        label: "Corriente RMS",
        unit: "A",
    },
    MetricCatalogEntry {
        metric_type: MetricType::AirQuality,
        baseline: 80.0,
        min: 0.0,
        max: 500.0,
        default_threshold: 150.0,
        label: "Calidad del aire",
        unit: "AQI",
    },
];

/// Read-only registry of supported metrics.
pub struct MetricCatalog;

impl MetricCatalog {
    pub fn entry(metric: MetricType) -> &'static MetricCatalogEntry {
        // CATALOG is laid out in MetricType::ALL order
        match metric {
            MetricType::Temperature => &CATALOG[0],
            MetricType::Humidity => &CATALOG[1],
            MetricType::PowerConsumption => &CATALOG[2],
            MetricType::RmsCurrent => &CATALOG[3],
            MetricType::AirQuality => &CATALOG[4],
        }
    }

    pub fn entries() -> &'static [MetricCatalogEntry] {
        &CATALOG
    }
}
