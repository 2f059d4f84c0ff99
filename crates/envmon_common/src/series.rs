//! Series resolution: query the store, fall back to synthesis.
//!
//! This is the only place where storage failures are absorbed. Invalid metric
//! tokens and unexpected failures still propagate to the caller.

use crate::metric::{MetricCatalog, MetricType};
use crate::query::{QueryError, TelemetryQueryService};
use crate::reading::DataPoint;
use crate::synth;
use crate::threshold::ThresholdSettings;
use crate::time_frame::{self, TimeFrame, Window};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Where series come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    /// Query the store, synthesize only when it is unavailable
    #[default]
    Database,
    /// Never touch the store
    Synthetic,
}

impl DataMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataMode::Database => "database",
            DataMode::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for DataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "database" | "db" => Ok(DataMode::Database),
            "synthetic" | "synth" => Ok(DataMode::Synthetic),
            other => Err(format!("unknown data mode '{}'", other)),
        }
    }
}

/// Whether a resolved series is real or synthesized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Stored,
    Synthetic,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Stored => "stored",
            Provenance::Synthetic => "synthetic",
        }
    }
}

/// One chart request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesRequest {
    pub metric: MetricType,
    pub time_frame: TimeFrame,
    pub threshold_override: Option<f64>,
}

impl SeriesRequest {
    pub fn new(metric: MetricType, time_frame: TimeFrame) -> Self {
        Self {
            metric,
            time_frame,
            threshold_override: None,
        }
    }

    /// Build a request from raw wire parameters.
    ///
    /// The metric must be valid; the time frame falls back to `day`.
    pub fn from_params(
        metric: &str,
        time_frame: Option<&str>,
        threshold_override: Option<f64>,
    ) -> Result<Self, QueryError> {
        Ok(Self {
            metric: TelemetryQueryService::parse_metric(metric)?,
            time_frame: TimeFrame::parse_lenient(time_frame),
            threshold_override,
        })
    }
}

/// Series plus the threshold it should be drawn against
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSeries {
    pub metric: MetricType,
    pub time_frame: TimeFrame,
    pub window: Window,
    pub points: Vec<DataPoint>,
    pub threshold: f64,
    pub provenance: Provenance,
}

/// Resolves chart requests against a query service and the data mode
#[derive(Clone)]
pub struct SeriesResolver {
    query: TelemetryQueryService,
    mode: DataMode,
    thresholds: ThresholdSettings,
}

impl SeriesResolver {
    pub fn new(query: TelemetryQueryService, mode: DataMode, thresholds: ThresholdSettings) -> Self {
        Self {
            query,
            mode,
            thresholds,
        }
    }

    pub fn mode(&self) -> DataMode {
        self.mode
    }

    pub fn query_service(&self) -> &TelemetryQueryService {
        &self.query
    }

    pub fn thresholds(&self) -> &ThresholdSettings {
        &self.thresholds
    }

    pub fn resolve<R: Rng + ?Sized>(
        &self,
        request: &SeriesRequest,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<ResolvedSeries, QueryError> {
        let metric = request.metric;
        let window = time_frame::resolve(request.time_frame, now);
        let threshold = self.thresholds.resolve(metric, request.threshold_override);

        let stored = match self.mode {
            DataMode::Synthetic => None,
            DataMode::Database => match self.query.query(metric, &window) {
                Ok(points) => Some(points),
                Err(QueryError::StorageUnavailable(e)) => {
                    warn!(
                        "Storage unavailable for {} ({}), serving synthetic series: {}",
                        metric, request.time_frame, e
                    );
                    None
                }
                Err(e) => return Err(e),
            },
        };

        let (points, provenance) = match stored {
            Some(points) => (points, Provenance::Stored),
            None => {
                let entry = MetricCatalog::entry(metric);
                let points =
                    synth::synthesize(metric, request.time_frame, entry, Some(threshold), now, rng);
                (points, Provenance::Synthetic)
            }
        };

        debug!(
            "Resolved {} {}: {} points ({}), threshold {}",
            metric,
            request.time_frame,
            points.len(),
            provenance.as_str(),
            threshold
        );

        Ok(ResolvedSeries {
            metric,
            time_frame: request.time_frame,
            window,
            points,
            threshold,
            provenance,
        })
    }
}
