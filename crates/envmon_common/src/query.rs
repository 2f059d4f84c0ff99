//! Windowed queries against the reading store.
//!
//! The query service only ever reports failures. Deciding to synthesize a
//! replacement series is left to its caller (see `series`).

use crate::metric::{InvalidMetricType, MetricType};
use crate::reading::DataPoint;
use crate::store::{ReadingStore, StoreError};
use crate::time_frame::Window;
use std::sync::Arc;
use tracing::debug;

/// Failures of the read path
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Client asked for a metric outside the catalog
    #[error(transparent)]
    InvalidMetricType(#[from] InvalidMetricType),

    /// Store could not be reached or read
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),

    #[error("unexpected failure: {0}")]
    UnexpectedFailure(String),
}

impl QueryError {
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, QueryError::StorageUnavailable(_))
    }
}

/// Reads single-metric series out of the store
#[derive(Clone)]
pub struct TelemetryQueryService {
    store: Option<Arc<dyn ReadingStore>>,
}

impl TelemetryQueryService {
    pub fn new(store: Arc<dyn ReadingStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Service with no backing store; every query reports `StorageUnavailable`.
    pub fn detached() -> Self {
        Self { store: None }
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    pub fn store(&self) -> Option<&Arc<dyn ReadingStore>> {
        self.store.as_ref()
    }

    /// Validate a metric token against the catalog
    pub fn parse_metric(token: &str) -> Result<MetricType, QueryError> {
        Ok(token.parse::<MetricType>()?)
    }

    /// All stored points of `metric` at or after `window.start`, oldest first.
    ///
    /// An empty store yields an empty series, not an error.
    pub fn query(&self, metric: MetricType, window: &Window) -> Result<Vec<DataPoint>, QueryError> {
        let store = self.store.as_ref().ok_or(StoreError::NotConfigured)?;
        let points = store.readings_since(metric, window.start)?;
        debug!(
            "Query {} since {}: {} points",
            metric,
            window.start.to_rfc3339(),
            points.len()
        );
        Ok(points)
    }

    /// Like `query`, but takes the metric as an unvalidated token
    pub fn query_token(&self, token: &str, window: &Window) -> Result<Vec<DataPoint>, QueryError> {
        let metric = Self::parse_metric(token)?;
        self.query(metric, window)
    }
}
