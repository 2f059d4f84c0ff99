//! Envmon Common - sensor telemetry series for charting
//!
//! Resolves symbolic time frames into query windows, projects single metrics
//! out of stored multi-metric readings, and synthesizes bounded replacement
//! series whenever the store cannot be read.

pub mod metric;
pub mod query;
pub mod reading;
pub mod seed;
pub mod series;
pub mod store;
pub mod synth;
pub mod threshold;
pub mod time_frame;

pub use metric::{InvalidMetricType, MetricCatalog, MetricCatalogEntry, MetricType};
pub use query::{QueryError, TelemetryQueryService};
pub use reading::{DataPoint, NewReading, ReadingError, ReadingPayload};
pub use seed::SeedError;
pub use series::{DataMode, Provenance, ResolvedSeries, SeriesRequest, SeriesResolver};
pub use store::{ReadingStore, SqliteReadingStore, StoreError};
pub use threshold::{Annotated, SeriesSummary, ThresholdSettings};
pub use time_frame::{TimeFrame, Window};
