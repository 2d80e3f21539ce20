//! Indexa composes macroeconomic series fetched from multiple data providers.
//!
//! Overview
//! - Routes series requests to connectors that implement the `indexa_core` contracts.
//! - Applies per-code priorities to influence provider order.
//! - Runs a staged composition pipeline: fetch, normalize, expand, rebase, join,
//!   compound, recompose, emit.
//! - Normalizes error handling and exposes uniform domain types from `indexa_core`.
//!
//! Key behaviors and trade-offs
//! - Fetch strategy:
//!   - `PriorityWithFallback`: deterministic order, per-provider timeout, aggregates
//!     errors; fewer concurrent requests but potentially higher latency.
//!   - `Latency`: races eligible providers; lowest tail latency but higher request fanout.
//! - Joins are nearest-date with a tolerance. Matches beyond it are kept and annotated
//!   with a warning in the report rather than dropped.
//! - The alternative estimate is spliced onto history at a fixed boundary month
//!   (09-2020 by default); starts after the boundary compound directly.
//! - Price index and currency are required; optional series degrade to warnings.
//!
//! Examples
//! Building an orchestrator and composing a real-price table:
//! ```rust,ignore
//! use std::sync::Arc;
//! use indexa::{Indexa, CompositionConfig, DeflatorVariant};
//!
//! let evds = Arc::new(EvdsConnector::new_with_key("..."));
//! let indexa = Indexa::builder().with_connector(evds).build()?;
//!
//! let cfg = CompositionConfig {
//!     deflator: DeflatorVariant::Average,
//!     recompose: true,
//!     ..CompositionConfig::default()
//! };
//! let table = indexa::loader::load_percent_changes(std::fs::File::open("alt.csv")?, "alt")?;
//! let report = indexa.composition(cfg).alternative(table).run().await?;
//! for w in &report.warnings {
//!     eprintln!("warning: {w}");
//! }
//! ```
//!
//! Point lookups:
//! ```rust,ignore
//! let obs = indexa.nearest_observation("CPIAUCSL", date, Some(JoinTolerance::from_days(31))).await?;
//! let change = indexa.inflation_between("CPIAUCSL", start, end, None).await?;
//! ```
#![warn(missing_docs)]

pub(crate) mod core;
pub mod loader;
mod router;

pub use core::{Indexa, IndexaBuilder, tag_err};
pub use router::compose::{CompositionBuilder, Stage};

/// The staged composition pipeline.
pub mod pipeline {
    pub use crate::router::compose::{CompositionBuilder, Stage};
}
pub use router::util::collapse_errors;

// Re-export core types for convenience
pub use indexa_core::{
    Anchor,
    Attribution,
    Capability,
    ColumnKey,
    CompositeTable,
    CompositionConfig,
    CompositionReport,
    Coverage,
    DeflatorVariant,
    FetchStrategy,
    Frequency,
    IndexSeries,
    IndexaConfig,
    IndexaConnector,
    IndexaError,
    InflationReport,
    JoinTolerance,
    MonthPeriod,
    ObservationQuery,
    ObservationReport,
    ObservationRequest,
    PanelConfig,
    PercentChangeSeries,
    PeriodicRequest,
    SeriesCodes,
    Series,
    SeriesSummary,
    SpliceBoundary,
    TimePoint,
    summarize,
};
