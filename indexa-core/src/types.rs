//! Re-export of the shared data model from `indexa-types`.
// Consolidated re-exports so downstream crates can depend on `indexa-core` only

pub use indexa_types::{
    Attribution, Capability, Column, ColumnKey, CompositeTable, CompositionConfig,
    CompositionReport, ConnectorKey, Coverage, DEFAULT_EXPANSION_HORIZON_MONTHS,
    DeflatorVariant, FetchStrategy, Frequency, IndexSeries, IndexaConfig, IndexaError,
    InflationReport, JoinTolerance, MonthPeriod, ObservationQuery, ObservationReport,
    ObservationRequest, PanelConfig, PercentChangeSeries, PeriodicRequest, Series, SeriesCodes,
    SpliceBoundary, TimePoint,
};
