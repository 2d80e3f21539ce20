//! Shared data model for the indexa workspace: series primitives, calendar-month
//! periods, composite tables, configuration and the unified error type.
#![warn(missing_docs)]

mod attribution;
mod capability;
mod config;
mod connector;
mod error;
mod period;
mod reports;
mod request;
mod series;
mod table;

pub use attribution::{Attribution, Coverage};
pub use capability::Capability;
pub use config::{
    CompositionConfig, DEFAULT_EXPANSION_HORIZON_MONTHS, DeflatorVariant, FetchStrategy,
    IndexaConfig, PanelConfig, SeriesCodes, SpliceBoundary,
};
pub use connector::ConnectorKey;
pub use error::IndexaError;
pub use period::{MonthPeriod, PercentChangeSeries};
pub use reports::{CompositionReport, InflationReport, ObservationReport};
pub use request::{Frequency, ObservationQuery, ObservationRequest, PeriodicRequest};
pub use series::{IndexSeries, JoinTolerance, Series, TimePoint};
pub use table::{Column, ColumnKey, CompositeTable};
