//! indexa-core
//!
//! Core types, traits, and operations shared across the indexa ecosystem.
//!
//! - `types`: series, periods, tables, configuration and errors (re-exported from `indexa-types`).
//! - `connector`: the `IndexaConnector` trait and capability provider traits.
//! - `timeseries`: pure composition operations (expand, rebase, join, compound, recompose).
//!
//! Every operation in `timeseries` is synchronous and takes already-materialized
//! series; none of them performs I/O.
#![warn(missing_docs)]

/// Connector capability traits and the primary `IndexaConnector` interface.
pub mod connector;
/// Time-series composition operations.
pub mod timeseries;
pub mod types;

pub use connector::IndexaConnector;
pub use timeseries::compound::{Compounded, Splice, compound, compound_series, splice};
pub use timeseries::convert::{average, convert_currency};
pub use timeseries::expand::expand_monthly;
pub use timeseries::join::{Aligned, NearestIndex, NearestMatch, align_nearest, nearest};
pub use timeseries::normalize::{DateFormat, coerce_numeric, parse_date, parse_date_with, sanitize};
pub use timeseries::rebase::{Anchor, rebase};
pub use timeseries::recompose::{Recomposed, recompose};
pub use timeseries::stats::{SeriesSummary, YearChange, summarize};
pub use types::*;
