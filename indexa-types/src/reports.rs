//! Report envelopes produced by the orchestrator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::attribution::Attribution;
use crate::error::IndexaError;
use crate::table::CompositeTable;

/// Result of a composition run.
///
/// The table is always complete for the columns it carries; problems local to a
/// point or a series are listed in `warnings`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompositionReport {
    /// Joined, rebased and recomposed columns.
    pub table: CompositeTable,
    /// Connectors that supplied each fetched series.
    pub attribution: Attribution,
    /// Non-fatal issues encountered while building the table.
    pub warnings: Vec<IndexaError>,
}

/// Result of a nearest-observation lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationReport {
    /// Series code queried.
    pub code: String,
    /// Requested date (`None` for a latest-observation query).
    pub requested: Option<NaiveDate>,
    /// Date of the returned observation.
    pub date: NaiveDate,
    /// Observed value.
    pub value: f64,
    /// Absolute distance in days between `requested` and `date` (0 for latest).
    pub distance_days: i64,
    /// Connector that answered.
    pub connector: String,
    /// Non-fatal issues (e.g. the match lies outside the tolerance).
    pub warnings: Vec<IndexaError>,
}

/// Percent change of a series between two observation lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InflationReport {
    /// Observation nearest to the start date.
    pub start: ObservationReport,
    /// Observation nearest to the end date.
    pub end: ObservationReport,
    /// `(end / start - 1) * 100`.
    pub change_pct: f64,
}
