use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the indexa workspace.
///
/// Composition failures (anchors, periods, join distances, columns, empty results)
/// double as warning annotations: local problems are collected into report
/// `warnings`, while failures that leave no usable output are returned as `Err`.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IndexaError {
    /// The rebasing anchor is missing, absent, or zero.
    #[error("missing anchor for {series} at {date}: {reason}")]
    MissingAnchor {
        /// Name of the series being rebased.
        series: String,
        /// Requested anchor date.
        date: NaiveDate,
        /// Why the anchor could not be used (e.g. "absent", "zero").
        reason: String,
    },

    /// The requested compounding start period is not in the percent-change table.
    #[error("unsupported period {period} in {table}")]
    UnsupportedPeriod {
        /// Requested period label (`MM-YYYY`).
        period: String,
        /// Name of the percent-change table.
        table: String,
    },

    /// A nearest-date match lies further away than the configured tolerance.
    #[error(
        "join tolerance exceeded for {series}: {query} matched {matched} ({distance_days}d > {tolerance_days}d)"
    )]
    JoinToleranceExceeded {
        /// Name of the reference series.
        series: String,
        /// Query date.
        query: NaiveDate,
        /// Matched reference date.
        matched: NaiveDate,
        /// Absolute day distance of the match.
        distance_days: i64,
        /// Configured tolerance in days.
        tolerance_days: i64,
    },

    /// An expected named column was not available.
    #[error("column '{column}' not found (available: {available:?})")]
    ColumnResolution {
        /// Requested column name.
        column: String,
        /// Columns that were available.
        available: Vec<String>,
    },

    /// A filter or provider query left zero rows.
    #[error("empty result: {what}")]
    EmptyResult {
        /// Description of what turned out empty, e.g. "price index 2020-01-01..2020-02-01".
        what: String,
    },

    /// An internal series invariant was violated (e.g. duplicate dates after expansion).
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// A raw value could not be parsed under any accepted format.
    #[error("unparseable {kind}: '{input}'")]
    Unparseable {
        /// What was being parsed ("date", "number", "period").
        kind: String,
        /// Offending input.
        input: String,
    },

    /// The requested capability is not implemented by any registered connector.
    #[error("unsupported capability: {capability}")]
    Unsupported {
        /// Capability label (e.g. "periodic-series").
        capability: String,
    },

    /// Issues with the returned or expected data.
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// An individual connector returned an error.
    #[error("{connector} failed: {msg}")]
    Connector {
        /// Connector name that failed.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A series or observation could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "series TP.FE.OKTG01".
        what: String,
    },

    /// All selected providers failed; contains the individual failures.
    #[error("all providers failed: {0:?}")]
    AllProvidersFailed(Vec<IndexaError>),

    /// An individual provider call exceeded the configured timeout.
    #[error("provider timed out: {capability} via {connector}")]
    ProviderTimeout {
        /// Connector name that timed out.
        connector: String,
        /// Capability label.
        capability: String,
    },

    /// The overall fetch stage exceeded the configured deadline.
    #[error("request timed out: {capability}")]
    RequestTimeout {
        /// Capability label for which the request timed out.
        capability: String,
    },

    /// All attempted providers timed out for the requested capability.
    #[error("all providers timed out: {capability}")]
    AllProvidersTimedOut {
        /// Capability label that timed out across all providers.
        capability: String,
    },
}

impl IndexaError {
    /// Helper: build an `Unsupported` error for a capability string.
    #[must_use]
    pub fn unsupported(cap: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: cap.into(),
        }
    }

    /// Helper: build a `Connector` error with the connector name and message.
    pub fn connector(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Connector {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `ProviderTimeout` error.
    pub fn provider_timeout(connector: impl Into<String>, capability: impl Into<String>) -> Self {
        Self::ProviderTimeout {
            connector: connector.into(),
            capability: capability.into(),
        }
    }

    /// Helper: build a `RequestTimeout` error.
    #[must_use]
    pub fn request_timeout(capability: impl Into<String>) -> Self {
        Self::RequestTimeout {
            capability: capability.into(),
        }
    }

    /// Helper: build a `MissingAnchor` error.
    pub fn missing_anchor(
        series: impl Into<String>,
        date: NaiveDate,
        reason: impl Into<String>,
    ) -> Self {
        Self::MissingAnchor {
            series: series.into(),
            date,
            reason: reason.into(),
        }
    }

    /// Helper: build an `EmptyResult` error.
    pub fn empty(what: impl Into<String>) -> Self {
        Self::EmptyResult { what: what.into() }
    }

    /// Helper: build an `Unparseable` error.
    pub fn unparseable(kind: impl Into<String>, input: impl Into<String>) -> Self {
        Self::Unparseable {
            kind: kind.into(),
            input: input.into(),
        }
    }

    /// Returns true if this error should be surfaced to users as actionable.
    ///
    /// Capability absence and benign not-found conditions are not actionable.
    /// Aggregates are classified based on their contents.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        match self {
            Self::Unsupported { .. } | Self::NotFound { .. } => false,
            Self::AllProvidersFailed(inner) => inner.iter().any(Self::is_actionable),
            _ => true,
        }
    }

    /// Flatten nested `AllProvidersFailed` structures into a plain vector.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::AllProvidersFailed(list) => list.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }
}
