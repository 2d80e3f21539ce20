//! Requests understood by data-provider connectors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::IndexaError;

/// Native sampling frequency requested from a macro-series provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Frequency {
    /// Daily observations.
    Daily,
    /// Business-day observations.
    Business,
    /// Weekly observations.
    Weekly,
    /// Twice-monthly observations.
    Biweekly,
    /// Monthly observations.
    #[default]
    Monthly,
    /// Quarterly observations.
    Quarterly,
    /// Half-yearly observations.
    Semiannual,
    /// Yearly observations.
    Annual,
}

impl Frequency {
    /// Numeric frequency code used by macro-series providers (1 = daily .. 8 = annual).
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Daily => 1,
            Self::Business => 2,
            Self::Weekly => 3,
            Self::Biweekly => 4,
            Self::Monthly => 5,
            Self::Quarterly => 6,
            Self::Semiannual => 7,
            Self::Annual => 8,
        }
    }
}

/// Request for a periodic macro series over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodicRequest {
    code: String,
    start: NaiveDate,
    end: NaiveDate,
    frequency: Frequency,
}

impl PeriodicRequest {
    /// Build a validated request.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an empty code or when `start > end`.
    pub fn new(
        code: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        frequency: Frequency,
    ) -> Result<Self, IndexaError> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(IndexaError::InvalidArg("series code is empty".into()));
        }
        if start > end {
            return Err(IndexaError::InvalidArg(format!(
                "start {start} is after end {end} for {code}"
            )));
        }
        Ok(Self {
            code,
            start,
            end,
            frequency,
        })
    }

    /// Provider series code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Inclusive start date.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Inclusive end date.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Requested frequency.
    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        self.frequency
    }
}

/// What a point-observation request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationQuery {
    /// Observations around a single date; callers pick the nearest one.
    Around {
        /// Target date.
        date: NaiveDate,
        /// Search window on each side, in days.
        window_days: i64,
    },
    /// All observations in an inclusive range.
    Range {
        /// Inclusive start.
        start: NaiveDate,
        /// Inclusive end.
        end: NaiveDate,
    },
    /// The most recent observation only.
    Latest,
}

/// Request for point observations of a single series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObservationRequest {
    code: String,
    query: ObservationQuery,
}

impl ObservationRequest {
    /// Default search window around a single date, in days.
    pub const DEFAULT_WINDOW_DAYS: i64 = 180;

    /// Build a validated request.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an empty code, an inverted range, or a negative window.
    pub fn new(code: impl Into<String>, query: ObservationQuery) -> Result<Self, IndexaError> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(IndexaError::InvalidArg("series code is empty".into()));
        }
        match query {
            ObservationQuery::Range { start, end } if start > end => {
                return Err(IndexaError::InvalidArg(format!(
                    "start {start} is after end {end} for {code}"
                )));
            }
            ObservationQuery::Around { window_days, .. } if window_days < 0 => {
                return Err(IndexaError::InvalidArg(format!(
                    "negative search window {window_days} for {code}"
                )));
            }
            _ => {}
        }
        Ok(Self { code, query })
    }

    /// Observations around `date` within the default window.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an empty code.
    pub fn around(code: impl Into<String>, date: NaiveDate) -> Result<Self, IndexaError> {
        Self::new(
            code,
            ObservationQuery::Around {
                date,
                window_days: Self::DEFAULT_WINDOW_DAYS,
            },
        )
    }

    /// Provider series code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Query shape.
    #[must_use]
    pub const fn query(&self) -> ObservationQuery {
        self.query
    }
}
