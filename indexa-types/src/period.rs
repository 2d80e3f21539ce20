//! Calendar-month periods and the period-keyed percent-change table.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::IndexaError;

/// A calendar month, labelled `MM-YYYY`.
///
/// Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthPeriod {
    pub(crate) year: i32,
    pub(crate) month: u32,
}

impl MonthPeriod {
    /// Construct a period.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `month` is outside `1..=12` or the year cannot be
    /// represented as a calendar date.
    pub fn new(year: i32, month: u32) -> Result<Self, IndexaError> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(IndexaError::InvalidArg(format!(
                "invalid month period {month:02}-{year}"
            )));
        }
        Ok(Self { year, month })
    }

    /// Period containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Calendar month (1-12).
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// First day of the month.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        // Validated on construction.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Shift by a signed number of months.
    #[must_use]
    pub fn offset(self, months: i32) -> Option<Self> {
        let first = self.first_day();
        let shifted = if months >= 0 {
            first.checked_add_months(Months::new(months.unsigned_abs()))
        } else {
            first.checked_sub_months(Months::new(months.unsigned_abs()))
        }?;
        Some(Self::of(shifted))
    }

    /// The following month.
    #[must_use]
    pub fn succ(self) -> Option<Self> {
        self.offset(1)
    }

    /// The preceding month.
    #[must_use]
    pub fn pred(self) -> Option<Self> {
        self.offset(-1)
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{}", self.month, self.year)
    }
}

impl FromStr for MonthPeriod {
    type Err = IndexaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || IndexaError::unparseable("period", s);
        let (m, y) = s.trim().split_once('-').ok_or_else(bad)?;
        let month: u32 = m.parse().map_err(|_| bad())?;
        let year: i32 = y.parse().map_err(|_| bad())?;
        Self::new(year, month).map_err(|_| bad())
    }
}

impl Serialize for MonthPeriod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthPeriod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Period-over-period percentage changes keyed by calendar month.
///
/// This is a lookup table, not a continuous function: unknown periods yield `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentChangeSeries {
    name: String,
    entries: BTreeMap<MonthPeriod, f64>,
}

impl PercentChangeSeries {
    /// Build a table from `(period, percent)` rows.
    ///
    /// # Errors
    /// Returns `InvalidArg` on duplicate periods and `Data` on non-finite changes.
    pub fn new<I>(name: impl Into<String>, rows: I) -> Result<Self, IndexaError>
    where
        I: IntoIterator<Item = (MonthPeriod, f64)>,
    {
        let name = name.into();
        let mut entries = BTreeMap::new();
        for (period, pct) in rows {
            if !pct.is_finite() {
                return Err(IndexaError::Data(format!(
                    "{name}: non-finite change {pct} at {period}"
                )));
            }
            if entries.insert(period, pct).is_some() {
                return Err(IndexaError::InvalidArg(format!(
                    "{name}: duplicate period {period}"
                )));
            }
        }
        Ok(Self { name, entries })
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Percent change for `period`, if the table covers it.
    #[must_use]
    pub fn get(&self, period: MonthPeriod) -> Option<f64> {
        self.entries.get(&period).copied()
    }

    /// Whether the table covers `period`.
    #[must_use]
    pub fn contains(&self, period: MonthPeriod) -> bool {
        self.entries.contains_key(&period)
    }

    /// Earliest covered period.
    #[must_use]
    pub fn first_period(&self) -> Option<MonthPeriod> {
        self.entries.keys().next().copied()
    }

    /// Latest covered period.
    #[must_use]
    pub fn last_period(&self) -> Option<MonthPeriod> {
        self.entries.keys().next_back().copied()
    }

    /// Rows from `start` (inclusive) onward, in period order.
    pub fn from_period(&self, start: MonthPeriod) -> impl Iterator<Item = (MonthPeriod, f64)> + '_ {
        self.entries.range(start..).map(|(p, v)| (*p, *v))
    }

    /// All rows in period order.
    pub fn iter(&self) -> impl Iterator<Item = (MonthPeriod, f64)> + '_ {
        self.entries.iter().map(|(p, v)| (*p, *v))
    }

    /// Number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
