//! Series primitives: dated observations, ordered series and rebased index series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::IndexaError;

/// A single dated observation. `value` is `None` for a missing observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    /// Calendar date of the observation.
    pub date: NaiveDate,
    /// Observed value, or `None` when absent.
    pub value: Option<f64>,
}

impl TimePoint {
    /// Construct an observed point.
    #[must_use]
    pub const fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value: Some(value),
        }
    }

    /// Construct a point with an absent value.
    #[must_use]
    pub const fn absent(date: NaiveDate) -> Self {
        Self { date, value: None }
    }
}

/// An immutable, named, date-ordered sequence of observations.
///
/// Invariant: dates are strictly increasing. Constructors enforce it either by
/// sorting and collapsing duplicate dates (`new`) or by rejecting unordered input
/// (`try_from_sorted`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Series {
    name: String,
    points: Vec<TimePoint>,
}

impl Series {
    /// Build a series from unordered points.
    ///
    /// Points are sorted by date; duplicate dates collapse to the mean of their
    /// present values (absent when none of them is present).
    pub fn new(name: impl Into<String>, mut points: Vec<TimePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        let mut out: Vec<TimePoint> = Vec::with_capacity(points.len());
        let mut i = 0;
        while i < points.len() {
            let date = points[i].date;
            let mut j = i;
            let mut sum = 0.0;
            let mut count = 0u32;
            while j < points.len() && points[j].date == date {
                if let Some(v) = points[j].value {
                    sum += v;
                    count += 1;
                }
                j += 1;
            }
            let value = if count == 0 {
                None
            } else if j - i == 1 {
                points[i].value
            } else {
                Some(sum / f64::from(count))
            };
            out.push(TimePoint { date, value });
            i = j;
        }
        Self {
            name: name.into(),
            points: out,
        }
    }

    /// Build a series from `(date, value)` pairs, all present.
    pub fn from_values<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            name,
            values
                .into_iter()
                .map(|(d, v)| TimePoint::new(d, v))
                .collect(),
        )
    }

    /// Build a series from points that must already be strictly increasing.
    ///
    /// # Errors
    /// Returns `Invariant` if two consecutive points are not strictly increasing.
    pub fn try_from_sorted(
        name: impl Into<String>,
        points: Vec<TimePoint>,
    ) -> Result<Self, IndexaError> {
        let name = name.into();
        if let Some(w) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(IndexaError::Invariant(format!(
                "{name}: dates not strictly increasing at {} -> {}",
                w[0].date, w[1].date
            )));
        }
        Ok(Self { name, points })
    }

    /// An empty series. Empty series are valid, inert inputs for every operation.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: Vec::new(),
        }
    }

    /// Series name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return a copy carrying a different name.
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: self.points.clone(),
        }
    }

    /// Ordered points.
    #[must_use]
    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    /// Consume the series and return its points.
    #[must_use]
    pub fn into_points(self) -> Vec<TimePoint> {
        self.points
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&TimePoint> {
        self.points.first()
    }

    /// Last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&TimePoint> {
        self.points.last()
    }

    /// Iterate the dates in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    /// Iterate only the points carrying a present value.
    pub fn observed(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.value.map(|v| (p.date, v)))
    }

    /// Look up the point at an exact date.
    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<&TimePoint> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| &self.points[i])
    }

    /// Present value at an exact date, if any.
    #[must_use]
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.get(date).and_then(|p| p.value)
    }

    /// Inclusive date-range filter. `None` leaves that side unbounded.
    #[must_use]
    pub fn between(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let points = self
            .points
            .iter()
            .filter(|p| start.is_none_or(|s| p.date >= s) && end.is_none_or(|e| p.date <= e))
            .copied()
            .collect();
        Self {
            name: self.name.clone(),
            points,
        }
    }

    /// Points strictly before `date`.
    #[must_use]
    pub fn before(&self, date: NaiveDate) -> Self {
        let cut = self.points.partition_point(|p| p.date < date);
        Self {
            name: self.name.clone(),
            points: self.points[..cut].to_vec(),
        }
    }

    /// Apply `f` to every present value; absent values stay absent.
    #[must_use]
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            name: self.name.clone(),
            points: self
                .points
                .iter()
                .map(|p| TimePoint {
                    date: p.date,
                    value: p.value.map(&f),
                })
                .collect(),
        }
    }
}

/// A series rescaled so that `value(base_date) == base_value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSeries {
    series: Series,
    base_date: NaiveDate,
    base_value: f64,
}

impl IndexSeries {
    /// Default reference value for rebased indices.
    pub const DEFAULT_BASE: f64 = 100.0;

    /// Wrap a series as an index, checking the base invariant.
    ///
    /// # Errors
    /// Returns `Invariant` when the value at `base_date` is missing or differs from
    /// `base_value` beyond a 1e-9 relative tolerance.
    pub fn new(series: Series, base_date: NaiveDate, base_value: f64) -> Result<Self, IndexaError> {
        let at_base = series.value_at(base_date).ok_or_else(|| {
            IndexaError::Invariant(format!("{}: no value at base date {base_date}", series.name()))
        })?;
        let scale = base_value.abs().max(1.0);
        if (at_base - base_value).abs() > 1e-9 * scale {
            return Err(IndexaError::Invariant(format!(
                "{}: value {at_base} at base date {base_date} != {base_value}",
                series.name()
            )));
        }
        Ok(Self {
            series,
            base_date,
            base_value,
        })
    }

    /// Underlying series.
    #[must_use]
    pub const fn series(&self) -> &Series {
        &self.series
    }

    /// Date at which the index equals `base_value`.
    #[must_use]
    pub const fn base_date(&self) -> NaiveDate {
        self.base_date
    }

    /// Reference value at `base_date`.
    #[must_use]
    pub const fn base_value(&self) -> f64 {
        self.base_value
    }

    /// Discard index metadata.
    #[must_use]
    pub fn into_series(self) -> Series {
        self.series
    }
}

/// Maximum acceptable distance for a nearest-date match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinTolerance {
    days: i64,
}

impl JoinTolerance {
    /// Tolerance of `days` calendar days (negative inputs are treated as zero).
    #[must_use]
    pub const fn from_days(days: i64) -> Self {
        Self {
            days: if days < 0 { 0 } else { days },
        }
    }

    /// Tolerance in days.
    #[must_use]
    pub const fn days(self) -> i64 {
        self.days
    }

    /// Whether a match at `distance_days` is within tolerance.
    #[must_use]
    pub const fn allows(self, distance_days: i64) -> bool {
        distance_days <= self.days
    }
}
