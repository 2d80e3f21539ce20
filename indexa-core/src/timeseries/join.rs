use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{IndexaError, JoinTolerance, Series, TimePoint};

/// Result of matching one query date against a reference series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearestMatch {
    /// Date that was looked up.
    pub query: NaiveDate,
    /// Date of the matched reference observation.
    pub date: NaiveDate,
    /// Matched reference value.
    pub value: f64,
    /// `|date - query|` in days; always reported.
    pub distance_days: i64,
    /// Whether the distance exceeds the tolerance given to the lookup.
    pub exceeded: bool,
}

/// Sorted view over the observed points of a reference series for repeated lookups.
///
/// Building is O(n); each lookup is a binary search, so a bulk join over `m`
/// query dates costs O((n + m) log n).
#[derive(Debug, Clone)]
pub struct NearestIndex<'a> {
    name: &'a str,
    points: Vec<(NaiveDate, f64)>,
}

impl<'a> NearestIndex<'a> {
    /// Index the observed (present-valued) points of `reference`.
    #[must_use]
    pub fn new(reference: &'a Series) -> Self {
        Self {
            name: reference.name(),
            points: reference.observed().collect(),
        }
    }

    /// Number of indexed observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether there is nothing to match against.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closest observation to `query`; equidistant candidates resolve to the earlier date.
    #[must_use]
    pub fn lookup(&self, query: NaiveDate, tolerance: Option<JoinTolerance>) -> Option<NearestMatch> {
        let i = self.points.partition_point(|(d, _)| *d < query);
        let before = i.checked_sub(1).and_then(|j| self.points.get(j));
        let after = self.points.get(i);
        let (date, value) = match (before, after) {
            (Some(b), Some(a)) => {
                if (a.0 - query).num_days() < (query - b.0).num_days() {
                    *a
                } else {
                    *b
                }
            }
            (Some(p), None) | (None, Some(p)) => *p,
            (None, None) => return None,
        };
        let distance_days = (date - query).num_days().abs();
        Some(NearestMatch {
            query,
            date,
            value,
            distance_days,
            exceeded: tolerance.is_some_and(|t| !t.allows(distance_days)),
        })
    }

    fn tolerance_warning(&self, m: &NearestMatch, tolerance: JoinTolerance) -> IndexaError {
        IndexaError::JoinToleranceExceeded {
            series: self.name.to_string(),
            query: m.query,
            matched: m.date,
            distance_days: m.distance_days,
            tolerance_days: tolerance.days(),
        }
    }
}

/// Single-date nearest lookup over the observed points of `reference`.
#[must_use]
pub fn nearest(
    query: NaiveDate,
    reference: &Series,
    tolerance: Option<JoinTolerance>,
) -> Option<NearestMatch> {
    NearestIndex::new(reference).lookup(query, tolerance)
}

/// Output of a bulk nearest-date join.
#[derive(Debug, Clone, PartialEq)]
pub struct Aligned {
    /// Reference values placed on the query dates (absent where nothing matched).
    pub series: Series,
    /// One match per query date that found an observation, in query order.
    pub matches: Vec<NearestMatch>,
    /// `JoinToleranceExceeded` for every match beyond tolerance.
    pub warnings: Vec<IndexaError>,
}

/// Align `reference` onto `queries` by nearest date.
///
/// Matches beyond `tolerance` keep their value and are reported in `warnings`.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "indexa_core::align_nearest",
        skip(queries, reference),
        fields(reference = reference.name()),
    )
)]
pub fn align_nearest<I>(queries: I, reference: &Series, tolerance: Option<JoinTolerance>) -> Aligned
where
    I: IntoIterator<Item = NaiveDate>,
{
    let index = NearestIndex::new(reference);
    let mut points = Vec::new();
    let mut matches = Vec::new();
    let mut warnings = Vec::new();
    for q in queries {
        match index.lookup(q, tolerance) {
            Some(m) => {
                if m.exceeded
                    && let Some(t) = tolerance
                {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        series = reference.name(),
                        query = %m.query,
                        matched = %m.date,
                        distance_days = m.distance_days,
                        "nearest match beyond tolerance"
                    );
                    warnings.push(index.tolerance_warning(&m, t));
                }
                points.push(TimePoint::new(q, m.value));
                matches.push(m);
            }
            None => points.push(TimePoint::absent(q)),
        }
    }
    Aligned {
        series: Series::new(reference.name(), points),
        matches,
        warnings,
    }
}
