use chrono::NaiveDate;

use crate::timeseries::join::nearest;
use crate::types::{IndexSeries, IndexaError, JoinTolerance, Series};

/// Where a rebased index is pinned to its reference value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// The first point of the series.
    #[default]
    First,
    /// The point at exactly this date.
    On(NaiveDate),
    /// The observed point nearest to this date, optionally within a tolerance.
    Nearest {
        /// Target date.
        date: NaiveDate,
        /// Maximum accepted distance; `None` accepts any distance.
        tolerance: Option<JoinTolerance>,
    },
}

/// Rescale `series` so the anchor point equals `reference`.
///
/// Every present value becomes `value * reference / value_at_anchor`; absent values
/// stay absent.
///
/// # Errors
/// Returns `MissingAnchor` when the anchor date is not in the series, its value is
/// absent, zero or non-finite, or (for `Anchor::Nearest`) no observation lies
/// within tolerance. Returns `EmptyResult` for an empty series.
pub fn rebase(series: &Series, anchor: Anchor, reference: f64) -> Result<IndexSeries, IndexaError> {
    let (base_date, base) = resolve(series, anchor)?;
    if base == 0.0 {
        return Err(IndexaError::missing_anchor(series.name(), base_date, "zero"));
    }
    if !base.is_finite() {
        return Err(IndexaError::missing_anchor(
            series.name(),
            base_date,
            "non-finite",
        ));
    }
    let out = series.map_values(|v| v * reference / base);
    IndexSeries::new(out, base_date, reference)
}

fn resolve(series: &Series, anchor: Anchor) -> Result<(NaiveDate, f64), IndexaError> {
    let absent = |date| IndexaError::missing_anchor(series.name(), date, "absent");
    match anchor {
        Anchor::First => {
            let first = series.first().ok_or_else(|| {
                IndexaError::empty(format!("{}: nothing to rebase", series.name()))
            })?;
            first
                .value
                .map(|v| (first.date, v))
                .ok_or_else(|| absent(first.date))
        }
        Anchor::On(date) => {
            let p = series.get(date).ok_or_else(|| {
                IndexaError::missing_anchor(series.name(), date, "date not in series")
            })?;
            p.value.map(|v| (date, v)).ok_or_else(|| absent(date))
        }
        Anchor::Nearest { date, tolerance } => {
            let m = nearest(date, series, tolerance).ok_or_else(|| {
                IndexaError::missing_anchor(series.name(), date, "no observations")
            })?;
            if m.exceeded {
                return Err(IndexaError::missing_anchor(
                    series.name(),
                    date,
                    format!(
                        "nearest observation {} is {} days away",
                        m.date, m.distance_days
                    ),
                ));
            }
            Ok((m.date, m.value))
        }
    }
}
