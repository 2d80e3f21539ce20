use chrono::Months;

use crate::types::{IndexaError, Series, TimePoint};

/// Upsample a sparse series to one point per calendar month by step repetition.
///
/// Each source point `d_i` is repeated at `d_i + k months` for every `k >= 0` while
/// the date stays before `d_{i+1}`; the last point extends to
/// `d_last + horizon_months` (exclusive). Offsets are computed from the anchor, not
/// chained, so day-of-month clamping (Jan 31 -> Feb 29) never drifts later points.
/// Every anchor point is kept, even with a zero horizon.
///
/// # Errors
/// Returns `Invariant` if the expansion produces a duplicate or out-of-order date,
/// which can only happen when the input violates the series ordering invariant.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "indexa_core::expand_monthly",
        skip(series),
        fields(series = series.name(), points = series.len()),
    )
)]
pub fn expand_monthly(series: &Series, horizon_months: u32) -> Result<Series, IndexaError> {
    let src = series.points();
    let mut out: Vec<TimePoint> = Vec::with_capacity(src.len() * 6);
    for (i, p) in src.iter().enumerate() {
        let upper = match src.get(i + 1) {
            Some(next) => Some(next.date),
            None => p.date.checked_add_months(Months::new(horizon_months)),
        };
        out.push(*p);
        let mut k = 1u32;
        while let Some(date) = p.date.checked_add_months(Months::new(k)) {
            if upper.is_none_or(|u| date >= u) {
                break;
            }
            out.push(TimePoint {
                date,
                value: p.value,
            });
            k += 1;
        }
    }
    Series::try_from_sorted(series.name(), out)
}
