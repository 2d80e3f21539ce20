use chrono::NaiveDate;

use crate::timeseries::rebase::{Anchor, rebase};
use crate::types::{IndexaError, MonthPeriod, PercentChangeSeries, Series, TimePoint};

/// Absolute levels produced by compounding a percent-change table from a seed.
#[derive(Debug, Clone, PartialEq)]
pub struct Compounded {
    /// Period whose change produced `levels[1]`.
    pub start: MonthPeriod,
    /// `levels[0]` is the seed; `levels[k]` is the level of period `start + (k - 1)`.
    pub levels: Vec<f64>,
    /// `UnsupportedPeriod` for the first month compounding could not cover: the start
    /// period when it is unknown, or the first month missing from the table after it.
    pub unsupported: Option<IndexaError>,
}

impl Compounded {
    /// Whether compounding stopped at the seed because the start period is unknown.
    #[must_use]
    pub fn is_seed_only(&self) -> bool {
        self.levels.len() == 1 && self.unsupported.is_some()
    }

    /// Period each compounded level belongs to, skipping the seed.
    pub fn periods(&self) -> impl Iterator<Item = (MonthPeriod, f64)> + '_ {
        self.levels
            .iter()
            .skip(1)
            .zip(0i32..)
            .filter_map(|(v, k)| self.start.offset(k).map(|p| (p, *v)))
    }
}

fn unsupported(period: MonthPeriod, table: &PercentChangeSeries) -> IndexaError {
    IndexaError::UnsupportedPeriod {
        period: period.to_string(),
        table: table.name().to_string(),
    }
}

/// Compound `table` from `start` onward: `v[0] = v0`, `v[k] = v[k-1] * (1 + pct_k / 100)`.
///
/// Periods are consumed month by month. An unknown start period yields the seed alone;
/// a month missing further on stops compounding there. Both cases carry
/// `UnsupportedPeriod` naming the month that was not covered.
#[must_use]
pub fn compound(v0: f64, start: MonthPeriod, table: &PercentChangeSeries) -> Compounded {
    let mut levels = vec![v0];
    let mut missing = None;
    let mut level = v0;
    let mut expected = Some(start);
    let last = table.last_period();
    while let Some(period) = expected.filter(|p| Some(*p) <= last) {
        let Some(pct) = table.get(period) else {
            missing = Some(unsupported(period, table));
            break;
        };
        level *= 1.0 + pct / 100.0;
        levels.push(level);
        expected = period.succ();
    }
    if levels.len() == 1 && missing.is_none() {
        missing = Some(unsupported(start, table));
    }
    Compounded {
        start,
        levels,
        unsupported: missing,
    }
}

/// Compound and date the levels by the month they belong to.
///
/// The seed keeps `seed_date`, which must fall in the month before `start`. The level
/// produced by period `P` is dated `P.first_day()`.
///
/// # Errors
/// `InvalidArg` when `seed_date` is not in the month preceding `start`.
pub fn compound_series(
    name: impl Into<String>,
    seed_date: NaiveDate,
    v0: f64,
    start: MonthPeriod,
    table: &PercentChangeSeries,
) -> Result<(Series, Option<IndexaError>), IndexaError> {
    if start.pred() != Some(MonthPeriod::of(seed_date)) {
        return Err(IndexaError::InvalidArg(format!(
            "seed dated {seed_date} does not precede compounding start {start}"
        )));
    }
    let compounded = compound(v0, start, table);
    let mut points = vec![TimePoint::new(seed_date, v0)];
    points.extend(
        compounded
            .periods()
            .map(|(p, v)| TimePoint::new(p.first_day(), v)),
    );
    let series = Series::try_from_sorted(name, points)?;
    Ok((series, compounded.unsupported))
}

/// A historical head joined to a compounded tail at a boundary period.
#[derive(Debug, Clone, PartialEq)]
pub struct Splice {
    /// Head (without its last point) followed by the compounded tail.
    pub series: Series,
    /// Period from which compounding took over.
    pub boundary: MonthPeriod,
    /// Last head value, used as the compounding seed.
    pub seed: f64,
    /// Date of the seed; the tail starts here.
    pub seed_date: NaiveDate,
    /// `UnsupportedPeriod` when the table does not cover the boundary onward.
    pub warnings: Vec<IndexaError>,
}

/// Splice a rebased historical segment with a compounded continuation.
///
/// The head is `historical` from `start` up to the first day of `boundary`
/// (exclusive), rebased to `rebase_to` at its first point when given. Its last value
/// seeds compounding from `boundary`; that last point is then dropped so the tail's
/// first level (equal to it) takes its place.
///
/// # Errors
/// `EmptyResult` when no historical point falls in `[start, boundary)`, `Data` when
/// the head does not reach the month before `boundary`, and `MissingAnchor` when the
/// head cannot be rebased or its last value is absent.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "indexa_core::splice",
        skip(historical, table),
        fields(series = historical.name(), start = %start, boundary = %boundary),
    )
)]
pub fn splice(
    historical: &Series,
    start: NaiveDate,
    boundary: MonthPeriod,
    table: &PercentChangeSeries,
    rebase_to: Option<f64>,
) -> Result<Splice, IndexaError> {
    let head = historical
        .between(Some(start), None)
        .before(boundary.first_day());
    let Some(last) = head.last() else {
        return Err(IndexaError::empty(format!(
            "{}: no history between {start} and {boundary}",
            historical.name()
        )));
    };
    let ends_in = MonthPeriod::of(last.date);
    if boundary.pred() != Some(ends_in) {
        return Err(IndexaError::Data(format!(
            "{}: history ends in {ends_in}, splicing at {boundary} needs the month before",
            historical.name()
        )));
    }
    let head = match rebase_to {
        Some(reference) => rebase(&head, Anchor::First, reference)?.into_series(),
        None => head,
    };
    let mut points = head.into_points();
    let Some(last) = points.pop() else {
        return Err(IndexaError::empty(historical.name()));
    };
    let seed = last
        .value
        .ok_or_else(|| IndexaError::missing_anchor(historical.name(), last.date, "absent"))?;

    let (tail, unsupported) =
        compound_series(historical.name(), last.date, seed, boundary, table)?;
    points.extend(tail.into_points());
    let series = Series::try_from_sorted(historical.name(), points)?;
    Ok(Splice {
        series,
        boundary,
        seed,
        seed_date: last.date,
        warnings: unsupported.into_iter().collect(),
    })
}
