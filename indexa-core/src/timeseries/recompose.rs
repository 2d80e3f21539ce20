use chrono::NaiveDate;

use crate::types::{IndexaError, Series, TimePoint};

/// Output of [`recompose`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recomposed {
    /// Recomposed series, on the raw series' dates.
    pub series: Series,
    /// `Data` warnings for points that could not be recomposed.
    pub warnings: Vec<IndexaError>,
}

/// Replace the deflator embedded in `raw` from `splice_date` onward.
///
/// For every raw point after the first one at or after `splice_date`:
/// `(R * X) * (B / A) / X`, where `A` is the original deflator, `B` the replacement
/// and `X` the currency rate, all looked up by date. Earlier points and the anchor
/// point itself pass through unchanged. A missing operand or a zero `A`/`X` leaves
/// the point absent and records a warning.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "indexa_core::recompose",
        skip(raw, original, replacement, fx),
        fields(raw = raw.name(), splice = %splice_date),
    )
)]
pub fn recompose(
    raw: &Series,
    original: &Series,
    replacement: &Series,
    fx: &Series,
    splice_date: NaiveDate,
) -> Recomposed {
    let mut warnings = Vec::new();
    let mut anchored = false;
    let points = raw
        .points()
        .iter()
        .map(|p| {
            if p.date < splice_date {
                return *p;
            }
            if !anchored {
                anchored = true;
                return *p;
            }
            match recompose_point(p, original, replacement, fx) {
                Ok(v) => TimePoint::new(p.date, v),
                Err(reason) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(date = %p.date, reason, "point left absent");
                    warnings.push(IndexaError::Data(format!(
                        "{}: cannot recompose {}: {reason}",
                        raw.name(),
                        p.date
                    )));
                    TimePoint::absent(p.date)
                }
            }
        })
        .collect();
    Recomposed {
        series: Series::new(raw.name(), points),
        warnings,
    }
}

fn recompose_point(
    p: &TimePoint,
    original: &Series,
    replacement: &Series,
    fx: &Series,
) -> Result<f64, &'static str> {
    let r = p.value.ok_or("raw value absent")?;
    let a = original.value_at(p.date).ok_or("original deflator absent")?;
    let b = replacement
        .value_at(p.date)
        .ok_or("replacement deflator absent")?;
    let x = fx.value_at(p.date).ok_or("currency rate absent")?;
    if a == 0.0 {
        return Err("original deflator is zero");
    }
    if x == 0.0 {
        return Err("currency rate is zero");
    }
    Ok((r * x) * (b / a) / x)
}
