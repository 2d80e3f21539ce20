use crate::types::{IndexaError, Series, TimePoint};

/// Per-date mean of two series over their common dates.
///
/// A date where either side is absent yields an absent point.
#[must_use]
pub fn average(name: impl Into<String>, a: &Series, b: &Series) -> Series {
    combine(name, a, b, |x, y| Some((x + y) / 2.0))
}

/// Convert local-currency values into a second currency as `local / fx`.
///
/// Only dates present in both series survive. A zero rate yields an absent point and
/// a `Data` warning.
pub fn convert_currency(local: &Series, fx: &Series) -> (Series, Vec<IndexaError>) {
    let mut warnings = Vec::new();
    let out = combine(local.name(), local, fx, |l, x| {
        if x == 0.0 {
            warnings.push(IndexaError::Data(format!(
                "{}: zero exchange rate in {}",
                local.name(),
                fx.name()
            )));
            None
        } else {
            Some(l / x)
        }
    });
    (out, warnings)
}

fn combine(
    name: impl Into<String>,
    a: &Series,
    b: &Series,
    mut f: impl FnMut(f64, f64) -> Option<f64>,
) -> Series {
    let points = a
        .points()
        .iter()
        .filter_map(|p| {
            let other = b.get(p.date)?;
            let value = match (p.value, other.value) {
                (Some(x), Some(y)) => f(x, y),
                _ => None,
            };
            Some(TimePoint {
                date: p.date,
                value,
            })
        })
        .collect();
    Series::new(name, points)
}
