pub mod macro_series;
pub mod observations;

use chrono::{Datelike, Months, NaiveDate};
use indexa_core::{Series, TimePoint};

/// First month covered by every fixture.
pub const FIRST: (i32, u32) = (2018, 1);
/// Number of monthly points in every fixture (2018-01 through 2025-12).
pub const MONTHS: u32 = 96;

pub fn first_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(FIRST.0, FIRST.1, 1).unwrap_or(NaiveDate::MIN)
}

/// Compound `start` by a monthly rate chosen per calendar year.
pub fn compounded(name: &str, start: f64, monthly_pct: impl Fn(i32) -> f64) -> Series {
    let base = first_day();
    let mut level = start;
    let mut points = Vec::with_capacity(MONTHS as usize);
    for k in 0..MONTHS {
        let Some(date) = base.checked_add_months(Months::new(k)) else {
            break;
        };
        points.push(TimePoint::new(date, (level * 1e4).round() / 1e4));
        level *= 1.0 + monthly_pct(date.year()) / 100.0;
    }
    Series::new(name, points)
}
