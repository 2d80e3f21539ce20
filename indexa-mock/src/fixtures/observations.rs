use chrono::NaiveDate;
use indexa_core::{Series, TimePoint};

use super::compounded;

/// US CPI with the missing October 2025 print as an absent point.
pub fn cpiaucsl() -> Series {
    let gap = NaiveDate::from_ymd_opt(2025, 10, 1);
    let s = compounded("CPIAUCSL", 247.8, |y| match y {
        2018 | 2019 => 0.19,
        2020 => 0.1,
        2021 => 0.55,
        2022 => 0.5,
        2023 => 0.3,
        _ => 0.25,
    });
    let points = s
        .points()
        .iter()
        .map(|p| {
            if Some(p.date) == gap {
                TimePoint::absent(p.date)
            } else {
                *p
            }
        })
        .collect();
    Series::new(s.name(), points)
}

/// Observation fixtures keyed by provider code.
pub fn by_code(code: &str) -> Option<Series> {
    match code {
        "CPIAUCSL" => Some(cpiaucsl()),
        _ => None,
    }
}
