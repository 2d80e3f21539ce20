// Re-export helpers so tests can `use helpers::*;`
#![allow(dead_code)]

pub mod mock_connector;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Months, NaiveDate};
use indexa_core::{IndexaConnector, IndexaError, PercentChangeSeries, Series, TimePoint};
pub use mock_connector::MockConnector;

/// Series codes used across tests.
pub const CPI: &str = "TP.FE.OKTG01";
pub const USD: &str = "TP.DK.USD.S.YTL";
pub const RATIO: &str = "TP.RK.T1.Y";
pub const US_CPI: &str = "CPIAUCSL";

/// Construct a date for readability in tests.
pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Monthly series starting at `start`, one value per month.
pub fn monthly(name: &str, start: NaiveDate, values: &[f64]) -> Series {
    let points = values
        .iter()
        .zip(0u32..)
        .map(|(v, k)| TimePoint::new(start.checked_add_months(Months::new(k)).unwrap(), *v))
        .collect();
    Series::new(name, points)
}

/// Percent-change table starting at `first` ("MM-YYYY").
pub fn pct_table(first: &str, values: &[f64]) -> PercentChangeSeries {
    let mut period = first.parse().unwrap();
    let mut rows = Vec::new();
    for v in values {
        rows.push((period, *v));
        period = indexa_core::MonthPeriod::succ(period).unwrap();
    }
    PercentChangeSeries::new("alt", rows).unwrap()
}

/// Connector serving a single monthly series for every code.
pub fn m_series(name: &'static str, start: NaiveDate, values: &[f64]) -> Arc<dyn IndexaConnector> {
    MockConnector::builder()
        .name(name)
        .returns_series_ok(monthly(name, start, values))
        .build()
}

/// Connector serving a fixed series per code; unknown codes are `NotFound`.
pub fn m_catalogue(name: &'static str, series: Vec<(&str, Series)>) -> Arc<MockConnector> {
    let by_code: HashMap<String, Series> = series
        .into_iter()
        .map(|(code, s)| (code.to_string(), s))
        .collect();
    MockConnector::builder()
        .name(name)
        .with_periodic_fn(move |req| {
            by_code
                .get(req.code())
                .map(|s| {
                    s.between(Some(req.start()), Some(req.end()))
                        .renamed(req.code())
                })
                .ok_or_else(|| IndexaError::not_found(format!("series {}", req.code())))
        })
        .build()
}
