use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::Series;

/// Change between the mean values of two consecutive calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearChange {
    /// Later year.
    pub year: i32,
    /// Mean of the later year's observations.
    pub mean: f64,
    /// Percent change against the previous year's mean.
    pub change_pct: f64,
}

/// Descriptive statistics over the observed points of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    /// Series name.
    pub name: String,
    /// Number of observed points.
    pub count: usize,
    /// First observation.
    pub first: (NaiveDate, f64),
    /// Last observation.
    pub last: (NaiveDate, f64),
    /// Smallest value and its (earliest) date.
    pub min: (NaiveDate, f64),
    /// Largest value and its (earliest) date.
    pub max: (NaiveDate, f64),
    /// Arithmetic mean.
    pub mean: f64,
    /// Median.
    pub median: f64,
    /// Sample standard deviation; `None` with fewer than two observations.
    pub std_dev: Option<f64>,
    /// `(last / first - 1) * 100`; `None` when the first value is zero.
    pub total_change_pct: Option<f64>,
    /// Total change divided by the span in years (days / 365.25).
    pub annualized_change_pct: Option<f64>,
    /// Year-over-year changes of yearly means, oldest first.
    pub yearly: Vec<YearChange>,
}

/// Summarize the observed points of `series`; `None` when nothing is observed.
#[must_use]
pub fn summarize(series: &Series) -> Option<SeriesSummary> {
    let obs: Vec<(NaiveDate, f64)> = series.observed().collect();
    let first = *obs.first()?;
    let last = *obs.last()?;
    let n = obs.len();

    let mut min = first;
    let mut max = first;
    let mut sum = 0.0;
    for &(d, v) in &obs {
        if v < min.1 {
            min = (d, v);
        }
        if v > max.1 {
            max = (d, v);
        }
        sum += v;
    }
    let mean = sum / n as f64;

    let mut sorted: Vec<f64> = obs.iter().map(|(_, v)| *v).collect();
    sorted.sort_by(f64::total_cmp);
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    };

    let std_dev = (n > 1).then(|| {
        let var = obs.iter().map(|(_, v)| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        var.sqrt()
    });

    let total_change_pct = (first.1 != 0.0).then(|| (last.1 / first.1 - 1.0) * 100.0);
    let days = (last.0 - first.0).num_days();
    let annualized_change_pct =
        total_change_pct.filter(|_| days > 0).map(|t| t / (days as f64 / 365.25));

    Some(SeriesSummary {
        name: series.name().to_string(),
        count: n,
        first,
        last,
        min,
        max,
        mean,
        median,
        std_dev,
        total_change_pct,
        annualized_change_pct,
        yearly: yearly_changes(&obs),
    })
}

fn yearly_changes(obs: &[(NaiveDate, f64)]) -> Vec<YearChange> {
    let mut by_year: BTreeMap<i32, (f64, u32)> = BTreeMap::new();
    for &(d, v) in obs {
        let e = by_year.entry(d.year()).or_insert((0.0, 0));
        e.0 += v;
        e.1 += 1;
    }
    let means: Vec<(i32, f64)> = by_year
        .into_iter()
        .map(|(y, (s, c))| (y, s / f64::from(c)))
        .collect();
    means
        .windows(2)
        .filter(|w| w[0].1 != 0.0)
        .map(|w| YearChange {
            year: w[1].0,
            mean: w[1].1,
            change_pct: (w[1].1 / w[0].1 - 1.0) * 100.0,
        })
        .collect()
}
