use chrono::NaiveDate;

use crate::types::{IndexaError, Series, TimePoint};

/// Accepted textual date layouts, tried in order by [`parse_date`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateFormat {
    /// `DD-MM-YYYY` (user input, daily provider labels).
    DayMonthYear,
    /// `YYYY-MM-DD`.
    IsoDate,
    /// `YYYY-M` or `YYYY-MM` (monthly provider labels), first day of month.
    YearMonth,
    /// `MM-YYYY` or `M-YYYY`, first day of month.
    MonthYear,
    /// `YYYY-Qn`, first day of the quarter.
    YearQuarter,
    /// `YYYY`, January 1st.
    Year,
}

impl DateFormat {
    /// Default order used at collaborator boundaries.
    pub const DEFAULT_ORDER: [Self; 6] = [
        Self::DayMonthYear,
        Self::IsoDate,
        Self::YearMonth,
        Self::MonthYear,
        Self::YearQuarter,
        Self::Year,
    ];

    /// Parse `s` under this layout only.
    #[must_use]
    pub fn parse(self, s: &str) -> Option<NaiveDate> {
        let s = s.trim();
        match self {
            Self::DayMonthYear => NaiveDate::parse_from_str(s, "%d-%m-%Y").ok(),
            Self::IsoDate => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
            Self::YearMonth => {
                let (y, m) = s.split_once('-')?;
                first_of_month(year_part(y)?, month_part(m)?)
            }
            Self::MonthYear => {
                let (m, y) = s.split_once('-')?;
                first_of_month(year_part(y)?, month_part(m)?)
            }
            Self::YearQuarter => {
                let (y, q) = s.split_once('-')?;
                let q: u32 = q.strip_prefix(['Q', 'q'])?.parse().ok()?;
                if !(1..=4).contains(&q) {
                    return None;
                }
                first_of_month(year_part(y)?, (q - 1) * 3 + 1)
            }
            Self::Year => first_of_month(year_part(s)?, 1),
        }
    }
}

fn year_part(s: &str) -> Option<i32> {
    (s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()))
        .then(|| s.parse().ok())
        .flatten()
}

fn month_part(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Parse a date trying [`DateFormat::DEFAULT_ORDER`] in sequence.
///
/// # Errors
/// Returns `Unparseable` when no layout accepts the input.
pub fn parse_date(s: &str) -> Result<NaiveDate, IndexaError> {
    parse_date_with(s, &DateFormat::DEFAULT_ORDER)
}

/// Parse a date trying `formats` in sequence; the first successful layout wins.
///
/// # Errors
/// Returns `Unparseable` when no layout accepts the input.
pub fn parse_date_with(s: &str, formats: &[DateFormat]) -> Result<NaiveDate, IndexaError> {
    formats
        .iter()
        .find_map(|f| f.parse(s))
        .ok_or_else(|| IndexaError::unparseable("date", s))
}

/// Coerce a provider string into a number.
///
/// Handles plain (`1234.5`), grouped (`1,234.5`, `1.234,5`) and comma-decimal
/// (`454,08`) layouts. Placeholders such as `""`, `"."`, `"-"`, `"NaN"` or `"null"`
/// yield `None`. A lone comma is read as the decimal separator.
#[must_use]
pub fn coerce_numeric(raw: &str) -> Option<f64> {
    let s: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\'')
        .collect();
    if s.is_empty()
        || matches!(
            s.to_ascii_lowercase().as_str(),
            "." | "-" | "nan" | "null" | "none" | "na" | "n/a" | "nd"
        )
    {
        return None;
    }

    let commas = s.matches(',').count();
    let dots = s.matches('.').count();
    let normalized = match (commas, dots) {
        (0, 0 | 1) => s,
        (0, _) => s.replace('.', ""),
        (1, 0) => s.replace(',', "."),
        (_, 0) => s.replace(',', ""),
        _ => {
            let last_comma = s.rfind(',')?;
            let last_dot = s.rfind('.')?;
            if last_comma > last_dot {
                s.replace('.', "").replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
    };
    normalized.parse::<f64>().ok()
}

/// Replace non-finite values with absent ones, reporting each as a `Data` warning.
#[must_use]
pub fn sanitize(series: &Series) -> (Series, Vec<IndexaError>) {
    let mut warnings = Vec::new();
    let points = series
        .points()
        .iter()
        .map(|p| match p.value {
            Some(v) if !v.is_finite() => {
                warnings.push(IndexaError::Data(format!(
                    "{}: non-finite value {v} at {}",
                    series.name(),
                    p.date
                )));
                TimePoint::absent(p.date)
            }
            _ => *p,
        })
        .collect();
    (Series::new(series.name(), points), warnings)
}
