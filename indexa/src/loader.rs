//! CSV loaders for panel data and percent-change tables.
//!
//! Column names are resolved once here against a fixed schema; everything past this
//! module sees only `Series` and `PercentChangeSeries` values.

use std::io::Read;
use std::path::Path;

use indexa_core::{
    IndexaError, MonthPeriod, PercentChangeSeries, Series, TimePoint, coerce_numeric, parse_date,
};

/// Designated price column of a retail-price panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PanelColumn {
    /// Price in local currency (`local_price`).
    LocalPrice,
    /// Local units per dollar (`exchange_rate`, or `dollar_ex`).
    ExchangeRate,
    /// Price in dollars (`dollar_price`).
    #[default]
    DollarPrice,
    /// Pre-adjusted price (`adjusted_price`, optional in the file).
    AdjustedPrice,
}

impl PanelColumn {
    /// Accepted header names, preferred first.
    #[must_use]
    pub const fn headers(self) -> &'static [&'static str] {
        match self {
            Self::LocalPrice => &["local_price"],
            Self::ExchangeRate => &["exchange_rate", "dollar_ex"],
            Self::DollarPrice => &["dollar_price"],
            Self::AdjustedPrice => &["adjusted_price"],
        }
    }
}

fn csv_err(e: &csv::Error) -> IndexaError {
    IndexaError::Data(format!("csv: {e}"))
}

fn resolve(headers: &csv::StringRecord, names: &[&str]) -> Result<usize, IndexaError> {
    names
        .iter()
        .find_map(|n| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(n)))
        .ok_or_else(|| IndexaError::ColumnResolution {
            column: names.join("|"),
            available: headers.iter().map(str::to_string).collect(),
        })
}

/// Load `date` and one price column from a panel CSV.
///
/// Rows whose price cannot be coerced become absent points. Duplicate dates
/// collapse to their mean.
///
/// # Errors
/// `ColumnResolution` when `date` or the designated column is missing, `Unparseable`
/// for a bad date, `Data` for malformed CSV.
pub fn load_panel<R: Read>(
    reader: R,
    name: &str,
    column: PanelColumn,
) -> Result<Series, IndexaError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers().map_err(|e| csv_err(&e))?.clone();
    let date_col = resolve(&headers, &["date"])?;
    let value_col = resolve(&headers, column.headers())?;

    let mut points = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| csv_err(&e))?;
        let raw_date = record.get(date_col).unwrap_or_default();
        if raw_date.is_empty() {
            continue;
        }
        let date = parse_date(raw_date)?;
        let value = record.get(value_col).and_then(coerce_numeric);
        points.push(TimePoint { date, value });
    }
    Ok(Series::new(name, points))
}

/// [`load_panel`] from a file path.
///
/// # Errors
/// As [`load_panel`], plus `Data` when the file cannot be opened.
pub fn load_panel_path(
    path: impl AsRef<Path>,
    name: &str,
    column: PanelColumn,
) -> Result<Series, IndexaError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| IndexaError::Data(format!("failed to open {}: {e}", path.display())))?;
    load_panel(file, name, column)
}

/// Load a percent-change table with `period` (`MM-YYYY`) and `pct` columns.
///
/// # Errors
/// `ColumnResolution` for missing columns, `Unparseable` for bad periods or values,
/// and the table constructor's errors for duplicates.
pub fn load_percent_changes<R: Read>(
    reader: R,
    name: &str,
) -> Result<PercentChangeSeries, IndexaError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers().map_err(|e| csv_err(&e))?.clone();
    let period_col = resolve(&headers, &["period"])?;
    let pct_col = resolve(&headers, &["pct", "percent_change"])?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| csv_err(&e))?;
        let raw_period = record.get(period_col).unwrap_or_default();
        let period: MonthPeriod = raw_period.parse()?;
        let raw_pct = record.get(pct_col).unwrap_or_default();
        let pct = coerce_numeric(raw_pct).ok_or_else(|| IndexaError::unparseable("pct", raw_pct))?;
        rows.push((period, pct));
    }
    PercentChangeSeries::new(name, rows)
}
