//! Composite tables: named columns over a shared date axis.

use core::fmt;
use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::IndexaError;
use crate::series::{Series, TimePoint};

/// Fixed column schema of composite tables.
///
/// Keys do not depend on which pipeline stages ran: a price index that was not
/// rebased is still `PriceIndex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ColumnKey {
    /// Official consumer price index (rebased when normalizing).
    PriceIndex,
    /// Currency rate as an index (rebased when normalizing).
    CurrencyIndex,
    /// Currency rate as published.
    CurrencyRaw,
    /// Alternative inflation estimate compounded into an index.
    AlternativeIndex,
    /// Mean of the alternative index and the price index.
    AlternativeAverage,
    /// Point-observation reference index aligned by nearest date.
    ReferenceIndex,
    /// Raw ratio series at nominal prices.
    RatioRaw,
    /// Ratio series recomposed with the selected deflator.
    RatioRecomposed,
    /// Retail-price panel column expanded monthly.
    PanelPrice,
    /// Panel price deflated to constant prices by the reference index.
    PanelAdjusted,
    /// Local-currency series before conversion.
    LocalValue,
    /// Local series converted with the currency rate.
    ConvertedValue,
}

impl ColumnKey {
    /// Stable snake-case column name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceIndex => "price_index",
            Self::CurrencyIndex => "currency_index",
            Self::CurrencyRaw => "currency_raw",
            Self::AlternativeIndex => "alternative_index",
            Self::AlternativeAverage => "alternative_average",
            Self::ReferenceIndex => "reference_index",
            Self::RatioRaw => "ratio_raw",
            Self::RatioRecomposed => "ratio_recomposed",
            Self::PanelPrice => "panel_price",
            Self::PanelAdjusted => "panel_adjusted",
            Self::LocalValue => "local_value",
            Self::ConvertedValue => "converted_value",
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named column; `values[i]` belongs to `CompositeTable::dates()[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column key.
    pub key: ColumnKey,
    /// Values aligned with the table's date axis.
    pub values: Vec<Option<f64>>,
}

/// Named columns joined on a common, strictly increasing date axis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompositeTable {
    dates: Vec<NaiveDate>,
    columns: Vec<Column>,
}

impl CompositeTable {
    /// Inner-join series on their dates: a date survives only if every series has it.
    ///
    /// # Errors
    /// Returns `InvalidArg` if a column key appears twice.
    pub fn inner_join<I>(parts: I) -> Result<Self, IndexaError>
    where
        I: IntoIterator<Item = (ColumnKey, Series)>,
    {
        let parts: Vec<(ColumnKey, Series)> = parts.into_iter().collect();
        let mut seen = BTreeSet::new();
        for (key, _) in &parts {
            if !seen.insert(*key) {
                return Err(IndexaError::InvalidArg(format!("duplicate column '{key}'")));
            }
        }
        let Some((_, head)) = parts.first() else {
            return Ok(Self::default());
        };
        let dates: Vec<NaiveDate> = head
            .dates()
            .filter(|d| parts.iter().all(|(_, s)| s.get(*d).is_some()))
            .collect();
        let columns = parts
            .iter()
            .map(|(key, s)| Column {
                key: *key,
                values: dates.iter().map(|d| s.value_at(*d)).collect(),
            })
            .collect();
        Ok(Self { dates, columns })
    }

    /// Add a column with left-style retention: every table date is kept and
    /// dates missing from `series` hold absent values.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `key` already exists.
    pub fn retain_column(mut self, key: ColumnKey, series: &Series) -> Result<Self, IndexaError> {
        self.ensure_new(key)?;
        let values = self.dates.iter().map(|d| series.value_at(*d)).collect();
        self.columns.push(Column { key, values });
        Ok(self)
    }

    /// Drop the column for `key`, if present.
    #[must_use]
    pub fn without_column(mut self, key: ColumnKey) -> Self {
        self.columns.retain(|c| c.key != key);
        self
    }

    fn ensure_new(&self, key: ColumnKey) -> Result<(), IndexaError> {
        if self.contains(key) {
            return Err(IndexaError::InvalidArg(format!("duplicate column '{key}'")));
        }
        Ok(())
    }

    /// Shared date axis.
    #[must_use]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Columns in insertion order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = ColumnKey> + '_ {
        self.columns.iter().map(|c| c.key)
    }

    /// Whether the table has a column for `key`.
    #[must_use]
    pub fn contains(&self, key: ColumnKey) -> bool {
        self.columns.iter().any(|c| c.key == key)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Resolve a column by key.
    ///
    /// # Errors
    /// Returns `ColumnResolution` listing the available columns when `key` is absent.
    pub fn column(&self, key: ColumnKey) -> Result<&Column, IndexaError> {
        self.columns
            .iter()
            .find(|c| c.key == key)
            .ok_or_else(|| IndexaError::ColumnResolution {
                column: key.as_str().to_string(),
                available: self.keys().map(|k| k.as_str().to_string()).collect(),
            })
    }

    /// Materialize a column as a `Series` named after its key.
    ///
    /// # Errors
    /// Returns `ColumnResolution` when `key` is absent.
    pub fn series(&self, key: ColumnKey) -> Result<Series, IndexaError> {
        let col = self.column(key)?;
        let points = self
            .dates
            .iter()
            .zip(&col.values)
            .map(|(d, v)| TimePoint {
                date: *d,
                value: *v,
            })
            .collect();
        Series::try_from_sorted(key.as_str(), points)
    }
}
