//! Configuration types shared across the orchestrator, connectors and CLI.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::IndexaError;
use crate::period::{MonthPeriod, PercentChangeSeries};
use crate::request::Frequency;
use crate::series::JoinTolerance;

/// Months the last point of a sparse series is carried forward during monthly expansion.
pub const DEFAULT_EXPANSION_HORIZON_MONTHS: u32 = 6;

/// Strategy for selecting among eligible data providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FetchStrategy {
    /// Use registration order and fall back to the next provider on failure.
    #[default]
    PriorityWithFallback,
    /// Race all eligible providers concurrently and return the first success.
    Latency,
}

/// Global configuration for the `Indexa` orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexaConfig {
    /// Strategy for fetching from multiple providers.
    pub fetch_strategy: FetchStrategy,
    /// Timeout for individual provider requests.
    pub provider_timeout: Duration,
    /// Optional deadline for the whole fetch stage of a pipeline run.
    pub request_timeout: Option<Duration>,
}

impl Default for IndexaConfig {
    fn default() -> Self {
        Self {
            fetch_strategy: FetchStrategy::default(),
            provider_timeout: Duration::from_secs(15),
            request_timeout: None,
        }
    }
}

/// Which deflator replaces the official price index when recomposing ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeflatorVariant {
    /// Official price index (recomposition is then the identity).
    #[default]
    PriceIndex,
    /// Alternative inflation estimate.
    Alternative,
    /// Mean of the alternative estimate and the official price index.
    Average,
}

impl DeflatorVariant {
    /// Whether this variant requires the alternative estimate to be compounded.
    #[must_use]
    pub const fn needs_alternative(self) -> bool {
        !matches!(self, Self::PriceIndex)
    }
}

/// Month at which percent-change compounding takes over from observed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpliceBoundary {
    /// A fixed calendar month.
    Fixed(MonthPeriod),
    /// Whatever the first period of the percent-change table is.
    FirstTablePeriod,
}

impl SpliceBoundary {
    /// The historical boundary: the first month of the alternative estimate table.
    pub const HISTORICAL: Self = Self::Fixed(MonthPeriod {
        year: 2020,
        month: 9,
    });

    /// Resolve against a concrete table. `None` only for `FirstTablePeriod` on an empty table.
    #[must_use]
    pub fn resolve(self, table: &PercentChangeSeries) -> Option<MonthPeriod> {
        match self {
            Self::Fixed(p) => Some(p),
            Self::FirstTablePeriod => table.first_period(),
        }
    }
}

impl Default for SpliceBoundary {
    fn default() -> Self {
        Self::HISTORICAL
    }
}

/// Provider series codes used by a composition run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesCodes {
    /// Official consumer price index.
    pub price_index: String,
    /// Currency rate (local units per US dollar).
    pub currency: String,
    /// Raw ratio series recomposed with the selected deflator.
    pub ratio: String,
    /// Native frequency requested for all periodic series.
    pub frequency: Frequency,
}

impl Default for SeriesCodes {
    fn default() -> Self {
        Self {
            price_index: "TP.FE.OKTG01".to_string(),
            currency: "TP.DK.USD.S.YTL".to_string(),
            ratio: "TP.RK.T1.Y".to_string(),
            frequency: Frequency::Monthly,
        }
    }
}

/// Handling of a retail-price panel supplied to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Expand the sparse panel to a monthly cadence before joining.
    pub expand: bool,
    /// Deflate the panel to constant prices at its last date using the reference index.
    pub deflate: bool,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            expand: true,
            deflate: true,
        }
    }
}

/// Configuration of one composition run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionConfig {
    /// Inclusive start of the output range.
    pub start: NaiveDate,
    /// Inclusive end of the output range.
    pub end: NaiveDate,
    /// Deflator used by ratio recomposition.
    pub deflator: DeflatorVariant,
    /// Rebase index columns to 100 at the start date.
    pub normalize: bool,
    /// Emit the alternative estimate and its average with the price index.
    pub include_alternative: bool,
    /// Fetch the ratio series and recompose it with the selected deflator.
    pub recompose: bool,
    /// Month at which compounding takes over from observed data.
    pub splice_boundary: SpliceBoundary,
    /// Months the last point of a sparse series is carried forward.
    pub expansion_horizon_months: u32,
    /// Tolerance for nearest-date alignment of point observations.
    pub join_tolerance: JoinTolerance,
    /// Periodic series codes.
    pub codes: SeriesCodes,
    /// Point-observation series aligned onto the monthly axis, if any.
    pub reference_code: Option<String>,
    /// Retail-price panel handling.
    pub panel: PanelConfig,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2020, 9, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap_or(NaiveDate::MAX),
            deflator: DeflatorVariant::default(),
            normalize: false,
            include_alternative: false,
            recompose: false,
            splice_boundary: SpliceBoundary::default(),
            expansion_horizon_months: DEFAULT_EXPANSION_HORIZON_MONTHS,
            join_tolerance: JoinTolerance::from_days(31),
            codes: SeriesCodes::default(),
            reference_code: None,
            panel: PanelConfig::default(),
        }
    }
}

impl CompositionConfig {
    /// Validate cross-field constraints.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `start > end` or the expansion horizon is zero.
    pub fn validate(&self) -> Result<(), IndexaError> {
        if self.start > self.end {
            return Err(IndexaError::InvalidArg(format!(
                "start {} is after end {}",
                self.start, self.end
            )));
        }
        if self.expansion_horizon_months == 0 {
            return Err(IndexaError::InvalidArg(
                "expansion horizon must be at least one month".into(),
            ));
        }
        Ok(())
    }

    /// Whether the alternative estimate must be compounded for this run.
    #[must_use]
    pub const fn needs_alternative(&self) -> bool {
        self.include_alternative || self.deflator.needs_alternative()
    }
}
