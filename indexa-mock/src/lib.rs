//! Deterministic connectors for tests and offline demos.
//!
//! - [`MockConnector`] serves fixed fixture series for a small catalogue of codes.
//!   The codes `FAIL` and `TIMEOUT` force a connector error or a 200 ms delay.
use async_trait::async_trait;
use chrono::Days;
use indexa_core::connector::{IndexaConnector, ObservationProvider, PeriodicSeriesProvider};
use indexa_core::{
    IndexaError, ObservationQuery, ObservationRequest, PeriodicRequest, Series,
};

mod fixtures;

/// Mock connector for CI-safe examples. Provides deterministic data from static fixtures.
pub struct MockConnector;

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnector {
    /// Create the connector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Codes with fixture data.
    pub const CODES: &'static [&'static str] =
        &["TP.FE.OKTG01", "TP.DK.USD.S.YTL", "TP.RK.T1.Y", "CPIAUCSL"];

    fn not_found(what: &str) -> IndexaError {
        IndexaError::not_found(what.to_string())
    }

    async fn maybe_fail_or_timeout(code: &str, capability: &'static str) -> Result<(), IndexaError> {
        match code {
            "FAIL" => Err(IndexaError::connector(
                "indexa-mock",
                format!("forced failure: {capability}"),
            )),
            "TIMEOUT" => {
                // Long enough to trip a short provider timeout in tests.
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl IndexaConnector for MockConnector {
    fn name(&self) -> &'static str {
        "indexa-mock"
    }
    fn vendor(&self) -> &'static str {
        "Mock"
    }

    fn as_periodic_provider(&self) -> Option<&dyn PeriodicSeriesProvider> {
        Some(self as &dyn PeriodicSeriesProvider)
    }
    fn as_observation_provider(&self) -> Option<&dyn ObservationProvider> {
        Some(self as &dyn ObservationProvider)
    }
}

#[async_trait]
impl PeriodicSeriesProvider for MockConnector {
    async fn periodic_series(&self, req: &PeriodicRequest) -> Result<Series, IndexaError> {
        let code = req.code();
        Self::maybe_fail_or_timeout(code, "periodic-series").await?;
        fixtures::macro_series::by_code(code)
            .map(|s| s.between(Some(req.start()), Some(req.end())))
            .ok_or_else(|| Self::not_found(&format!("periodic series {code}")))
    }
}

#[async_trait]
impl ObservationProvider for MockConnector {
    async fn observations(&self, req: &ObservationRequest) -> Result<Series, IndexaError> {
        let code = req.code();
        Self::maybe_fail_or_timeout(code, "observations").await?;
        let s = fixtures::observations::by_code(code)
            .ok_or_else(|| Self::not_found(&format!("observations for {code}")))?;
        Ok(match req.query() {
            ObservationQuery::Around { date, window_days } => {
                let w = Days::new(window_days.unsigned_abs());
                s.between(date.checked_sub_days(w), date.checked_add_days(w))
            }
            ObservationQuery::Range { start, end } => s.between(Some(start), Some(end)),
            ObservationQuery::Latest => {
                let last = s.observed().last();
                Series::from_values(s.name(), last)
            }
        })
    }
}
