//! indexa-fred
//!
//! Connector that implements `IndexaConnector` on top of the FRED
//! `series/observations` endpoint. Serves point observations (nearest to a date,
//! a range, or the latest value) and periodic series for non-`TP.` codes such as
//! `CPIAUCSL`.
#![warn(missing_docs)]

/// Adapter definitions and the production HTTP adapter.
pub mod adapter;

use std::sync::Arc;

#[cfg(feature = "test-adapters")]
use adapter::CloneArcAdapters;
use adapter::{FredObservations, FredQuery, FredResponse, RealAdapter, SortOrder};
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use indexa_core::{
    Frequency, IndexaError, ObservationQuery, ObservationRequest, PeriodicRequest, Series,
    TimePoint, coerce_numeric,
    connector::{IndexaConnector, ObservationProvider, PeriodicSeriesProvider},
    types::ConnectorKey,
};

#[cfg(feature = "test-adapters")]
type ObservationsAdapter = Arc<dyn FredObservations>;
#[cfg(not(feature = "test-adapters"))]
type ObservationsAdapter = Arc<RealAdapter>;

/// Public connector type. Production users construct it with `FredConnector::new_with_key`.
pub struct FredConnector {
    observations: ObservationsAdapter,
}

impl FredConnector {
    /// Static connector key for orchestrator priority configuration.
    pub const KEY: ConnectorKey = ConnectorKey::new("indexa-fred");

    /// Rows requested for a latest-value query; trailing placeholders are skipped.
    pub const LATEST_LOOKBACK: u32 = 12;

    fn looks_like_not_found(msg: &str) -> bool {
        let m = msg.to_ascii_lowercase();
        m.contains("not found") || m.contains("does not exist")
    }

    fn normalize_error(e: IndexaError, what: &str) -> IndexaError {
        match e {
            IndexaError::Connector { connector: _, msg } => {
                if Self::looks_like_not_found(&msg) {
                    IndexaError::not_found(what.to_string())
                } else {
                    IndexaError::connector("indexa-fred", msg)
                }
            }
            other => other,
        }
    }

    /// Build against the production endpoint with an API key.
    #[must_use]
    pub fn new_with_key(api_key: impl Into<String>) -> Self {
        let a = RealAdapter::new(api_key);
        Self::from_adapter(&a)
    }

    /// Build against a custom base URL (proxies, test servers).
    #[must_use]
    pub fn new_with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let a = RealAdapter::with_client(reqwest::Client::new(), base_url, api_key);
        Self::from_adapter(&a)
    }

    /// For tests/injection (requires the `test-adapters` feature).
    #[cfg(feature = "test-adapters")]
    pub fn from_adapter<A: CloneArcAdapters + 'static>(adapter: &A) -> Self {
        Self {
            observations: adapter.clone_arc_observations(),
        }
    }

    #[cfg(not(feature = "test-adapters"))]
    /// Build from a concrete `RealAdapter`.
    pub fn from_adapter(adapter: &RealAdapter) -> Self {
        Self {
            observations: Arc::new(adapter.clone()),
        }
    }

    async fn fetch(&self, query: FredQuery, what: &str) -> Result<Series, IndexaError> {
        let resp = self
            .observations
            .observations(&query)
            .await
            .map_err(|e| Self::normalize_error(e, what))?;
        if resp.observations.is_empty() {
            return Err(IndexaError::not_found(what.to_string()));
        }
        series_from_response(&query.series_id, resp)
    }
}

const fn frequency_param(f: Frequency) -> Option<&'static str> {
    match f {
        Frequency::Daily => Some("d"),
        Frequency::Weekly => Some("w"),
        Frequency::Biweekly => Some("bw"),
        Frequency::Monthly => Some("m"),
        Frequency::Quarterly => Some("q"),
        Frequency::Semiannual => Some("sa"),
        Frequency::Annual => Some("a"),
        _ => None,
    }
}

/// Map a FRED payload onto a `Series` named after `code`.
///
/// `"."` placeholders become absent points.
///
/// # Errors
/// Returns `Unparseable` for a date that is not `YYYY-MM-DD`.
pub fn series_from_response(code: &str, resp: FredResponse) -> Result<Series, IndexaError> {
    let points = resp
        .observations
        .iter()
        .map(|o| {
            let date = NaiveDate::parse_from_str(o.date.trim(), "%Y-%m-%d")
                .map_err(|_| IndexaError::unparseable("date", o.date.as_str()))?;
            Ok(match coerce_numeric(&o.value) {
                Some(v) => TimePoint::new(date, v),
                None => TimePoint::absent(date),
            })
        })
        .collect::<Result<Vec<_>, IndexaError>>()?;
    Ok(Series::new(code, points))
}

#[async_trait]
impl ObservationProvider for FredConnector {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "indexa_fred::observations",
            skip(self, req),
            fields(code = req.code()),
        )
    )]
    async fn observations(&self, req: &ObservationRequest) -> Result<Series, IndexaError> {
        let what = format!("observations for {}", req.code());
        let query = match req.query() {
            ObservationQuery::Around { date, window_days } => {
                let window = Days::new(u64::try_from(window_days).unwrap_or(0));
                FredQuery {
                    series_id: req.code().to_string(),
                    start: date.checked_sub_days(window),
                    end: date.checked_add_days(window),
                    ..FredQuery::default()
                }
            }
            ObservationQuery::Range { start, end } => FredQuery {
                series_id: req.code().to_string(),
                start: Some(start),
                end: Some(end),
                ..FredQuery::default()
            },
            ObservationQuery::Latest => FredQuery {
                series_id: req.code().to_string(),
                sort_order: SortOrder::Desc,
                limit: Some(Self::LATEST_LOOKBACK),
                ..FredQuery::default()
            },
        };
        self.fetch(query, &what).await
    }
}

#[async_trait]
impl PeriodicSeriesProvider for FredConnector {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "indexa_fred::periodic_series",
            skip(self, req),
            fields(code = req.code()),
        )
    )]
    async fn periodic_series(&self, req: &PeriodicRequest) -> Result<Series, IndexaError> {
        let what = format!("series {}", req.code());
        let query = FredQuery {
            series_id: req.code().to_string(),
            start: Some(req.start()),
            end: Some(req.end()),
            frequency: frequency_param(req.frequency()),
            ..FredQuery::default()
        };
        self.fetch(query, &what).await
    }
}

#[async_trait]
impl IndexaConnector for FredConnector {
    fn name(&self) -> &'static str {
        "indexa-fred"
    }

    fn vendor(&self) -> &'static str {
        "Federal Reserve Bank of St. Louis"
    }

    fn supports_code(&self, code: &str) -> bool {
        !code.starts_with("TP.")
    }

    fn as_periodic_provider(&self) -> Option<&dyn PeriodicSeriesProvider> {
        Some(self as &dyn PeriodicSeriesProvider)
    }

    fn as_observation_provider(&self) -> Option<&dyn ObservationProvider> {
        Some(self as &dyn ObservationProvider)
    }
}
