//! indexa-evds
//!
//! Connector that implements `IndexaConnector` on top of the EVDS electronic data
//! delivery service. Serves periodic macro series (price indices, exchange rates,
//! ratios) identified by `TP.`-prefixed codes.
//!
//! The service names each value column after the series code with dots replaced by
//! underscores (`TP.FE.OKTG01` -> `TP_FE_OKTG01`) and labels rows in a `Tarih` column
//! whose layout depends on the frequency (`2020-1`, `01-01-2020`, `2020-Q1`, `2020`).
//! Both are resolved here, once, before a `Series` is handed to the orchestrator.
#![warn(missing_docs)]

/// Adapter definitions and the production HTTP adapter.
pub mod adapter;

use std::sync::Arc;

#[cfg(feature = "test-adapters")]
use adapter::CloneArcAdapters;
use adapter::{EvdsQuery, EvdsResponse, EvdsSeries, RealAdapter};
use async_trait::async_trait;
use indexa_core::{
    IndexaError, PeriodicRequest, Series, TimePoint, coerce_numeric, parse_date,
    connector::{IndexaConnector, PeriodicSeriesProvider},
    types::ConnectorKey,
};

#[cfg(feature = "test-adapters")]
type SeriesAdapter = Arc<dyn EvdsSeries>;
#[cfg(not(feature = "test-adapters"))]
type SeriesAdapter = Arc<RealAdapter>;

/// Name of the row-label column in EVDS payloads.
pub const DATE_COLUMN: &str = "Tarih";

/// Public connector type. Production users construct it with `EvdsConnector::new_with_key`.
pub struct EvdsConnector {
    series: SeriesAdapter,
}

impl EvdsConnector {
    /// Static connector key for orchestrator priority configuration.
    pub const KEY: ConnectorKey = ConnectorKey::new("indexa-evds");

    fn looks_like_not_found(msg: &str) -> bool {
        let m = msg.to_ascii_lowercase();
        m.contains("not found") || m.contains("no data") || m.contains("bulunamad")
    }

    fn normalize_error(e: IndexaError, what: &str) -> IndexaError {
        match e {
            IndexaError::Connector { connector: _, msg } => {
                if Self::looks_like_not_found(&msg) {
                    IndexaError::not_found(what.to_string())
                } else {
                    IndexaError::connector("indexa-evds", msg)
                }
            }
            other => other,
        }
    }

    /// Build against the production endpoint with an API key.
    #[must_use]
    pub fn new_with_key(key: impl Into<String>) -> Self {
        let a = RealAdapter::new(key);
        Self::from_adapter(&a)
    }

    /// Build against a custom base URL (proxies, test servers).
    #[must_use]
    pub fn new_with_base_url(key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let a = RealAdapter::with_client(reqwest::Client::new(), base_url, key);
        Self::from_adapter(&a)
    }

    /// Build from a provided `reqwest::Client`.
    #[must_use]
    pub fn new_with_reqwest_client(http: reqwest::Client, key: impl Into<String>) -> Self {
        let a = RealAdapter::with_client(http, adapter::DEFAULT_BASE_URL, key);
        Self::from_adapter(&a)
    }

    /// For tests/injection (requires the `test-adapters` feature).
    #[cfg(feature = "test-adapters")]
    pub fn from_adapter<A: CloneArcAdapters + 'static>(adapter: &A) -> Self {
        Self {
            series: adapter.clone_arc_series(),
        }
    }

    #[cfg(not(feature = "test-adapters"))]
    /// Build from a concrete `RealAdapter`.
    pub fn from_adapter(adapter: &RealAdapter) -> Self {
        Self {
            series: Arc::new(adapter.clone()),
        }
    }

    /// Value column carrying `code` in EVDS payloads.
    #[must_use]
    pub fn value_column(code: &str) -> String {
        code.replace('.', "_")
    }
}

fn cell_value(v: &serde_json::Value) -> Option<f64> {
    match v {
        serde_json::Value::Number(n) => n.as_f64().filter(|x| x.is_finite()),
        serde_json::Value::String(s) => coerce_numeric(s),
        _ => None,
    }
}

/// Map an EVDS payload onto a `Series` named after `code`.
///
/// Rows missing the value column, or carrying null/placeholder values, become absent
/// points.
///
/// # Errors
/// - `ColumnResolution` when no row carries the value column at all.
/// - `Unparseable` for a date label no accepted layout understands.
pub fn series_from_response(code: &str, resp: EvdsResponse) -> Result<Series, IndexaError> {
    let column = EvdsConnector::value_column(code);
    if !resp.items.is_empty() && !resp.items.iter().any(|row| row.contains_key(&column)) {
        let mut available: Vec<String> = resp
            .items
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();
        available.sort();
        return Err(IndexaError::ColumnResolution { column, available });
    }

    let mut points = Vec::with_capacity(resp.items.len());
    for row in &resp.items {
        let label = row
            .get(DATE_COLUMN)
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| IndexaError::ColumnResolution {
                column: DATE_COLUMN.to_string(),
                available: row.keys().cloned().collect(),
            })?;
        let date = parse_date(label)?;
        let value = row.get(&column).and_then(cell_value);
        points.push(match value {
            Some(v) => TimePoint::new(date, v),
            None => TimePoint::absent(date),
        });
    }
    Ok(Series::new(code, points))
}

#[async_trait]
impl PeriodicSeriesProvider for EvdsConnector {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "indexa_evds::periodic_series",
            skip(self, req),
            fields(code = req.code(), frequency = req.frequency().code()),
        )
    )]
    async fn periodic_series(&self, req: &PeriodicRequest) -> Result<Series, IndexaError> {
        let what = format!("series {}", req.code());
        let query = EvdsQuery {
            series: req.code().to_string(),
            start: req.start(),
            end: req.end(),
            frequency: req.frequency().code(),
        };
        let resp = self
            .series
            .fetch(&query)
            .await
            .map_err(|e| Self::normalize_error(e, &what))?;
        if resp.items.is_empty() {
            return Err(IndexaError::not_found(what));
        }
        let series = series_from_response(req.code(), resp)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(points = series.len(), "evds series mapped");
        Ok(series.between(Some(req.start()), Some(req.end())))
    }
}

#[async_trait]
impl IndexaConnector for EvdsConnector {
    fn name(&self) -> &'static str {
        "indexa-evds"
    }

    fn vendor(&self) -> &'static str {
        "TCMB EVDS"
    }

    fn supports_code(&self, code: &str) -> bool {
        code.starts_with("TP.")
    }

    fn as_periodic_provider(&self) -> Option<&dyn PeriodicSeriesProvider> {
        Some(self as &dyn PeriodicSeriesProvider)
    }
}
