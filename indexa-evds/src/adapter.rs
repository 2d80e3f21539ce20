#[cfg(feature = "test-adapters")]
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use indexa_core::IndexaError;

/// Production endpoint of the EVDS service.
pub const DEFAULT_BASE_URL: &str = "https://evds2.tcmb.gov.tr/service/evds";

/// A single-series EVDS query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvdsQuery {
    /// Series code, e.g. `TP.FE.OKTG01`.
    pub series: String,
    /// Inclusive start date.
    pub start: NaiveDate,
    /// Inclusive end date.
    pub end: NaiveDate,
    /// Numeric frequency code (1 = daily .. 8 = annual).
    pub frequency: u8,
}

impl EvdsQuery {
    /// Path-style query segment understood by the service.
    ///
    /// Dates are sent as `DD-MM-YYYY`.
    #[must_use]
    pub fn to_path(&self) -> String {
        format!(
            "series={}&startDate={}&endDate={}&type=json&frequency={}",
            self.series,
            self.start.format("%d-%m-%Y"),
            self.end.format("%d-%m-%Y"),
            self.frequency
        )
    }
}

/// Raw EVDS JSON payload.
///
/// Rows are kept as loose maps; the value column name depends on the series code.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvdsResponse {
    /// Number of rows reported by the service.
    #[serde(rename = "totalCount", default)]
    pub total_count: Option<u64>,
    /// Data rows.
    #[serde(default)]
    pub items: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Series abstraction (so we can inject mocks in tests).
#[async_trait]
pub trait EvdsSeries: Send + Sync {
    /// Fetch the raw rows for one series.
    async fn fetch(&self, query: &EvdsQuery) -> Result<EvdsResponse, IndexaError>;
}

/// Real adapter backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct RealAdapter {
    http: reqwest::Client,
    base_url: String,
    key: String,
}

impl RealAdapter {
    /// Adapter against the production endpoint.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), DEFAULT_BASE_URL, key)
    }

    /// Adapter with a caller-provided HTTP client and base URL.
    #[must_use]
    pub fn with_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            key: key.into(),
        }
    }

    fn url(&self, query: &EvdsQuery) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), query.to_path())
    }
}

fn map_http_err(e: &reqwest::Error, context: &str) -> IndexaError {
    if e.is_timeout() {
        IndexaError::connector("indexa-evds", format!("timed out: {context}"))
    } else if e.is_decode() {
        IndexaError::connector("indexa-evds", format!("malformed payload for {context}: {e}"))
    } else {
        IndexaError::connector("indexa-evds", e.to_string())
    }
}

fn map_status(status: reqwest::StatusCode, context: &str) -> IndexaError {
    match status.as_u16() {
        404 => IndexaError::not_found(context.to_string()),
        401 | 403 => IndexaError::connector("indexa-evds", format!("unauthorized: {context}")),
        429 => IndexaError::connector("indexa-evds", format!("rate limit: {context}")),
        s if s >= 500 => {
            IndexaError::connector("indexa-evds", format!("server error {s}: {context}"))
        }
        s => IndexaError::connector("indexa-evds", format!("status {s}: {context}")),
    }
}

#[async_trait]
impl EvdsSeries for RealAdapter {
    async fn fetch(&self, query: &EvdsQuery) -> Result<EvdsResponse, IndexaError> {
        let context = format!("series {}", query.series);
        let resp = self
            .http
            .get(self.url(query))
            .header("key", &self.key)
            .send()
            .await
            .map_err(|e| map_http_err(&e, &context))?;
        if !resp.status().is_success() {
            return Err(map_status(resp.status(), &context));
        }
        resp.json::<EvdsResponse>()
            .await
            .map_err(|e| map_http_err(&e, &context))
    }
}

#[cfg(feature = "test-adapters")]
impl dyn EvdsSeries {
    /// Build an `EvdsSeries` from a closure (tests only).
    pub fn from_fn<F>(f: F) -> Arc<dyn EvdsSeries>
    where
        F: Send + Sync + 'static + Fn(EvdsQuery) -> Result<EvdsResponse, IndexaError>,
    {
        struct FnSeries<F>(F);
        #[async_trait]
        impl<F> EvdsSeries for FnSeries<F>
        where
            F: Send + Sync + 'static + Fn(EvdsQuery) -> Result<EvdsResponse, IndexaError>,
        {
            async fn fetch(&self, query: &EvdsQuery) -> Result<EvdsResponse, IndexaError> {
                (self.0)(query.clone())
            }
        }
        Arc::new(FnSeries(f))
    }
}

#[cfg(feature = "test-adapters")]
/// Clone the adapter into the trait object the connector stores (tests only).
pub trait CloneArcAdapters {
    /// Clone as `Arc<dyn EvdsSeries>`.
    fn clone_arc_series(&self) -> Arc<dyn EvdsSeries> {
        <dyn EvdsSeries>::from_fn(|_| Err(IndexaError::unsupported("periodic_series")))
    }
}

#[cfg(feature = "test-adapters")]
impl CloneArcAdapters for RealAdapter {
    fn clone_arc_series(&self) -> Arc<dyn EvdsSeries> {
        Arc::new(self.clone()) as Arc<dyn EvdsSeries>
    }
}
