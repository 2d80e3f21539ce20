#[cfg(feature = "test-adapters")]
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use indexa_core::IndexaError;

/// Production endpoint root of the FRED API.
pub const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org/fred";

/// Row ordering requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Oldest first.
    #[default]
    Asc,
    /// Newest first.
    Desc,
}

impl SortOrder {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A `series/observations` query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FredQuery {
    /// Series identifier, e.g. `CPIAUCSL`.
    pub series_id: String,
    /// Inclusive `observation_start`.
    pub start: Option<NaiveDate>,
    /// Inclusive `observation_end`.
    pub end: Option<NaiveDate>,
    /// Row ordering.
    pub sort_order: SortOrder,
    /// Maximum number of rows.
    pub limit: Option<u32>,
    /// Aggregation frequency code (`m`, `q`, `a`, ...); native frequency when `None`.
    pub frequency: Option<&'static str>,
}

impl FredQuery {
    /// Query parameters, without the API key.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![
            ("series_id", self.series_id.clone()),
            ("file_type", "json".to_string()),
            ("sort_order", self.sort_order.as_str().to_string()),
        ];
        if let Some(s) = self.start {
            out.push(("observation_start", s.format("%Y-%m-%d").to_string()));
        }
        if let Some(e) = self.end {
            out.push(("observation_end", e.format("%Y-%m-%d").to_string()));
        }
        if let Some(l) = self.limit {
            out.push(("limit", l.to_string()));
        }
        if let Some(f) = self.frequency {
            out.push(("frequency", f.to_string()));
        }
        out
    }
}

/// One raw observation row. Missing values are reported as `"."`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FredObservation {
    /// `YYYY-MM-DD` date.
    pub date: String,
    /// Value as text.
    pub value: String,
}

/// Raw `series/observations` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FredResponse {
    /// Observation rows in the requested order.
    #[serde(default)]
    pub observations: Vec<FredObservation>,
}

/// Observations abstraction (so we can inject mocks in tests).
#[async_trait]
pub trait FredObservations: Send + Sync {
    /// Fetch raw observation rows.
    async fn observations(&self, query: &FredQuery) -> Result<FredResponse, IndexaError>;
}

/// Real adapter backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct RealAdapter {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RealAdapter {
    /// Adapter against the production endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), DEFAULT_BASE_URL, api_key)
    }

    /// Adapter with a caller-provided HTTP client and base URL.
    #[must_use]
    pub fn with_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

fn map_http_err(e: &reqwest::Error, context: &str) -> IndexaError {
    if e.is_timeout() {
        IndexaError::connector("indexa-fred", format!("timed out: {context}"))
    } else if e.is_decode() {
        IndexaError::connector("indexa-fred", format!("malformed payload for {context}: {e}"))
    } else {
        IndexaError::connector("indexa-fred", e.to_string())
    }
}

// FRED answers unknown series ids with a 400 and an `error_message` body.
fn map_status(status: reqwest::StatusCode, body: &str, context: &str) -> IndexaError {
    match status.as_u16() {
        404 => IndexaError::not_found(context.to_string()),
        400 if body.to_ascii_lowercase().contains("does not exist") => {
            IndexaError::not_found(context.to_string())
        }
        401 | 403 => IndexaError::connector("indexa-fred", format!("unauthorized: {context}")),
        429 => IndexaError::connector("indexa-fred", format!("rate limit: {context}")),
        s if s >= 500 => {
            IndexaError::connector("indexa-fred", format!("server error {s}: {context}"))
        }
        s => IndexaError::connector("indexa-fred", format!("status {s}: {context}")),
    }
}

#[async_trait]
impl FredObservations for RealAdapter {
    async fn observations(&self, query: &FredQuery) -> Result<FredResponse, IndexaError> {
        let context = format!("observations for {}", query.series_id);
        let url = format!("{}/series/observations", self.base_url.trim_end_matches('/'));
        let mut params = query.params();
        params.push(("api_key", self.api_key.clone()));
        let resp = self
            .http
            .get(url)
            .query(&params)
            .send()
            .await
            .map_err(|e| map_http_err(&e, &context))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(map_status(status, &body, &context));
        }
        resp.json::<FredResponse>()
            .await
            .map_err(|e| map_http_err(&e, &context))
    }
}

#[cfg(feature = "test-adapters")]
impl dyn FredObservations {
    /// Build a `FredObservations` from a closure (tests only).
    pub fn from_fn<F>(f: F) -> Arc<dyn FredObservations>
    where
        F: Send + Sync + 'static + Fn(FredQuery) -> Result<FredResponse, IndexaError>,
    {
        struct FnObs<F>(F);
        #[async_trait]
        impl<F> FredObservations for FnObs<F>
        where
            F: Send + Sync + 'static + Fn(FredQuery) -> Result<FredResponse, IndexaError>,
        {
            async fn observations(&self, query: &FredQuery) -> Result<FredResponse, IndexaError> {
                (self.0)(query.clone())
            }
        }
        Arc::new(FnObs(f))
    }
}

#[cfg(feature = "test-adapters")]
/// Clone the adapter into the trait object the connector stores (tests only).
pub trait CloneArcAdapters {
    /// Clone as `Arc<dyn FredObservations>`.
    fn clone_arc_observations(&self) -> Arc<dyn FredObservations> {
        <dyn FredObservations>::from_fn(|_| Err(IndexaError::unsupported("observations")))
    }
}

#[cfg(feature = "test-adapters")]
impl CloneArcAdapters for RealAdapter {
    fn clone_arc_observations(&self) -> Arc<dyn FredObservations> {
        Arc::new(self.clone()) as Arc<dyn FredObservations>
    }
}
