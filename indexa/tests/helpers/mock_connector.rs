#![allow(dead_code)]
#![allow(clippy::type_complexity)]
#![allow(clippy::cast_possible_truncation)]

use std::sync::Arc;

use async_trait::async_trait;
use indexa_core::{
    IndexaConnector, IndexaError, ObservationRequest, PeriodicRequest, Series,
    connector::{ObservationProvider, PeriodicSeriesProvider},
};
use tokio::time::{Duration, sleep};

/// Simple in-memory connector used by integration tests.
/// Behavior is scripted per test through the closures below.
pub struct MockConnector {
    pub name: &'static str,
    pub delay_ms: u64,
    pub codes: Option<Vec<String>>,
    pub periodic_fn:
        Option<Arc<dyn Fn(&PeriodicRequest) -> Result<Series, IndexaError> + Send + Sync>>,
    pub observations_fn:
        Option<Arc<dyn Fn(&ObservationRequest) -> Result<Series, IndexaError> + Send + Sync>>,
}

#[async_trait]
impl PeriodicSeriesProvider for MockConnector {
    async fn periodic_series(&self, req: &PeriodicRequest) -> Result<Series, IndexaError> {
        if self.delay_ms > 0 {
            sleep(Duration::from_millis(self.delay_ms)).await;
        }
        match &self.periodic_fn {
            Some(f) => (f)(req),
            None => Err(IndexaError::unsupported("periodic-series")),
        }
    }
}

#[async_trait]
impl ObservationProvider for MockConnector {
    async fn observations(&self, req: &ObservationRequest) -> Result<Series, IndexaError> {
        if self.delay_ms > 0 {
            sleep(Duration::from_millis(self.delay_ms)).await;
        }
        match &self.observations_fn {
            Some(f) => (f)(req),
            None => Err(IndexaError::unsupported("observations")),
        }
    }
}

impl IndexaConnector for MockConnector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn supports_code(&self, code: &str) -> bool {
        self.codes
            .as_ref()
            .is_none_or(|codes| codes.iter().any(|c| c == code))
    }

    fn as_periodic_provider(&self) -> Option<&dyn PeriodicSeriesProvider> {
        if self.periodic_fn.is_some() {
            Some(self as &dyn PeriodicSeriesProvider)
        } else {
            None
        }
    }

    fn as_observation_provider(&self) -> Option<&dyn ObservationProvider> {
        if self.observations_fn.is_some() {
            Some(self as &dyn ObservationProvider)
        } else {
            None
        }
    }
}

impl MockConnector {
    pub fn builder() -> MockConnectorBuilder {
        MockConnectorBuilder::new()
    }
}

pub struct MockConnectorBuilder {
    name: &'static str,
    delay_ms: u64,
    codes: Option<Vec<String>>,
    periodic_fn:
        Option<Arc<dyn Fn(&PeriodicRequest) -> Result<Series, IndexaError> + Send + Sync>>,
    observations_fn:
        Option<Arc<dyn Fn(&ObservationRequest) -> Result<Series, IndexaError> + Send + Sync>>,
}

impl MockConnectorBuilder {
    pub fn new() -> Self {
        Self {
            name: "mock",
            delay_ms: 0,
            codes: None,
            periodic_fn: None,
            observations_fn: None,
        }
    }

    pub fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
    pub fn delay(mut self, d: Duration) -> Self {
        self.delay_ms = d.as_millis() as u64;
        self
    }
    pub fn supports_codes(mut self, codes: &[&str]) -> Self {
        self.codes = Some(codes.iter().map(|c| (*c).to_string()).collect());
        self
    }

    // Periodic series
    pub fn with_periodic_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&PeriodicRequest) -> Result<Series, IndexaError> + Send + Sync + 'static,
    {
        self.periodic_fn = Some(Arc::new(f));
        self
    }
    /// Serve `series` (renamed to the requested code) for every code, clipped to the range.
    pub fn returns_series_ok(mut self, series: Series) -> Self {
        self.periodic_fn = Some(Arc::new(move |req| {
            Ok(series
                .between(Some(req.start()), Some(req.end()))
                .renamed(req.code()))
        }));
        self
    }
    pub fn fails_periodic(mut self, msg: &'static str) -> Self {
        let name = self.name;
        self.periodic_fn = Some(Arc::new(move |_| Err(IndexaError::connector(name, msg))));
        self
    }

    // Observations
    pub fn with_observations_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&ObservationRequest) -> Result<Series, IndexaError> + Send + Sync + 'static,
    {
        self.observations_fn = Some(Arc::new(f));
        self
    }

    pub fn build(self) -> Arc<MockConnector> {
        Arc::new(MockConnector {
            name: self.name,
            delay_ms: self.delay_ms,
            codes: self.codes,
            periodic_fn: self.periodic_fn,
            observations_fn: self.observations_fn,
        })
    }
}
