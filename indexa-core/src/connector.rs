use async_trait::async_trait;

use crate::types::{ConnectorKey, IndexaError, ObservationRequest, PeriodicRequest, Series};

/// Focused role trait for connectors that serve periodic macro series.
///
/// Implementations map the provider's native schema (column names, date labels,
/// number formats) onto `Series` once, before returning.
#[async_trait]
pub trait PeriodicSeriesProvider: Send + Sync {
    /// Fetch a series over an inclusive date range at the requested frequency.
    async fn periodic_series(&self, req: &PeriodicRequest) -> Result<Series, IndexaError>;
}

/// Focused role trait for connectors that serve point observations.
#[async_trait]
pub trait ObservationProvider: Send + Sync {
    /// Fetch observations for a single date window, a range, or the latest point.
    ///
    /// Missing-value placeholders are returned as absent points.
    async fn observations(&self, req: &ObservationRequest) -> Result<Series, IndexaError>;
}

/// Main connector trait implemented by provider crates. Exposes capability discovery.
#[async_trait]
pub trait IndexaConnector: Send + Sync {
    /// A stable identifier for priority lists and attribution (e.g. "indexa-evds").
    fn name(&self) -> &'static str;

    /// Canonical connector key constructed from the static name.
    fn key(&self) -> ConnectorKey {
        ConnectorKey::new(self.name())
    }

    /// Human-friendly vendor string.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Whether this connector serves the given series code.
    ///
    /// Default: `true`. Connectors with a fixed catalogue override this so the
    /// orchestrator can skip them without a round trip.
    fn supports_code(&self, code: &str) -> bool {
        let _ = code;
        true
    }

    /// Advertise periodic-series capability.
    fn as_periodic_provider(&self) -> Option<&dyn PeriodicSeriesProvider> {
        None
    }

    /// Advertise point-observation capability.
    fn as_observation_provider(&self) -> Option<&dyn ObservationProvider> {
        None
    }
}
