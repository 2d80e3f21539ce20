use core::fmt;
use serde::{Deserialize, Serialize};

/// Capability labels for routing, errors, and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Capability {
    /// Periodic macro series keyed by code, date range and frequency.
    PeriodicSeries,
    /// Point observations keyed by code and a date, range, or latest.
    Observations,
}

impl Capability {
    /// Stable string label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PeriodicSeries => "periodic-series",
            Self::Observations => "observations",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
