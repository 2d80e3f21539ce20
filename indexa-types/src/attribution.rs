//! Attribution of fetched series to the connectors that supplied them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date coverage of one fetched series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    /// First date returned (inclusive).
    pub start: NaiveDate,
    /// Last date returned (inclusive).
    pub end: NaiveDate,
    /// Number of points returned.
    pub points: usize,
}

/// Which connector supplied which series, and what it covered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attribution {
    /// `(series code, connector name, coverage)`; coverage is `None` for empty results.
    pub sources: Vec<(String, String, Option<Coverage>)>,
}

impl Attribution {
    /// Create an empty attribution.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Record a fetched series.
    pub fn push(&mut self, code: impl Into<String>, connector: &str, coverage: Option<Coverage>) {
        self.sources
            .push((code.into(), connector.to_string(), coverage));
    }

    /// Connector that supplied `code`, if recorded.
    #[must_use]
    pub fn connector_for(&self, code: &str) -> Option<&str> {
        self.sources
            .iter()
            .find(|(c, _, _)| c == code)
            .map(|(_, n, _)| n.as_str())
    }
}
