use indexa_core::{Attribution, Capability, IndexaError, PeriodicRequest, Series};

use crate::Indexa;
use crate::router::util::coverage;

impl Indexa {
    /// Fetch a periodic macro series from the first provider that serves it.
    ///
    /// Behavior and trade-offs:
    /// - Honors the builder's `FetchStrategy` and per-provider timeout.
    /// - Connectors whose `supports_code` rejects the code are skipped without a call.
    ///
    /// # Errors
    /// Returns an error if no eligible provider succeeds or none support the capability.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "indexa::router",
            skip(self, req),
            fields(code = req.code(), start = %req.start(), end = %req.end()),
        )
    )]
    pub async fn periodic_series(&self, req: &PeriodicRequest) -> Result<Series, IndexaError> {
        self.periodic_series_with_attribution(req)
            .await
            .map(|(s, _)| s)
    }

    /// Like [`periodic_series`](Self::periodic_series), also reporting which connector
    /// answered.
    ///
    /// # Errors
    /// Returns an error if no eligible provider succeeds or none support the capability.
    pub async fn periodic_series_with_attribution(
        &self,
        req: &PeriodicRequest,
    ) -> Result<(Series, Attribution), IndexaError> {
        let (series, name) = self
            .fetch_single(req.code(), Capability::PeriodicSeries, |c| {
                c.as_periodic_provider()?;
                let req = req.clone();
                Some(async move {
                    match c.as_periodic_provider() {
                        Some(p) => p.periodic_series(&req).await,
                        None => Err(IndexaError::connector(
                            c.name(),
                            "missing periodic-series capability during call",
                        )),
                    }
                })
            })
            .await?;
        let mut attribution = Attribution::new();
        attribution.push(req.code(), name, coverage(&series));
        Ok((series, attribution))
    }
}
