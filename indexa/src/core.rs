use std::collections::HashMap;
#[cfg(feature = "tracing")]
use std::convert::TryFrom;
use std::sync::Arc;

use indexa_core::{
    Capability, ConnectorKey, FetchStrategy, IndexaConfig, IndexaConnector, IndexaError,
};

/// Orchestrator that routes series requests across registered providers.
pub struct Indexa {
    pub(crate) connectors: Vec<Arc<dyn IndexaConnector>>,
    pub(crate) cfg: IndexaConfig,
    pub(crate) per_code_priority: HashMap<String, Vec<ConnectorKey>>,
}

/// Builder for constructing an `Indexa` orchestrator with custom configuration.
pub struct IndexaBuilder {
    connectors: Vec<Arc<dyn IndexaConnector>>,
    cfg: IndexaConfig,
    per_code_priority: HashMap<String, Vec<ConnectorKey>>,
}

impl Default for IndexaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexaBuilder {
    /// Create a new builder with sensible defaults.
    ///
    /// Behavior and trade-offs:
    /// - Starts with no connectors; you must register at least one via [`with_connector`].
    /// - Defaults: priority-with-fallback fetches, 15s provider timeout, no overall
    ///   request deadline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connectors: vec![],
            cfg: IndexaConfig::default(),
            per_code_priority: HashMap::new(),
        }
    }

    /// Register a provider connector.
    ///
    /// Behavior and trade-offs:
    /// - Registration order is the provider order unless [`prefer_for_code`] says otherwise.
    /// - Duplicates are not deduplicated; avoid registering the same connector twice.
    #[must_use]
    pub fn with_connector(mut self, c: Arc<dyn IndexaConnector>) -> Self {
        self.connectors.push(c);
        self
    }

    /// Set preferred providers for a series code using connector instances.
    ///
    /// The list is an ordering hint; unlisted but capable connectors are still tried
    /// after the listed ones.
    #[must_use]
    pub fn prefer_for_code(mut self, code: &str, connectors_desc: &[Arc<dyn IndexaConnector>]) -> Self {
        let keys: Vec<ConnectorKey> = connectors_desc.iter().map(|c| c.key()).collect();
        self.per_code_priority.insert(code.to_string(), keys);
        self
    }

    /// Replace the whole orchestrator configuration.
    #[must_use]
    pub const fn config(mut self, cfg: IndexaConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Select the fetch strategy for multi-provider requests.
    ///
    /// Behavior and trade-offs:
    /// - `PriorityWithFallback`: deterministic order, applies per-provider timeout,
    ///   aggregates errors; slower but predictable and economical on rate limits.
    /// - `Latency`: race all eligible providers and return the first success.
    #[must_use]
    pub const fn fetch_strategy(mut self, strategy: FetchStrategy) -> Self {
        self.cfg.fetch_strategy = strategy;
        self
    }

    /// Set the per-provider request timeout.
    #[must_use]
    pub const fn provider_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.cfg.provider_timeout = timeout;
        self
    }

    /// Set an overall deadline for fan-out fetches (composition, conversion).
    ///
    /// When exceeded, returns a `RequestTimeout` error for the capability.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.cfg.request_timeout = Some(timeout);
        self
    }

    /// Build the `Indexa` orchestrator.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no connectors have been registered via [`with_connector`].
    pub fn build(mut self) -> Result<Indexa, IndexaError> {
        // Drop priority keys that name unregistered connectors, and dedup.
        let known: std::collections::HashSet<&'static str> =
            self.connectors.iter().map(|c| c.name()).collect();
        for v in self.per_code_priority.values_mut() {
            let mut seen = std::collections::HashSet::new();
            v.retain(|k| known.contains(k.as_str()) && seen.insert(k.as_str()));
        }

        if self.connectors.is_empty() {
            return Err(IndexaError::InvalidArg(
                "no connectors registered; add at least one via with_connector(...)".to_string(),
            ));
        }

        Ok(Indexa {
            connectors: self.connectors,
            cfg: self.cfg,
            per_code_priority: self.per_code_priority,
        })
    }
}

/// Prefix a connector name onto errors that do not already carry one.
pub fn tag_err(connector: &str, e: IndexaError) -> IndexaError {
    match e {
        e @ (IndexaError::NotFound { .. }
        | IndexaError::ProviderTimeout { .. }
        | IndexaError::Connector { .. }
        | IndexaError::RequestTimeout { .. }
        | IndexaError::AllProvidersTimedOut { .. }
        | IndexaError::AllProvidersFailed(_)) => e,
        other => IndexaError::Connector {
            connector: connector.to_string(),
            msg: other.to_string(),
        },
    }
}

/// Run `fut` under an optional request-level deadline.
pub(crate) async fn with_request_deadline<T, Fut>(
    deadline: Option<std::time::Duration>,
    fut: Fut,
) -> Result<T, IndexaError>
where
    Fut: core::future::Future<Output = T>,
{
    match deadline {
        Some(d) => tokio::time::timeout(d, fut)
            .await
            .map_err(|_| IndexaError::request_timeout("request")),
        None => Ok(fut.await),
    }
}

impl Indexa {
    /// Wrap a provider future with a timeout and standardized timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "indexa::core::provider_call_with_timeout",
            skip(fut),
            fields(
                connector = connector_name,
                capability = capability.as_str(),
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn provider_call_with_timeout<T, Fut>(
        connector_name: &'static str,
        capability: Capability,
        timeout: std::time::Duration,
        fut: Fut,
    ) -> Result<T, IndexaError>
    where
        Fut: core::future::Future<Output = Result<T, IndexaError>>,
    {
        (tokio::time::timeout(timeout, fut).await).unwrap_or_else(|_| {
            Err(IndexaError::provider_timeout(
                connector_name,
                capability.as_str(),
            ))
        })
    }

    /// Start building a new `Indexa` instance.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    ///
    /// let evds = Arc::new(indexa_evds::EvdsConnector::new_with_key("..."));
    /// let fred = Arc::new(indexa_fred::FredConnector::new_with_key("..."));
    ///
    /// let indexa = indexa::Indexa::builder()
    ///     .with_connector(evds)
    ///     .with_connector(fred)
    ///     .fetch_strategy(indexa::FetchStrategy::PriorityWithFallback)
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> IndexaBuilder {
        IndexaBuilder::new()
    }

    /// Orchestrator configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &IndexaConfig {
        &self.cfg
    }

    /// Connectors eligible for `code`, in priority order.
    pub(crate) fn ordered(&self, code: &str) -> Vec<Arc<dyn IndexaConnector>> {
        let mut out: Vec<(usize, Arc<dyn IndexaConnector>)> = self
            .connectors
            .iter()
            .filter(|c| c.supports_code(code))
            .cloned()
            .enumerate()
            .collect();
        if let Some(pref) = self.per_code_priority.get(code) {
            let pos: HashMap<_, _> = pref
                .iter()
                .enumerate()
                .map(|(i, n)| (n.as_str(), i))
                .collect();
            out.sort_by_key(|(orig_i, c)| {
                (pos.get(c.name()).copied().unwrap_or(usize::MAX), *orig_i)
            });
        }
        out.into_iter().map(|(_, c)| c).collect()
    }

    /// Generic single-item fetch across eligible providers.
    ///
    /// - Honors `FetchStrategy::{PriorityWithFallback, Latency}`
    /// - Applies the per-provider timeout in both modes
    /// - Returns the value with the name of the connector that supplied it
    /// - All `NotFound` collapses to `NotFound`, all timeouts to `AllProvidersTimedOut`,
    ///   anything else to `AllProvidersFailed`; no capable provider is `Unsupported`
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "indexa::core::fetch_single",
            skip(self, call),
            fields(code = code, capability = capability.as_str()),
        )
    )]
    pub(crate) async fn fetch_single<T, F, Fut>(
        &self,
        code: &str,
        capability: Capability,
        call: F,
    ) -> Result<(T, &'static str), IndexaError>
    where
        T: Send,
        F: Fn(Arc<dyn IndexaConnector>) -> Option<Fut> + Send,
        Fut: core::future::Future<Output = Result<T, IndexaError>> + Send,
    {
        match self.cfg.fetch_strategy {
            FetchStrategy::Latency => self.fetch_single_latency(code, capability, call).await,
            _ => {
                self.fetch_single_priority_with_fallback(code, capability, call)
                    .await
            }
        }
    }

    async fn fetch_single_priority_with_fallback<T, F, Fut>(
        &self,
        code: &str,
        capability: Capability,
        call: F,
    ) -> Result<(T, &'static str), IndexaError>
    where
        T: Send,
        F: Fn(Arc<dyn IndexaConnector>) -> Option<Fut> + Send,
        Fut: core::future::Future<Output = Result<T, IndexaError>> + Send,
    {
        let mut attempted_any = false;
        let mut errors: Vec<IndexaError> = Vec::new();

        for c in self.ordered(code) {
            if let Some(fut) = call(c.clone()) {
                attempted_any = true;
                match Self::provider_call_with_timeout(
                    c.name(),
                    capability,
                    self.cfg.provider_timeout,
                    fut,
                )
                .await
                {
                    Ok(v) => return Ok((v, c.name())),
                    Err(e @ (IndexaError::NotFound { .. } | IndexaError::ProviderTimeout { .. })) => {
                        errors.push(e);
                    }
                    Err(e) => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(connector = c.name(), error = %e, "provider failed; falling back");
                        errors.push(tag_err(c.name(), e));
                    }
                }
            }
        }

        Err(crate::router::util::collapse_errors(
            capability,
            attempted_any,
            errors,
            Some(format!("{capability} for {code}")),
        ))
    }

    async fn fetch_single_latency<T, F, Fut>(
        &self,
        code: &str,
        capability: Capability,
        call: F,
    ) -> Result<(T, &'static str), IndexaError>
    where
        T: Send,
        F: Fn(Arc<dyn IndexaConnector>) -> Option<Fut> + Send,
        Fut: core::future::Future<Output = Result<T, IndexaError>> + Send,
    {
        use futures::stream::{FuturesUnordered, StreamExt};

        let mut futs = FuturesUnordered::new();
        let mut attempted_any = false;
        for c in self.ordered(code) {
            if let Some(fut) = call(c.clone()) {
                let name = c.name();
                let timeout = self.cfg.provider_timeout;
                futs.push(async move {
                    (
                        name,
                        Self::provider_call_with_timeout(name, capability, timeout, fut).await,
                    )
                });
                attempted_any = true;
            }
        }

        let mut errors: Vec<IndexaError> = Vec::new();
        while let Some((name, res)) = futs.next().await {
            match res {
                Ok(v) => return Ok((v, name)),
                Err(e @ (IndexaError::ProviderTimeout { .. } | IndexaError::NotFound { .. })) => {
                    errors.push(e);
                }
                Err(e) => errors.push(tag_err(name, e)),
            }
        }

        Err(crate::router::util::collapse_errors(
            capability,
            attempted_any,
            errors,
            Some(format!("{capability} for {code}")),
        ))
    }
}
