use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use indexa::{FetchStrategy, Indexa, IndexaConnector};

/// Connector selection taken from global flags.
pub struct ConnectorArgs<'a> {
    pub mock: bool,
    pub evds_key: Option<&'a str>,
    pub fred_key: Option<&'a str>,
    pub latency: bool,
    pub provider_timeout: Duration,
}

/// Register the mock connector, or every remote connector a key was supplied for.
pub fn build(args: &ConnectorArgs<'_>) -> anyhow::Result<Indexa> {
    let mut connectors: Vec<Arc<dyn IndexaConnector>> = Vec::new();
    if args.mock {
        tracing::info!("using the offline fixture connector");
        connectors.push(Arc::new(indexa_mock::MockConnector::new()));
    } else {
        if let Some(key) = args.evds_key.filter(|k| !k.trim().is_empty()) {
            connectors.push(Arc::new(indexa_evds::EvdsConnector::new_with_key(key)));
        }
        if let Some(key) = args.fred_key.filter(|k| !k.trim().is_empty()) {
            connectors.push(Arc::new(indexa_fred::FredConnector::new_with_key(key)));
        }
    }
    if connectors.is_empty() {
        bail!("no data provider configured: pass --mock, --evds-key or --fred-key");
    }

    let strategy = if args.latency {
        FetchStrategy::Latency
    } else {
        FetchStrategy::PriorityWithFallback
    };
    connectors
        .into_iter()
        .fold(Indexa::builder(), |b, c| b.with_connector(c))
        .fetch_strategy(strategy)
        .provider_timeout(args.provider_timeout)
        .build()
        .context("building the orchestrator")
}
