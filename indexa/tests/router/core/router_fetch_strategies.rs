use std::time::Duration;

use indexa::{FetchStrategy, Frequency, Indexa, IndexaError, PeriodicRequest};

use crate::helpers::{CPI, MockConnector, d, monthly};

fn cpi_request() -> PeriodicRequest {
    PeriodicRequest::new(CPI, d(2020, 1, 1), d(2020, 3, 1), Frequency::Monthly).unwrap()
}

#[tokio::test]
async fn strategy_latency_returns_fastest_success() {
    let fast_ok = MockConnector::builder()
        .name("fast")
        .delay(Duration::from_millis(10))
        .returns_series_ok(monthly("fast", d(2020, 1, 1), &[11.0, 12.0, 13.0]))
        .build();
    let slow_ok = MockConnector::builder()
        .name("slow")
        .delay(Duration::from_millis(100))
        .returns_series_ok(monthly("slow", d(2020, 1, 1), &[99.0, 98.0, 97.0]))
        .build();

    let indexa = Indexa::builder()
        .with_connector(slow_ok)
        .with_connector(fast_ok)
        .fetch_strategy(FetchStrategy::Latency)
        .build()
        .unwrap();

    let (s, attr) = indexa
        .periodic_series_with_attribution(&cpi_request())
        .await
        .unwrap();
    assert_eq!(s.value_at(d(2020, 1, 1)), Some(11.0));
    assert_eq!(attr.connector_for(CPI), Some("fast"));
}

#[tokio::test]
async fn strategy_latency_ignores_faster_failure_and_returns_first_success() {
    let fast_fail = MockConnector::builder()
        .name("fast_fail")
        .delay(Duration::from_millis(5))
        .fails_periodic("boom")
        .build();
    let slow_ok = MockConnector::builder()
        .name("slow_ok")
        .delay(Duration::from_millis(20))
        .returns_series_ok(monthly("slow_ok", d(2020, 1, 1), &[77.0, 78.0, 79.0]))
        .build();

    let indexa = Indexa::builder()
        .with_connector(fast_fail)
        .with_connector(slow_ok)
        .fetch_strategy(FetchStrategy::Latency)
        .build()
        .unwrap();

    let s = indexa.periodic_series(&cpi_request()).await.unwrap();
    assert_eq!(s.value_at(d(2020, 1, 1)), Some(77.0));
}

#[tokio::test]
async fn priority_falls_back_after_failure() {
    let first = MockConnector::builder()
        .name("first")
        .fails_periodic("down")
        .build();
    let second = MockConnector::builder()
        .name("second")
        .returns_series_ok(monthly("second", d(2020, 1, 1), &[1.0, 2.0, 3.0]))
        .build();

    let indexa = Indexa::builder()
        .with_connector(first)
        .with_connector(second)
        .build()
        .unwrap();

    let (s, attr) = indexa
        .periodic_series_with_attribution(&cpi_request())
        .await
        .unwrap();
    assert_eq!(s.len(), 3);
    assert_eq!(attr.connector_for(CPI), Some("second"));
}

#[tokio::test]
async fn all_providers_timing_out_collapses() {
    let slow = MockConnector::builder()
        .name("slow")
        .delay(Duration::from_millis(200))
        .returns_series_ok(monthly("slow", d(2020, 1, 1), &[1.0]))
        .build();

    let indexa = Indexa::builder()
        .with_connector(slow)
        .provider_timeout(Duration::from_millis(10))
        .build()
        .unwrap();

    let err = indexa.periodic_series(&cpi_request()).await.unwrap_err();
    assert!(matches!(err, IndexaError::AllProvidersTimedOut { .. }), "{err:?}");
}

#[tokio::test]
async fn no_capable_provider_is_unsupported() {
    let obs_only = MockConnector::builder()
        .name("obs_only")
        .with_observations_fn(|_| Ok(monthly("x", d(2020, 1, 1), &[1.0])))
        .build();
    let indexa = Indexa::builder().with_connector(obs_only).build().unwrap();

    let err = indexa.periodic_series(&cpi_request()).await.unwrap_err();
    assert!(matches!(err, IndexaError::Unsupported { .. }), "{err:?}");
}

#[tokio::test]
async fn connector_rejecting_code_is_skipped() {
    let us_only = MockConnector::builder()
        .name("us_only")
        .supports_codes(&["CPIAUCSL"])
        .returns_series_ok(monthly("us", d(2020, 1, 1), &[5.0, 5.0, 5.0]))
        .build();
    let tr = MockConnector::builder()
        .name("tr")
        .returns_series_ok(monthly("tr", d(2020, 1, 1), &[7.0, 7.0, 7.0]))
        .build();
    let indexa = Indexa::builder()
        .with_connector(us_only)
        .with_connector(tr)
        .build()
        .unwrap();

    let (_, attr) = indexa
        .periodic_series_with_attribution(&cpi_request())
        .await
        .unwrap();
    assert_eq!(attr.connector_for(CPI), Some("tr"));
}

#[test]
fn builder_without_connectors_is_invalid() {
    assert!(matches!(
        Indexa::builder().build(),
        Err(IndexaError::InvalidArg(_))
    ));
}
