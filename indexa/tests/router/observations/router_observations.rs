use indexa::{Indexa, IndexaError, JoinTolerance, ObservationQuery, Series, TimePoint};

use crate::helpers::{MockConnector, US_CPI, d};

fn cpi_observations() -> Series {
    Series::new(
        US_CPI,
        vec![
            TimePoint::new(d(2023, 1, 1), 300.0),
            TimePoint::absent(d(2023, 2, 1)),
            TimePoint::new(d(2023, 3, 1), 306.0),
        ],
    )
}

fn fred_like() -> Indexa {
    let c = MockConnector::builder()
        .name("fred")
        .with_observations_fn(|req| match req.query() {
            ObservationQuery::Latest => Ok(Series::new(
                req.code(),
                vec![TimePoint::new(d(2023, 3, 1), 306.0)],
            )),
            _ => Ok(cpi_observations()),
        })
        .build();
    Indexa::builder().with_connector(c).build().unwrap()
}

#[tokio::test]
async fn nearest_skips_placeholders_and_reports_distance() {
    let indexa = fred_like();
    let r = indexa
        .nearest_observation(US_CPI, d(2023, 2, 3), Some(JoinTolerance::from_days(31)))
        .await
        .unwrap();
    assert_eq!(r.date, d(2023, 3, 1));
    assert!((r.value - 306.0).abs() < 1e-12);
    assert_eq!(r.distance_days, 26);
    assert_eq!(r.connector, "fred");
    assert!(r.warnings.is_empty());
}

#[tokio::test]
async fn nearest_beyond_tolerance_is_annotated_not_dropped() {
    let indexa = fred_like();
    let r = indexa
        .nearest_observation(US_CPI, d(2023, 2, 3), Some(JoinTolerance::from_days(10)))
        .await
        .unwrap();
    assert_eq!(r.date, d(2023, 3, 1));
    assert_eq!(r.warnings.len(), 1);
    match &r.warnings[0] {
        IndexaError::JoinToleranceExceeded {
            distance_days,
            tolerance_days,
            ..
        } => {
            assert_eq!(*distance_days, 26);
            assert_eq!(*tolerance_days, 10);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn latest_returns_most_recent_point() {
    let indexa = fred_like();
    let r = indexa.latest_observation(US_CPI).await.unwrap();
    assert_eq!(r.date, d(2023, 3, 1));
    assert_eq!(r.requested, None);
    assert_eq!(r.distance_days, 0);
}

#[tokio::test]
async fn inflation_between_two_lookups() {
    let indexa = fred_like();
    let r = indexa
        .inflation_between(US_CPI, d(2023, 1, 1), d(2023, 3, 1), None)
        .await
        .unwrap();
    assert!((r.change_pct - 2.0).abs() < 1e-9);
    assert_eq!(r.start.date, d(2023, 1, 1));
    assert_eq!(r.end.date, d(2023, 3, 1));

    let err = indexa
        .inflation_between(US_CPI, d(2023, 3, 1), d(2023, 1, 1), None)
        .await
        .unwrap_err();
    assert!(matches!(err, IndexaError::InvalidArg(_)));
}

#[tokio::test]
async fn empty_window_is_not_found() {
    let c = MockConnector::builder()
        .name("empty")
        .with_observations_fn(|req| Ok(Series::empty(req.code())))
        .build();
    let indexa = Indexa::builder().with_connector(c).build().unwrap();
    let err = indexa
        .nearest_observation(US_CPI, d(2023, 1, 1), None)
        .await
        .unwrap_err();
    assert!(matches!(err, IndexaError::NotFound { .. }), "{err:?}");
}
