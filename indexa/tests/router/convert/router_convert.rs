use indexa::{ColumnKey, Frequency, Indexa, IndexaError, JoinTolerance, PeriodicRequest};

use crate::helpers::{USD, d, m_catalogue, monthly};

const WAGE: &str = "TP.WAGE";

#[tokio::test]
async fn converts_local_values_by_nearest_rate() {
    let evds = m_catalogue(
        "evds",
        vec![
            (WAGE, monthly(WAGE, d(2021, 1, 1), &[700.0, 800.0, 0.0])),
            (USD, monthly(USD, d(2021, 1, 1), &[7.0, 8.0, 0.0])),
        ],
    );
    let indexa = Indexa::builder().with_connector(evds).build().unwrap();
    let req = PeriodicRequest::new(WAGE, d(2021, 1, 1), d(2021, 3, 1), Frequency::Monthly).unwrap();

    let report = indexa
        .converted_series(&req, USD, JoinTolerance::from_days(31))
        .await
        .unwrap();

    let out = &report.table.column(ColumnKey::ConvertedValue).unwrap().values;
    assert_eq!(out[0], Some(100.0));
    assert_eq!(out[1], Some(100.0));
    // A zero rate leaves the point absent with a warning.
    assert_eq!(out[2], None);
    assert!(
        report
            .warnings
            .iter()
            .any(|w| matches!(w, IndexaError::Data(_)))
    );
    assert_eq!(report.attribution.sources.len(), 2);
}

#[tokio::test]
async fn disjoint_series_are_empty() {
    let evds = m_catalogue(
        "evds",
        vec![
            (WAGE, monthly(WAGE, d(2021, 1, 1), &[700.0])),
            (USD, monthly(USD, d(2022, 1, 1), &[7.0])),
        ],
    );
    let indexa = Indexa::builder().with_connector(evds).build().unwrap();
    let req = PeriodicRequest::new(WAGE, d(2021, 1, 1), d(2022, 1, 1), Frequency::Monthly).unwrap();

    let err = indexa
        .converted_series(&req, USD, JoinTolerance::from_days(31))
        .await
        .unwrap_err();
    assert!(matches!(err, IndexaError::EmptyResult { .. }), "{err:?}");
}
