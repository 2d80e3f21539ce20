#![cfg(feature = "test-adapters")]

use std::sync::Arc;

use chrono::NaiveDate;
use indexa_core::{
    Frequency, IndexaError, PeriodicRequest,
    connector::{IndexaConnector, PeriodicSeriesProvider},
};
use indexa_evds::{EvdsConnector, adapter};
use serde_json::json;

struct Combo {
    s: Arc<dyn adapter::EvdsSeries>,
}
impl adapter::CloneArcAdapters for Combo {
    fn clone_arc_series(&self) -> Arc<dyn adapter::EvdsSeries> {
        self.s.clone()
    }
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn payload(v: serde_json::Value) -> adapter::EvdsResponse {
    serde_json::from_value(v).unwrap()
}

#[tokio::test]
async fn monthly_rows_map_onto_series() {
    let series = <dyn adapter::EvdsSeries>::from_fn(|q| {
        assert_eq!(q.series, "TP.FE.OKTG01");
        assert_eq!(q.frequency, 5);
        assert_eq!(
            q.to_path(),
            "series=TP.FE.OKTG01&startDate=01-01-2020&endDate=01-04-2020&type=json&frequency=5"
        );
        Ok(payload(json!({
            "totalCount": 4,
            "items": [
                {"Tarih": "2020-1", "TP_FE_OKTG01": "454.08", "UNIXTIME": {"$numberLong": "1577836800"}},
                {"Tarih": "2020-2", "TP_FE_OKTG01": "456,74"},
                {"Tarih": "2020-3", "TP_FE_OKTG01": null},
                {"Tarih": "2020-4", "TP_FE_OKTG01": 461.0}
            ]
        })))
    });
    let evds = EvdsConnector::from_adapter(&Combo { s: series });

    let req = PeriodicRequest::new("TP.FE.OKTG01", d(2020, 1, 1), d(2020, 4, 1), Frequency::Monthly)
        .unwrap();
    let out = evds.periodic_series(&req).await.unwrap();

    assert_eq!(out.name(), "TP.FE.OKTG01");
    assert_eq!(out.len(), 4);
    assert_eq!(out.value_at(d(2020, 1, 1)), Some(454.08));
    assert_eq!(out.value_at(d(2020, 2, 1)), Some(456.74));
    assert!(out.get(d(2020, 3, 1)).is_some_and(|p| p.value.is_none()));
    assert_eq!(out.value_at(d(2020, 4, 1)), Some(461.0));
}

#[tokio::test]
async fn daily_labels_are_day_month_year() {
    let series = <dyn adapter::EvdsSeries>::from_fn(|_| {
        Ok(payload(json!({
            "items": [
                {"Tarih": "03-01-2022", "TP_DK_USD_S_YTL": "13.3283"},
                {"Tarih": "04-01-2022", "TP_DK_USD_S_YTL": "13.4001"}
            ]
        })))
    });
    let evds = EvdsConnector::from_adapter(&Combo { s: series });
    let req = PeriodicRequest::new("TP.DK.USD.S.YTL", d(2022, 1, 1), d(2022, 1, 31), Frequency::Daily)
        .unwrap();
    let out = evds.periodic_series(&req).await.unwrap();
    let dates: Vec<_> = out.dates().collect();
    assert_eq!(dates, vec![d(2022, 1, 3), d(2022, 1, 4)]);
}

#[tokio::test]
async fn missing_value_column_is_a_resolution_error() {
    let series = <dyn adapter::EvdsSeries>::from_fn(|_| {
        Ok(payload(json!({
            "items": [{"Tarih": "2020-1", "TP_OTHER": "1.0"}]
        })))
    });
    let evds = EvdsConnector::from_adapter(&Combo { s: series });
    let req = PeriodicRequest::new("TP.RK.T1.Y", d(2020, 1, 1), d(2020, 2, 1), Frequency::Monthly)
        .unwrap();
    let err = evds.periodic_series(&req).await.unwrap_err();
    match err {
        IndexaError::ColumnResolution { column, available } => {
            assert_eq!(column, "TP_RK_T1_Y");
            assert!(available.contains(&"TP_OTHER".to_string()));
        }
        other => panic!("expected column resolution error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_payload_is_not_found() {
    let series = <dyn adapter::EvdsSeries>::from_fn(|_| Ok(payload(json!({"items": []}))));
    let evds = EvdsConnector::from_adapter(&Combo { s: series });
    let req = PeriodicRequest::new("TP.FE.OKTG01", d(2020, 1, 1), d(2020, 2, 1), Frequency::Monthly)
        .unwrap();
    let err = evds.periodic_series(&req).await.unwrap_err();
    assert!(matches!(err, IndexaError::NotFound { .. }));
}

#[tokio::test]
async fn unparseable_label_surfaces() {
    let series = <dyn adapter::EvdsSeries>::from_fn(|_| {
        Ok(payload(json!({"items": [{"Tarih": "Ocak 2020", "TP_FE_OKTG01": "1"}]})))
    });
    let evds = EvdsConnector::from_adapter(&Combo { s: series });
    let req = PeriodicRequest::new("TP.FE.OKTG01", d(2020, 1, 1), d(2020, 2, 1), Frequency::Monthly)
        .unwrap();
    let err = evds.periodic_series(&req).await.unwrap_err();
    assert!(matches!(err, IndexaError::Unparseable { .. }));
}

#[test]
fn only_tp_codes_are_served() {
    let series = <dyn adapter::EvdsSeries>::from_fn(|_| Ok(adapter::EvdsResponse::default()));
    let evds = EvdsConnector::from_adapter(&Combo { s: series });
    assert!(evds.supports_code("TP.FE.OKTG01"));
    assert!(!evds.supports_code("CPIAUCSL"));
    assert!(evds.as_periodic_provider().is_some());
    assert!(evds.as_observation_provider().is_none());
    assert_eq!(evds.key(), EvdsConnector::KEY);
}
