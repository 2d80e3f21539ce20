use std::time::Duration;

use indexa::{
    ColumnKey, CompositionConfig, DeflatorVariant, Indexa, IndexaError, MonthPeriod, Series,
    SpliceBoundary, Stage, TimePoint,
};

use crate::helpers::{CPI, MockConnector, USD, d, m_catalogue, monthly, pct_table};

fn approx(a: Option<f64>, b: f64) -> bool {
    a.is_some_and(|a| (a - b).abs() < 1e-9)
}

fn column(report: &indexa::CompositionReport, key: ColumnKey) -> Vec<Option<f64>> {
    report.table.column(key).unwrap().values.clone()
}

#[tokio::test]
async fn rebases_and_joins_required_columns() {
    let evds = m_catalogue(
        "evds",
        vec![
            (CPI, monthly(CPI, d(2021, 1, 1), &[200.0, 220.0, 242.0])),
            (USD, monthly(USD, d(2021, 1, 1), &[8.0, 10.0, 12.0])),
        ],
    );
    let indexa = Indexa::builder().with_connector(evds).build().unwrap();
    let cfg = CompositionConfig {
        start: d(2021, 1, 1),
        end: d(2021, 3, 1),
        normalize: true,
        ..CompositionConfig::default()
    };

    let builder = indexa.composition(cfg);
    assert_eq!(
        builder.stages(),
        vec![Stage::Fetch, Stage::Normalize, Stage::Rebase, Stage::Join, Stage::Emit]
    );
    let report = builder.run().await.unwrap();

    assert_eq!(report.table.dates(), &[d(2021, 1, 1), d(2021, 2, 1), d(2021, 3, 1)]);
    let price = column(&report, ColumnKey::PriceIndex);
    assert!(approx(price[0], 100.0) && approx(price[1], 110.0) && approx(price[2], 121.0));
    let fx = column(&report, ColumnKey::CurrencyIndex);
    assert!(approx(fx[1], 125.0) && approx(fx[2], 150.0));
    let fx_raw = column(&report, ColumnKey::CurrencyRaw);
    assert!(approx(fx_raw[2], 12.0));
    assert!(!report.table.contains(ColumnKey::AlternativeIndex));
    assert!(report.warnings.is_empty());
    assert_eq!(report.attribution.connector_for(CPI), Some("evds"));
    assert_eq!(report.attribution.connector_for(USD), Some("evds"));
}

#[tokio::test]
async fn start_after_boundary_compounds_directly() {
    let evds = m_catalogue(
        "evds",
        vec![
            (CPI, monthly(CPI, d(2020, 9, 1), &[50.0, 51.0, 52.0])),
            (USD, monthly(USD, d(2020, 9, 1), &[7.0, 8.0, 8.0])),
        ],
    );
    let indexa = Indexa::builder().with_connector(evds).build().unwrap();
    let cfg = CompositionConfig {
        start: d(2020, 9, 1),
        end: d(2020, 11, 1),
        normalize: true,
        include_alternative: true,
        ..CompositionConfig::default()
    };

    let report = indexa
        .composition(cfg)
        .alternative(pct_table("09-2020", &[3.0, 10.0, -5.0]))
        .run()
        .await
        .unwrap();

    // September seeds the index; its own change precedes the seed and is not applied.
    let alt = column(&report, ColumnKey::AlternativeIndex);
    assert!(approx(alt[0], 100.0) && approx(alt[1], 110.0) && approx(alt[2], 104.5));
    let avg = column(&report, ColumnKey::AlternativeAverage);
    assert!(approx(avg[0], 100.0) && approx(avg[1], 106.0) && approx(avg[2], 104.25));
}

#[tokio::test]
async fn start_before_boundary_splices_history() {
    let evds = m_catalogue(
        "evds",
        vec![
            (CPI, monthly(CPI, d(2020, 7, 1), &[80.0, 88.0, 90.0, 91.0, 92.0])),
            (USD, monthly(USD, d(2020, 7, 1), &[7.0; 5])),
        ],
    );
    let indexa = Indexa::builder().with_connector(evds).build().unwrap();
    let cfg = CompositionConfig {
        start: d(2020, 7, 1),
        end: d(2020, 11, 1),
        normalize: true,
        include_alternative: true,
        ..CompositionConfig::default()
    };

    let report = indexa
        .composition(cfg)
        .alternative(pct_table("09-2020", &[10.0, -5.0]))
        .run()
        .await
        .unwrap();

    let alt = column(&report, ColumnKey::AlternativeIndex);
    assert!(approx(alt[0], 100.0));
    assert!(approx(alt[1], 110.0));
    assert!(approx(alt[2], 121.0));
    assert!(approx(alt[3], 114.95));
    // The table runs out after 10-2020; the row stays, the value is absent.
    assert_eq!(alt[4], None);

    let avg = column(&report, ColumnKey::AlternativeAverage);
    assert!(approx(avg[2], 116.75));
    assert!(approx(avg[3], 114.35));
    assert_eq!(avg[4], None);
}

#[tokio::test]
async fn range_closing_before_boundary_keeps_history() {
    let evds = m_catalogue(
        "evds",
        vec![
            (CPI, monthly(CPI, d(2020, 5, 1), &[80.0, 88.0, 96.0])),
            (USD, monthly(USD, d(2020, 5, 1), &[7.0; 3])),
        ],
    );
    let indexa = Indexa::builder().with_connector(evds).build().unwrap();
    let cfg = CompositionConfig {
        start: d(2020, 5, 1),
        end: d(2020, 7, 1),
        normalize: true,
        include_alternative: true,
        ..CompositionConfig::default()
    };
    let report = indexa
        .composition(cfg)
        .alternative(pct_table("09-2020", &[10.0]))
        .run()
        .await
        .unwrap();

    assert_eq!(
        column(&report, ColumnKey::AlternativeIndex),
        column(&report, ColumnKey::PriceIndex)
    );
    let alt = column(&report, ColumnKey::AlternativeIndex);
    assert!(approx(alt[0], 100.0) && approx(alt[2], 120.0));
}

#[tokio::test]
async fn boundary_follows_table_when_configured() {
    let evds = m_catalogue(
        "evds",
        vec![
            (CPI, monthly(CPI, d(2021, 1, 1), &[10.0, 10.0, 10.0])),
            (USD, monthly(USD, d(2021, 1, 1), &[1.0, 1.0, 1.0])),
        ],
    );
    let indexa = Indexa::builder().with_connector(evds).build().unwrap();
    let cfg = CompositionConfig {
        start: d(2021, 1, 1),
        end: d(2021, 3, 1),
        normalize: true,
        include_alternative: true,
        splice_boundary: SpliceBoundary::FirstTablePeriod,
        ..CompositionConfig::default()
    };
    let report = indexa
        .composition(cfg)
        .alternative(pct_table("02-2021", &[50.0]))
        .run()
        .await
        .unwrap();

    // Head is January only; February onward is compounded from it.
    let alt = column(&report, ColumnKey::AlternativeIndex);
    assert!(approx(alt[0], 100.0));
    assert!(approx(alt[1], 150.0));
    assert_eq!(alt[2], None);
    assert_eq!(
        SpliceBoundary::FirstTablePeriod.resolve(&pct_table("02-2021", &[50.0])),
        Some(MonthPeriod::new(2021, 2).unwrap())
    );
}

#[tokio::test]
async fn mid_month_start_dates_levels_by_their_month() {
    let evds = m_catalogue(
        "evds",
        vec![
            (CPI, monthly(CPI, d(2021, 1, 1), &[10.0, 10.0, 10.0, 10.0])),
            (USD, monthly(USD, d(2021, 1, 1), &[1.0; 4])),
        ],
    );
    let indexa = Indexa::builder().with_connector(evds).build().unwrap();
    let cfg = CompositionConfig {
        start: d(2021, 1, 15),
        end: d(2021, 4, 1),
        normalize: true,
        include_alternative: true,
        ..CompositionConfig::default()
    };
    let report = indexa
        .composition(cfg)
        .alternative(pct_table("01-2021", &[10.0, 10.0, 20.0, 50.0]))
        .run()
        .await
        .unwrap();

    assert_eq!(report.table.dates(), &[d(2021, 2, 1), d(2021, 3, 1), d(2021, 4, 1)]);
    // February is the first month on the axis and seeds the index; March and April
    // carry their own changes.
    let alt = column(&report, ColumnKey::AlternativeIndex);
    assert!(approx(alt[0], 100.0));
    assert!(approx(alt[1], 120.0));
    assert!(approx(alt[2], 180.0));
}

#[tokio::test]
async fn table_gap_leaves_later_months_absent() {
    let evds = m_catalogue(
        "evds",
        vec![
            (CPI, monthly(CPI, d(2021, 1, 1), &[10.0; 4])),
            (USD, monthly(USD, d(2021, 1, 1), &[1.0; 4])),
        ],
    );
    let indexa = Indexa::builder().with_connector(evds).build().unwrap();
    let cfg = CompositionConfig {
        start: d(2021, 1, 1),
        end: d(2021, 4, 1),
        normalize: true,
        include_alternative: true,
        ..CompositionConfig::default()
    };
    let table = indexa::PercentChangeSeries::new(
        "alt",
        [
            (MonthPeriod::new(2021, 2).unwrap(), 10.0),
            (MonthPeriod::new(2021, 4).unwrap(), 50.0),
        ],
    )
    .unwrap();
    let report = indexa.composition(cfg).alternative(table).run().await.unwrap();

    let alt = column(&report, ColumnKey::AlternativeIndex);
    assert!(approx(alt[0], 100.0));
    assert!(approx(alt[1], 110.0));
    assert_eq!(alt[2], None);
    assert_eq!(alt[3], None);
    assert!(report.warnings.iter().any(|w| matches!(
        w,
        IndexaError::UnsupportedPeriod { period, .. } if period == "03-2021"
    )));
}

#[tokio::test]
async fn missing_anchor_keeps_raw_series_and_warns() {
    let cpi = Series::new(
        CPI,
        vec![
            TimePoint::absent(d(2021, 1, 1)),
            TimePoint::new(d(2021, 2, 1), 110.0),
            TimePoint::new(d(2021, 3, 1), 121.0),
        ],
    );
    let evds = m_catalogue(
        "evds",
        vec![(CPI, cpi), (USD, monthly(USD, d(2021, 1, 1), &[8.0, 8.0, 8.0]))],
    );
    let indexa = Indexa::builder().with_connector(evds).build().unwrap();
    let cfg = CompositionConfig {
        start: d(2021, 1, 1),
        end: d(2021, 3, 1),
        normalize: true,
        ..CompositionConfig::default()
    };

    let report = indexa.composition(cfg).run().await.unwrap();
    let price = column(&report, ColumnKey::PriceIndex);
    assert_eq!(price[0], None);
    assert!(approx(price[1], 110.0));
    assert!(
        report
            .warnings
            .iter()
            .any(|w| matches!(w, IndexaError::MissingAnchor { .. }))
    );
}

#[tokio::test]
async fn missing_required_series_fails_the_run() {
    let evds = m_catalogue(
        "evds",
        vec![(CPI, monthly(CPI, d(2021, 1, 1), &[1.0, 2.0]))],
    );
    let indexa = Indexa::builder().with_connector(evds).build().unwrap();
    let cfg = CompositionConfig {
        start: d(2021, 1, 1),
        end: d(2021, 2, 1),
        ..CompositionConfig::default()
    };
    let err = indexa.composition(cfg).run().await.unwrap_err();
    assert!(matches!(err, IndexaError::NotFound { .. }), "{err:?}");
}

#[tokio::test]
async fn empty_range_is_an_error() {
    let evds = m_catalogue(
        "evds",
        vec![
            (CPI, monthly(CPI, d(2010, 1, 1), &[1.0, 2.0])),
            (USD, monthly(USD, d(2010, 1, 1), &[1.0, 2.0])),
        ],
    );
    let indexa = Indexa::builder().with_connector(evds).build().unwrap();
    let cfg = CompositionConfig {
        start: d(2021, 1, 1),
        end: d(2021, 2, 1),
        ..CompositionConfig::default()
    };
    let err = indexa.composition(cfg).run().await.unwrap_err();
    assert!(matches!(err, IndexaError::EmptyResult { .. }), "{err:?}");
}

#[tokio::test]
async fn alternative_deflator_requires_a_table() {
    let evds = m_catalogue("evds", vec![]);
    let indexa = Indexa::builder().with_connector(evds).build().unwrap();
    let cfg = CompositionConfig {
        deflator: DeflatorVariant::Average,
        ..CompositionConfig::default()
    };
    let err = indexa.composition(cfg).run().await.unwrap_err();
    assert!(matches!(err, IndexaError::InvalidArg(_)), "{err:?}");
}

#[tokio::test]
async fn request_deadline_bounds_the_fetch_stage() {
    let slow = MockConnector::builder()
        .name("slow")
        .delay(Duration::from_millis(200))
        .returns_series_ok(monthly("slow", d(2021, 1, 1), &[1.0, 2.0]))
        .build();
    let indexa = Indexa::builder()
        .with_connector(slow)
        .request_timeout(Duration::from_millis(20))
        .build()
        .unwrap();
    let cfg = CompositionConfig {
        start: d(2021, 1, 1),
        end: d(2021, 2, 1),
        ..CompositionConfig::default()
    };
    let err = indexa.composition(cfg).run().await.unwrap_err();
    match err {
        IndexaError::RequestTimeout { capability } => assert_eq!(capability, "compose"),
        other => panic!("unexpected: {other:?}"),
    }
}
