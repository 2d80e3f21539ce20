use indexa::{ColumnKey, CompositionConfig, DeflatorVariant, Indexa, IndexaError, Stage};

use crate::helpers::{CPI, RATIO, USD, d, m_catalogue, monthly, pct_table};

fn indexa_with_ratio() -> Indexa {
    let evds = m_catalogue(
        "evds",
        vec![
            (CPI, monthly(CPI, d(2020, 9, 1), &[50.0, 51.0, 52.0])),
            (USD, monthly(USD, d(2020, 9, 1), &[7.0, 8.0, 8.0])),
            (RATIO, monthly(RATIO, d(2020, 9, 1), &[90.0, 95.0, 100.0])),
        ],
    );
    Indexa::builder().with_connector(evds).build().unwrap()
}

fn cfg(deflator: DeflatorVariant) -> CompositionConfig {
    CompositionConfig {
        start: d(2020, 9, 1),
        end: d(2020, 11, 1),
        normalize: true,
        recompose: true,
        deflator,
        ..CompositionConfig::default()
    }
}

#[tokio::test]
async fn official_deflator_is_identity() {
    let indexa = indexa_with_ratio();
    let report = indexa
        .composition(cfg(DeflatorVariant::PriceIndex))
        .run()
        .await
        .unwrap();
    let raw = &report.table.column(ColumnKey::RatioRaw).unwrap().values;
    let out = &report.table.column(ColumnKey::RatioRecomposed).unwrap().values;
    for (r, o) in raw.iter().zip(out) {
        assert!((r.unwrap() - o.unwrap()).abs() < 1e-9);
    }
}

#[tokio::test]
async fn alternative_deflator_rescales_after_the_first_point() {
    let indexa = indexa_with_ratio();
    let builder = indexa
        .composition(cfg(DeflatorVariant::Alternative))
        .alternative(pct_table("10-2020", &[10.0, -5.0]));
    assert_eq!(
        builder.stages(),
        vec![
            Stage::Fetch,
            Stage::Normalize,
            Stage::Rebase,
            Stage::Join,
            Stage::Compound,
            Stage::Recompose,
            Stage::Emit
        ]
    );
    let report = builder.run().await.unwrap();
    let out = &report.table.column(ColumnKey::RatioRecomposed).unwrap().values;
    assert!((out[0].unwrap() - 90.0).abs() < 1e-9);
    assert!((out[1].unwrap() - 95.0 * 110.0 / 102.0).abs() < 1e-9);
    assert!((out[2].unwrap() - 100.0 * 104.5 / 104.0).abs() < 1e-9);
    assert!(!report.table.contains(ColumnKey::AlternativeIndex));
    assert!(!report.table.contains(ColumnKey::AlternativeAverage));
}

#[tokio::test]
async fn recompose_requires_the_ratio_series() {
    let evds = m_catalogue(
        "evds",
        vec![
            (CPI, monthly(CPI, d(2020, 9, 1), &[50.0, 51.0])),
            (USD, monthly(USD, d(2020, 9, 1), &[7.0, 8.0])),
        ],
    );
    let indexa = Indexa::builder().with_connector(evds).build().unwrap();
    let err = indexa
        .composition(cfg(DeflatorVariant::PriceIndex))
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, IndexaError::NotFound { .. }), "{err:?}");
}
