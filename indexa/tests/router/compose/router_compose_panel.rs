use std::collections::HashMap;

use indexa::{ColumnKey, CompositionConfig, Indexa, IndexaError, Series, Stage, TimePoint};

use crate::helpers::{CPI, MockConnector, US_CPI, USD, d, m_catalogue, monthly};

fn burger_panel() -> Series {
    Series::new(
        "dollar_price",
        vec![
            TimePoint::new(d(2021, 1, 15), 10.0),
            TimePoint::new(d(2021, 3, 15), 12.0),
            TimePoint::new(d(2021, 5, 15), 15.0),
        ],
    )
}

fn panel_cfg() -> CompositionConfig {
    CompositionConfig {
        start: d(2021, 1, 1),
        end: d(2021, 6, 1),
        reference_code: Some(US_CPI.to_string()),
        ..CompositionConfig::default()
    }
}

fn catalogue() -> HashMap<&'static str, Series> {
    HashMap::from([
        (
            CPI,
            monthly(CPI, d(2021, 1, 1), &[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]),
        ),
        (USD, monthly(USD, d(2021, 1, 1), &[7.0; 6])),
    ])
}

#[tokio::test]
async fn panel_is_expanded_aligned_and_deflated() {
    let by_code = catalogue();
    let connector = MockConnector::builder()
        .name("combined")
        .with_periodic_fn(move |req| {
            by_code
                .get(req.code())
                .cloned()
                .ok_or_else(|| IndexaError::not_found(req.code()))
        })
        .with_observations_fn(|req| {
            Ok(monthly(
                req.code(),
                d(2021, 1, 1),
                &[200.0, 202.0, 204.0, 206.0, 208.0, 210.0],
            ))
        })
        .build();
    let indexa = Indexa::builder().with_connector(connector).build().unwrap();

    let builder = indexa.composition(panel_cfg()).panel(burger_panel());
    assert!(builder.stages().contains(&Stage::Expand));
    let report = builder.run().await.unwrap();

    let panel = &report.table.column(ColumnKey::PanelPrice).unwrap().values;
    assert_eq!(
        panel,
        &vec![
            Some(10.0),
            Some(10.0),
            Some(10.0),
            Some(12.0),
            Some(15.0),
            Some(15.0)
        ]
    );
    let adjusted = &report.table.column(ColumnKey::PanelAdjusted).unwrap().values;
    assert!((adjusted[0].unwrap() - 10.5).abs() < 1e-9);
    assert!((adjusted[3].unwrap() - 12.0 * 210.0 / 206.0).abs() < 1e-9);
    assert!((adjusted[5].unwrap() - 15.0).abs() < 1e-9);
    assert!(report.table.contains(ColumnKey::ReferenceIndex));
    assert_eq!(report.attribution.connector_for(US_CPI), Some("combined"));
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}

#[tokio::test]
async fn unavailable_reference_leaves_panel_undeflated() {
    let evds = m_catalogue(
        "evds",
        catalogue().into_iter().collect::<Vec<_>>(),
    );
    let indexa = Indexa::builder().with_connector(evds).build().unwrap();

    let report = indexa
        .composition(panel_cfg())
        .panel(burger_panel())
        .run()
        .await
        .unwrap();

    assert!(report.table.contains(ColumnKey::PanelPrice));
    assert!(!report.table.contains(ColumnKey::PanelAdjusted));
    assert!(
        report
            .warnings
            .iter()
            .any(|w| matches!(w, IndexaError::Unsupported { .. }))
    );
}

#[tokio::test]
async fn unexpanded_panel_is_matched_by_nearest_date() {
    let evds = m_catalogue("evds", catalogue().into_iter().collect::<Vec<_>>());
    let indexa = Indexa::builder().with_connector(evds).build().unwrap();
    let mut cfg = panel_cfg();
    cfg.reference_code = None;
    cfg.panel.expand = false;

    let builder = indexa.composition(cfg).panel(burger_panel());
    assert!(!builder.stages().contains(&Stage::Expand));
    let report = builder.run().await.unwrap();

    // Sparse points two months apart still land within the 31-day tolerance.
    let panel = &report.table.column(ColumnKey::PanelPrice).unwrap().values;
    assert_eq!(panel[0], Some(10.0));
    assert_eq!(panel[1], Some(10.0));
    assert_eq!(panel[3], Some(12.0));
    assert_eq!(panel[5], Some(15.0));
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}
