use indexa::{Frequency, Indexa, PeriodicRequest};

use crate::helpers::{CPI, USD, d, m_series};

#[tokio::test]
async fn per_code_priority_is_applied() {
    let low = m_series("low", d(2021, 1, 1), &[1.0, 1.0]);
    let high = m_series("high", d(2021, 1, 1), &[2.0, 2.0]);

    let indexa = Indexa::builder()
        .with_connector(low.clone())
        .with_connector(high.clone())
        .prefer_for_code(CPI, &[high, low])
        .build()
        .unwrap();

    let cpi = PeriodicRequest::new(CPI, d(2021, 1, 1), d(2021, 2, 1), Frequency::Monthly).unwrap();
    let (s, attr) = indexa.periodic_series_with_attribution(&cpi).await.unwrap();
    assert_eq!(attr.connector_for(CPI), Some("high"));
    assert_eq!(s.value_at(d(2021, 2, 1)), Some(2.0));

    // Codes without a preference keep registration order.
    let usd = PeriodicRequest::new(USD, d(2021, 1, 1), d(2021, 2, 1), Frequency::Monthly).unwrap();
    let (_, attr) = indexa.periodic_series_with_attribution(&usd).await.unwrap();
    assert_eq!(attr.connector_for(USD), Some("low"));
}
