use indexa_core::{
    Attribution, ColumnKey, CompositeTable, CompositionReport, IndexaError, JoinTolerance,
    PeriodicRequest, convert_currency, sanitize,
};

use crate::Indexa;
use crate::router::compose::align_onto;

impl Indexa {
    /// Convert a local-currency series into a second currency.
    ///
    /// The exchange rate (local units per unit of the target currency) is fetched over
    /// the same range and frequency as `local`, aligned onto the local dates within
    /// `tolerance`, and divided out. The table carries `local_value`, `currency_raw` and
    /// `converted_value`.
    ///
    /// # Errors
    /// Provider errors for either series, `RequestTimeout` when the overall deadline
    /// elapses, and `EmptyResult` when the two series share no dates.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "indexa::router",
            skip(self, local),
            fields(code = local.code(), fx = fx_code),
        )
    )]
    pub async fn converted_series(
        &self,
        local: &PeriodicRequest,
        fx_code: &str,
        tolerance: JoinTolerance,
    ) -> Result<CompositionReport, IndexaError> {
        let fx_req = PeriodicRequest::new(fx_code, local.start(), local.end(), local.frequency())?;
        let (local_res, fx_res) = crate::core::with_request_deadline(self.cfg.request_timeout, async {
            tokio::join!(
                self.periodic_series_with_attribution(local),
                self.periodic_series_with_attribution(&fx_req),
            )
        })
        .await
        .map_err(|_| IndexaError::request_timeout("convert"))?;
        let (local_series, local_attr) = local_res?;
        let (fx_series, fx_attr) = fx_res?;

        let mut warnings = Vec::new();
        let (local_series, w) = sanitize(&local_series);
        warnings.extend(w);
        let (fx_series, w) = sanitize(&fx_series);
        warnings.extend(w);

        let axis: Vec<_> = local_series.dates().collect();
        let fx_aligned = align_onto(&axis, &fx_series, tolerance, &mut warnings);
        let table = CompositeTable::inner_join([
            (ColumnKey::LocalValue, local_series),
            (ColumnKey::CurrencyRaw, fx_aligned),
        ])?;
        if table.is_empty() {
            return Err(IndexaError::empty(format!(
                "no common dates between {} and {fx_code}",
                local.code()
            )));
        }
        let (converted, w) = convert_currency(
            &table.series(ColumnKey::LocalValue)?,
            &table.series(ColumnKey::CurrencyRaw)?,
        );
        warnings.extend(w);
        let table = table.retain_column(ColumnKey::ConvertedValue, &converted)?;

        let mut attribution = Attribution::new();
        attribution.sources.extend(local_attr.sources);
        attribution.sources.extend(fx_attr.sources);
        Ok(CompositionReport {
            table,
            attribution,
            warnings,
        })
    }
}
