use chrono::{Days, NaiveDate};
use indexa_core::{
    Anchor, Attribution, ColumnKey, CompositeTable, CompositionConfig, CompositionReport,
    DeflatorVariant, IndexSeries, IndexaError, JoinTolerance, MonthPeriod, ObservationQuery,
    ObservationRequest, PercentChangeSeries, PeriodicRequest, Series, SpliceBoundary,
    align_nearest, average, compound_series, convert_currency, expand_monthly, rebase,
    recompose, sanitize, splice,
};

use crate::Indexa;
use crate::router::util::coverage;

/// Stages of a composition run, in execution order.
///
/// `Fetch`, `Normalize`, `Join` and `Emit` always run; the others are switched by
/// configuration. Column keys do not depend on which stages ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Fetch every series the configuration needs, concurrently.
    Fetch,
    /// Sanitize values and restrict to the requested range.
    Normalize,
    /// Expand the panel to a monthly cadence.
    Expand,
    /// Rebase the price index and currency to 100 at their first point.
    Rebase,
    /// Align every series onto the price index dates.
    Join,
    /// Compound the alternative estimate, splicing with history when needed.
    Compound,
    /// Swap the deflator embedded in the ratio series.
    Recompose,
    /// Drop working columns the configuration did not ask for and produce the report.
    Emit,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Self; 8] = [
        Self::Fetch,
        Self::Normalize,
        Self::Expand,
        Self::Rebase,
        Self::Join,
        Self::Compound,
        Self::Recompose,
        Self::Emit,
    ];

    /// Stable label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Normalize => "normalize",
            Self::Expand => "expand",
            Self::Rebase => "rebase",
            Self::Join => "join",
            Self::Compound => "compound",
            Self::Recompose => "recompose",
            Self::Emit => "emit",
        }
    }

    /// Whether this stage runs for `cfg`.
    #[must_use]
    pub const fn enabled(self, cfg: &CompositionConfig, has_panel: bool) -> bool {
        match self {
            Self::Fetch | Self::Normalize | Self::Join | Self::Emit => true,
            Self::Expand => has_panel && cfg.panel.expand,
            Self::Rebase => cfg.normalize,
            Self::Compound => cfg.needs_alternative(),
            Self::Recompose => cfg.recompose,
        }
    }
}

/// Builder for a composition run bound to an `Indexa` instance.
pub struct CompositionBuilder<'a> {
    pub(crate) indexa: &'a Indexa,
    pub(crate) cfg: CompositionConfig,
    pub(crate) alternative: Option<PercentChangeSeries>,
    pub(crate) panel: Option<Series>,
}

/// Intermediate state carried between stages.
#[derive(Default)]
struct Work {
    price_raw: Series,
    price: Series,
    currency_raw: Series,
    currency: Series,
    ratio: Option<Series>,
    reference: Option<Series>,
    panel: Option<Series>,
    table: CompositeTable,
    boundary: Option<MonthPeriod>,
    attribution: Attribution,
    warnings: Vec<IndexaError>,
}

impl<'a> CompositionBuilder<'a> {
    /// Create a builder for `cfg`.
    #[must_use]
    pub fn new(indexa: &'a Indexa, cfg: CompositionConfig) -> Self {
        Self {
            indexa,
            cfg,
            alternative: None,
            panel: None,
        }
    }

    /// Supply the alternative estimate as a percent-change table.
    ///
    /// Required when the deflator variant or `include_alternative` asks for it.
    #[must_use]
    pub fn alternative(mut self, table: PercentChangeSeries) -> Self {
        self.alternative = Some(table);
        self
    }

    /// Supply a retail-price panel (one designated price column, see `loader`).
    #[must_use]
    pub fn panel(mut self, series: Series) -> Self {
        self.panel = Some(series);
        self
    }

    /// Stages that will run for the current configuration.
    #[must_use]
    pub fn stages(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|s| s.enabled(&self.cfg, self.panel.is_some()))
            .collect()
    }

    /// Execute the composition.
    ///
    /// Behavior and trade-offs:
    /// - Price index and currency are required: if either cannot be fetched or is empty
    ///   over the range, the run fails and no partial table is returned.
    /// - A failed rebase keeps the raw series for that column and records the
    ///   `MissingAnchor` warning.
    /// - Optional series (panel, reference) that fail are reported as warnings.
    ///
    /// # Errors
    /// `InvalidArg` for an invalid configuration or a missing alternative table,
    /// provider errors for required series, `RequestTimeout` when the overall deadline
    /// elapses, and `EmptyResult` when the table ends up empty.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "indexa::compose::run",
            skip(self),
            fields(start = %self.cfg.start, end = %self.cfg.end, deflator = ?self.cfg.deflator),
        )
    )]
    pub async fn run(self) -> Result<CompositionReport, IndexaError> {
        self.cfg.validate()?;
        if self.cfg.needs_alternative() && self.alternative.is_none() {
            return Err(IndexaError::InvalidArg(
                "an alternative estimate table is required for this deflator selection".into(),
            ));
        }
        let mut work = Work {
            panel: self.panel.clone(),
            ..Work::default()
        };
        for stage in self.stages() {
            #[cfg(feature = "tracing")]
            tracing::debug!(stage = stage.as_str(), "composition stage");
            match stage {
                Stage::Fetch => self.fetch(&mut work).await?,
                Stage::Normalize => self.normalize(&mut work)?,
                Stage::Expand => self.expand(&mut work)?,
                Stage::Rebase => self.rebase(&mut work),
                Stage::Join => self.join(&mut work)?,
                Stage::Compound => self.compound(&mut work)?,
                Stage::Recompose => self.recompose(&mut work)?,
                Stage::Emit => self.emit(&mut work),
            }
        }
        if work.table.is_empty() {
            return Err(IndexaError::empty(format!(
                "no common dates between {} and {}",
                self.cfg.codes.price_index, self.cfg.codes.currency
            )));
        }
        Ok(CompositionReport {
            table: work.table,
            attribution: work.attribution,
            warnings: work.warnings,
        })
    }

    fn periodic(&self, code: &str) -> Result<PeriodicRequest, IndexaError> {
        PeriodicRequest::new(code, self.cfg.start, self.cfg.end, self.cfg.codes.frequency)
    }

    async fn fetch(&self, work: &mut Work) -> Result<(), IndexaError> {
        let cfg = &self.cfg;
        let price_req = self.periodic(&cfg.codes.price_index)?;
        let fx_req = self.periodic(&cfg.codes.currency)?;
        let ratio_req = if cfg.recompose {
            Some(self.periodic(&cfg.codes.ratio)?)
        } else {
            None
        };
        let reference_req = match (&work.panel, &cfg.reference_code) {
            (Some(_), Some(code)) if cfg.panel.deflate => Some(ObservationRequest::new(
                code.as_str(),
                ObservationQuery::Range {
                    start: cfg.start,
                    end: cfg.end,
                },
            )?),
            _ => None,
        };

        let indexa = self.indexa;
        let fetches = async {
            tokio::join!(
                indexa.periodic_series_with_attribution(&price_req),
                indexa.periodic_series_with_attribution(&fx_req),
                async {
                    match &ratio_req {
                        Some(r) => Some(indexa.periodic_series_with_attribution(r).await),
                        None => None,
                    }
                },
                async {
                    match &reference_req {
                        Some(r) => Some(indexa.observations(r).await),
                        None => None,
                    }
                },
            )
        };
        let (price, fx, ratio, reference) =
            crate::core::with_request_deadline(indexa.cfg.request_timeout, fetches)
                .await
                .map_err(|_| IndexaError::request_timeout("compose"))?;

        let (price, attr) = price?;
        work.attribution.sources.extend(attr.sources);
        work.price_raw = price;
        let (fx, attr) = fx?;
        work.attribution.sources.extend(attr.sources);
        work.currency_raw = fx;
        if let Some((ratio, attr)) = ratio.transpose()? {
            work.attribution.sources.extend(attr.sources);
            work.ratio = Some(ratio);
        }
        match reference {
            Some(Ok((series, connector))) => {
                work.attribution
                    .push(series.name().to_string(), connector, coverage(&series));
                work.reference = Some(series);
            }
            Some(Err(e)) => {
                #[cfg(feature = "tracing")]
                if e.is_actionable() {
                    tracing::warn!(error = %e, "reference index unavailable; panel left undeflated");
                } else {
                    tracing::debug!(error = %e, "no reference index; panel left undeflated");
                }
                work.warnings.extend(e.flatten());
            }
            None => {}
        }
        Ok(())
    }

    fn normalize(&self, work: &mut Work) -> Result<(), IndexaError> {
        let (start, end) = (Some(self.cfg.start), Some(self.cfg.end));
        work.price_raw = clean(&work.price_raw, &mut work.warnings).between(start, end);
        work.currency_raw = clean(&work.currency_raw, &mut work.warnings).between(start, end);
        for (s, code) in [
            (&work.price_raw, &self.cfg.codes.price_index),
            (&work.currency_raw, &self.cfg.codes.currency),
        ] {
            if s.observed().next().is_none() {
                return Err(IndexaError::empty(format!(
                    "{code}: no observations between {} and {}",
                    self.cfg.start, self.cfg.end
                )));
            }
        }
        work.price = work.price_raw.clone();
        work.currency = work.currency_raw.clone();

        if let Some(ratio) = work.ratio.take() {
            let ratio = clean(&ratio, &mut work.warnings).between(start, end);
            if ratio.observed().next().is_none() {
                return Err(IndexaError::empty(format!(
                    "{}: no observations between {} and {}",
                    self.cfg.codes.ratio, self.cfg.start, self.cfg.end
                )));
            }
            work.ratio = Some(ratio);
        }
        if let Some(reference) = work.reference.take() {
            work.reference = Some(clean(&reference, &mut work.warnings));
        }
        if let Some(panel) = work.panel.take() {
            let panel = clean(&panel, &mut work.warnings);
            // Range filtering of the panel happens after expansion.
            work.panel = (!panel.is_empty()).then_some(panel);
        }
        Ok(())
    }

    fn expand(&self, work: &mut Work) -> Result<(), IndexaError> {
        if let Some(panel) = work.panel.take() {
            let expanded = expand_monthly(&panel, self.cfg.expansion_horizon_months)?
                .between(Some(self.cfg.start), Some(self.cfg.end));
            if expanded.is_empty() {
                work.warnings.push(IndexaError::empty(format!(
                    "{}: no panel points between {} and {}",
                    panel.name(),
                    self.cfg.start,
                    self.cfg.end
                )));
            } else {
                work.panel = Some(expanded);
            }
        }
        Ok(())
    }

    fn rebase(&self, work: &mut Work) {
        for s in [&mut work.price, &mut work.currency] {
            match rebase(s, Anchor::First, IndexSeries::DEFAULT_BASE) {
                Ok(idx) => *s = idx.into_series(),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(series = s.name(), error = %e, "rebase skipped");
                    work.warnings.push(e);
                }
            }
        }
    }

    fn join(&self, work: &mut Work) -> Result<(), IndexaError> {
        let tol = self.cfg.join_tolerance;
        let axis: Vec<NaiveDate> = work.price.dates().collect();
        let currency = align_onto(&axis, &work.currency, tol, &mut work.warnings);
        let mut ignored = Vec::new();
        let currency_raw = align_onto(&axis, &work.currency_raw, tol, &mut ignored);
        let mut table = CompositeTable::inner_join([
            (ColumnKey::PriceIndex, work.price.clone()),
            (ColumnKey::CurrencyIndex, currency),
            (ColumnKey::CurrencyRaw, currency_raw),
        ])?;

        if let Some(ratio) = &work.ratio {
            let aligned = align_onto(table.dates(), ratio, tol, &mut work.warnings);
            table = table.retain_column(ColumnKey::RatioRaw, &aligned)?;
        }
        if let Some(panel) = &work.panel {
            let panel_aligned = align_onto(table.dates(), panel, tol, &mut work.warnings);
            table = table.retain_column(ColumnKey::PanelPrice, &panel_aligned)?;
            if let Some(reference) = &work.reference {
                let ref_aligned = align_onto(table.dates(), reference, tol, &mut work.warnings);
                table = table.retain_column(ColumnKey::ReferenceIndex, &ref_aligned)?;
                match deflate_panel(&panel_aligned, &ref_aligned) {
                    Ok((adjusted, w)) => {
                        work.warnings.extend(w);
                        table = table.retain_column(ColumnKey::PanelAdjusted, &adjusted)?;
                    }
                    Err(e) => work.warnings.push(e),
                }
            }
        }
        work.table = table;
        Ok(())
    }

    fn compound(&self, work: &mut Work) -> Result<(), IndexaError> {
        let Some(pct) = &self.alternative else {
            return Ok(());
        };
        let boundary = self.cfg.splice_boundary.resolve(pct).ok_or_else(|| {
            IndexaError::empty(format!("{}: percent-change table is empty", pct.name()))
        })?;
        #[cfg(feature = "tracing")]
        if let SpliceBoundary::Fixed(p) = self.cfg.splice_boundary
            && pct.first_period() != Some(p)
        {
            tracing::warn!(
                boundary = %p,
                first_period = ?pct.first_period().map(|f| f.to_string()),
                "fixed splice boundary differs from the table's first period"
            );
        }
        work.boundary = Some(boundary);

        let start_period = MonthPeriod::of(self.cfg.start);
        let alternative = if MonthPeriod::of(self.cfg.end) < boundary {
            // The range closes before the table takes over: history alone.
            work.price.clone()
        } else if start_period < boundary {
            let out = splice(
                &work.price_raw,
                self.cfg.start,
                boundary,
                pct,
                self.cfg.normalize.then_some(IndexSeries::DEFAULT_BASE),
            )?;
            work.warnings.extend(out.warnings);
            out.series
        } else {
            let price = work.table.series(ColumnKey::PriceIndex)?;
            let first = price.first().ok_or_else(|| IndexaError::empty("price index"))?;
            let seed = first.value.ok_or_else(|| {
                IndexaError::missing_anchor(price.name(), first.date, "absent")
            })?;
            // The first point on the axis is the seed; compounding covers the months after it.
            let from = MonthPeriod::of(first.date).succ().ok_or_else(|| {
                IndexaError::InvalidArg(format!("no month follows {}", first.date))
            })?;
            let (series, unsupported) = compound_series(pct.name(), first.date, seed, from, pct)?;
            if let Some(e) = unsupported {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, "compounding stopped at an uncovered month");
                work.warnings.push(e);
            }
            series
        };

        let table = std::mem::take(&mut work.table)
            .retain_column(ColumnKey::AlternativeIndex, &alternative)?;
        let alt_on_axis = table.series(ColumnKey::AlternativeIndex)?;
        let price = table.series(ColumnKey::PriceIndex)?;
        let avg = average(ColumnKey::AlternativeAverage.as_str(), &alt_on_axis, &price);
        work.table = table.retain_column(ColumnKey::AlternativeAverage, &avg)?;
        Ok(())
    }

    // Alternative columns that only served as a deflator are not part of the output.
    fn emit(&self, work: &mut Work) {
        if !self.cfg.include_alternative {
            work.table = std::mem::take(&mut work.table)
                .without_column(ColumnKey::AlternativeIndex)
                .without_column(ColumnKey::AlternativeAverage);
        }
    }

    fn recompose(&self, work: &mut Work) -> Result<(), IndexaError> {
        let table = &work.table;
        let raw = table.series(ColumnKey::RatioRaw)?;
        let original = table.series(ColumnKey::PriceIndex)?;
        let replacement = match self.cfg.deflator {
            DeflatorVariant::PriceIndex => original.clone(),
            DeflatorVariant::Alternative => table.series(ColumnKey::AlternativeIndex)?,
            DeflatorVariant::Average => table.series(ColumnKey::AlternativeAverage)?,
        };
        let fx = table.series(ColumnKey::CurrencyRaw)?;
        let splice_date = self.splice_date(work.boundary);
        let out = recompose(&raw, &original, &replacement, &fx, splice_date);
        work.warnings.extend(out.warnings);
        work.table = std::mem::take(&mut work.table)
            .retain_column(ColumnKey::RatioRecomposed, &out.series)?;
        Ok(())
    }

    fn splice_date(&self, resolved: Option<MonthPeriod>) -> NaiveDate {
        let boundary = resolved.or(match self.cfg.splice_boundary {
            SpliceBoundary::Fixed(p) => Some(p),
            SpliceBoundary::FirstTablePeriod => {
                self.alternative.as_ref().and_then(PercentChangeSeries::first_period)
            }
        });
        boundary.map_or(self.cfg.start, MonthPeriod::first_day)
    }
}

fn clean(series: &Series, warnings: &mut Vec<IndexaError>) -> Series {
    let (series, w) = sanitize(series);
    warnings.extend(w);
    series
}

/// Nearest-date alignment of `s` onto the `axis` dates that lie within `tol` of its
/// coverage; dates outside are left out rather than filled with stale values.
pub(crate) fn align_onto(
    axis: &[NaiveDate],
    s: &Series,
    tol: JoinTolerance,
    warnings: &mut Vec<IndexaError>,
) -> Series {
    let (Some(first), Some(last)) = (s.first(), s.last()) else {
        return Series::empty(s.name());
    };
    let days = Days::new(tol.days().unsigned_abs());
    let lo = first.date.checked_sub_days(days).unwrap_or(NaiveDate::MIN);
    let hi = last.date.checked_add_days(days).unwrap_or(NaiveDate::MAX);
    let aligned = align_nearest(
        axis.iter().copied().filter(|d| (lo..=hi).contains(d)),
        s,
        Some(tol),
    );
    warnings.extend(aligned.warnings);
    aligned.series
}

/// Express `panel` in constant prices of its last date with a reference index.
fn deflate_panel(
    panel: &Series,
    reference: &Series,
) -> Result<(Series, Vec<IndexaError>), IndexaError> {
    let base = panel
        .observed()
        .filter(|(d, _)| reference.value_at(*d).is_some())
        .map(|(d, _)| d)
        .last()
        .ok_or_else(|| {
            IndexaError::empty(format!(
                "{}: no date shared with {}",
                panel.name(),
                reference.name()
            ))
        })?;
    let deflator = rebase(reference, Anchor::On(base), 1.0)?;
    let (adjusted, warnings) = convert_currency(panel, deflator.series());
    Ok((adjusted.renamed(ColumnKey::PanelAdjusted.as_str()), warnings))
}

impl Indexa {
    /// Begin a composition run for `cfg`.
    ///
    /// Typical usage: optionally attach `alternative`/`panel`, then call `run()`.
    #[must_use]
    pub fn composition(&self, cfg: CompositionConfig) -> CompositionBuilder<'_> {
        CompositionBuilder::new(self, cfg)
    }
}
