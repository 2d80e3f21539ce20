use chrono::NaiveDate;
use indexa_core::{
    Capability, IndexaError, InflationReport, JoinTolerance, ObservationQuery, ObservationReport,
    ObservationRequest, Series, nearest,
};

use crate::Indexa;

impl Indexa {
    /// Fetch raw observations (placeholders already mapped to absent points).
    ///
    /// # Errors
    /// Returns an error if no eligible provider succeeds or none support the capability.
    pub async fn observations(
        &self,
        req: &ObservationRequest,
    ) -> Result<(Series, &'static str), IndexaError> {
        self.fetch_single(req.code(), Capability::Observations, |c| {
            c.as_observation_provider()?;
            let req = req.clone();
            Some(async move {
                match c.as_observation_provider() {
                    Some(p) => p.observations(&req).await,
                    None => Err(IndexaError::connector(
                        c.name(),
                        "missing observations capability during call",
                    )),
                }
            })
        })
        .await
    }

    /// Observation closest to `date`, searched within the default +/-180 day window.
    ///
    /// Behavior:
    /// - Absent (placeholder) observations are never matched.
    /// - The distance is always reported; a match beyond `tolerance` is returned with a
    ///   `JoinToleranceExceeded` warning rather than rejected.
    ///
    /// # Errors
    /// Returns `NotFound` when the window holds no observed value, or the provider error.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(target = "indexa::router", skip(self), fields(code = code, date = %date))
    )]
    pub async fn nearest_observation(
        &self,
        code: &str,
        date: NaiveDate,
        tolerance: Option<JoinTolerance>,
    ) -> Result<ObservationReport, IndexaError> {
        let req = ObservationRequest::around(code, date)?;
        let (series, connector) = self.observations(&req).await?;
        let m = nearest(date, &series, tolerance)
            .ok_or_else(|| IndexaError::not_found(format!("observation for {code} near {date}")))?;
        let mut warnings = Vec::new();
        if m.exceeded
            && let Some(t) = tolerance
        {
            warnings.push(IndexaError::JoinToleranceExceeded {
                series: code.to_string(),
                query: date,
                matched: m.date,
                distance_days: m.distance_days,
                tolerance_days: t.days(),
            });
        }
        Ok(ObservationReport {
            code: code.to_string(),
            requested: Some(date),
            date: m.date,
            value: m.value,
            distance_days: m.distance_days,
            connector: connector.to_string(),
            warnings,
        })
    }

    /// Most recent observed value of a series.
    ///
    /// # Errors
    /// Returns `NotFound` when the provider returns no observed value.
    pub async fn latest_observation(&self, code: &str) -> Result<ObservationReport, IndexaError> {
        let req = ObservationRequest::new(code, ObservationQuery::Latest)?;
        let (series, connector) = self.observations(&req).await?;
        let (date, value) = series
            .observed()
            .last()
            .ok_or_else(|| IndexaError::not_found(format!("latest observation for {code}")))?;
        Ok(ObservationReport {
            code: code.to_string(),
            requested: None,
            date,
            value,
            distance_days: 0,
            connector: connector.to_string(),
            warnings: Vec::new(),
        })
    }

    /// Percent change between the observations nearest to `start` and `end`.
    ///
    /// Both lookups run concurrently.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `start > end`, `Data` when the start value is zero, or
    /// any error from the underlying lookups.
    pub async fn inflation_between(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
        tolerance: Option<JoinTolerance>,
    ) -> Result<InflationReport, IndexaError> {
        if start > end {
            return Err(IndexaError::InvalidArg(format!(
                "start {start} is after end {end}"
            )));
        }
        let (s, e) = tokio::join!(
            self.nearest_observation(code, start, tolerance),
            self.nearest_observation(code, end, tolerance),
        );
        let (start, end) = (s?, e?);
        if start.value == 0.0 {
            return Err(IndexaError::Data(format!(
                "{code}: zero value at {}",
                start.date
            )));
        }
        let change_pct = (end.value / start.value - 1.0) * 100.0;
        Ok(InflationReport {
            start,
            end,
            change_pct,
        })
    }
}
