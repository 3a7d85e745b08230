use crate::errors::{EngineError, EngineResult};
use crate::strategy::metrics::{self, CoreMetrics};
use crate::strategy::AnalysisRequest;
use chrono::{Days, NaiveDate};

/// Everything a renderer needs for the formal analysis document.
/// Built once per request, never mutated.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Report {
    pub request: AnalysisRequest,
    pub metrics: CoreMetrics,
    pub as_of_date: NaiveDate,
    pub expiry_date: NaiveDate,
    /// Dollars per share between spot and strike
    pub upside_participation: f64,
    pub distance_to_strike_pct: f64,
    pub assignment_probability_pct: f64,
}

/// Compose a report from already computed metrics.
/// `as_of_date` is explicit so the same inputs always give the same report.
pub fn assemble(
    request: &AnalysisRequest,
    metrics: &CoreMetrics,
    as_of_date: NaiveDate,
) -> EngineResult<Report> {
    request.validate()?;

    let days = u64::try_from(request.days_to_expiry)
        .map_err(|_| EngineError::invalid_input("days_to_expiry out of range"))?;
    let expiry_date = as_of_date
        .checked_add_days(Days::new(days))
        .ok_or_else(|| EngineError::invalid_input("expiry date out of range"))?;

    let upside_participation = metrics.suggested_strike - request.spot_price;

    Ok(Report {
        request: request.clone(),
        metrics: *metrics,
        as_of_date,
        expiry_date,
        upside_participation,
        distance_to_strike_pct: upside_participation / request.spot_price * 100.0,
        assignment_probability_pct: 100.0 - request.target_probability_pct,
    })
}

/// Compute metrics for the request and assemble the report.
pub fn build(request: &AnalysisRequest, as_of_date: NaiveDate) -> EngineResult<Report> {
    let metrics = metrics::compute(
        request.spot_price,
        request.iv_pct,
        request.days_to_expiry,
        request.target_probability_pct,
    )?;
    assemble(request, &metrics, as_of_date)
}
