use crate::errors::EngineResult;
use crate::strategy::metrics::{self, CoreMetrics};
use smallvec::SmallVec;

/// Trading cadences compared by the timeframe optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Timeframe {
    #[serde(rename = "Weekly")]
    Weekly,
    #[serde(rename = "Bi-Weekly")]
    BiWeekly,
    #[serde(rename = "Monthly")]
    Monthly,
}

impl Timeframe {
    /// Catalog order. Also the tie-break order.
    pub const ALL: [Timeframe; 3] = [Timeframe::Weekly, Timeframe::BiWeekly, Timeframe::Monthly];

    pub fn definition(self) -> TimeframeDefinition {
        match self {
            Self::Weekly => TimeframeDefinition { name: "Weekly", days: 7, cycles_per_year: 52 },
            Self::BiWeekly => TimeframeDefinition { name: "Bi-Weekly", days: 14, cycles_per_year: 26 },
            Self::Monthly => TimeframeDefinition { name: "Monthly", days: 30, cycles_per_year: 12 },
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.definition().name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct TimeframeDefinition {
    pub name: &'static str,
    pub days: i64,
    pub cycles_per_year: u32,
}

/// One row of the comparison table.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct TimeframeResult {
    pub timeframe: Timeframe,
    pub days: i64,
    pub cycles_per_year: u32,
    pub metrics: CoreMetrics,
    /// premium per cycle * cycles per year, not compounded
    pub annual_return: f64,
    /// annual_return * target probability
    pub annual_return_risk_adjusted: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ComparisonResult {
    pub spot_price: f64,
    pub iv_pct: f64,
    pub target_probability_pct: f64,
    /// Always three entries, in `Timeframe::ALL` order
    pub entries: SmallVec<[TimeframeResult; 3]>,
    pub best_total_return: Timeframe,
    pub best_risk_adjusted: Timeframe,
}

impl ComparisonResult {
    pub fn entry(&self, timeframe: Timeframe) -> Option<&TimeframeResult> {
        self.entries.iter().find(|e| e.timeframe == timeframe)
    }
}

/// Evaluate every catalog timeframe and pick the two optima.
///
/// The two maxima are chosen independently; ties go to the earlier
/// catalog entry. Errors are those of `metrics::compute`.
pub fn compare(
    spot_price: f64,
    iv_pct: f64,
    target_probability_pct: f64,
) -> EngineResult<ComparisonResult> {
    let mut entries: SmallVec<[TimeframeResult; 3]> = SmallVec::new();

    for timeframe in Timeframe::ALL {
        let def = timeframe.definition();
        let metrics = metrics::compute(spot_price, iv_pct, def.days, target_probability_pct)?;
        let annual_return = metrics.estimated_premium_pct * def.cycles_per_year as f64;

        entries.push(TimeframeResult {
            timeframe,
            days: def.days,
            cycles_per_year: def.cycles_per_year,
            metrics,
            annual_return,
            annual_return_risk_adjusted: annual_return * (target_probability_pct / 100.0),
        });
    }

    let best_total_return = first_max(&entries, |e| e.annual_return);
    let best_risk_adjusted = first_max(&entries, |e| e.annual_return_risk_adjusted);

    tracing::debug!(
        spot_price,
        iv_pct,
        %best_total_return,
        %best_risk_adjusted,
        "timeframes compared"
    );

    Ok(ComparisonResult {
        spot_price,
        iv_pct,
        target_probability_pct,
        entries,
        best_total_return,
        best_risk_adjusted,
    })
}

/// Argmax keeping the first of equal values.
fn first_max(entries: &[TimeframeResult], key: impl Fn(&TimeframeResult) -> f64) -> Timeframe {
    let mut best = Timeframe::ALL[0];
    let mut best_value = f64::NEG_INFINITY;
    for e in entries {
        let v = key(e);
        if v > best_value {
            best_value = v;
            best = e.timeframe;
        }
    }
    best
}
