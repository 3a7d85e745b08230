use crate::errors::{EngineError, EngineResult};
use crate::render;
use crate::strategy::{
    self, metrics, report, returns, timeframes, AnalysisRequest, DEFAULT_TARGET_PROBABILITY,
    DEFAULT_TRADES_PER_YEAR,
};
use chrono::NaiveDate;
use serde_json::Value;
use std::str::FromStr;

/// Named operations exposed to tool clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    GetStartedGuide,
    ComputeMetrics,
    CompareTimeframes,
    ProjectAnnualReturn,
    BuildReport,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::GetStartedGuide,
        Tool::ComputeMetrics,
        Tool::CompareTimeframes,
        Tool::ProjectAnnualReturn,
        Tool::BuildReport,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::GetStartedGuide => "get_started_guide",
            Self::ComputeMetrics => "compute_metrics",
            Self::CompareTimeframes => "compare_timeframes",
            Self::ProjectAnnualReturn => "project_annual_return",
            Self::BuildReport => "build_report",
        }
    }

    pub fn spec(self) -> ToolSpec {
        let (description, required, optional): (_, &'static [&'static str], &'static [&'static str]) =
            match self {
                Self::GetStartedGuide => (
                    "What this calculator does and the recommended workflow",
                    &[],
                    &[],
                ),
                Self::ComputeMetrics => (
                    "Optimal strike price and expected premium for one position and expiry; days_to_expiry must be a whole number",
                    &["symbol", "spot_price", "iv_pct", "days_to_expiry"],
                    &["target_probability_pct"],
                ),
                Self::CompareTimeframes => (
                    "Compare weekly, bi-weekly and monthly cycles by total and risk-adjusted return",
                    &["symbol", "spot_price", "iv_pct"],
                    &["target_probability_pct"],
                ),
                Self::ProjectAnnualReturn => (
                    "Project yearly income from volatility level and trading frequency; trades_per_year must be a whole number",
                    &["iv_pct"],
                    &["trades_per_year"],
                ),
                Self::BuildReport => (
                    "Formal analysis document for a position; days_to_expiry must be a whole number, as_of_date is YYYY-MM-DD",
                    &["symbol", "spot_price", "iv_pct", "days_to_expiry"],
                    &["target_probability_pct", "as_of_date"],
                ),
            };

        ToolSpec {
            name: self.name(),
            description,
            required,
            optional,
        }
    }
}

impl FromStr for Tool {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get_started_guide" => Ok(Self::GetStartedGuide),
            "compute_metrics" | "analyze_covered_call" | "calculate_quick_analysis" => {
                Ok(Self::ComputeMetrics)
            }
            "compare_timeframes" => Ok(Self::CompareTimeframes),
            "project_annual_return" | "estimate_annual_returns" => Ok(Self::ProjectAnnualReturn),
            "build_report" | "create_professional_report" => Ok(Self::BuildReport),
            other => Err(EngineError::UnknownTool(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolOutput {
    pub tool: &'static str,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(serde::Deserialize)]
struct ComparisonArgs {
    #[serde(alias = "stock_symbol")]
    symbol: String,
    #[serde(alias = "stock_price")]
    spot_price: f64,
    #[serde(alias = "iv_percent", alias = "implied_volatility_pct")]
    iv_pct: f64,
    #[serde(default = "default_target_probability", alias = "target_probability")]
    target_probability_pct: f64,
}

#[derive(serde::Deserialize)]
struct ProjectionArgs {
    #[serde(alias = "iv_percent", alias = "implied_volatility_pct")]
    iv_pct: f64,
    #[serde(default = "default_trades_per_year", deserialize_with = "strategy::whole_number")]
    trades_per_year: i64,
}

fn default_target_probability() -> f64 {
    DEFAULT_TARGET_PROBABILITY
}

fn default_trades_per_year() -> i64 {
    DEFAULT_TRADES_PER_YEAR
}

/// Run one tool against its JSON arguments.
///
/// `today` is the fallback report date when `as_of_date` is not supplied;
/// the caller owns the clock.
pub fn run(tool: Tool, args: &Value, today: NaiveDate) -> EngineResult<ToolOutput> {
    let (text, data) = match tool {
        Tool::GetStartedGuide => (render::getting_started(), None),
        Tool::ComputeMetrics => {
            let request: AnalysisRequest = serde_json::from_value(args.clone())?;
            let analysis = metrics::analyze(&request)?;
            (render::quick_analysis(&analysis), Some(serde_json::to_value(&analysis)?))
        }
        Tool::CompareTimeframes => {
            let a: ComparisonArgs = serde_json::from_value(args.clone())?;
            strategy::ensure_symbol(&a.symbol)?;
            let result = timeframes::compare(a.spot_price, a.iv_pct, a.target_probability_pct)?;
            (render::comparison(&a.symbol, &result), Some(serde_json::to_value(&result)?))
        }
        Tool::ProjectAnnualReturn => {
            let a: ProjectionArgs = serde_json::from_value(args.clone())?;
            let projection = returns::project(a.iv_pct, a.trades_per_year)?;
            (render::annual_returns(&projection), Some(serde_json::to_value(&projection)?))
        }
        Tool::BuildReport => {
            let request: AnalysisRequest = serde_json::from_value(args.clone())?;
            let as_of = match args.get("as_of_date") {
                None | Some(Value::Null) => today,
                Some(Value::String(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d")?,
                Some(_) => {
                    return Err(EngineError::Parse(
                        "as_of_date must be a YYYY-MM-DD string".to_string(),
                    ))
                }
            };
            let rep = report::build(&request, as_of)?;
            (render::professional_report(&rep), Some(serde_json::to_value(&rep)?))
        }
    };

    Ok(ToolOutput {
        tool: tool.name(),
        text,
        data,
    })
}
