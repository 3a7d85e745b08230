//! Rule-of-thumb annual income projection.
//!
//! per_trade     = IV% * 0.02
//! base_annual   = per_trade * trades_per_year
//! risk_adjusted = base_annual * 0.84
//!
//! Does not use the strike calculator.

use crate::errors::{EngineError, EngineResult};
use crate::strategy::ensure_iv;

const PREMIUM_PER_IV_POINT: f64 = 0.02;

/// Fixed success weighting, regardless of any target probability.
const SUCCESS_WEIGHT: f64 = 0.84;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum IvCategory {
    #[serde(rename = "Low IV")]
    Low,
    #[serde(rename = "Medium IV")]
    Medium,
    #[serde(rename = "High IV")]
    High,
    #[serde(rename = "Very High IV")]
    VeryHigh,
}

impl IvCategory {
    /// Upper bounds are inclusive.
    pub fn classify(iv_pct: f64) -> Self {
        if iv_pct <= 25.0 {
            Self::Low
        } else if iv_pct <= 35.0 {
            Self::Medium
        } else if iv_pct <= 50.0 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low IV",
            Self::Medium => "Medium IV",
            Self::High => "High IV",
            Self::VeryHigh => "Very High IV",
        }
    }

    pub fn return_range(self) -> &'static str {
        match self {
            Self::Low => "10-15%",
            Self::Medium => "15-25%",
            Self::High => "25-35%",
            Self::VeryHigh => "35%+",
        }
    }
}

impl std::fmt::Display for IvCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ReturnProjection {
    pub iv_pct: f64,
    pub trades_per_year: i64,
    pub category: IvCategory,
    pub return_range: &'static str,
    pub per_trade_estimate: f64,
    pub base_annual_estimate: f64,
    pub risk_adjusted_estimate: f64,
}

pub fn project(iv_pct: f64, trades_per_year: i64) -> EngineResult<ReturnProjection> {
    ensure_iv(iv_pct)?;
    if trades_per_year < 0 {
        return Err(EngineError::invalid_input(format!(
            "trades_per_year must be non-negative, got {trades_per_year}"
        )));
    }

    let category = IvCategory::classify(iv_pct);
    let per_trade_estimate = iv_pct * PREMIUM_PER_IV_POINT;
    let base_annual_estimate = per_trade_estimate * trades_per_year as f64;

    Ok(ReturnProjection {
        iv_pct,
        trades_per_year,
        category,
        return_range: category.return_range(),
        per_trade_estimate,
        base_annual_estimate,
        risk_adjusted_estimate: base_annual_estimate * SUCCESS_WEIGHT,
    })
}
