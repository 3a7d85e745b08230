pub mod metrics;
pub mod timeframes;
pub mod returns;
pub mod report;

use crate::errors::{EngineError, EngineResult};

/// Target probability used when the caller does not supply one.
/// One standard deviation above spot ~ 84% one-sided.
pub const DEFAULT_TARGET_PROBABILITY: f64 = 84.0;

/// Trades per year assumed by the return projector (bi-weekly cycles).
pub const DEFAULT_TRADES_PER_YEAR: i64 = 26;

/// A single covered-call question: "where should I sell calls on this
/// position, and what does it pay?"
///
/// Accepts both the short engine field names and the longer names used by
/// tool clients (`stock_symbol`, `stock_price`, `iv_percent`,
/// `target_probability`).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisRequest {
    #[serde(alias = "stock_symbol")]
    pub symbol: String,
    #[serde(alias = "stock_price")]
    pub spot_price: f64,
    #[serde(alias = "iv_percent", alias = "implied_volatility_pct")]
    pub iv_pct: f64,
    #[serde(deserialize_with = "whole_number")]
    pub days_to_expiry: i64,
    #[serde(
        default = "default_target_probability",
        alias = "target_probability"
    )]
    pub target_probability_pct: f64,
}

impl AnalysisRequest {
    #[cfg(test)]
    pub fn new(
        symbol: impl Into<String>,
        spot_price: f64,
        iv_pct: f64,
        days_to_expiry: i64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            spot_price,
            iv_pct,
            days_to_expiry,
            target_probability_pct: DEFAULT_TARGET_PROBABILITY,
        }
    }

    #[cfg(test)]
    pub fn with_target_probability(mut self, target_probability_pct: f64) -> Self {
        self.target_probability_pct = target_probability_pct;
        self
    }

    /// Check every field invariant.
    pub fn validate(&self) -> EngineResult<()> {
        ensure_symbol(&self.symbol)?;
        ensure_market_inputs(self.spot_price, self.iv_pct, self.target_probability_pct)?;
        ensure_days(self.days_to_expiry)
    }
}

fn default_target_probability() -> f64 {
    DEFAULT_TARGET_PROBABILITY
}

/// Decode a count that clients may send as `30` or `30.0`.
/// Fractional or out-of-range values are a decode error, never truncated.
pub(crate) fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let value = <f64 as serde::Deserialize>::deserialize(deserializer)?;
    if !value.is_finite() || value.fract() != 0.0 || value.abs() > i64::MAX as f64 / 2.0 {
        return Err(D::Error::custom(format!("expected a whole number, got {value}")));
    }
    Ok(value as i64)
}

pub(crate) fn ensure_symbol(symbol: &str) -> EngineResult<()> {
    if symbol.trim().is_empty() {
        return Err(EngineError::invalid_input("symbol must not be empty"));
    }
    Ok(())
}

/// spot > 0, iv >= 0, everything finite.
pub(crate) fn ensure_market_inputs(
    spot_price: f64,
    iv_pct: f64,
    target_probability_pct: f64,
) -> EngineResult<()> {
    if !spot_price.is_finite() || spot_price <= 0.0 {
        return Err(EngineError::invalid_input(format!(
            "spot_price must be positive, got {spot_price}"
        )));
    }
    ensure_iv(iv_pct)?;
    if !target_probability_pct.is_finite() {
        return Err(EngineError::invalid_input(format!(
            "target_probability_pct must be finite, got {target_probability_pct}"
        )));
    }
    Ok(())
}

pub(crate) fn ensure_iv(iv_pct: f64) -> EngineResult<()> {
    if !iv_pct.is_finite() || iv_pct < 0.0 {
        return Err(EngineError::invalid_input(format!(
            "iv_pct must be non-negative, got {iv_pct}"
        )));
    }
    Ok(())
}

pub(crate) fn ensure_days(days_to_expiry: i64) -> EngineResult<()> {
    if days_to_expiry <= 0 {
        return Err(EngineError::invalid_input(format!(
            "days_to_expiry must be positive, got {days_to_expiry}"
        )));
    }
    Ok(())
}
