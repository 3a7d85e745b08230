use crate::errors::EngineResult;
use crate::strategy::{ensure_days, ensure_market_inputs, ensure_symbol, AnalysisRequest};

/// Calendar days per year used for square-root-of-time scaling.
const DAYS_PER_YEAR: f64 = 365.0;

/// Empirical premium factor: premium% ~ IV% * sqrt(T) * 0.4.
/// Not a pricing model.
const PREMIUM_FACTOR: f64 = 0.4;

/// Standard-deviation multiplier per target probability.
/// Exact keys only; anything else falls back to 1.0.
const PROBABILITY_MULTIPLIERS: [(f64, f64); 6] = [
    (68.0, 1.0),
    (75.0, 0.67),
    (80.0, 0.84),
    (84.0, 1.0),
    (90.0, 1.28),
    (95.0, 1.64),
];

const FALLBACK_MULTIPLIER: f64 = 1.0;

/// Core covered-call metrics for one (price, vol, horizon, probability) tuple.
/// Stack-allocated, Copy.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct CoreMetrics {
    /// One-sigma absolute price move over the horizon
    pub expected_move: f64,
    /// Spot plus the probability-scaled expected move
    pub target_strike_level: f64,
    /// Target level rounded up to the listed strike grid
    pub suggested_strike: f64,
    pub percent_move: f64,
    pub estimated_premium_pct: f64,
    /// sqrt(days / 365)
    pub time_factor: f64,
}

/// Core metrics plus the display fields a caller needs to explain them.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StrikeAnalysis {
    pub request: AnalysisRequest,
    pub multiplier: f64,
    pub strike_interval: f64,
    pub assignment_probability_pct: f64,
    pub metrics: CoreMetrics,
}

/// Map a target probability to its sigma multiplier.
#[inline]
pub fn probability_multiplier(target_probability_pct: f64) -> f64 {
    PROBABILITY_MULTIPLIERS
        .iter()
        .find(|(p, _)| *p == target_probability_pct)
        .map(|(_, m)| *m)
        .unwrap_or(FALLBACK_MULTIPLIER)
}

/// Strike grid spacing by price tier.
#[inline]
pub fn strike_interval(spot_price: f64) -> f64 {
    if spot_price > 100.0 {
        5.0
    } else if spot_price > 50.0 {
        2.5
    } else {
        1.0
    }
}

/// Smallest multiple of `interval` that is >= `level`.
#[inline]
pub fn round_up_to_interval(level: f64, interval: f64) -> f64 {
    let strike = (level / interval).ceil() * interval;
    // float division can land one ulp under an exact multiple
    if strike < level {
        strike + interval
    } else {
        strike
    }
}

/// Compute the covered-call metrics.
///
/// time_factor   = sqrt(days / 365)
/// expected_move = S * (IV / 100) * time_factor
/// target        = S + expected_move * multiplier(p)
/// strike        = ceil(target / interval) * interval
///
/// Pure function: deterministic from inputs. Fails with `InvalidInput`
/// before any arithmetic when spot <= 0, iv < 0 or days <= 0.
pub fn compute(
    spot_price: f64,
    iv_pct: f64,
    days_to_expiry: i64,
    target_probability_pct: f64,
) -> EngineResult<CoreMetrics> {
    ensure_market_inputs(spot_price, iv_pct, target_probability_pct)?;
    ensure_days(days_to_expiry)?;

    let iv_decimal = iv_pct / 100.0;
    let time_factor = (days_to_expiry as f64 / DAYS_PER_YEAR).sqrt();
    let expected_move = spot_price * iv_decimal * time_factor;

    let multiplier = probability_multiplier(target_probability_pct);
    let target_strike_level = spot_price + expected_move * multiplier;
    let suggested_strike = round_up_to_interval(target_strike_level, strike_interval(spot_price));

    Ok(CoreMetrics {
        expected_move,
        target_strike_level,
        suggested_strike,
        percent_move: expected_move / spot_price * 100.0,
        estimated_premium_pct: iv_pct * time_factor * PREMIUM_FACTOR,
        time_factor,
    })
}

/// Run `compute` for a full request and attach display fields.
pub fn analyze(request: &AnalysisRequest) -> EngineResult<StrikeAnalysis> {
    ensure_symbol(&request.symbol)?;
    let metrics = compute(
        request.spot_price,
        request.iv_pct,
        request.days_to_expiry,
        request.target_probability_pct,
    )?;

    Ok(StrikeAnalysis {
        request: request.clone(),
        multiplier: probability_multiplier(request.target_probability_pct),
        strike_interval: strike_interval(request.spot_price),
        assignment_probability_pct: 100.0 - request.target_probability_pct,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EngineError;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_large_cap_scenario() {
        let m = compute(190.0, 25.0, 30, 84.0).unwrap();
        assert!(close(m.time_factor, 0.2867, 1e-4), "time_factor={}", m.time_factor);
        assert!(close(m.expected_move, 13.62, 0.01), "expected_move={}", m.expected_move);
        assert!(close(m.target_strike_level, 203.62, 0.01), "target={}", m.target_strike_level);
        assert_eq!(m.suggested_strike, 205.0);
        assert!(close(m.percent_move, 7.167, 0.01), "percent_move={}", m.percent_move);
        assert!(close(m.estimated_premium_pct, 2.867, 0.01), "premium={}", m.estimated_premium_pct);
    }

    #[test]
    fn test_small_cap_scenario() {
        let m = compute(40.0, 30.0, 14, 84.0).unwrap();
        assert_eq!(strike_interval(40.0), 1.0);
        assert!(close(m.time_factor, 0.1958, 1e-4), "time_factor={}", m.time_factor);
        assert!(close(m.expected_move, 2.35, 0.01), "expected_move={}", m.expected_move);
        assert!(close(m.target_strike_level, 42.35, 0.01), "target={}", m.target_strike_level);
        assert_eq!(m.suggested_strike, 43.0);
    }

    #[test]
    fn test_unmapped_probability_falls_back() {
        assert_eq!(probability_multiplier(70.0), 1.0);
        assert_eq!(probability_multiplier(84.5), 1.0);
        assert_eq!(probability_multiplier(90.0), 1.28);
        assert_eq!(probability_multiplier(75.0), 0.67);

        let custom = compute(190.0, 25.0, 30, 70.0).unwrap();
        let default = compute(190.0, 25.0, 30, 84.0).unwrap();
        assert_eq!(custom, default);
    }

    #[test]
    fn test_higher_probability_pushes_strike_out() {
        let p84 = compute(150.0, 40.0, 30, 84.0).unwrap();
        let p95 = compute(150.0, 40.0, 30, 95.0).unwrap();
        let p75 = compute(150.0, 40.0, 30, 75.0).unwrap();
        assert!(p95.target_strike_level > p84.target_strike_level);
        assert!(p75.target_strike_level < p84.target_strike_level);
        assert_eq!(p84.expected_move, p95.expected_move);
    }

    #[test]
    fn test_strike_tiers() {
        assert_eq!(strike_interval(100.01), 5.0);
        assert_eq!(strike_interval(100.0), 2.5);
        assert_eq!(strike_interval(50.01), 2.5);
        assert_eq!(strike_interval(50.0), 1.0);
        assert_eq!(strike_interval(3.0), 1.0);
    }

    #[test]
    fn test_strike_never_below_target_and_on_grid() {
        let spots = [1.5, 12.0, 49.99, 50.0, 63.7, 99.99, 100.0, 101.3, 187.25, 512.0, 4321.1];
        let ivs = [0.0, 5.0, 18.5, 25.0, 60.0, 140.0];
        let days = [1, 2, 7, 14, 30, 45, 90, 365, 730];
        for &s in &spots {
            for &iv in &ivs {
                for &d in &days {
                    let m = compute(s, iv, d, 84.0).unwrap();
                    let interval = strike_interval(s);
                    assert!(
                        m.suggested_strike >= m.target_strike_level,
                        "strike {} below target {} (s={s}, iv={iv}, d={d})",
                        m.suggested_strike,
                        m.target_strike_level
                    );
                    let steps = m.suggested_strike / interval;
                    assert_eq!(steps.fract(), 0.0, "strike {} off grid {interval}", m.suggested_strike);
                }
            }
        }
    }

    #[test]
    fn test_expected_move_monotone() {
        let mut prev = 0.0;
        for iv in [0.0, 1.0, 10.0, 25.0, 25.5, 50.0, 200.0] {
            let m = compute(120.0, iv, 21, 84.0).unwrap();
            assert!(m.expected_move >= prev, "not monotone in iv at {iv}");
            prev = m.expected_move;
        }

        let mut prev = 0.0;
        for d in [1, 2, 3, 7, 14, 30, 60, 365, 1000] {
            let m = compute(120.0, 30.0, d, 84.0).unwrap();
            assert!(m.expected_move >= prev, "not monotone in days at {d}");
            prev = m.expected_move;
        }
    }

    #[test]
    fn test_zero_move_rounds_to_first_strike_at_spot() {
        let m = compute(100.0, 0.0, 1, 84.0).unwrap();
        assert_eq!(m.expected_move, 0.0);
        assert_eq!(m.suggested_strike, 100.0);

        let m = compute(101.0, 0.0, 1, 84.0).unwrap();
        assert_eq!(m.suggested_strike, 105.0);

        let m = compute(190.0, 25.0, 1, 84.0).unwrap();
        assert!(m.time_factor < 0.06);
        assert_eq!(m.suggested_strike, 195.0);
    }

    #[test]
    fn test_round_up_exact_multiple_unchanged() {
        assert_eq!(round_up_to_interval(205.0, 5.0), 205.0);
        assert_eq!(round_up_to_interval(62.5, 2.5), 62.5);
        assert_eq!(round_up_to_interval(62.51, 2.5), 65.0);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(compute(0.0, 25.0, 30, 84.0), Err(EngineError::InvalidInput(_))));
        assert!(matches!(compute(-1.0, 25.0, 30, 84.0), Err(EngineError::InvalidInput(_))));
        assert!(matches!(compute(100.0, 25.0, 0, 84.0), Err(EngineError::InvalidInput(_))));
        assert!(matches!(compute(100.0, 25.0, -7, 84.0), Err(EngineError::InvalidInput(_))));
        assert!(matches!(compute(100.0, -0.1, 7, 84.0), Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn test_deterministic() {
        let a = compute(333.3, 41.0, 17, 90.0).unwrap();
        let b = compute(333.3, 41.0, 17, 90.0).unwrap();
        assert_eq!(a.expected_move.to_bits(), b.expected_move.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn test_analyze_display_fields() {
        let req = AnalysisRequest::new("MSFT", 350.0, 30.0, 14).with_target_probability(90.0);
        let a = analyze(&req).unwrap();
        assert_eq!(a.multiplier, 1.28);
        assert_eq!(a.strike_interval, 5.0);
        assert_eq!(a.assignment_probability_pct, 10.0);
        assert_eq!(a.metrics, compute(350.0, 30.0, 14, 90.0).unwrap());

        let bad = AnalysisRequest::new("", 350.0, 30.0, 14);
        assert!(analyze(&bad).is_err());
    }
}
