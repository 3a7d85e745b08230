//! Markdown rendering of engine results.
//! Pure functions: a value in, a String out. No numbers are computed here.

use crate::strategy::metrics::StrikeAnalysis;
use crate::strategy::report::Report;
use crate::strategy::returns::ReturnProjection;
use crate::strategy::timeframes::ComparisonResult;
use std::fmt::Write;

const DATE_FORMAT: &str = "%B %d, %Y";

const DISCLAIMER: &str = "**Important:** This analysis is for educational purposes only and is not \
personalized investment advice. Consult a qualified financial advisor before trading options.";

pub fn quick_analysis(a: &StrikeAnalysis) -> String {
    let r = &a.request;
    let m = &a.metrics;
    let strike = m.suggested_strike;
    let p = r.target_probability_pct;

    format!(
        "**Covered Call Analysis for {symbol}**

**Current Setup:**
- Stock Price: ${spot:.2}
- Implied Volatility: {iv}%
- Days to Expiry: {days}
- Target Success Probability: {p}%

**Calculations:**
- Expected Move (1σ): ${mv:.2} ({pct:.1}%)
- Sigma Multiplier: {mult:.2}
- Target Strike Level: ${target:.2}
- **Recommended Strike: ${strike:.2}** (${interval} strike grid)

**Expected Outcomes:**
- **Success ({p}%)**: Keep full premium, estimated ~{prem:.1}% return
- **Assignment ({assign}%)**: Stock closes above ${strike:.2}, shares called away or buy-to-close required

**Recommendation:**
Sell {symbol} {strike:.0} calls expiring in {days} days.",
        symbol = r.symbol,
        spot = r.spot_price,
        iv = r.iv_pct,
        days = r.days_to_expiry,
        mv = m.expected_move,
        pct = m.percent_move,
        mult = a.multiplier,
        target = m.target_strike_level,
        interval = a.strike_interval,
        prem = m.estimated_premium_pct,
        assign = a.assignment_probability_pct,
    )
}

pub fn comparison(symbol: &str, c: &ComparisonResult) -> String {
    let mut out = format!(
        "**Multi-Timeframe Strategy Comparison for {symbol}**

**Market Context:**
- Current Price: ${spot:.2}
- Implied Volatility: {iv}%
- Target Success Rate: {p}%

| Timeframe | Strike | Return/Cycle | Annual Return | Risk-Adjusted* |
|-----------|--------|--------------|---------------|----------------|",
        spot = c.spot_price,
        iv = c.iv_pct,
        p = c.target_probability_pct,
    );

    for e in &c.entries {
        let _ = write!(
            out,
            "\n| **{name}** ({days}d) | ${strike:.0} | {cycle:.1}% | {annual:.1}% | {adj:.1}% |",
            name = e.timeframe,
            days = e.days,
            strike = e.metrics.suggested_strike,
            cycle = e.metrics.estimated_premium_pct,
            annual = e.annual_return,
            adj = e.annual_return_risk_adjusted,
        );
    }

    out.push_str("\n\n**Recommendations:**\n");
    if let Some(best) = c.entry(c.best_total_return) {
        let _ = write!(
            out,
            "\n**For Maximum Income:** {} cycles\n- Strike: ${:.0}\n- Expected: {:.1}% annual return\n",
            best.timeframe, best.metrics.suggested_strike, best.annual_return,
        );
    }
    if let Some(best) = c.entry(c.best_risk_adjusted) {
        let _ = write!(
            out,
            "\n**For Risk-Adjusted Returns:** {} cycles\n- Strike: ${:.0}\n- Expected: {:.1}% risk-adjusted annual return\n",
            best.timeframe, best.metrics.suggested_strike, best.annual_return_risk_adjusted,
        );
    }
    let _ = write!(
        out,
        "\n*Risk-adjusted = Annual return × {}% success probability",
        c.target_probability_pct
    );
    out
}

pub fn annual_returns(p: &ReturnProjection) -> String {
    format!(
        "**Annualized Return Estimate**

**IV Category:** {category} ({iv}%)
**Trading Frequency:** {trades} trades/year

**Expected Returns:**
- **Range:** {range} annually
- **Estimate:** ~{annual:.1}% per year
- **Per Trade:** ~{per_trade:.1}% average

**Risk-Adjusted Expectation:**
With 84% success rate: ~{adj:.1}% annual return

**Notes:**
- Higher IV means higher premiums and higher returns
- Returns assume consistent execution of probability-based strikes",
        category = p.category,
        iv = p.iv_pct,
        trades = p.trades_per_year,
        range = p.return_range,
        annual = p.base_annual_estimate,
        per_trade = p.per_trade_estimate,
        adj = p.risk_adjusted_estimate,
    )
}

pub fn professional_report(rep: &Report) -> String {
    let r = &rep.request;
    let m = &rep.metrics;
    let strike = m.suggested_strike;
    let p = r.target_probability_pct;

    format!(
        "# Covered Call Strategy Analysis

**Analysis Date:** {as_of}
**Security:** {symbol}
**Current Price:** ${spot:.2}
**Target Expiration:** {expiry} ({days} days)

---

## Executive Summary

**Recommended Action:** Sell {symbol} ${strike:.0} call options

**Key Metrics:**
- **Success Probability:** {p}% chance of retaining full premium
- **Expected Return:** {prem:.1}% for the {days}-day period
- **Maximum Upside:** ${upside:.2} per share ({dist:.1}%)

---

## Strategy Details

### Position Structure
| Component | Details |
|-----------|---------|
| Underlying Asset | {symbol} @ ${spot:.2} |
| Call Strike | ${strike:.2} |
| Days to Expiration | {days} |
| Implied Volatility | {iv}% |
| Expected Move (1σ) | ${mv:.2} ({pct:.1}%) |
| Distance to Strike | {dist:.1}% above current price |

### Probability Analysis
| Scenario | Probability | Outcome |
|----------|-------------|---------|
| **Success Case** | {p}% | Stock remains below ${strike:.2}, retain full premium |
| **Assignment Risk** | {assign}% | Stock rises above ${strike:.2}, shares called away |

---

## Risk Assessment

### Favorable Outcomes
- **Income Generation:** Collect option premium through moderate stock movement
- **Downside Cushion:** Premium offsets minor price declines

### Risk Considerations
- **Opportunity Cost:** No upside participation above ${strike:.2}
- **Assignment Risk:** {assign}% chance of shares being called away
- **Market Risk:** Premium offers limited protection in a sharp decline

---

## Implementation Notes

Based on implied volatility of {iv}%. The recommended strike of ${strike:.2} is the first listed \
strike at or above the target level of ${target:.2}.

{disclaimer}

---

*Analysis generated using implied volatility-based probability calculations*",
        as_of = rep.as_of_date.format(DATE_FORMAT),
        expiry = rep.expiry_date.format(DATE_FORMAT),
        symbol = r.symbol,
        spot = r.spot_price,
        days = r.days_to_expiry,
        iv = r.iv_pct,
        prem = m.estimated_premium_pct,
        upside = rep.upside_participation,
        dist = rep.distance_to_strike_pct,
        mv = m.expected_move,
        pct = m.percent_move,
        target = m.target_strike_level,
        assign = rep.assignment_probability_pct,
        disclaimer = DISCLAIMER,
    )
}

pub fn getting_started() -> String {
    "# Covered Call Income Calculator - Getting Started

Sell covered calls against stocks you already own and collect premium, with the strike chosen \
from implied volatility so the calls expire worthless about 84% of the time.

## Recommended Workflow

1. **Compare timeframes** (`compare_timeframes`): weekly vs bi-weekly vs monthly cycles for a \
stock, ranked by total and risk-adjusted annual return.
2. **Analyze a trade** (`compute_metrics`): exact strike and expected premium for one expiry.
3. **Project income** (`project_annual_return`): yearly estimate from IV and trade frequency.
4. **Document it** (`build_report`): a formal report you can save or share.

## Key Concepts

- **Success rate**: probability the calls expire worthless and you keep the premium
- **Implied volatility (IV)**: the market's expected price movement; higher IV, higher premiums
- **Strike price**: where your shares get called away if the stock rises through it
- **Premium**: the income collected up front

## Risk Reminder

- **You win when** the stock stays flat or rises moderately: keep premium plus stock gains
- **You give up** any rally above the strike: shares are called away at the strike
- **Premium** cushions small declines only"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{metrics, report, returns, timeframes, AnalysisRequest};
    use chrono::NaiveDate;

    #[test]
    fn test_quick_analysis_embeds_strike() {
        let a = metrics::analyze(&AnalysisRequest::new("AAPL", 190.0, 25.0, 30)).unwrap();
        let text = quick_analysis(&a);
        assert!(text.contains("**Recommended Strike: $205.00**"), "{text}");
        assert!(text.contains("Expected Move (1σ): $13.62 (7.2%)"), "{text}");
        assert!(text.contains("Sell AAPL 205 calls expiring in 30 days."), "{text}");
        assert!(text.contains("**Assignment (16%)**"), "{text}");
    }

    #[test]
    fn test_comparison_rows_and_recommendations() {
        let c = timeframes::compare(190.0, 25.0, 84.0).unwrap();
        let text = comparison("AAPL", &c);
        assert!(text.contains("| **Weekly** (7d) |"), "{text}");
        assert!(text.contains("| **Bi-Weekly** (14d) |"), "{text}");
        assert!(text.contains("| **Monthly** (30d) | $205 |"), "{text}");
        assert!(text.contains("**For Maximum Income:** Weekly cycles"), "{text}");
        assert!(text.contains("**For Risk-Adjusted Returns:** Weekly cycles"), "{text}");
    }

    #[test]
    fn test_annual_returns_text() {
        let text = annual_returns(&returns::project(40.0, 26).unwrap());
        assert!(text.contains("**IV Category:** High IV (40%)"), "{text}");
        assert!(text.contains("**Range:** 25-35% annually"), "{text}");
        assert!(text.contains("~20.8% per year"), "{text}");
        assert!(text.contains("~17.5% annual return"), "{text}");
    }

    #[test]
    fn test_report_dates_formatted() {
        let req = AnalysisRequest::new("AAPL", 190.0, 25.0, 30);
        let rep = report::build(&req, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()).unwrap();
        let text = professional_report(&rep);
        assert!(text.contains("**Analysis Date:** March 01, 2024"), "{text}");
        assert!(text.contains("**Target Expiration:** March 31, 2024 (30 days)"), "{text}");
        assert!(text.contains("**Maximum Upside:** $15.00 per share (7.9%)"), "{text}");
        assert!(text.contains("| Call Strike | $205.00 |"), "{text}");
    }

    #[test]
    fn test_guide_mentions_every_tool() {
        let text = getting_started();
        for tool in ["compare_timeframes", "compute_metrics", "project_annual_return", "build_report"] {
            assert!(text.contains(tool), "guide missing {tool}");
        }
    }
}
