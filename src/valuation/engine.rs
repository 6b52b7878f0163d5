use serde::Serialize;

use super::error::ValuationError;
use super::params::{RateAssumptions, ValuationParameters};

/// One year of the explicit projection period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CashFlowRow {
    pub year: u32,
    pub fcf: f64,
    pub present_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Undervalued,
    Overvalued,
}

/// Everything needed to present a single valuation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationSummary {
    pub years: u32,
    pub rates: RateAssumptions,
    pub intrinsic_value: f64,
    pub current_price: f64,
    pub upside_percentage: f64,
    pub verdict: Verdict,
    pub margin: f64,
    pub intrinsic_enterprise_value: f64,
    pub terminal_value: f64,
    pub pv_terminal_value: f64,
    pub intrinsic_equity_value: f64,
    pub cash_flows: Vec<CashFlowRow>,
}

/// Discounted cash flow valuation over a fixed parameter set.
///
/// The engine never mutates its parameters. Sweeps evaluate fresh snapshots,
/// so a single engine can be shared freely between threads.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationEngine {
    params: ValuationParameters,
}

impl ValuationEngine {
    pub fn new(params: ValuationParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ValuationParameters {
        &self.params
    }

    /// Engine over the same company with the three rates replaced.
    pub(crate) fn with_rates(&self, rates: RateAssumptions) -> Self {
        Self::new(self.params.with_rates(rates))
    }

    /// Compound-growth projection: `last_fcf * (1 + g)^t` for `t = 1..=years`.
    pub fn project_cash_flows(&self, years: u32) -> Vec<f64> {
        let growth = 1.0 + self.params.growth_rate;
        (1..=years)
            .map(|year| self.params.last_fcf * growth.powf(year as f64))
            .collect()
    }

    /// Gordon-growth perpetuity on the final projected year.
    pub fn compute_terminal_value(&self, final_year_fcf: f64) -> Result<f64, ValuationError> {
        let denominator = self.params.wacc - self.params.terminal_growth_rate;
        if denominator <= 0.0 {
            return Err(ValuationError::InvalidDiscountRate {
                wacc: self.params.wacc,
                terminal_growth_rate: self.params.terminal_growth_rate,
            });
        }
        Ok(final_year_fcf * (1.0 + self.params.terminal_growth_rate) / denominator)
    }

    /// Intrinsic enterprise value: discounted cash flows plus the terminal
    /// value discounted over the full horizon.
    pub fn compute_present_value(&self, cash_flows: &[f64], terminal_value: f64) -> f64 {
        let pv_fcf: f64 = cash_flows
            .iter()
            .enumerate()
            .map(|(i, fcf)| fcf / self.discount_factor(i as u32 + 1))
            .sum();
        let pv_terminal = terminal_value / self.discount_factor(cash_flows.len() as u32);
        pv_fcf + pv_terminal
    }

    /// Equity value from the input (market) enterprise value.
    pub fn compute_equity_value(&self) -> f64 {
        self.params.enterprise_value - self.params.debt + self.params.cash
    }

    /// Current share price implied by market EV; 0 without shares.
    pub fn compute_implied_share_price(&self) -> f64 {
        self.per_share(self.compute_equity_value())
    }

    /// Intrinsic value per share. 0 when `years == 0` or there are no shares.
    pub fn compute_intrinsic_value(&self, years: u32) -> Result<f64, ValuationError> {
        let projected = self.project_cash_flows(years);
        let Some(&final_fcf) = projected.last() else {
            return Ok(0.0);
        };

        let terminal_value = self.compute_terminal_value(final_fcf)?;
        let intrinsic_ev = self.compute_present_value(&projected, terminal_value);
        Ok(self.per_share(self.equity_from(intrinsic_ev)))
    }

    /// Full breakdown of a single valuation run.
    pub fn summarize(&self, years: u32) -> Result<ValuationSummary, ValuationError> {
        let projected = self.project_cash_flows(years);
        let current_price = self.compute_implied_share_price();

        let (terminal_value, intrinsic_ev) = match projected.last() {
            Some(&final_fcf) => {
                let terminal_value = self.compute_terminal_value(final_fcf)?;
                (terminal_value, self.compute_present_value(&projected, terminal_value))
            }
            None => (0.0, 0.0),
        };

        let (intrinsic_equity_value, intrinsic_value) = if projected.is_empty() {
            (0.0, 0.0)
        } else {
            let equity = self.equity_from(intrinsic_ev);
            (equity, self.per_share(equity))
        };

        let cash_flows = projected
            .iter()
            .enumerate()
            .map(|(i, &fcf)| {
                let year = i as u32 + 1;
                CashFlowRow {
                    year,
                    fcf,
                    present_value: fcf / self.discount_factor(year),
                }
            })
            .collect();

        let verdict = if intrinsic_value > current_price {
            Verdict::Undervalued
        } else {
            Verdict::Overvalued
        };

        Ok(ValuationSummary {
            years,
            rates: self.params.rates(),
            intrinsic_value,
            current_price,
            upside_percentage: upside_percentage(intrinsic_value, current_price),
            verdict,
            margin: (intrinsic_value - current_price).abs(),
            intrinsic_enterprise_value: intrinsic_ev,
            terminal_value,
            pv_terminal_value: terminal_value / self.discount_factor(years),
            intrinsic_equity_value,
            cash_flows,
        })
    }

    fn discount_factor(&self, year: u32) -> f64 {
        (1.0 + self.params.wacc).powf(year as f64)
    }

    fn equity_from(&self, enterprise_value: f64) -> f64 {
        enterprise_value - self.params.debt + self.params.cash
    }

    fn per_share(&self, equity_value: f64) -> f64 {
        if self.params.shares_outstanding == 0.0 {
            0.0
        } else {
            equity_value / self.params.shares_outstanding
        }
    }
}

/// Percentage gap between intrinsic and current price; 0 when the current
/// price is 0.
pub fn upside_percentage(intrinsic_value: f64, current_price: f64) -> f64 {
    if current_price == 0.0 {
        0.0
    } else {
        (intrinsic_value - current_price) / current_price * 100.0
    }
}
