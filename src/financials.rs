//! Normalization of raw financial statement figures into valuation inputs.
//!
//! Raw figures are in reported currency units; the engine works in millions.
//! Missing free cash flow is estimated through a fixed fallback chain and
//! historical growth is derived from the revenue trend.

use serde::{Deserialize, Serialize};

use crate::valuation::validation::GROWTH_RATE_BAND;
use crate::valuation::ValuationParameters;

const UNIT_SCALE: f64 = 1_000_000.0;

/// Share of net income used as a free cash flow proxy.
const NET_INCOME_FCF_RATIO: f64 = 0.8;

/// Last-resort free cash flow (millions) when no positive estimate exists.
pub const FALLBACK_FCF: f64 = 100.0;

/// Growth used when the revenue history is too short to measure.
pub const DEFAULT_GROWTH_RATE: f64 = 0.05;

/// Number of most recent year-over-year revenue changes averaged.
const GROWTH_LOOKBACK: usize = 3;

/// Raw statement figures for one company, as reported.
///
/// Example YAML:
/// ```yaml
/// statements:
///   enterprise_value: 2000000000000
///   total_debt: 100000000000
///   total_cash: 50000000000
///   shares_outstanding: 16000000000
///   operating_cash_flow: 100000000000
///   capital_expenditures: -20000000000
///   revenues: [365000000000, 350000000000, 340000000000]
///   industry: Technology
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FinancialStatements {
    #[serde(default)]
    pub enterprise_value: f64,

    /// Headline total debt; preferred over `balance_sheet_debt`
    #[serde(default)]
    pub total_debt: Option<f64>,

    #[serde(default)]
    pub balance_sheet_debt: Option<f64>,

    #[serde(default)]
    pub total_cash: Option<f64>,

    #[serde(default)]
    pub shares_outstanding: f64,

    #[serde(default)]
    pub operating_cash_flow: Option<f64>,

    /// Reported as a negative outflow
    #[serde(default)]
    pub capital_expenditures: Option<f64>,

    #[serde(default)]
    pub free_cash_flow: Option<f64>,

    #[serde(default)]
    pub net_income: Option<f64>,

    /// Annual revenues, newest first
    #[serde(default)]
    pub revenues: Vec<f64>,

    #[serde(default)]
    pub industry: Option<String>,

    /// Last traded share price, informational
    #[serde(default)]
    pub current_price: Option<f64>,
}

/// Company inputs in millions with growth as a decimal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedFinancials {
    pub enterprise_value: f64,
    pub debt: f64,
    pub cash: f64,
    pub shares_outstanding: f64,
    pub last_fcf: f64,
    pub growth_rate: f64,
    pub industry: String,
    pub current_price: Option<f64>,
}

impl NormalizedFinancials {
    /// Combine with caller-chosen discount assumptions.
    pub fn into_parameters(self, wacc: f64, terminal_growth_rate: f64) -> ValuationParameters {
        ValuationParameters {
            enterprise_value: self.enterprise_value,
            debt: self.debt,
            cash: self.cash,
            shares_outstanding: self.shares_outstanding,
            last_fcf: self.last_fcf,
            growth_rate: self.growth_rate,
            wacc,
            terminal_growth_rate,
            industry: self.industry,
        }
    }
}

impl FinancialStatements {
    pub fn normalize(&self) -> NormalizedFinancials {
        let debt = self
            .total_debt
            .or(self.balance_sheet_debt)
            .unwrap_or(0.0);

        NormalizedFinancials {
            enterprise_value: self.enterprise_value / UNIT_SCALE,
            debt: debt / UNIT_SCALE,
            cash: self.total_cash.unwrap_or(0.0) / UNIT_SCALE,
            shares_outstanding: self.shares_outstanding / UNIT_SCALE,
            last_fcf: self.estimate_fcf(),
            growth_rate: revenue_growth(&self.revenues),
            industry: self
                .industry
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "N/A".to_string()),
            current_price: self.current_price,
        }
    }

    /// Free cash flow in millions: operating cash flow plus capex, then the
    /// reported figure, then a share of net income, then a fixed fallback.
    fn estimate_fcf(&self) -> f64 {
        let operating = finite_or_zero(self.operating_cash_flow);
        let capex = finite_or_zero(self.capital_expenditures);
        let computed = (operating + capex) / UNIT_SCALE;
        if computed > 0.0 {
            return computed;
        }

        if let Some(fcf) = self.free_cash_flow.filter(|v| v.is_finite() && *v > 0.0) {
            tracing::debug!("free cash flow taken from reported figure");
            return fcf / UNIT_SCALE;
        }

        if let Some(income) = self.net_income.filter(|v| v.is_finite() && *v > 0.0) {
            tracing::debug!("free cash flow estimated from net income");
            return income * NET_INCOME_FCF_RATIO / UNIT_SCALE;
        }

        tracing::warn!(
            "no positive free cash flow estimate, falling back to {}M",
            FALLBACK_FCF
        );
        FALLBACK_FCF
    }
}

/// Mean of the most recent year-over-year revenue changes, clamped to the
/// expected growth band.
pub fn revenue_growth(revenues: &[f64]) -> f64 {
    let changes: Vec<f64> = revenues
        .windows(2)
        .filter(|pair| pair[1] != 0.0 && pair[0].is_finite() && pair[1].is_finite())
        .map(|pair| pair[0] / pair[1] - 1.0)
        .take(GROWTH_LOOKBACK)
        .collect();

    if changes.is_empty() {
        return DEFAULT_GROWTH_RATE;
    }

    let mean = changes.iter().sum::<f64>() / changes.len() as f64;
    let (low, high) = GROWTH_RATE_BAND;
    mean.clamp(low, high)
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_statements() -> FinancialStatements {
        FinancialStatements {
            enterprise_value: 2_000_000_000_000.0,
            total_debt: Some(100_000_000_000.0),
            balance_sheet_debt: None,
            total_cash: Some(50_000_000_000.0),
            shares_outstanding: 16_000_000_000.0,
            operating_cash_flow: Some(100_000_000_000.0),
            capital_expenditures: Some(-20_000_000_000.0),
            free_cash_flow: None,
            net_income: None,
            revenues: vec![365_000_000_000.0, 350_000_000_000.0, 340_000_000_000.0],
            industry: Some("Technology".to_string()),
            current_price: Some(190.0),
        }
    }

    #[test]
    fn test_normalize_scales_to_millions() {
        let n = sample_statements().normalize();
        assert_eq!(n.enterprise_value, 2_000_000.0);
        assert_eq!(n.debt, 100_000.0);
        assert_eq!(n.cash, 50_000.0);
        assert_eq!(n.shares_outstanding, 16_000.0);
        assert_eq!(n.last_fcf, 80_000.0);
        assert_eq!(n.industry, "Technology");
        assert_eq!(n.current_price, Some(190.0));
    }

    #[test]
    fn test_growth_from_revenue_trend() {
        let n = sample_statements().normalize();
        let expected = ((365.0 / 350.0 - 1.0) + (350.0 / 340.0 - 1.0)) / 2.0;
        assert!((n.growth_rate - expected).abs() < 1e-12);
    }

    #[test]
    fn test_growth_clamped() {
        assert_eq!(revenue_growth(&[200.0, 100.0]), 0.20);
        assert_eq!(revenue_growth(&[90.0, 100.0]), 0.01);
    }

    #[test]
    fn test_growth_uses_three_most_recent_changes() {
        // Changes: 10%, 10%, 10%, then a 100% jump that must be ignored
        let revenues = [133.1, 121.0, 110.0, 100.0, 50.0];
        assert!((revenue_growth(&revenues) - 0.10).abs() < 1e-9);
    }

    #[test]
    fn test_growth_default_when_history_short() {
        assert_eq!(revenue_growth(&[]), DEFAULT_GROWTH_RATE);
        assert_eq!(revenue_growth(&[100.0]), DEFAULT_GROWTH_RATE);
        assert_eq!(revenue_growth(&[100.0, 0.0]), DEFAULT_GROWTH_RATE);
    }

    #[test]
    fn test_debt_falls_back_to_balance_sheet() {
        let mut s = sample_statements();
        s.total_debt = None;
        s.balance_sheet_debt = Some(7_000_000.0);
        assert_eq!(s.normalize().debt, 7.0);

        s.balance_sheet_debt = None;
        assert_eq!(s.normalize().debt, 0.0);
    }

    #[test]
    fn test_fcf_uses_reported_when_computed_not_positive() {
        let mut s = sample_statements();
        s.operating_cash_flow = Some(10_000_000.0);
        s.capital_expenditures = Some(-30_000_000.0);
        s.free_cash_flow = Some(5_000_000.0);
        assert_eq!(s.normalize().last_fcf, 5.0);
    }

    #[test]
    fn test_fcf_uses_net_income_proxy() {
        let mut s = sample_statements();
        s.operating_cash_flow = None;
        s.capital_expenditures = None;
        s.free_cash_flow = Some(-1.0);
        s.net_income = Some(10_000_000.0);
        assert!((s.normalize().last_fcf - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_fcf_fixed_fallback() {
        let mut s = sample_statements();
        s.operating_cash_flow = None;
        s.capital_expenditures = None;
        s.net_income = Some(-5.0);
        assert_eq!(s.normalize().last_fcf, FALLBACK_FCF);
    }

    #[test]
    fn test_industry_defaults() {
        let mut s = sample_statements();
        s.industry = None;
        assert_eq!(s.normalize().industry, "N/A");
        s.industry = Some("".to_string());
        assert_eq!(s.normalize().industry, "N/A");
    }

    #[test]
    fn test_into_parameters() {
        let params = sample_statements().normalize().into_parameters(0.09, 0.025);
        assert_eq!(params.wacc, 0.09);
        assert_eq!(params.terminal_growth_rate, 0.025);
        assert_eq!(params.last_fcf, 80_000.0);
        assert_eq!(params.industry, "Technology");
    }

    #[test]
    fn test_normalized_values_positive_intrinsic() {
        use crate::valuation::ValuationEngine;
        let params = sample_statements().normalize().into_parameters(0.08, 0.02);
        let value = ValuationEngine::new(params).compute_intrinsic_value(5).unwrap();
        assert!(value > 0.0);
    }

    #[test]
    fn test_statements_parse() {
        let yaml = r#"
enterprise_value: 1000000000
shares_outstanding: 10000000
net_income: 50000000
revenues: [110, 100]
"#;
        let s: FinancialStatements = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(s.enterprise_value, 1_000_000_000.0);
        assert!(s.total_debt.is_none());
        assert_eq!(s.revenues.len(), 2);
        let n = s.normalize();
        assert!((n.last_fcf - 40.0).abs() < 1e-12);
        assert!((n.growth_rate - 0.10).abs() < 1e-12);
    }
}
