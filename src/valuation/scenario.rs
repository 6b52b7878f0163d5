use serde::{Deserialize, Serialize};

use super::engine::{upside_percentage, ValuationEngine};
use super::params::RateShift;

/// A named joint shift of all three rates.
///
/// Example YAML:
/// ```yaml
/// - name: Stress
///   growth_rate: -0.03
///   wacc: 0.02
///   terminal_growth_rate: -0.01
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub growth_rate: f64,
    #[serde(default)]
    pub wacc: f64,
    #[serde(default)]
    pub terminal_growth_rate: f64,
}

impl Scenario {
    pub fn new(name: &str, growth_rate: f64, wacc: f64, terminal_growth_rate: f64) -> Self {
        Self {
            name: name.to_string(),
            growth_rate,
            wacc,
            terminal_growth_rate,
        }
    }

    pub fn shift(&self) -> RateShift {
        RateShift {
            growth_rate: self.growth_rate,
            wacc: self.wacc,
            terminal_growth_rate: self.terminal_growth_rate,
        }
    }

    /// Bear, Base and Bull, in that order.
    pub fn defaults() -> Vec<Scenario> {
        vec![
            Scenario::new("Bear Case", -0.02, 0.01, -0.005),
            Scenario::new("Base Case", 0.0, 0.0, 0.0),
            Scenario::new("Bull Case", 0.02, -0.005, 0.005),
        ]
    }
}

/// Valuation under one scenario. `error` is set when the shifted rates
/// could not be valued; the value fields then hold the 0 / -100 sentinel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub intrinsic_value: f64,
    pub upside_percentage: f64,
    pub growth_rate: f64,
    pub wacc: f64,
    pub terminal_growth_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScenarioOutcome {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

impl ValuationEngine {
    /// Bear/Base/Bull analysis.
    pub fn scenario_analysis(&self, years: u32) -> Vec<ScenarioOutcome> {
        self.scenario_analysis_with(years, &Scenario::defaults())
    }

    /// Value each scenario with all three shifts applied together. Output
    /// order follows `scenarios`. Invalid rate combinations become
    /// error-tagged outcomes rather than failing the whole run.
    pub fn scenario_analysis_with(&self, years: u32, scenarios: &[Scenario]) -> Vec<ScenarioOutcome> {
        let base_rates = self.params().rates();

        scenarios
            .iter()
            .map(|scenario| {
                let rates = base_rates.shifted(scenario.shift());
                let shifted = self.with_rates(rates);

                match shifted.compute_intrinsic_value(years) {
                    Ok(intrinsic_value) => {
                        let current_price = shifted.compute_implied_share_price();
                        ScenarioOutcome {
                            name: scenario.name.clone(),
                            intrinsic_value,
                            upside_percentage: upside_percentage(intrinsic_value, current_price),
                            growth_rate: rates.growth_rate,
                            wacc: rates.wacc,
                            terminal_growth_rate: rates.terminal_growth_rate,
                            error: None,
                        }
                    }
                    Err(e) => {
                        tracing::debug!(scenario = %scenario.name, "scenario invalid: {}", e);
                        ScenarioOutcome {
                            name: scenario.name.clone(),
                            intrinsic_value: 0.0,
                            upside_percentage: -100.0,
                            growth_rate: rates.growth_rate,
                            wacc: rates.wacc,
                            terminal_growth_rate: rates.terminal_growth_rate,
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::ValuationParameters;

    fn sample_params() -> ValuationParameters {
        ValuationParameters {
            enterprise_value: 1000.0,
            debt: 200.0,
            cash: 100.0,
            shares_outstanding: 10.0,
            last_fcf: 50.0,
            growth_rate: 0.05,
            wacc: 0.08,
            terminal_growth_rate: 0.02,
            industry: "Technology".to_string(),
        }
    }

    #[test]
    fn test_default_order_and_fields() {
        let engine = ValuationEngine::new(sample_params());
        let outcomes = engine.scenario_analysis(5);

        let names: Vec<_> = outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Bear Case", "Base Case", "Bull Case"]);
        assert!(outcomes.iter().all(ScenarioOutcome::is_valid));
    }

    #[test]
    fn test_bull_above_base_above_bear() {
        let engine = ValuationEngine::new(sample_params());
        let outcomes = engine.scenario_analysis(5);

        let bear = outcomes[0].intrinsic_value;
        let base = outcomes[1].intrinsic_value;
        let bull = outcomes[2].intrinsic_value;
        assert!(bull > base);
        assert!(base > bear);
    }

    #[test]
    fn test_base_case_matches_direct_valuation() {
        let engine = ValuationEngine::new(sample_params());
        let outcomes = engine.scenario_analysis(5);
        let base = &outcomes[1];

        let value = engine.compute_intrinsic_value(5).unwrap();
        assert_eq!(base.intrinsic_value, value);
        assert!((base.upside_percentage - (value - 90.0) / 90.0 * 100.0).abs() < 1e-9);
        assert_eq!(base.growth_rate, 0.05);
        assert_eq!(base.wacc, 0.08);
        assert_eq!(base.terminal_growth_rate, 0.02);
    }

    #[test]
    fn test_reports_shifted_rates() {
        let engine = ValuationEngine::new(sample_params());
        let bear = &engine.scenario_analysis(5)[0];

        assert!((bear.growth_rate - 0.03).abs() < 1e-12);
        assert!((bear.wacc - 0.09).abs() < 1e-12);
        assert!((bear.terminal_growth_rate - 0.015).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_rates_tagged_not_raised() {
        let mut params = sample_params();
        params.wacc = 0.01;
        let engine = ValuationEngine::new(params);

        assert!(engine.compute_intrinsic_value(5).is_err());

        let outcomes = engine.scenario_analysis(5);
        assert_eq!(outcomes.len(), 3);
        // Bear lifts wacc to 0.02 over a 0.015 terminal rate, so it still values
        assert!(outcomes[0].is_valid());
        for outcome in &outcomes[1..] {
            assert!(!outcome.is_valid());
            assert_eq!(outcome.intrinsic_value, 0.0);
            assert_eq!(outcome.upside_percentage, -100.0);
            assert!(outcome.error.as_deref().unwrap().contains("WACC"));
        }
        assert_eq!(outcomes[1].wacc, 0.01);
        assert_eq!(outcomes[1].terminal_growth_rate, 0.02);
    }

    #[test]
    fn test_partial_failure_keeps_other_scenarios() {
        // Bull takes wacc to 0.019 and terminal growth to 0.02
        let mut params = sample_params();
        params.wacc = 0.024;
        params.terminal_growth_rate = 0.015;
        let engine = ValuationEngine::new(params);

        let outcomes = engine.scenario_analysis(5);
        assert!(outcomes[0].is_valid());
        assert!(outcomes[1].is_valid());
        assert!(!outcomes[2].is_valid());
    }

    #[test]
    fn test_zero_shares_upside_is_zero() {
        let mut params = sample_params();
        params.shares_outstanding = 0.0;
        let engine = ValuationEngine::new(params);

        for outcome in engine.scenario_analysis(5) {
            assert_eq!(outcome.intrinsic_value, 0.0);
            assert_eq!(outcome.upside_percentage, 0.0);
        }
    }

    #[test]
    fn test_engine_state_unchanged() {
        let engine = ValuationEngine::new(sample_params());
        let before = engine.params().clone();
        let _ = engine.scenario_analysis(5);
        assert_eq!(engine.params(), &before);
    }

    #[test]
    fn test_custom_scenarios_keep_order() {
        let engine = ValuationEngine::new(sample_params());
        let scenarios = vec![
            Scenario::new("Upside", 0.01, 0.0, 0.0),
            Scenario::new("Stress", -0.03, 0.02, -0.01),
        ];
        let outcomes = engine.scenario_analysis_with(5, &scenarios);

        assert_eq!(outcomes[0].name, "Upside");
        assert_eq!(outcomes[1].name, "Stress");
        assert!(outcomes[0].intrinsic_value > outcomes[1].intrinsic_value);
    }

    #[test]
    fn test_scenario_parse() {
        let yaml = r#"
name: Stress
growth_rate: -0.03
wacc: 0.02
"#;
        let scenario: Scenario = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(scenario.name, "Stress");
        assert_eq!(scenario.growth_rate, -0.03);
        assert_eq!(scenario.wacc, 0.02);
        assert_eq!(scenario.terminal_growth_rate, 0.0);
    }

    #[test]
    fn test_error_field_skipped_when_valid() {
        let engine = ValuationEngine::new(sample_params());
        let json = serde_json::to_value(&engine.scenario_analysis(5)[1]).unwrap();
        assert!(json.get("error").is_none());
        assert!(json.get("intrinsic_value").is_some());
    }
}
