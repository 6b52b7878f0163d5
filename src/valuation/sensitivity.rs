use serde::{Deserialize, Serialize};

use super::engine::ValuationEngine;
use super::error::ValuationError;
use super::params::RateAssumptions;

/// A rate that sensitivity analysis can perturb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateVariable {
    GrowthRate,
    Wacc,
    TerminalGrowthRate,
}

impl RateVariable {
    pub const ALL: [RateVariable; 3] = [
        RateVariable::GrowthRate,
        RateVariable::Wacc,
        RateVariable::TerminalGrowthRate,
    ];

    /// Config/report key
    pub fn key(self) -> &'static str {
        match self {
            RateVariable::GrowthRate => "growth_rate",
            RateVariable::Wacc => "wacc",
            RateVariable::TerminalGrowthRate => "terminal_growth_rate",
        }
    }

    /// Human-readable name for tables
    pub fn label(self) -> &'static str {
        match self {
            RateVariable::GrowthRate => "FCF Growth Rate",
            RateVariable::Wacc => "WACC",
            RateVariable::TerminalGrowthRate => "Terminal Growth",
        }
    }

    /// Rates with only this variable moved by `adjustment`.
    pub fn adjust(self, rates: RateAssumptions, adjustment: f64) -> RateAssumptions {
        match self {
            RateVariable::GrowthRate => RateAssumptions {
                growth_rate: rates.growth_rate + adjustment,
                ..rates
            },
            RateVariable::Wacc => RateAssumptions {
                wacc: rates.wacc + adjustment,
                ..rates
            },
            RateVariable::TerminalGrowthRate => RateAssumptions {
                terminal_growth_rate: rates.terminal_growth_rate + adjustment,
                ..rates
            },
        }
    }
}

/// Adjustments to sweep for one variable.
///
/// Example YAML:
/// ```yaml
/// - variable: wacc
///   adjustments: [-0.01, 0, 0.01]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensitivityRange {
    pub variable: RateVariable,
    pub adjustments: Vec<f64>,
}

impl SensitivityRange {
    /// Five points per variable, symmetric about zero.
    pub fn defaults() -> Vec<SensitivityRange> {
        vec![
            SensitivityRange {
                variable: RateVariable::GrowthRate,
                adjustments: vec![-0.02, -0.01, 0.0, 0.01, 0.02],
            },
            SensitivityRange {
                variable: RateVariable::Wacc,
                adjustments: vec![-0.01, -0.005, 0.0, 0.005, 0.01],
            },
            SensitivityRange {
                variable: RateVariable::TerminalGrowthRate,
                adjustments: vec![-0.005, -0.0025, 0.0, 0.0025, 0.005],
            },
        ]
    }
}

/// One perturbed valuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensitivityPoint {
    pub adjustment: f64,
    pub intrinsic_value: f64,
    /// Change against the unperturbed base value, in percent.
    pub percentage_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableSensitivity {
    pub variable: RateVariable,
    pub points: Vec<SensitivityPoint>,
}

/// Results of a one-at-a-time sweep, in range order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityAnalysis {
    pub base_intrinsic_value: f64,
    pub variables: Vec<VariableSensitivity>,
}

impl SensitivityAnalysis {
    pub fn get(&self, variable: RateVariable) -> Option<&[SensitivityPoint]> {
        self.variables
            .iter()
            .find(|v| v.variable == variable)
            .map(|v| v.points.as_slice())
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

impl ValuationEngine {
    /// Perturb each variable on its own and revalue.
    ///
    /// Points where the perturbed rates are invalid are recorded as
    /// `intrinsic_value: 0, percentage_change: -100` and the sweep carries on.
    /// Only a failure of the unperturbed base valuation is returned as an error.
    pub fn sensitivity_analysis(
        &self,
        years: u32,
        ranges: Option<&[SensitivityRange]>,
    ) -> Result<SensitivityAnalysis, ValuationError> {
        let defaults;
        let ranges: &[SensitivityRange] = match ranges {
            Some(r) => r,
            None => {
                defaults = SensitivityRange::defaults();
                &defaults
            }
        };

        let base_intrinsic_value = self.compute_intrinsic_value(years)?;
        let base_rates = self.params().rates();

        let variables = ranges
            .iter()
            .map(|range| {
                let points = range
                    .adjustments
                    .iter()
                    .map(|&adjustment| {
                        let rates = range.variable.adjust(base_rates, adjustment);
                        match self.with_rates(rates).compute_intrinsic_value(years) {
                            Ok(value) => SensitivityPoint {
                                adjustment,
                                intrinsic_value: value,
                                percentage_change: percentage_change(value, base_intrinsic_value),
                            },
                            Err(e) => {
                                tracing::debug!(
                                    variable = range.variable.key(),
                                    adjustment,
                                    "sensitivity point invalid: {}",
                                    e
                                );
                                SensitivityPoint {
                                    adjustment,
                                    intrinsic_value: 0.0,
                                    percentage_change: -100.0,
                                }
                            }
                        }
                    })
                    .collect();
                VariableSensitivity {
                    variable: range.variable,
                    points,
                }
            })
            .collect();

        Ok(SensitivityAnalysis {
            base_intrinsic_value,
            variables,
        })
    }
}

fn percentage_change(value: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        (value - base) / base * 100.0
    }
}
