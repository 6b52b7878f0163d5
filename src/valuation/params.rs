use serde::{Deserialize, Serialize};

/// The three rates a sweep is allowed to perturb.
///
/// All rates are decimal fractions (0.05 = 5%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateAssumptions {
    pub growth_rate: f64,
    pub wacc: f64,
    pub terminal_growth_rate: f64,
}

impl RateAssumptions {
    /// Apply a joint shift to all three rates.
    pub fn shifted(self, shift: RateShift) -> Self {
        Self {
            growth_rate: self.growth_rate + shift.growth_rate,
            wacc: self.wacc + shift.wacc,
            terminal_growth_rate: self.terminal_growth_rate + shift.terminal_growth_rate,
        }
    }
}

/// Additive deltas for each perturbable rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateShift {
    #[serde(default)]
    pub growth_rate: f64,
    #[serde(default)]
    pub wacc: f64,
    #[serde(default)]
    pub terminal_growth_rate: f64,
}

/// Company and valuation inputs, already unit-normalized and in decimals.
///
/// Monetary fields and `shares_outstanding` share one scale (e.g. millions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationParameters {
    pub enterprise_value: f64,
    pub debt: f64,
    pub cash: f64,
    pub shares_outstanding: f64,
    pub last_fcf: f64,
    pub growth_rate: f64,
    pub wacc: f64,
    pub terminal_growth_rate: f64,
    /// Informational only. No calculation branches on it.
    pub industry: String,
}

impl ValuationParameters {
    pub fn rates(&self) -> RateAssumptions {
        RateAssumptions {
            growth_rate: self.growth_rate,
            wacc: self.wacc,
            terminal_growth_rate: self.terminal_growth_rate,
        }
    }

    /// Snapshot of these parameters with the three rates replaced.
    pub fn with_rates(&self, rates: RateAssumptions) -> Self {
        Self {
            growth_rate: rates.growth_rate,
            wacc: rates.wacc,
            terminal_growth_rate: rates.terminal_growth_rate,
            ..self.clone()
        }
    }
}
