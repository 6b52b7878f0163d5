use serde::{Deserialize, Serialize};

use crate::financials::FinancialStatements;
use crate::valuation::{Scenario, SensitivityRange};

pub const DEFAULT_WACC: f64 = 0.08;
pub const DEFAULT_TERMINAL_GROWTH_RATE: f64 = 0.02;
pub const DEFAULT_PROJECTION_YEARS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Display name for the company being valued
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Already-normalized company figures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyConfig>,

    /// Raw statement figures, normalized on load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statements: Option<FinancialStatements>,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Company inputs in millions, growth as a decimal.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompanyConfig {
    pub enterprise_value: f64,
    #[serde(default)]
    pub debt: f64,
    #[serde(default)]
    pub cash: f64,
    pub shares_outstanding: f64,
    pub last_fcf: f64,
    pub growth_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

/// Discount assumptions and sweep settings, rates as decimals.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    #[serde(default = "default_wacc")]
    pub wacc: f64,

    #[serde(default = "default_terminal_growth_rate")]
    pub terminal_growth_rate: f64,

    #[serde(default = "default_years")]
    pub years: u32,

    /// Custom sensitivity ranges; defaults to the standard five-point sweep
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<Vec<SensitivityRange>>,

    /// Custom scenario set; defaults to Bear/Base/Bull
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenarios: Option<Vec<Scenario>>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            wacc: DEFAULT_WACC,
            terminal_growth_rate: DEFAULT_TERMINAL_GROWTH_RATE,
            years: DEFAULT_PROJECTION_YEARS,
            sensitivity: None,
            scenarios: None,
        }
    }
}

fn default_wacc() -> f64 {
    DEFAULT_WACC
}

fn default_terminal_growth_rate() -> f64 {
    DEFAULT_TERMINAL_GROWTH_RATE
}

fn default_years() -> u32 {
    DEFAULT_PROJECTION_YEARS
}
