use std::collections::HashSet;

use super::params::ValuationParameters;
use super::scenario::Scenario;
use super::sensitivity::SensitivityRange;

pub const MIN_PROJECTION_YEARS: u32 = 1;
pub const MAX_PROJECTION_YEARS: u32 = 10;

/// Band a normalized growth rate is expected to sit in.
pub const GROWTH_RATE_BAND: (f64, f64) = (0.01, 0.20);

/// Validate valuation inputs before they reach the engine.
/// Returns all validation errors at once (not just the first).
pub fn validate_inputs(
    params: &ValuationParameters,
    years: u32,
    ranges: Option<&[SensitivityRange]>,
    scenarios: Option<&[Scenario]>,
) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if !(MIN_PROJECTION_YEARS..=MAX_PROJECTION_YEARS).contains(&years) {
        errors.push(format!(
            "analysis.years: must be between {} and {}, got {}",
            MIN_PROJECTION_YEARS, MAX_PROJECTION_YEARS, years
        ));
    }

    let numeric = [
        ("company.enterprise_value", params.enterprise_value),
        ("company.debt", params.debt),
        ("company.cash", params.cash),
        ("company.shares_outstanding", params.shares_outstanding),
        ("company.last_fcf", params.last_fcf),
        ("company.growth_rate", params.growth_rate),
        ("analysis.wacc", params.wacc),
        ("analysis.terminal_growth_rate", params.terminal_growth_rate),
    ];
    for (field, value) in numeric {
        if !value.is_finite() {
            errors.push(format!("{}: must be a finite number", field));
        }
    }

    for (field, value) in [
        ("company.debt", params.debt),
        ("company.cash", params.cash),
        ("company.shares_outstanding", params.shares_outstanding),
    ] {
        if value < 0.0 {
            errors.push(format!("{}: must be non-negative", field));
        }
    }

    if params.last_fcf <= 0.0 {
        errors.push("company.last_fcf: must be positive".to_string());
    }

    if params.wacc <= params.terminal_growth_rate {
        errors.push(format!(
            "analysis.wacc: must be greater than terminal_growth_rate ({} <= {})",
            params.wacc, params.terminal_growth_rate
        ));
    }

    if let Some(ranges) = ranges {
        let mut seen = HashSet::new();
        for (i, range) in ranges.iter().enumerate() {
            if !seen.insert(range.variable) {
                errors.push(format!(
                    "analysis.sensitivity[{}].variable: duplicate '{}'",
                    i,
                    range.variable.key()
                ));
            }
            if range.adjustments.is_empty() {
                errors.push(format!(
                    "analysis.sensitivity[{}].adjustments: must not be empty",
                    i
                ));
            }
            if range.adjustments.iter().any(|a| !a.is_finite()) {
                errors.push(format!(
                    "analysis.sensitivity[{}].adjustments: must be finite numbers",
                    i
                ));
            }
        }
    }

    if let Some(scenarios) = scenarios {
        let mut seen = HashSet::new();
        for (i, scenario) in scenarios.iter().enumerate() {
            let name = scenario.name.trim();
            if name.is_empty() {
                errors.push(format!("analysis.scenarios[{}].name: must not be empty", i));
            } else if !seen.insert(name.to_string()) {
                errors.push(format!(
                    "analysis.scenarios[{}].name: duplicate '{}'",
                    i, name
                ));
            }
            if [scenario.growth_rate, scenario.wacc, scenario.terminal_growth_rate]
                .iter()
                .any(|d| !d.is_finite())
            {
                errors.push(format!(
                    "analysis.scenarios[{}]: shifts must be finite numbers",
                    i
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Whether a growth rate falls outside the expected band.
pub fn growth_out_of_band(growth_rate: f64) -> bool {
    let (low, high) = GROWTH_RATE_BAND;
    growth_rate < low || growth_rate > high
}
