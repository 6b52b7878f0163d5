pub mod engine;
pub mod error;
pub mod params;
pub mod scenario;
pub mod sensitivity;
pub mod validation;

pub use engine::{upside_percentage, CashFlowRow, ValuationEngine, ValuationSummary, Verdict};
pub use error::ValuationError;
pub use params::{RateAssumptions, RateShift, ValuationParameters};
pub use scenario::{Scenario, ScenarioOutcome};
pub use sensitivity::{
    RateVariable, SensitivityAnalysis, SensitivityPoint, SensitivityRange, VariableSensitivity,
};
pub use validation::{growth_out_of_band, validate_inputs, MAX_PROJECTION_YEARS, MIN_PROJECTION_YEARS};
