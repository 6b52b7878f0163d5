use thiserror::Error;

/// The single domain failure of the valuation engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValuationError {
    /// A perpetuity growing as fast as (or faster than) it is discounted has
    /// no finite value.
    #[error("invalid parameters: WACC ({wacc:.4}) must be greater than the terminal growth rate ({terminal_growth_rate:.4})")]
    InvalidDiscountRate {
        wacc: f64,
        terminal_growth_rate: f64,
    },
}
