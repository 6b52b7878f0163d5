pub mod config;
pub mod financials;
pub mod logging;
pub mod output;
pub mod report;
pub mod valuation;
