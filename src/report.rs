use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::valuation::{
    Scenario, ScenarioOutcome, SensitivityAnalysis, SensitivityRange, ValuationEngine,
    ValuationError, ValuationParameters, ValuationSummary,
};

/// Complete analysis of one company, ready to serialize.
#[derive(Debug, Clone, Serialize)]
pub struct ValuationReport {
    pub generated_at: DateTime<Utc>,
    pub name: String,
    pub industry: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_price: Option<f64>,
    pub parameters: ValuationParameters,
    pub summary: ValuationSummary,
    pub sensitivity: SensitivityAnalysis,
    pub scenarios: Vec<ScenarioOutcome>,
}

/// Run every analysis for `years`. Custom ranges or scenarios replace the
/// defaults when given.
pub fn build_report(
    name: &str,
    market_price: Option<f64>,
    engine: &ValuationEngine,
    years: u32,
    ranges: Option<&[SensitivityRange]>,
    scenarios: Option<&[Scenario]>,
) -> Result<ValuationReport, ValuationError> {
    let summary = engine.summarize(years)?;
    let sensitivity = engine.sensitivity_analysis(years, ranges)?;
    let scenarios = match scenarios {
        Some(s) => engine.scenario_analysis_with(years, s),
        None => engine.scenario_analysis(years),
    };

    Ok(ValuationReport {
        generated_at: Utc::now(),
        name: name.to_string(),
        industry: engine.params().industry.clone(),
        market_price,
        parameters: engine.params().clone(),
        summary,
        sensitivity,
        scenarios,
    })
}

/// Save a report as pretty JSON atomically
///
/// The target file is never left half-written. Parent directories are
/// created when missing.
pub fn save_report(path: &Path, report: &ValuationReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, report).context("Failed to serialize report")?;

    file.commit()
        .with_context(|| format!("Failed to save report to {}", path.display()))?;

    Ok(())
}

/// Header fields of a saved report, for reading exports back.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportHeader {
    pub generated_at: DateTime<Utc>,
    pub name: String,
    pub industry: String,
}

pub fn load_report_header(path: &Path) -> Result<ReportHeader> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open report at {}", path.display()))?;
    serde_json::from_reader(file).context("Failed to load report")
}
