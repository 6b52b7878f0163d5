pub mod init;
mod schema;

pub use schema::{
    AnalysisConfig, CompanyConfig, Config, DEFAULT_PROJECTION_YEARS,
    DEFAULT_TERMINAL_GROWTH_RATE, DEFAULT_WACC,
};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::valuation::ValuationParameters;

/// Get the config directory path (~/.config/dcf-val/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("dcf-val"))
}

/// Get the default config file path (~/.config/dcf-val/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/dcf-val/config.yaml)
///
/// # Errors
///
/// Returns an error if:
/// - The config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
/// - The file gives both or neither of `company` and `statements`
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => p,
        None => get_config_path()?,
    };

    if !config_path.exists() {
        anyhow::bail!(
            "Config file not found at {}. Run `dcf-val init` to create one",
            config_path.display()
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    parse_config(&config_content)
        .with_context(|| format!("Invalid config in {}", config_path.display()))
}

/// Parse and check a config document.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config =
        serde_saphyr::from_str(content).context("Failed to parse config: invalid YAML")?;

    match (&config.company, &config.statements) {
        (Some(_), Some(_)) => anyhow::bail!("Set either `company` or `statements`, not both"),
        (None, None) => anyhow::bail!("Missing company inputs: set `company` or `statements`"),
        _ => Ok(config),
    }
}

impl Config {
    /// Build engine parameters from the company section and analysis rates.
    pub fn parameters(&self) -> Result<ValuationParameters> {
        let wacc = self.analysis.wacc;
        let terminal_growth_rate = self.analysis.terminal_growth_rate;

        if let Some(company) = &self.company {
            return Ok(ValuationParameters {
                enterprise_value: company.enterprise_value,
                debt: company.debt,
                cash: company.cash,
                shares_outstanding: company.shares_outstanding,
                last_fcf: company.last_fcf,
                growth_rate: company.growth_rate,
                wacc,
                terminal_growth_rate,
                industry: company
                    .industry
                    .clone()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| "N/A".to_string()),
            });
        }

        let statements = self
            .statements
            .as_ref()
            .context("Missing company inputs: set `company` or `statements`")?;
        Ok(statements
            .normalize()
            .into_parameters(wacc, terminal_growth_rate))
    }

    /// Display name, falling back to a generic label.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Company")
    }

    /// Last traded share price, only known when raw statements supply one.
    pub fn market_price(&self) -> Option<f64> {
        self.statements
            .as_ref()
            .and_then(|s| s.normalize().current_price)
    }
}
