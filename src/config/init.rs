use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, AnalysisConfig, CompanyConfig, Config};
use crate::valuation::{MAX_PROJECTION_YEARS, MIN_PROJECTION_YEARS};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Keep asking until the input parses as a number accepted by `check`.
fn prompt_number(
    message: &str,
    default: &str,
    check: impl Fn(f64) -> Result<(), String>,
) -> Result<f64> {
    loop {
        let input = prompt_with_default(message, default)?;
        match input.parse::<f64>() {
            Ok(v) if v.is_finite() => match check(v) {
                Ok(()) => return Ok(v),
                Err(e) => println!("  Invalid: {}. Try again.", e),
            },
            _ => println!("  Invalid: must be a number. Try again."),
        }
    }
}

fn any_number(_: f64) -> Result<(), String> {
    Ok(())
}

fn non_negative(v: f64) -> Result<(), String> {
    if v < 0.0 {
        Err("must be non-negative".to_string())
    } else {
        Ok(())
    }
}

fn positive(v: f64) -> Result<(), String> {
    if v <= 0.0 {
        Err("must be positive".to_string())
    } else {
        Ok(())
    }
}

/// Print text with a typewriter effect, one character at a time.
fn typewriter(text: &str) {
    use std::thread;
    use std::time::Duration;
    for c in text.chars() {
        print!("{}", c);
        std::io::stdout().flush().ok();
        thread::sleep(Duration::from_millis(18));
    }
    println!();
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    typewriter("DCF Valuation Configuration Wizard");
    println!("==================================");
    println!();

    // 1. Company figures
    let name = prompt("Company name (optional): ")?;
    let name = if name.is_empty() { None } else { Some(name) };

    println!();
    typewriter("Enter figures in millions of your reporting currency. Share count uses the same scale.");
    let enterprise_value = prompt_number("Enterprise value (M)", "1000", any_number)?;
    let debt = prompt_number("Total debt (M)", "0", non_negative)?;
    let cash = prompt_number("Cash and equivalents (M)", "0", non_negative)?;
    let shares_outstanding = prompt_number("Shares outstanding (M)", "100", non_negative)?;
    let last_fcf = prompt_number("Most recent free cash flow (M)", "50", positive)?;

    println!();
    typewriter("Rates are entered in percent (5 means 5%).");
    let growth_pct = prompt_number("FCF growth rate during projection (%)", "5", any_number)?;

    let industry = prompt_with_default("Industry", "N/A")?;
    let industry = if industry == "N/A" { None } else { Some(industry) };

    // 2. Discount assumptions
    println!();
    typewriter("WACC discounts every projected cash flow. The terminal growth rate is the perpetual growth applied after the projection period.");
    typewriter("WACC must stay above the terminal growth rate, or the terminal value has no finite answer.");
    let (wacc_pct, terminal_pct) = loop {
        let wacc = prompt_number("WACC (%)", "8", any_number)?;
        let terminal = prompt_number("Terminal growth rate (%)", "2", any_number)?;
        if wacc > terminal {
            break (wacc, terminal);
        }
        println!("  Invalid: WACC must be greater than the terminal growth rate. Try again.");
    };

    let years = loop {
        let input = prompt_with_default("Projection years", "5")?;
        match input.parse::<u32>() {
            Ok(v) if (MIN_PROJECTION_YEARS..=MAX_PROJECTION_YEARS).contains(&v) => break v,
            _ => println!(
                "  Invalid: must be a whole number between {} and {}. Try again.",
                MIN_PROJECTION_YEARS, MAX_PROJECTION_YEARS
            ),
        }
    };

    // 3. Config path
    let default_config_path = match default_path {
        Some(p) => p,
        None => get_config_path()?,
    };
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    // Check if file already exists
    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 4. Write config
    let config = Config {
        name,
        company: Some(CompanyConfig {
            enterprise_value,
            debt,
            cash,
            shares_outstanding,
            last_fcf,
            growth_rate: growth_pct / 100.0,
            industry,
        }),
        statements: None,
        analysis: AnalysisConfig {
            wacc: wacc_pct / 100.0,
            terminal_growth_rate: terminal_pct / 100.0,
            years,
            ..AnalysisConfig::default()
        },
    };

    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    // Create parent directories
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!();
    println!("Config written to {}", config_path.display());
    typewriter("Add `sensitivity` or `scenarios` under `analysis` to customize the sweeps.");
    println!("Run `dcf-val` to get started.");

    Ok(())
}
