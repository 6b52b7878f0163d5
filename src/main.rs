use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use dcf_val::config::Config;
use dcf_val::valuation::{self, ValuationEngine, ValuationError};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_VALUATION: i32 = 3;
const EXIT_CONFIG: i32 = 4;
const EXIT_IO: i32 = 5;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Table,
    Tsv,
    Json,
}

/// Overrides for the assumptions in the config file. Rates are in percent.
#[derive(Args, Debug, Clone, Default)]
struct Assumptions {
    /// Discount rate in percent (e.g. 8.5)
    #[arg(long)]
    wacc: Option<f64>,

    /// Perpetual growth rate after the projection period, in percent
    #[arg(long)]
    terminal_growth: Option<f64>,

    /// FCF growth rate during the projection period, in percent
    #[arg(long)]
    growth: Option<f64>,

    /// Projection horizon in years (1-10)
    #[arg(long)]
    years: Option<u32>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Intrinsic value summary and cash flow table (default if no subcommand)
    Value(Assumptions),
    /// One-at-a-time sensitivity of the value to each rate
    Sensitivity(Assumptions),
    /// Bear/Base/Bull (or configured) scenarios
    Scenarios(Assumptions),
    /// Summary, cash flows, sensitivity and scenarios
    All(Assumptions),
    /// Write the full analysis as a JSON report
    Export {
        /// Destination file
        path: PathBuf,
        #[command(flatten)]
        assumptions: Assumptions,
    },
    /// Create a config file interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "dcf-val")]
#[command(about = "Discounted cash flow valuation CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/dcf-val/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Apply CLI overrides on top of the config file.
fn apply_overrides(config: &mut Config, assumptions: &Assumptions) {
    if let Some(wacc) = assumptions.wacc {
        config.analysis.wacc = wacc / 100.0;
    }
    if let Some(terminal) = assumptions.terminal_growth {
        config.analysis.terminal_growth_rate = terminal / 100.0;
    }
    if let Some(years) = assumptions.years {
        config.analysis.years = years;
    }
}

fn valuation_failed(e: ValuationError) -> ! {
    eprintln!("Valuation error: {}", e);
    std::process::exit(EXIT_VALUATION);
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize output: {}", e);
            std::process::exit(EXIT_IO);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    dcf_val::logging::init_logging(cli.verbose);

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Value(Assumptions::default()));
    let config_path = cli.config.map(PathBuf::from);

    if let Commands::Init = command {
        if let Err(e) = dcf_val::config::init::run_init_wizard(config_path) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Load config
    let mut config = match dcf_val::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let assumptions = match &command {
        Commands::Value(a) | Commands::Sensitivity(a) | Commands::Scenarios(a) | Commands::All(a) => {
            a.clone()
        }
        Commands::Export { assumptions, .. } => assumptions.clone(),
        Commands::Init => Assumptions::default(),
    };
    apply_overrides(&mut config, &assumptions);

    let mut params = match config.parameters() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    if let Some(growth) = assumptions.growth {
        params.growth_rate = growth / 100.0;
    }

    let years = config.analysis.years;
    let ranges = config.analysis.sensitivity.as_deref();
    let scenarios = config.analysis.scenarios.as_deref();

    // Validate inputs before valuing
    if let Err(errors) = valuation::validate_inputs(&params, years, ranges, scenarios) {
        eprintln!("Input errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    if valuation::growth_out_of_band(params.growth_rate) {
        tracing::warn!(
            growth_rate = params.growth_rate,
            "growth rate is outside the usual 1%-20% band"
        );
    }

    tracing::debug!(
        name = config.display_name(),
        industry = %params.industry,
        years,
        wacc = params.wacc,
        terminal_growth_rate = params.terminal_growth_rate,
        growth_rate = params.growth_rate,
        "valuing"
    );

    let name = config.display_name().to_string();
    let market_price = config.market_price();
    let engine = ValuationEngine::new(params);
    let use_colors = !cli.no_color && dcf_val::output::should_use_colors();
    let format = assumptions.format;

    match command {
        Commands::Value(_) => {
            let summary = engine.summarize(years).unwrap_or_else(|e| valuation_failed(e));
            match format {
                OutputFormat::Json => print_json(&summary),
                OutputFormat::Tsv => println!("{}", dcf_val::output::format_cash_flows_tsv(&summary)),
                OutputFormat::Table => {
                    println!(
                        "{}",
                        dcf_val::output::format_summary(&name, &engine.params().industry, &summary, market_price, use_colors)
                    );
                    println!();
                    println!("{}", dcf_val::output::format_cash_flow_table(&summary, use_colors));
                }
            }
        }
        Commands::Sensitivity(_) => {
            let analysis = engine
                .sensitivity_analysis(years, ranges)
                .unwrap_or_else(|e| valuation_failed(e));
            match format {
                OutputFormat::Json => print_json(&analysis),
                OutputFormat::Tsv => println!("{}", dcf_val::output::format_sensitivity_tsv(&analysis)),
                OutputFormat::Table => {
                    println!("{}", dcf_val::output::format_sensitivity_table(&analysis, use_colors))
                }
            }
        }
        Commands::Scenarios(_) => {
            let outcomes = match scenarios {
                Some(s) => engine.scenario_analysis_with(years, s),
                None => engine.scenario_analysis(years),
            };
            match format {
                OutputFormat::Json => print_json(&outcomes),
                OutputFormat::Tsv => println!("{}", dcf_val::output::format_scenarios_tsv(&outcomes)),
                OutputFormat::Table => {
                    println!("{}", dcf_val::output::format_scenario_table(&outcomes, use_colors))
                }
            }
        }
        Commands::All(_) => {
            let report = dcf_val::report::build_report(&name, market_price, &engine, years, ranges, scenarios)
                .unwrap_or_else(|e| valuation_failed(e));
            match format {
                OutputFormat::Json => print_json(&report),
                OutputFormat::Tsv => {
                    println!("{}", dcf_val::output::format_cash_flows_tsv(&report.summary));
                    println!();
                    println!("{}", dcf_val::output::format_sensitivity_tsv(&report.sensitivity));
                    println!();
                    println!("{}", dcf_val::output::format_scenarios_tsv(&report.scenarios));
                }
                OutputFormat::Table => {
                    println!(
                        "{}",
                        dcf_val::output::format_summary(&name, &report.industry, &report.summary, report.market_price, use_colors)
                    );
                    println!();
                    println!("{}", dcf_val::output::format_cash_flow_table(&report.summary, use_colors));
                    println!();
                    println!("{}", dcf_val::output::format_sensitivity_table(&report.sensitivity, use_colors));
                    println!();
                    println!("{}", dcf_val::output::format_scenario_table(&report.scenarios, use_colors));
                }
            }
        }
        Commands::Export { path, .. } => {
            let report = dcf_val::report::build_report(&name, market_price, &engine, years, ranges, scenarios)
                .unwrap_or_else(|e| valuation_failed(e));
            if let Err(e) = dcf_val::report::save_report(&path, &report) {
                eprintln!("Export failed: {:#}", e);
                std::process::exit(EXIT_IO);
            }
            println!("Report written to {}", path.display());
        }
        Commands::Init => unreachable!("init handled before config load"),
    }

    std::process::exit(EXIT_SUCCESS);
}
