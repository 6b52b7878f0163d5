use std::io::IsTerminal;
use owo_colors::OwoColorize;

use crate::valuation::{
    RateVariable, ScenarioOutcome, SensitivityAnalysis, ValuationSummary, Verdict,
};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Group the integer part with commas: 1234567.891 -> "1,234,567.89"
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Currency amount: "$1,234.56", "-$12.00"
pub fn format_money(value: f64, decimals: usize) -> String {
    let n = format_number(value, decimals);
    match n.strip_prefix('-') {
        Some(abs) => format!("-${}", abs),
        None => format!("${}", n),
    }
}

/// Decimal rate as percent: 0.0625 -> "6.25%"
pub fn format_rate(rate: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, rate * 100.0)
}

/// Decimal adjustment as signed percent: -0.005 -> "-0.50%"
pub fn format_adjustment(adjustment: f64, decimals: usize) -> String {
    format!("{:+.*}%", decimals, adjustment * 100.0)
}

/// Already-in-percent change: 12.345 -> "+12.3%"
pub fn format_change(percent: f64) -> String {
    format!("{:+.1}%", percent)
}

fn verdict_label(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Undervalued => "UNDERVALUED",
        Verdict::Overvalued => "OVERVALUED",
    }
}

/// Multi-line valuation summary with assumptions. `market_price` adds the
/// last traded price next to the EV-implied one.
pub fn format_summary(
    name: &str,
    industry: &str,
    summary: &ValuationSummary,
    market_price: Option<f64>,
    use_colors: bool,
) -> String {
    let heading = format!("DCF Valuation: {} ({})", name, industry);
    let verdict = verdict_label(summary.verdict);
    let verdict = if !use_colors {
        verdict.to_string()
    } else {
        match summary.verdict {
            Verdict::Undervalued => verdict.green().bold().to_string(),
            Verdict::Overvalued => verdict.red().bold().to_string(),
        }
    };
    let heading = if use_colors {
        heading.bold().to_string()
    } else {
        heading
    };

    let mut lines = vec![
        heading,
        String::new(),
        format!("  Intrinsic value / share:  {:>14}", format_money(summary.intrinsic_value, 2)),
        format!("  Current implied price:    {:>14}", format_money(summary.current_price, 2)),
    ];
    if let Some(price) = market_price {
        lines.push(format!("  Last traded price:        {:>14}", format_money(price, 2)));
    }
    lines.extend([
        format!("  Upside / downside:        {:>14}", format_change(summary.upside_percentage)),
        format!("  Verdict:                  {} by {}", verdict, format_money(summary.margin, 2)),
        String::new(),
        format!(
            "  Intrinsic enterprise value: {:>12}M",
            format_money(summary.intrinsic_enterprise_value, 0)
        ),
        format!(
            "  Terminal value (PV):        {:>12}M",
            format_money(summary.pv_terminal_value, 0)
        ),
        format!(
            "  Intrinsic equity value:     {:>12}M",
            format_money(summary.intrinsic_equity_value, 0)
        ),
        String::new(),
        format!("  FCF growth rate:          {:>8}", format_rate(summary.rates.growth_rate, 2)),
        format!("  WACC:                     {:>8}", format_rate(summary.rates.wacc, 2)),
        format!(
            "  Terminal growth rate:     {:>8}",
            format_rate(summary.rates.terminal_growth_rate, 2)
        ),
        format!("  Projection period:        {:>8}", format!("{}y", summary.years)),
    ]);
    lines.join("\n")
}

/// Year-by-year projection with present values and the terminal row.
pub fn format_cash_flow_table(summary: &ValuationSummary, use_colors: bool) -> String {
    if summary.cash_flows.is_empty() {
        return "No cash flows projected.".to_string();
    }

    let header = format!("{:<10} {:>18} {:>18}", "Year", "Projected FCF", "Present Value");
    let mut lines = vec![if use_colors {
        header.bold().to_string()
    } else {
        header
    }];

    for row in &summary.cash_flows {
        lines.push(format!(
            "{:<10} {:>18} {:>18}",
            format!("Year {}", row.year),
            format!("{}M", format_money(row.fcf, 1)),
            format!("{}M", format_money(row.present_value, 1)),
        ));
    }

    let terminal = format!(
        "{:<10} {:>18} {:>18}",
        "Terminal",
        format!("{}M", format_money(summary.terminal_value, 1)),
        format!("{}M", format_money(summary.pv_terminal_value, 1)),
    );
    lines.push(if use_colors {
        terminal.dimmed().to_string()
    } else {
        terminal
    });

    lines.join("\n")
}

fn adjustment_decimals(variable: RateVariable) -> usize {
    match variable {
        RateVariable::TerminalGrowthRate => 2,
        _ => 1,
    }
}

/// One row per sweep point, grouped by variable.
pub fn format_sensitivity_table(analysis: &SensitivityAnalysis, use_colors: bool) -> String {
    if analysis.is_empty() {
        return "No sensitivity ranges configured.".to_string();
    }

    let header = format!(
        "{:<16} {:>11} {:>16} {:>10}",
        "Variable", "Adjustment", "Intrinsic Value", "% Change"
    );
    let mut lines = vec![if use_colors {
        header.bold().to_string()
    } else {
        header
    }];

    for entry in &analysis.variables {
        for point in &entry.points {
            let change = format!("{:>10}", format_change(point.percentage_change));
            let change = if !use_colors {
                change
            } else if point.percentage_change > 0.0 {
                change.green().to_string()
            } else if point.percentage_change < 0.0 {
                change.red().to_string()
            } else {
                change
            };
            lines.push(format!(
                "{:<16} {:>11} {:>16} {}",
                entry.variable.label(),
                format_adjustment(point.adjustment, adjustment_decimals(entry.variable)),
                format_money(point.intrinsic_value, 2),
                change
            ));
        }
    }

    lines.join("\n")
}

/// One row per scenario with the rates it was valued at.
pub fn format_scenario_table(outcomes: &[ScenarioOutcome], use_colors: bool) -> String {
    if outcomes.is_empty() {
        return "No scenarios configured.".to_string();
    }

    let header = format!(
        "{:<12} {:>16} {:>10} {:>8} {:>8} {:>9}",
        "Scenario", "Intrinsic Value", "Upside", "Growth", "WACC", "Terminal"
    );
    let mut lines = vec![if use_colors {
        header.bold().to_string()
    } else {
        header
    }];

    for outcome in outcomes {
        let rates = format!(
            "{:>8} {:>8} {:>9}",
            format_rate(outcome.growth_rate, 1),
            format_rate(outcome.wacc, 1),
            format_rate(outcome.terminal_growth_rate, 1)
        );
        let line = match &outcome.error {
            Some(_) => {
                let value = format!("{:>16} {:>10}", "ERROR", "n/a");
                let value = if use_colors {
                    value.red().to_string()
                } else {
                    value
                };
                format!("{:<12} {} {}", outcome.name, value, rates)
            }
            None => format!(
                "{:<12} {:>16} {:>10} {}",
                outcome.name,
                format_money(outcome.intrinsic_value, 2),
                format_change(outcome.upside_percentage),
                rates
            ),
        };
        lines.push(line);
    }

    let errors: Vec<_> = outcomes
        .iter()
        .filter_map(|o| o.error.as_ref().map(|e| format!("  {}: {}", o.name, e)))
        .collect();
    if !errors.is_empty() {
        lines.push(String::new());
        lines.extend(errors);
    }

    lines.join("\n")
}

/// Cash flows as tab-separated values: year, fcf, present_value
pub fn format_cash_flows_tsv(summary: &ValuationSummary) -> String {
    summary
        .cash_flows
        .iter()
        .map(|row| format!("{}\t{:.4}\t{:.4}", row.year, row.fcf, row.present_value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sensitivity points as tab-separated values:
/// variable, adjustment, intrinsic_value, percentage_change
pub fn format_sensitivity_tsv(analysis: &SensitivityAnalysis) -> String {
    analysis
        .variables
        .iter()
        .flat_map(|entry| {
            entry.points.iter().map(move |p| {
                format!(
                    "{}\t{}\t{:.4}\t{:.4}",
                    entry.variable.key(),
                    p.adjustment,
                    p.intrinsic_value,
                    p.percentage_change
                )
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Scenario outcomes as tab-separated values:
/// name, intrinsic_value, upside_percentage, growth_rate, wacc, terminal_growth_rate
pub fn format_scenarios_tsv(outcomes: &[ScenarioOutcome]) -> String {
    outcomes
        .iter()
        .map(|o| {
            format!(
                "{}\t{:.4}\t{:.4}\t{}\t{}\t{}",
                o.name,
                o.intrinsic_value,
                o.upside_percentage,
                o.growth_rate,
                o.wacc,
                o.terminal_growth_rate
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::{ValuationEngine, ValuationParameters};

    fn sample_engine() -> ValuationEngine {
        ValuationEngine::new(ValuationParameters {
            enterprise_value: 1000.0,
            debt: 200.0,
            cash: 100.0,
            shares_outstanding: 10.0,
            last_fcf: 50.0,
            growth_rate: 0.05,
            wacc: 0.08,
            terminal_growth_rate: 0.02,
            industry: "Technology".to_string(),
        })
    }

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1,000");
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-98765.4, 1), "-98,765.4");
    }

    #[test]
    fn test_format_number_negative_rounds_to_zero() {
        assert_eq!(format_number(-0.001, 2), "0.00");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(90.0, 2), "$90.00");
        assert_eq!(format_money(-1500.0, 0), "-$1,500");
    }

    #[test]
    fn test_format_rates() {
        assert_eq!(format_rate(0.0625, 2), "6.25%");
        assert_eq!(format_rate(0.08, 1), "8.0%");
        assert_eq!(format_adjustment(-0.005, 2), "-0.50%");
        assert_eq!(format_adjustment(0.01, 1), "+1.0%");
        assert_eq!(format_adjustment(0.0, 1), "+0.0%");
        assert_eq!(format_change(12.345), "+12.3%");
        assert_eq!(format_change(-100.0), "-100.0%");
    }

    #[test]
    fn test_format_summary_plain() {
        let engine = sample_engine();
        let summary = engine.summarize(3).unwrap();
        let text = format_summary("ACME", "Technology", &summary, None, false);

        assert!(text.contains("DCF Valuation: ACME (Technology)"));
        assert!(!text.contains("Last traded price:"));
        assert!(text.contains("Current implied price:"));
        assert!(text.contains("$90.00"));
        assert!(text.contains("WACC:"));
        assert!(text.contains("8.00%"));
        assert!(text.contains("3y"));
        assert!(text.contains("OVERVALUED") || text.contains("UNDERVALUED"));
    }

    #[test]
    fn test_format_summary_market_price() {
        let summary = sample_engine().summarize(3).unwrap();
        let text = format_summary("ACME", "Technology", &summary, Some(87.25), false);

        let line = text
            .lines()
            .find(|l| l.contains("Last traded price:"))
            .unwrap();
        assert!(line.contains("$87.25"));
    }

    #[test]
    fn test_format_cash_flow_table() {
        let summary = sample_engine().summarize(3).unwrap();
        let text = format_cash_flow_table(&summary, false);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 5); // header + 3 years + terminal
        assert!(lines[1].contains("Year 1"));
        assert!(lines[1].contains("$52.5M"));
        assert!(lines[4].starts_with("Terminal"));
        assert!(lines[4].contains("$984.0M"));
    }

    #[test]
    fn test_format_cash_flow_table_empty() {
        let summary = sample_engine().summarize(0).unwrap();
        assert_eq!(format_cash_flow_table(&summary, false), "No cash flows projected.");
    }

    #[test]
    fn test_format_sensitivity_table() {
        let analysis = sample_engine().sensitivity_analysis(5, None).unwrap();
        let text = format_sensitivity_table(&analysis, false);

        assert_eq!(text.lines().count(), 16); // header + 15 points
        assert!(text.contains("FCF Growth Rate"));
        assert!(text.contains("-2.0%"));
        assert!(text.contains("+0.25%"));
        assert!(text.contains("+0.0%"));
    }

    #[test]
    fn test_format_scenario_table_with_error() {
        let mut engine_params = sample_engine().params().clone();
        engine_params.wacc = 0.01;
        let outcomes = ValuationEngine::new(engine_params).scenario_analysis(5);
        let text = format_scenario_table(&outcomes, false);

        assert!(text.contains("Bear Case"));
        assert!(text.contains("ERROR"));
        assert!(text.contains("Base Case: invalid parameters"));
    }

    #[test]
    fn test_format_scenario_table_order() {
        let outcomes = sample_engine().scenario_analysis(5);
        let text = format_scenario_table(&outcomes, false);
        let bear = text.find("Bear Case").unwrap();
        let base = text.find("Base Case").unwrap();
        let bull = text.find("Bull Case").unwrap();
        assert!(bear < base && base < bull);
        assert!(!text.contains("ERROR"));
    }

    #[test]
    fn test_tsv_outputs() {
        let engine = sample_engine();
        let summary = engine.summarize(3).unwrap();
        let tsv = format_cash_flows_tsv(&summary);
        assert_eq!(tsv.lines().next().unwrap(), "1\t52.5000\t48.6111");

        let analysis = engine.sensitivity_analysis(5, None).unwrap();
        let tsv = format_sensitivity_tsv(&analysis);
        assert_eq!(tsv.lines().count(), 15);
        assert!(tsv.lines().next().unwrap().starts_with("growth_rate\t-0.02\t"));

        let tsv = format_scenarios_tsv(&engine.scenario_analysis(5));
        assert_eq!(tsv.lines().count(), 3);
        assert!(tsv.starts_with("Bear Case\t"));
    }
}
