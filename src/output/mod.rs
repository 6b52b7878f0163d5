pub mod formatter;

pub use formatter::{
    format_adjustment, format_cash_flow_table, format_cash_flows_tsv, format_change,
    format_money, format_number, format_rate, format_scenario_table, format_scenarios_tsv,
    format_sensitivity_table, format_sensitivity_tsv, format_summary, should_use_colors,
};
