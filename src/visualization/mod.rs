mod charts;
mod tables;

pub use charts::{format_growth_chart, print_growth_chart, short_date_label};
pub use tables::{
    format_deviation_summary, format_growth_table, format_parameter_summary, format_phase_table,
    print_deviation_summary, print_growth_table, print_parameter_summary, print_phase_table,
};
