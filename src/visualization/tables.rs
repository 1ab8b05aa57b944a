use colored::Colorize;
use comfy_table::{
    modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, CellAlignment, Color, ContentArrangement,
    Table,
};

use crate::analysis::{DeviationSummary, Simulation};
use crate::models::{GrowthPhase, GrowthSeries};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn phase_cell_color(phase: GrowthPhase) -> Color {
    match phase {
        GrowthPhase::Lenta => Color::Blue,
        GrowthPhase::Acelerada => Color::Green,
        GrowthPhase::Saturacao => Color::Red,
    }
}

/// Format the solved curve parameters as a string.
pub fn format_parameter_summary(sim: &Simulation) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Curve Parameters".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(50)));

    let params = sim.parameters();
    let mut table = new_table();
    table.set_header(vec!["Parameter", "Value", "Unit"]);
    table.add_row(vec![
        Cell::new("Initial weight"),
        Cell::new(format!("{:.2}", sim.spec.initial_weight)),
        Cell::new("g"),
    ]);
    table.add_row(vec![
        Cell::new("Final weight"),
        Cell::new(format!("{:.2}", sim.spec.final_weight)),
        Cell::new("g"),
    ]);
    table.add_row(vec![
        Cell::new("Period"),
        Cell::new(sim.spec.period_days),
        Cell::new("days"),
    ]);
    table.add_row(vec![
        Cell::new("Carrying capacity (K)"),
        Cell::new(format!("{:.2}", params.carrying_capacity)),
        Cell::new("g"),
    ]);
    table.add_row(vec![
        Cell::new("Growth rate (r)"),
        Cell::new(format!("{:.4}", params.growth_rate)),
        Cell::new("1/day"),
    ]);
    table.add_row(vec![
        Cell::new("Inflection (t0)"),
        Cell::new(format!("{:.1}", params.inflection_time)),
        Cell::new("day"),
    ]);
    let converged = if sim.outcome.converged {
        Cell::new("yes").fg(Color::Green)
    } else {
        Cell::new("no").fg(Color::Yellow)
    };
    table.add_row(vec![
        Cell::new("Converged"),
        converged,
        Cell::new(format!("{} iterations", sim.outcome.iterations)),
    ]);

    output.push_str(&format!("{table}"));
    output
}

/// Print the solved curve parameters.
pub fn print_parameter_summary(sim: &Simulation) {
    print!("{}", format_parameter_summary(sim));
}

/// Format the day-by-day growth table as a string.
pub fn format_growth_table(series: &GrowthSeries) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Growth Records".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(70)));

    let mut table = new_table();
    table.set_header(vec![
        "Day",
        "Date",
        "Phase",
        "Predicted (g)",
        "Actual (g)",
        "Deviation (g)",
    ]);

    for rec in series {
        let actual = rec
            .actual_weight
            .map(|a| format!("{a:.2}"))
            .unwrap_or_default();
        let deviation = match rec.deviation() {
            Some(d) => {
                let color = if d < 0.0 { Color::Red } else { Color::Green };
                Cell::new(format!("{d:+.2}")).fg(color)
            }
            None => Cell::new(""),
        };
        table.add_row(vec![
            Cell::new(rec.day).set_alignment(CellAlignment::Right),
            Cell::new(rec.date.format("%d/%m/%Y")),
            Cell::new(rec.phase).fg(phase_cell_color(rec.phase)),
            Cell::new(format!("{:.2}", rec.predicted_weight)).set_alignment(CellAlignment::Right),
            Cell::new(actual).set_alignment(CellAlignment::Right),
            deviation.set_alignment(CellAlignment::Right),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the day-by-day growth table.
pub fn print_growth_table(series: &GrowthSeries) {
    print!("{}", format_growth_table(series));
}

/// Format the contiguous phase runs of a series as a string.
pub fn format_phase_table(series: &GrowthSeries) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Growth Phases".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(50)));

    let mut table = new_table();
    table.set_header(vec!["Phase", "Stage", "First Day", "Last Day", "Days", "First Date"]);
    for span in series.phase_spans() {
        let first_date = series
            .get(span.first_day)
            .map(|r| r.date.format("%d/%m/%Y").to_string())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(span.phase).fg(phase_cell_color(span.phase)),
            Cell::new(span.phase.english_name()),
            Cell::new(span.first_day),
            Cell::new(span.last_day),
            Cell::new(span.days()),
            Cell::new(first_date),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

pub fn print_phase_table(series: &GrowthSeries) {
    print!("{}", format_phase_table(series));
}

/// Format the real-versus-predicted summary as a string.
pub fn format_deviation_summary(summary: &DeviationSummary) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Actual vs Predicted".bold().green()));
    output.push_str(&format!(
        "{}\n",
        format!("Measured days: {}", summary.measured_days).dimmed()
    ));

    let mut table = new_table();
    table.set_header(vec!["Metric", "Value", "Unit"]);
    table.add_row(vec![
        Cell::new("Mean deviation"),
        Cell::new(format!("{:+.2}", summary.mean_deviation)),
        Cell::new("g"),
    ]);
    table.add_row(vec![
        Cell::new("Mean absolute deviation"),
        Cell::new(format!("{:.2}", summary.mean_absolute_deviation)),
        Cell::new("g"),
    ]);
    table.add_row(vec![
        Cell::new("RMSE"),
        Cell::new(format!("{:.2}", summary.rmse)),
        Cell::new("g"),
    ]);
    table.add_row(vec![
        Cell::new("Mean deviation"),
        Cell::new(format!("{:+.1}", summary.mean_percent_deviation)),
        Cell::new("%"),
    ]);
    if let Some(ci) = &summary.interval {
        table.add_row(vec![
            Cell::new(format!("{:.0}% CI", ci.confidence_level * 100.0)),
            Cell::new(format!("{:+.1} to {:+.1}", ci.lower, ci.upper)),
            Cell::new("%"),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

pub fn print_deviation_summary(summary: &DeviationSummary) {
    print!("{}", format_deviation_summary(summary));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{reconcile, ActualWeight, GrowthEngine};
    use crate::models::GrowthSpec;
    use chrono::NaiveDate;

    fn simulation() -> Simulation {
        let spec = GrowthSpec::new(5.0, 260.0, 35, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        GrowthEngine::default().simulate(&spec).unwrap()
    }

    #[test]
    fn test_parameter_summary() {
        let output = format_parameter_summary(&simulation());
        assert!(output.contains("Curve Parameters"));
        assert!(output.contains("Carrying capacity (K)"));
        assert!(output.contains("17.5"));
    }

    #[test]
    fn test_growth_table_rows() {
        let mut sim = simulation();
        reconcile(&mut sim.series, &[ActualWeight::new(2, 6.5)]).unwrap();
        let output = format_growth_table(&sim.series);
        assert!(output.contains("01/01/2025"));
        assert!(output.contains("04/02/2025"));
        assert!(output.contains("Saturação"));
        assert!(output.contains("6.50"));
    }

    #[test]
    fn test_phase_table() {
        let output = format_phase_table(&simulation().series);
        assert!(output.contains("Lenta"));
        assert!(output.contains("Acelerada"));
        assert!(output.contains("Saturação"));
        assert!(output.contains("lag"));
        assert!(output.contains("plateau"));
    }

    #[test]
    fn test_deviation_summary() {
        let mut sim = simulation();
        reconcile(
            &mut sim.series,
            &[ActualWeight::new(10, 30.0), ActualWeight::new(20, 170.0)],
        )
        .unwrap();
        let summary = DeviationSummary::compute(&sim.series, 0.95).unwrap().unwrap();
        let output = format_deviation_summary(&summary);
        assert!(output.contains("Measured days: 2"));
        assert!(output.contains("RMSE"));
        assert!(output.contains("95% CI"));
    }
}
