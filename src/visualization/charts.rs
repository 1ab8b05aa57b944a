use chrono::{Datelike, NaiveDate};
use colored::{Color, Colorize};

use crate::models::{GrowthPhase, GrowthSeries};

const MONTHS_PT: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

const BAR_WIDTH: usize = 40;

/// Short axis label such as `07/Mar` or `15/Fev`.
pub fn short_date_label(date: NaiveDate) -> String {
    format!("{:02}/{}", date.day(), MONTHS_PT[date.month0() as usize])
}

fn phase_color(phase: GrowthPhase) -> Color {
    match phase {
        GrowthPhase::Lenta => Color::Blue,
        GrowthPhase::Acelerada => Color::Green,
        GrowthPhase::Saturacao => Color::Red,
    }
}

/// Format a text chart of the predicted curve, one bar per day.
///
/// Bars are colored by phase and scaled to the carrying capacity (or the
/// largest measured weight, if higher). Measured days show the actual
/// weight after the bar, and the inflection day is marked.
pub fn format_growth_chart(series: &GrowthSeries, carrying_capacity: f64) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Growth Curve".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    if series.is_empty() {
        output.push_str("  No data available.\n");
        return output;
    }

    let scale = series
        .measured()
        .filter_map(|r| r.actual_weight)
        .fold(carrying_capacity, f64::max);
    let inflection = series.inflection_day(carrying_capacity);

    output.push_str(&format!(
        "  {:>4}  {:>6}  {:>9}  Curve\n",
        "Day", "Date", "Pred (g)"
    ));
    output.push_str(&format!("  {}\n", "-".repeat(70)));

    for rec in series {
        let bar_len = if scale > 0.0 && scale.is_finite() {
            ((rec.predicted_weight / scale) * BAR_WIDTH as f64)
                .round()
                .clamp(0.0, BAR_WIDTH as f64) as usize
        } else {
            0
        };
        let bar = "\u{2588}".repeat(bar_len).color(phase_color(rec.phase));
        let padding = " ".repeat(BAR_WIDTH - bar_len);

        let mut line = format!(
            "  {:>4}  {:>6}  {:>9.2}  {}{}",
            rec.day,
            short_date_label(rec.date),
            rec.predicted_weight,
            bar,
            padding
        );
        if let Some(actual) = rec.actual_weight {
            line.push_str(&format!("  {} {actual:.2}", "\u{25cf}".yellow()));
        }
        if Some(rec.day) == inflection {
            line.push_str(&format!("  {}", "\u{25c0} inflection".bold()));
        }
        output.push_str(&line);
        output.push('\n');
    }

    output.push_str(&format!(
        "\n  {} {}  {} {}  {} {}\n",
        "\u{2588}".color(phase_color(GrowthPhase::Lenta)),
        GrowthPhase::Lenta,
        "\u{2588}".color(phase_color(GrowthPhase::Acelerada)),
        GrowthPhase::Acelerada,
        "\u{2588}".color(phase_color(GrowthPhase::Saturacao)),
        GrowthPhase::Saturacao,
    ));
    output
}

/// Print a text chart of the predicted curve.
pub fn print_growth_chart(series: &GrowthSeries, carrying_capacity: f64) {
    print!("{}", format_growth_chart(series, carrying_capacity));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{reconcile, ActualWeight, GrowthEngine};
    use crate::models::GrowthSpec;

    #[test]
    fn test_short_date_label() {
        let d = |m, day| NaiveDate::from_ymd_opt(2025, m, day).unwrap();
        assert_eq!(short_date_label(d(3, 7)), "07/Mar");
        assert_eq!(short_date_label(d(2, 15)), "15/Fev");
        assert_eq!(short_date_label(d(12, 31)), "31/Dez");
        assert_eq!(short_date_label(d(5, 1)), "01/Mai");
    }

    #[test]
    fn test_chart_marks_inflection_and_actuals() {
        let spec = GrowthSpec::new(5.0, 260.0, 35, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let mut sim = GrowthEngine::default().simulate(&spec).unwrap();
        reconcile(&mut sim.series, &[ActualWeight::new(5, 12.34)]).unwrap();

        let output = format_growth_chart(&sim.series, sim.parameters().carrying_capacity);
        assert!(output.contains("Growth Curve"));
        assert!(output.contains("inflection"));
        assert!(output.contains("12.34"));
        assert!(output.contains("04/Fev"));
        assert_eq!(output.matches("inflection").count(), 1);
    }

    #[test]
    fn test_chart_empty_series() {
        let series = GrowthSeries::from_records(vec![]).unwrap();
        let output = format_growth_chart(&series, 100.0);
        assert!(output.contains("No data available."));
    }
}
