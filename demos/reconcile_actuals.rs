//! Reconciliation example: overlay weekly weighings onto a predicted curve,
//! summarize the deviation and export the result.
//!
//! Run from the project root:
//!   cargo run --example reconcile_actuals

use chrono::NaiveDate;

use hydro_growth::analysis::{reconcile, DeviationSummary, GrowthEngine};
use hydro_growth::io::{read_measurements_csv_from_bytes, resolve_measurements, CsvFormat, SeriesWriter};
use hydro_growth::models::GrowthSpec;
use hydro_growth::visualization::{print_deviation_summary, print_growth_table};

const WEIGHINGS: &str = "\
day,date,actual_weight
7,,9.8
,21/03/2025,31.0
21,,118.4
28,,221.5
";

fn main() {
    let planted = NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date");
    let spec = GrowthSpec::new(5.0, 260.0, 35, planted);
    let mut series = GrowthEngine::default()
        .simulate(&spec)
        .expect("valid spec")
        .series;

    let rows = read_measurements_csv_from_bytes(WEIGHINGS.as_bytes()).expect("Failed to parse weighings");
    let updates = resolve_measurements(&rows, &series).expect("weighings inside the period");
    let applied = reconcile(&mut series, &updates).expect("valid weighings");
    println!("Applied {applied} weighings");

    print_growth_table(&series);
    if let Some(summary) = DeviationSummary::compute(&series, 0.95).expect("valid confidence") {
        print_deviation_summary(&summary);
    }

    let out = std::env::temp_dir().join("reconciled_series.csv");
    CsvFormat.write(&series, &out).expect("Failed to write CSV");
    println!("\nWrote {}", out.display());
}
