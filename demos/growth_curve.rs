//! Growth curve example: simulate a lettuce crop and display it.
//!
//! Run from the project root:
//!   cargo run --example growth_curve

use chrono::NaiveDate;

use hydro_growth::analysis::{GrowthEngine, SolverSettings, SolverStrategy};
use hydro_growth::models::GrowthSpec;
use hydro_growth::visualization::{
    print_growth_chart, print_growth_table, print_parameter_summary, print_phase_table,
};

fn main() {
    let planted = NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date");
    let spec = GrowthSpec::new(5.0, 260.0, 35, planted);

    let engine = GrowthEngine::default();
    let sim = engine.simulate(&spec).expect("valid spec");

    print_parameter_summary(&sim);
    print_phase_table(&sim.series);
    print_growth_table(&sim.series);
    print_growth_chart(&sim.series, sim.parameters().carrying_capacity);

    // Same crop through the bracketed solver
    let bisection = GrowthEngine::new(SolverSettings {
        strategy: SolverStrategy::Bisection,
        ..SolverSettings::default()
    });
    let other = bisection.simulate(&spec).expect("valid spec");
    println!(
        "\nK fixed-point = {:.3} g, K bisection = {:.3} g ({} vs {} iterations)",
        sim.parameters().carrying_capacity,
        other.parameters().carrying_capacity,
        sim.outcome.iterations,
        other.outcome.iterations
    );
}
