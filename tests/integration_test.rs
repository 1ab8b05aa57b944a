use assert_approx_eq::assert_approx_eq;
use chrono::NaiveDate;
use proptest::prelude::*;

use hydro_growth::{
    analysis::{
        classify_phase, generate_series, reconcile, solve_logistic_parameters, ActualWeight,
        BisectionSolver, DeviationSummary, FixedPointSolver, GrowthEngine, ParameterSolver,
        SolverSettings, SolverStrategy,
    },
    error::GrowthError,
    io,
    models::{GrowthPhase, GrowthSeries, GrowthSpec},
};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn lettuce() -> GrowthSpec {
    GrowthSpec::new(5.0, 260.0, 35, start())
}

fn simulate(spec: &GrowthSpec) -> GrowthSeries {
    GrowthEngine::default().simulate(spec).unwrap().series
}

// ============================================================================
// End-to-end scenario
// ============================================================================

#[test]
fn test_lettuce_end_to_end() {
    let series = simulate(&lettuce());

    assert_eq!(series.len(), 35);
    assert_approx_eq!(series.get(1).unwrap().predicted_weight, 5.0, 0.01);
    assert_approx_eq!(series.get(35).unwrap().predicted_weight, 260.0, 0.01);
    assert_eq!(series.get(18).unwrap().phase, GrowthPhase::Acelerada);
    assert_eq!(series.get(1).unwrap().phase, GrowthPhase::Lenta);
    assert_eq!(series.get(35).unwrap().phase, GrowthPhase::Saturacao);
    assert_eq!(series.get(35).unwrap().date, NaiveDate::from_ymd_opt(2025, 2, 4).unwrap());
    assert!(series.iter().all(|r| r.actual_weight.is_none()));
}

#[test]
fn test_lettuce_parameters() {
    let params = solve_logistic_parameters(&lettuce());
    assert_eq!(params.inflection_time, 17.5);
    assert!(params.carrying_capacity > 260.0 && params.carrying_capacity < 270.0);
    assert!(params.growth_rate > 0.2 && params.growth_rate < 0.3);
}

#[test]
fn test_inflection_day_near_midpoint() {
    let sim = GrowthEngine::default().simulate(&lettuce()).unwrap();
    let day = sim
        .series
        .inflection_day(sim.parameters().carrying_capacity)
        .unwrap();
    assert!(day == 17 || day == 18);
}

#[test]
fn test_phase_spans_cover_series() {
    let series = simulate(&lettuce());
    let spans = series.phase_spans();
    assert_eq!(spans.len(), 3);
    assert_eq!(spans[0].first_day, 1);
    assert_eq!(spans[2].last_day, 35);
    assert_eq!(spans.iter().map(|s| s.days()).sum::<u32>(), 35);
}

// ============================================================================
// Phase boundaries
// ============================================================================

#[test]
fn test_phase_boundaries_exact() {
    assert_eq!(classify_phase(10.0, 100.0), GrowthPhase::Acelerada);
    assert_eq!(classify_phase(90.0, 100.0), GrowthPhase::Acelerada);
    assert_eq!(classify_phase(9.999, 100.0), GrowthPhase::Lenta);
    assert_eq!(classify_phase(90.001, 100.0), GrowthPhase::Saturacao);
}

// ============================================================================
// Degenerate and invalid specs
// ============================================================================

#[test]
fn test_single_day_period() {
    let spec = GrowthSpec::new(5.0, 260.0, 1, start());
    let sim = GrowthEngine::default().simulate(&spec).unwrap();
    assert_eq!(sim.series.len(), 1);
    assert!(!sim.outcome.converged);
    assert!(sim.outcome.iterations < 1000);
    assert_approx_eq!(sim.series.get(1).unwrap().predicted_weight, 5.0, 1e-6);
}

#[test]
fn test_two_day_period() {
    let spec = GrowthSpec::new(5.0, 260.0, 2, start());
    let sim = GrowthEngine::default().simulate(&spec).unwrap();
    assert_eq!(sim.series.len(), 2);
    assert!(sim.series.iter().all(|r| r.predicted_weight.is_finite()));
    assert!(sim.series.get(2).unwrap().predicted_weight >= sim.series.get(1).unwrap().predicted_weight);
}

#[test]
fn test_invalid_specs_fail_up_front() {
    let engine = GrowthEngine::default();
    let cases = [
        GrowthSpec::new(5.0, 260.0, 0, start()),
        GrowthSpec::new(260.0, 260.0, 35, start()),
        GrowthSpec::new(300.0, 260.0, 35, start()),
        GrowthSpec::new(0.0, 260.0, 35, start()),
        GrowthSpec::new(5.0, f64::NAN, 35, start()),
    ];
    for spec in cases {
        assert!(
            matches!(engine.simulate(&spec), Err(GrowthError::InvalidSpec(_))),
            "expected InvalidSpec for {spec:?}"
        );
    }
}

#[test]
fn test_bisection_handles_small_ratio() {
    // Harvest barely above transplant weight: the bracketed search still lands on it.
    let spec = GrowthSpec::new(10.0, 15.0, 3, start());
    let outcome = BisectionSolver::default().solve(&spec);
    assert!(outcome.converged);
    assert_approx_eq!(outcome.parameters.weight_at(3.0), 15.0, 0.01);
    assert_approx_eq!(outcome.parameters.weight_at(1.0), 10.0, 1e-6);
}

// ============================================================================
// Reconciliation
// ============================================================================

#[test]
fn test_reconcile_and_summarize() {
    let mut series = simulate(&lettuce());
    let predicted_10 = series.get(10).unwrap().predicted_weight;
    let predicted_20 = series.get(20).unwrap().predicted_weight;

    reconcile(
        &mut series,
        &[
            ActualWeight::new(10, predicted_10 * 1.1),
            ActualWeight::new(20, predicted_20 * 0.9),
        ],
    )
    .unwrap();

    let summary = DeviationSummary::compute(&series, 0.95).unwrap().unwrap();
    assert_eq!(summary.measured_days, 2);
    assert_approx_eq!(summary.mean_percent_deviation, 0.0, 1e-9);
    assert!(summary.interval.is_some());
}

#[test]
fn test_reconcile_rejects_unknown_day() {
    let mut series = simulate(&lettuce());
    let err = reconcile(&mut series, &[ActualWeight::new(99, 1.0)]).unwrap_err();
    assert_eq!(err.to_string(), "Day 99 is outside the series (1..=35)");
}

// ============================================================================
// I/O pipeline
// ============================================================================

#[test]
fn test_csv_json_excel_pipeline() {
    let mut series = simulate(&lettuce());
    reconcile(&mut series, &[ActualWeight::new(7, 14.5)]).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("series.csv");
    let json_path = dir.path().join("series.json");
    let xlsx_path = dir.path().join("series.xlsx");

    io::write_csv(&series, &csv_path).unwrap();
    let from_csv = io::read_csv(&csv_path).unwrap();
    io::write_json(&from_csv, &json_path, false).unwrap();
    let from_json = io::read_json(&json_path).unwrap();
    io::write_excel(&from_json, &xlsx_path).unwrap();
    let from_excel = io::read_excel(&xlsx_path).unwrap();

    assert_eq!(from_csv, series);
    assert_eq!(from_json, series);
    assert_eq!(from_excel.len(), 35);
    assert_eq!(from_excel.get(7).unwrap().actual_weight, Some(14.5));
}

#[test]
fn test_measurement_import_into_series() {
    let mut series = simulate(&lettuce());
    let rows = io::read_measurements_csv_from_bytes(
        b"date,actual_weight\n2025-01-05,8.0\n06/01/2025,9.5\n",
    )
    .unwrap();
    let updates = io::resolve_measurements(&rows, &series).unwrap();
    reconcile(&mut series, &updates).unwrap();
    assert_eq!(series.get(5).unwrap().actual_weight, Some(8.0));
    assert_eq!(series.get(6).unwrap().actual_weight, Some(9.5));
}

// ============================================================================
// Persistence
// ============================================================================

#[cfg(feature = "store")]
#[test]
fn test_store_roundtrip_with_actuals() {
    use hydro_growth::store::{GrowthStore, SeriesKey};

    let store = GrowthStore::open_in_memory().unwrap();
    let engine = GrowthEngine::default();
    let key = SeriesKey {
        bench_id: 3,
        cultivar_id: 1,
        planting_date: start(),
    };

    let mut series = store
        .load_or_generate(&key, &lettuce(), &engine)
        .unwrap()
        .into_series();
    reconcile(&mut series, &[ActualWeight::new(12, 40.123)]).unwrap();
    store.upsert_series(&key, &series).unwrap();

    let loaded = store.load_series(&key).unwrap().unwrap();
    assert_eq!(loaded.get(12).unwrap().actual_weight, Some(40.12));
    for (stored, original) in loaded.iter().zip(series.iter()) {
        assert_eq!(stored.phase, original.phase);
        assert_approx_eq!(stored.predicted_weight, original.predicted_weight, 0.0051);
    }
}

// ============================================================================
// Properties
// ============================================================================

fn realistic_spec() -> impl Strategy<Value = GrowthSpec> {
    (1.0f64..20.0, 3.0f64..100.0, 10u32..120).prop_map(|(initial, ratio, days)| {
        GrowthSpec::new(initial, initial * ratio, days, start())
    })
}

proptest! {
    #[test]
    fn prop_predicted_weight_is_monotonic(spec in realistic_spec()) {
        let series = simulate(&spec);
        for pair in series.records().windows(2) {
            prop_assert!(pair[1].predicted_weight >= pair[0].predicted_weight);
        }
    }

    #[test]
    fn prop_curve_hits_both_endpoints(spec in realistic_spec()) {
        let sim = GrowthEngine::default().simulate(&spec).unwrap();
        prop_assert!(sim.outcome.converged);
        prop_assert_eq!(sim.series.len(), spec.period_days as usize);
        let first = sim.series.get(1).unwrap().predicted_weight;
        let last = sim.series.last().unwrap().predicted_weight;
        prop_assert!((first - spec.initial_weight).abs() < 1e-6);
        prop_assert!((last - spec.final_weight).abs() < 0.01);
        prop_assert!(sim.parameters().carrying_capacity > spec.initial_weight);
    }

    #[test]
    fn prop_phases_never_regress(spec in realistic_spec()) {
        let series = simulate(&spec);
        for pair in series.records().windows(2) {
            prop_assert!(pair[1].phase.id() >= pair[0].phase.id());
        }
    }

    #[test]
    fn prop_simulation_is_idempotent(spec in realistic_spec()) {
        let params_a = solve_logistic_parameters(&spec);
        let params_b = solve_logistic_parameters(&spec);
        prop_assert_eq!(params_a, params_b);
        prop_assert_eq!(generate_series(&spec, &params_a), generate_series(&spec, &params_b));
    }

    #[test]
    fn prop_reconcile_never_touches_predictions(
        spec in realistic_spec(),
        measurements in proptest::collection::vec((1u32..200, 0.0f64..2000.0), 0..20),
    ) {
        let original = simulate(&spec);
        let mut merged = original.clone();
        let actuals: Vec<ActualWeight> = measurements
            .into_iter()
            .filter(|(day, _)| *day <= spec.period_days)
            .map(|(day, w)| ActualWeight::new(day, w))
            .collect();
        reconcile(&mut merged, &actuals).unwrap();

        for (a, b) in original.iter().zip(merged.iter()) {
            prop_assert_eq!(a.predicted_weight, b.predicted_weight);
            prop_assert_eq!(a.phase, b.phase);
            prop_assert_eq!(a.date, b.date);
        }
        for actual in &actuals {
            prop_assert!(merged.get(actual.day).unwrap().actual_weight.is_some());
        }
    }

    #[test]
    fn prop_strategies_agree(spec in realistic_spec()) {
        let fixed = FixedPointSolver::default().solve(&spec);
        let bisect = SolverSettings {
            strategy: SolverStrategy::Bisection,
            ..SolverSettings::default()
        }
        .build()
        .solve(&spec);
        let t = f64::from(spec.period_days);
        prop_assert!(bisect.converged);
        prop_assert!((fixed.parameters.weight_at(t) - bisect.parameters.weight_at(t)).abs() < 0.02);
    }
}
