mod curve;
mod deviation;
mod engine;
mod phase;
mod reconcile;
mod solver;

pub use curve::generate_series;
pub use deviation::{DeviationInterval, DeviationSummary};
pub use engine::{GrowthEngine, Simulation};
pub use phase::{classify_phase, LAG_PHASE_CEILING, SATURATION_FLOOR};
pub use reconcile::{reconcile, ActualWeight};
pub use solver::{
    solve_logistic_parameters, BisectionSolver, CurveParameters, FixedPointSolver,
    ParameterSolver, SolverOutcome, SolverSettings, SolverStrategy, FALLBACK_GROWTH_RATE,
};
