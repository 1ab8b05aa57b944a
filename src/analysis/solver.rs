use serde::{Deserialize, Serialize};

use crate::error::GrowthError;
use crate::models::GrowthSpec;

/// Growth rate returned when no iteration ever produced a usable rate.
pub const FALLBACK_GROWTH_RATE: f64 = 0.1;

/// Relative change in the fitted final weight below which the fixed-point
/// correction is considered stalled.
const STALL_EPSILON: f64 = 1e-12;

/// Solved parameters of `f(t) = K / (1 + exp(-r * (t - t0)))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveParameters {
    /// Asymptotic upper bound K, in grams
    pub carrying_capacity: f64,
    /// Steepness r, per day
    pub growth_rate: f64,
    /// Day of maximum growth t0
    pub inflection_time: f64,
}

impl CurveParameters {
    /// Evaluate the logistic curve at day `t`.
    pub fn weight_at(&self, t: f64) -> f64 {
        self.carrying_capacity / (1.0 + (-self.growth_rate * (t - self.inflection_time)).exp())
    }
}

/// Result of a parameter search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverOutcome {
    pub parameters: CurveParameters,
    /// Whether the fitted final weight landed within tolerance
    pub converged: bool,
    /// Iterations spent
    pub iterations: u32,
}

/// Tuning knobs shared by the solver strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub strategy: SolverStrategy,
    /// Initial K as a multiple of the final weight
    pub headroom: f64,
    /// Factor applied to K when an iteration is numerically infeasible
    pub inflation: f64,
    /// Absolute tolerance on the fitted final weight, in grams
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            strategy: SolverStrategy::FixedPoint,
            headroom: 1.05,
            inflation: 1.1,
            tolerance: 0.01,
            max_iterations: 1000,
        }
    }
}

impl SolverSettings {
    pub fn validate(&self) -> Result<(), GrowthError> {
        if !(self.headroom.is_finite() && self.headroom > 0.0) {
            return Err(GrowthError::ConfigError(format!(
                "solver headroom must be positive, got {}",
                self.headroom
            )));
        }
        if !(self.inflation.is_finite() && self.inflation > 1.0) {
            return Err(GrowthError::ConfigError(format!(
                "solver inflation must be greater than 1, got {}",
                self.inflation
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(GrowthError::ConfigError(format!(
                "solver tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(GrowthError::ConfigError(
                "solver max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the solver selected by `strategy`.
    pub fn build(&self) -> Box<dyn ParameterSolver + Send + Sync> {
        match self.strategy {
            SolverStrategy::FixedPoint => Box::new(FixedPointSolver::new(self.clone())),
            SolverStrategy::Bisection => Box::new(BisectionSolver::new(self.clone())),
        }
    }
}

/// Available parameter search strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolverStrategy {
    /// Proportional rescaling of K until the curve lands on the final weight
    #[default]
    FixedPoint,
    /// Bracketed root search on K
    Bisection,
}

impl std::fmt::Display for SolverStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverStrategy::FixedPoint => write!(f, "fixed-point"),
            SolverStrategy::Bisection => write!(f, "bisection"),
        }
    }
}

impl std::str::FromStr for SolverStrategy {
    type Err = GrowthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed-point" | "fixed_point" | "fixedpoint" | "fp" => Ok(SolverStrategy::FixedPoint),
            "bisection" | "bisect" => Ok(SolverStrategy::Bisection),
            _ => Err(GrowthError::ParseError(format!(
                "Unknown solver strategy: '{s}'. Use fixed-point or bisection"
            ))),
        }
    }
}

/// Strategy seam for deriving logistic parameters from a spec.
///
/// Implementations never fail: infeasible inputs yield a best-effort curve
/// with `converged == false`. Callers validate the spec beforehand.
pub trait ParameterSolver {
    fn solve(&self, spec: &GrowthSpec) -> SolverOutcome;
}

/// Solve with the default fixed-point strategy and settings.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use hydro_growth::analysis::solve_logistic_parameters;
/// use hydro_growth::models::GrowthSpec;
///
/// let spec = GrowthSpec::new(5.0, 260.0, 35, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
/// let params = solve_logistic_parameters(&spec);
/// assert_eq!(params.inflection_time, 17.5);
/// assert!((params.weight_at(35.0) - 260.0).abs() < 0.01);
/// ```
pub fn solve_logistic_parameters(spec: &GrowthSpec) -> CurveParameters {
    FixedPointSolver::default().solve(spec).parameters
}

/// Rate that makes the curve pass through `initial_weight` at day 1.
fn rate_through_first_day(k: f64, initial_weight: f64, t0: f64) -> Option<f64> {
    let arg = k / initial_weight - 1.0;
    if arg <= 0.0 {
        return None;
    }
    let r = -arg.ln() / (1.0 - t0);
    r.is_finite().then_some(r)
}

/// Fixed-point iteration on the carrying capacity.
///
/// Starting from `K = final_weight * headroom`, each step derives `r` from
/// the day-1 constraint, evaluates the curve at the last day and rescales
/// `K` by `final_weight / f(T)`. Infeasible steps inflate `K` and retry.
#[derive(Debug, Clone, Default)]
pub struct FixedPointSolver {
    settings: SolverSettings,
}

impl FixedPointSolver {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }
}

impl ParameterSolver for FixedPointSolver {
    fn solve(&self, spec: &GrowthSpec) -> SolverOutcome {
        let p0 = spec.initial_weight;
        let pf = spec.final_weight;
        let period = f64::from(spec.period_days);
        let t0 = period / 2.0;
        let s = &self.settings;

        let mut k = pf * s.headroom;
        let mut last_good: Option<(f64, f64)> = None;
        let mut previous_fit: Option<f64> = None;
        let mut iterations = 0;

        for i in 0..s.max_iterations {
            iterations = i + 1;

            if k <= p0 {
                k = p0 * s.inflation;
                continue;
            }
            let Some(r) = rate_through_first_day(k, p0, t0) else {
                k *= s.inflation;
                continue;
            };
            let fit = k / (1.0 + (-r * (period - t0)).exp());
            if !fit.is_finite() || fit <= 0.0 {
                k *= s.inflation;
                continue;
            }

            // f(T) no longer responds to K (single-day periods pin f(T) to p0).
            if let Some(prev) = previous_fit {
                if (fit - prev).abs() <= STALL_EPSILON * prev.abs() {
                    break;
                }
            }

            last_good = Some((k, r));
            if (fit - pf).abs() < s.tolerance {
                tracing::debug!(iterations, k, r, "fixed-point solver converged");
                return SolverOutcome {
                    parameters: CurveParameters {
                        carrying_capacity: k,
                        growth_rate: r,
                        inflection_time: t0,
                    },
                    converged: true,
                    iterations,
                };
            }

            previous_fit = Some(fit);
            let next = k * pf / fit;
            if !next.is_finite() {
                break;
            }
            k = next;
        }

        let (k, r) = last_good.unwrap_or_else(|| (pf * s.headroom, FALLBACK_GROWTH_RATE));
        tracing::warn!(
            iterations,
            k,
            r,
            period_days = spec.period_days,
            "fixed-point solver did not converge, returning best-effort parameters"
        );
        SolverOutcome {
            parameters: CurveParameters {
                carrying_capacity: k,
                growth_rate: r,
                inflection_time: t0,
            },
            converged: false,
            iterations,
        }
    }
}

/// Bracketed bisection on the carrying capacity.
///
/// With `t0 = T / 2 > 1`, the day-1 constraint gives `f(T) = p0` at
/// `K = 2 * p0` and `f(T) -> K` as K grows, so a root of `f(T) - pf` is
/// bracketed once the upper bound overshoots. Periods of one or two days
/// have no such bracket and are delegated to [`FixedPointSolver`].
#[derive(Debug, Clone, Default)]
pub struct BisectionSolver {
    settings: SolverSettings,
}

impl BisectionSolver {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }

    fn fitted_final_weight(k: f64, p0: f64, period: f64, t0: f64) -> Option<(f64, f64)> {
        let r = rate_through_first_day(k, p0, t0)?;
        let fit = k / (1.0 + (-r * (period - t0)).exp());
        fit.is_finite().then_some((fit, r))
    }
}

impl ParameterSolver for BisectionSolver {
    fn solve(&self, spec: &GrowthSpec) -> SolverOutcome {
        if spec.period_days <= 2 {
            return FixedPointSolver::new(self.settings.clone()).solve(spec);
        }

        let p0 = spec.initial_weight;
        let pf = spec.final_weight;
        let period = f64::from(spec.period_days);
        let t0 = period / 2.0;
        let s = &self.settings;

        let mut lo = 2.0 * p0;
        let mut hi = (pf * s.headroom).max(lo * s.inflation);
        let mut iterations = 0;

        // Grow the upper bound until the curve overshoots the target.
        while iterations < s.max_iterations {
            match Self::fitted_final_weight(hi, p0, period, t0) {
                Some((fit, _)) if fit >= pf => break,
                _ => {
                    lo = hi;
                    hi *= 2.0;
                    iterations += 1;
                }
            }
            if !hi.is_finite() {
                break;
            }
        }

        let mut best: Option<(f64, f64)> = None;
        while iterations < s.max_iterations && hi.is_finite() {
            iterations += 1;
            let mid = lo + (hi - lo) / 2.0;
            let Some((fit, r)) = Self::fitted_final_weight(mid, p0, period, t0) else {
                lo = mid;
                continue;
            };
            best = Some((mid, r));
            if (fit - pf).abs() < s.tolerance {
                tracing::debug!(iterations, k = mid, r, bracket = hi - lo, "bisection solver converged");
                return SolverOutcome {
                    parameters: CurveParameters {
                        carrying_capacity: mid,
                        growth_rate: r,
                        inflection_time: t0,
                    },
                    converged: true,
                    iterations,
                };
            }
            if fit < pf {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo <= f64::EPSILON * hi {
                break;
            }
        }

        match best {
            Some((k, r)) => {
                tracing::warn!(iterations, k, r, "bisection solver did not converge");
                SolverOutcome {
                    parameters: CurveParameters {
                        carrying_capacity: k,
                        growth_rate: r,
                        inflection_time: t0,
                    },
                    converged: false,
                    iterations,
                }
            }
            None => FixedPointSolver::new(self.settings.clone()).solve(spec),
        }
    }
}
