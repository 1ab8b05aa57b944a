use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;

use crate::analysis::{
    generate_series, CurveParameters, ParameterSolver, SolverOutcome, SolverSettings,
};
use crate::error::GrowthError;
use crate::models::{GrowthSeries, GrowthSpec, SpecKey};

/// Result of one simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct Simulation {
    pub spec: GrowthSpec,
    pub outcome: SolverOutcome,
    pub series: GrowthSeries,
}

impl Simulation {
    pub fn parameters(&self) -> &CurveParameters {
        &self.outcome.parameters
    }
}

/// Unified API that validates a spec, solves its curve and generates the series.
///
/// Engines are stateless unless built with [`GrowthEngine::with_cache`], which
/// memoizes simulations by the exact spec value.
pub struct GrowthEngine {
    settings: SolverSettings,
    solver: Box<dyn ParameterSolver + Send + Sync>,
    cache: Option<Mutex<HashMap<SpecKey, Simulation>>>,
}

impl GrowthEngine {
    pub fn new(settings: SolverSettings) -> Self {
        Self {
            solver: settings.build(),
            settings,
            cache: None,
        }
    }

    /// Enable memoization of simulations.
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(Mutex::new(HashMap::new()));
        self
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Validate the spec and solve its curve parameters.
    pub fn solve(&self, spec: &GrowthSpec) -> Result<SolverOutcome, GrowthError> {
        spec.validate()?;
        Ok(self.solver.solve(spec))
    }

    /// Validate, solve and generate the day-by-day series.
    pub fn simulate(&self, spec: &GrowthSpec) -> Result<Simulation, GrowthError> {
        spec.validate()?;
        let key = spec.key();

        if let Some(cache) = &self.cache {
            let cache = cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(hit) = cache.get(&key) {
                tracing::debug!(?key, "simulation cache hit");
                return Ok(hit.clone());
            }
        }

        let outcome = self.solver.solve(spec);
        let series = generate_series(spec, &outcome.parameters);
        tracing::info!(
            strategy = %self.settings.strategy,
            period_days = spec.period_days,
            k = outcome.parameters.carrying_capacity,
            r = outcome.parameters.growth_rate,
            converged = outcome.converged,
            iterations = outcome.iterations,
            "simulated growth curve"
        );
        let simulation = Simulation {
            spec: spec.clone(),
            outcome,
            series,
        };

        if let Some(cache) = &self.cache {
            cache
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert(key, simulation.clone());
        }
        Ok(simulation)
    }

    /// Number of memoized simulations (always 0 without a cache).
    pub fn cached_len(&self) -> usize {
        self.cache
            .as_ref()
            .map(|c| c.lock().unwrap_or_else(|e| e.into_inner()).len())
            .unwrap_or(0)
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.lock().unwrap_or_else(|e| e.into_inner()).clear();
        }
    }
}

impl Default for GrowthEngine {
    fn default() -> Self {
        Self::new(SolverSettings::default())
    }
}

impl std::fmt::Debug for GrowthEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrowthEngine")
            .field("settings", &self.settings)
            .field("cached", &self.cached_len())
            .finish()
    }
}
