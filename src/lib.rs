//! Sigmoidal growth-curve simulation for hydroponic cultivars.
//!
//! A [`GrowthSpec`] (initial weight, harvest weight, period, planting date)
//! is fitted with a logistic curve whose day-by-day values form a
//! [`GrowthSeries`]; every day is classified into a [`GrowthPhase`] and
//! operator measurements can be overlaid with [`analysis::reconcile`].

pub mod analysis;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod models;
#[cfg(feature = "store")]
pub mod store;
pub mod visualization;

pub use analysis::{
    classify_phase, generate_series, reconcile, solve_logistic_parameters, ActualWeight,
    CurveParameters, GrowthEngine, Simulation,
};
pub use error::GrowthError;
pub use io::{SeriesReader, SeriesWriter};
pub use models::{DayRecord, GrowthPhase, GrowthSeries, GrowthSpec};
