use serde::{Deserialize, Serialize};

use crate::error::GrowthError;
use crate::models::GrowthSeries;

/// An operator measurement for one day of a series.
///
/// `weight: None` clears a previously recorded measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActualWeight {
    pub day: u32,
    pub weight: Option<f64>,
}

impl ActualWeight {
    pub fn new(day: u32, weight: f64) -> Self {
        Self {
            day,
            weight: Some(weight),
        }
    }

    pub fn cleared(day: u32) -> Self {
        Self { day, weight: None }
    }
}

/// Overlay operator measurements onto a series.
///
/// Every entry is checked before anything is written, so a rejected batch
/// leaves the series untouched. Predicted weights and phases are never
/// modified. Later entries for the same day win. Returns the number of
/// entries applied.
pub fn reconcile(series: &mut GrowthSeries, actuals: &[ActualWeight]) -> Result<usize, GrowthError> {
    let period_days = series.period_days();
    for entry in actuals {
        if entry.day == 0 || entry.day > period_days {
            return Err(GrowthError::DayOutOfRange {
                day: entry.day,
                period_days,
            });
        }
        if let Some(w) = entry.weight {
            if !w.is_finite() || w < 0.0 {
                return Err(GrowthError::ValidationError(format!(
                    "day {}: actual weight must be a non-negative number, got {w}",
                    entry.day
                )));
            }
        }
    }

    for entry in actuals {
        series.set_actual_weight(entry.day, entry.weight);
    }
    tracing::debug!(applied = actuals.len(), "reconciled actual weights");
    Ok(actuals.len())
}
