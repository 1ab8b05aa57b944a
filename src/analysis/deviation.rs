use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::GrowthError;
use crate::models::GrowthSeries;

/// Confidence interval for the mean percent deviation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviationInterval {
    pub lower: f64,
    pub upper: f64,
    pub std_error: f64,
    pub confidence_level: f64,
}

/// How far operator measurements sit from the predicted curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviationSummary {
    /// Number of days with a measurement
    pub measured_days: usize,
    /// Mean of `actual - predicted`, in grams
    pub mean_deviation: f64,
    /// Mean of `|actual - predicted|`, in grams
    pub mean_absolute_deviation: f64,
    /// Root mean squared deviation, in grams
    pub rmse: f64,
    /// Mean deviation as a percentage of the predicted weight
    pub mean_percent_deviation: f64,
    /// Only present with at least two measurements
    pub interval: Option<DeviationInterval>,
}

impl DeviationSummary {
    /// Summarize measured days at a given confidence level (e.g. 0.95).
    ///
    /// Returns `Ok(None)` when the series carries no measurements.
    pub fn compute(series: &GrowthSeries, confidence: f64) -> Result<Option<Self>, GrowthError> {
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(GrowthError::ValidationError(format!(
                "confidence must be between 0 and 1, got {confidence}"
            )));
        }

        let deviations: Vec<f64> = series.iter().filter_map(|r| r.deviation()).collect();
        if deviations.is_empty() {
            return Ok(None);
        }
        let percents: Vec<f64> = series.iter().filter_map(|r| r.deviation_percent()).collect();

        let n = deviations.len() as f64;
        let mean_deviation = deviations.iter().sum::<f64>() / n;
        let mean_absolute_deviation = deviations.iter().map(|d| d.abs()).sum::<f64>() / n;
        let rmse = (deviations.iter().map(|d| d.powi(2)).sum::<f64>() / n).sqrt();
        let mean_percent_deviation = if percents.is_empty() {
            0.0
        } else {
            percents.iter().sum::<f64>() / percents.len() as f64
        };

        Ok(Some(DeviationSummary {
            measured_days: deviations.len(),
            mean_deviation,
            mean_absolute_deviation,
            rmse,
            mean_percent_deviation,
            interval: mean_interval(&percents, confidence)?,
        }))
    }
}

/// Student-t interval around the mean of `values`.
fn mean_interval(values: &[f64], confidence: f64) -> Result<Option<DeviationInterval>, GrowthError> {
    let n = values.len();
    if n < 2 {
        return Ok(None);
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std_error = variance.sqrt() / (n as f64).sqrt();

    let alpha = 1.0 - confidence;
    let t_dist = StudentsT::new(0.0, 1.0, (n - 1) as f64)
        .map_err(|e| GrowthError::ValidationError(e.to_string()))?;
    let margin = t_dist.inverse_cdf(1.0 - alpha / 2.0) * std_error;

    Ok(Some(DeviationInterval {
        lower: mean - margin,
        upper: mean + margin,
        std_error,
        confidence_level: confidence,
    }))
}
