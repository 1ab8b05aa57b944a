use crate::analysis::{classify_phase, CurveParameters};
use crate::models::{DayRecord, GrowthSeries, GrowthSpec};

/// Walk the solved curve for days `1..=period_days`.
///
/// A day whose predicted weight is not finite is recorded as `0.0` and
/// logged; the remaining days are unaffected. Actual weights start empty.
///
/// The series stops at the last representable calendar date. Specs that
/// passed [`GrowthSpec::validate`] never reach that limit.
pub fn generate_series(spec: &GrowthSpec, params: &CurveParameters) -> GrowthSeries {
    let records = (1..=spec.period_days)
        .map_while(|day| {
            let Some(date) = spec.date_for_day(day) else {
                tracing::warn!(
                    day,
                    start = %spec.start_date,
                    "day falls past the calendar range, truncating series"
                );
                return None;
            };
            let mut predicted_weight = params.weight_at(f64::from(day));
            if !predicted_weight.is_finite() {
                tracing::warn!(
                    day,
                    k = params.carrying_capacity,
                    r = params.growth_rate,
                    "non-finite predicted weight, recording 0"
                );
                predicted_weight = 0.0;
            }
            Some(DayRecord {
                day,
                date,
                predicted_weight,
                phase: classify_phase(predicted_weight, params.carrying_capacity),
                actual_weight: None,
            })
        })
        .collect();
    GrowthSeries::from_generated(records)
}
