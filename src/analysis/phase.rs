use crate::models::GrowthPhase;

/// Fraction of carrying capacity below which a crop is still in the lag phase.
pub const LAG_PHASE_CEILING: f64 = 0.10;

/// Fraction of carrying capacity above which a crop has reached saturation.
pub const SATURATION_FLOOR: f64 = 0.90;

/// Classify a predicted weight against the curve's carrying capacity.
///
/// Both boundaries belong to the accelerated phase: a ratio of exactly
/// 0.10 or 0.90 is `Acelerada`.
///
/// # Examples
///
/// ```
/// use hydro_growth::analysis::classify_phase;
/// use hydro_growth::models::GrowthPhase;
///
/// assert_eq!(classify_phase(5.0, 100.0), GrowthPhase::Lenta);
/// assert_eq!(classify_phase(10.0, 100.0), GrowthPhase::Acelerada);
/// assert_eq!(classify_phase(95.0, 100.0), GrowthPhase::Saturacao);
/// ```
pub fn classify_phase(predicted_weight: f64, carrying_capacity: f64) -> GrowthPhase {
    let ratio = predicted_weight / carrying_capacity;
    if ratio < LAG_PHASE_CEILING {
        GrowthPhase::Lenta
    } else if ratio > SATURATION_FLOOR {
        GrowthPhase::Saturacao
    } else {
        GrowthPhase::Acelerada
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_boundary_is_accelerated() {
        assert_eq!(classify_phase(10.0, 100.0), GrowthPhase::Acelerada);
    }

    #[test]
    fn test_upper_boundary_is_accelerated() {
        assert_eq!(classify_phase(90.0, 100.0), GrowthPhase::Acelerada);
    }

    #[test]
    fn test_just_below_lower_boundary() {
        assert_eq!(classify_phase(9.999, 100.0), GrowthPhase::Lenta);
    }

    #[test]
    fn test_just_above_upper_boundary() {
        assert_eq!(classify_phase(90.001, 100.0), GrowthPhase::Saturacao);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(classify_phase(0.0, 100.0), GrowthPhase::Lenta);
        assert_eq!(classify_phase(100.0, 100.0), GrowthPhase::Saturacao);
    }

    #[test]
    fn test_scale_invariance() {
        assert_eq!(classify_phase(27.0, 264.0), GrowthPhase::Acelerada);
        assert_eq!(classify_phase(26.0, 264.0), GrowthPhase::Lenta);
        assert_eq!(classify_phase(240.0, 264.0), GrowthPhase::Saturacao);
    }
}
