use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::GrowthError;

/// Inputs to a growth simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthSpec {
    /// Weight at planting (day 1), in grams
    pub initial_weight: f64,
    /// Expected harvest weight at the last day, in grams
    pub final_weight: f64,
    /// Length of the growth period in days
    pub period_days: u32,
    /// Planting date (day 1)
    pub start_date: NaiveDate,
}

/// Hashable identity of a spec, used by the opt-in simulation cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecKey {
    initial_weight_bits: u64,
    final_weight_bits: u64,
    period_days: u32,
    start_date: NaiveDate,
}

impl GrowthSpec {
    pub fn new(
        initial_weight: f64,
        final_weight: f64,
        period_days: u32,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            initial_weight,
            final_weight,
            period_days,
            start_date,
        }
    }

    /// Check the preconditions the solver relies on.
    pub fn validate(&self) -> Result<(), GrowthError> {
        if !self.initial_weight.is_finite() || !self.final_weight.is_finite() {
            return Err(GrowthError::InvalidSpec(format!(
                "weights must be finite numbers, got initial={} final={}",
                self.initial_weight, self.final_weight
            )));
        }
        if self.initial_weight <= 0.0 {
            return Err(GrowthError::InvalidSpec(format!(
                "initial_weight must be positive, got {}",
                self.initial_weight
            )));
        }
        if self.final_weight <= self.initial_weight {
            return Err(GrowthError::InvalidSpec(format!(
                "final_weight ({}) must be greater than initial_weight ({})",
                self.final_weight, self.initial_weight
            )));
        }
        if self.period_days == 0 {
            return Err(GrowthError::InvalidSpec(
                "period_days must be at least 1".to_string(),
            ));
        }
        if self.end_date().is_none() {
            return Err(GrowthError::InvalidSpec(format!(
                "a {}-day period starting {} ends outside the calendar range",
                self.period_days, self.start_date
            )));
        }
        Ok(())
    }

    /// Calendar date of a 1-based day index.
    pub fn date_for_day(&self, day: u32) -> Option<NaiveDate> {
        let offset = day.checked_sub(1)?;
        self.start_date.checked_add_days(Days::new(u64::from(offset)))
    }

    /// Date of the last day of the period.
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.date_for_day(self.period_days.max(1))
    }

    pub fn key(&self) -> SpecKey {
        SpecKey {
            initial_weight_bits: self.initial_weight.to_bits(),
            final_weight_bits: self.final_weight.to_bits(),
            period_days: self.period_days,
            start_date: self.start_date,
        }
    }
}

/// Parse a calendar date written either as `YYYY-MM-DD` or `DD/MM/YYYY`.
pub fn parse_date(s: &str) -> Result<NaiveDate, GrowthError> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .map_err(|_| {
            GrowthError::ParseError(format!(
                "Invalid date '{s}'. Use YYYY-MM-DD or DD/MM/YYYY"
            ))
        })
}
