use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::GrowthPhase;
use crate::error::GrowthError;

/// One simulated day of a growth curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    /// 1-based day index
    pub day: u32,
    /// Calendar date of this day
    pub date: NaiveDate,
    /// Weight predicted by the logistic curve, in grams
    pub predicted_weight: f64,
    /// Growth phase of the predicted weight
    pub phase: GrowthPhase,
    /// Weight measured by an operator, in grams
    pub actual_weight: Option<f64>,
}

impl DayRecord {
    /// Signed difference `actual - predicted`, when a measurement exists.
    pub fn deviation(&self) -> Option<f64> {
        self.actual_weight.map(|a| a - self.predicted_weight)
    }

    /// Deviation as a percentage of the predicted weight.
    pub fn deviation_percent(&self) -> Option<f64> {
        let dev = self.deviation()?;
        if self.predicted_weight.abs() > f64::EPSILON {
            Some(dev / self.predicted_weight * 100.0)
        } else {
            None
        }
    }
}

/// A contiguous run of days sharing a growth phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSpan {
    pub phase: GrowthPhase,
    pub first_day: u32,
    pub last_day: u32,
}

impl PhaseSpan {
    /// Number of days in the span.
    pub fn days(&self) -> u32 {
        self.last_day - self.first_day + 1
    }
}

/// Day-by-day growth series, ordered by day starting at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DayRecord>", into = "Vec<DayRecord>")]
pub struct GrowthSeries {
    records: Vec<DayRecord>,
}

impl GrowthSeries {
    /// Build a series, checking that days run 1, 2, 3, ... with consecutive dates.
    pub fn from_records(records: Vec<DayRecord>) -> Result<Self, GrowthError> {
        for (idx, rec) in records.iter().enumerate() {
            let expected = idx as u32 + 1;
            if rec.day != expected {
                return Err(GrowthError::ValidationError(format!(
                    "series records must be numbered consecutively from 1: expected day {expected}, found {}",
                    rec.day
                )));
            }
            if idx > 0 && records[idx - 1].date.succ_opt() != Some(rec.date) {
                return Err(GrowthError::ValidationError(format!(
                    "day {} is dated {} but day {} is dated {}",
                    rec.day,
                    rec.date,
                    records[idx - 1].day,
                    records[idx - 1].date
                )));
            }
            if !rec.predicted_weight.is_finite() {
                return Err(GrowthError::ValidationError(format!(
                    "day {}: predicted weight must be finite",
                    rec.day
                )));
            }
        }
        Ok(Self { records })
    }

    pub(crate) fn from_generated(records: Vec<DayRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[DayRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DayRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn period_days(&self) -> u32 {
        self.records.len() as u32
    }

    /// Record for a 1-based day index.
    pub fn get(&self, day: u32) -> Option<&DayRecord> {
        let idx = day.checked_sub(1)? as usize;
        self.records.get(idx)
    }

    /// Only the actual weight is writable; predicted values stay fixed.
    pub(crate) fn set_actual_weight(&mut self, day: u32, weight: Option<f64>) -> bool {
        match day
            .checked_sub(1)
            .and_then(|idx| self.records.get_mut(idx as usize))
        {
            Some(rec) => {
                rec.actual_weight = weight;
                true
            }
            None => false,
        }
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last(&self) -> Option<&DayRecord> {
        self.records.last()
    }

    /// Day index of a calendar date inside the series.
    pub fn day_for_date(&self, date: NaiveDate) -> Option<u32> {
        let start = self.start_date()?;
        let offset = (date - start).num_days();
        if offset < 0 || offset >= self.records.len() as i64 {
            return None;
        }
        Some(offset as u32 + 1)
    }

    /// Day whose predicted weight is closest to half the carrying capacity.
    pub fn inflection_day(&self, carrying_capacity: f64) -> Option<u32> {
        let half = carrying_capacity / 2.0;
        self.records
            .iter()
            .min_by(|a, b| {
                let da = (a.predicted_weight - half).abs();
                let db = (b.predicted_weight - half).abs();
                da.total_cmp(&db)
            })
            .map(|r| r.day)
    }

    /// Contiguous runs of the same phase, in day order.
    pub fn phase_spans(&self) -> Vec<PhaseSpan> {
        let mut spans: Vec<PhaseSpan> = Vec::new();
        for rec in &self.records {
            match spans.last_mut() {
                Some(span) if span.phase == rec.phase => span.last_day = rec.day,
                _ => spans.push(PhaseSpan {
                    phase: rec.phase,
                    first_day: rec.day,
                    last_day: rec.day,
                }),
            }
        }
        spans
    }

    /// Records that carry an operator measurement.
    pub fn measured(&self) -> impl Iterator<Item = &DayRecord> {
        self.records.iter().filter(|r| r.actual_weight.is_some())
    }
}

impl TryFrom<Vec<DayRecord>> for GrowthSeries {
    type Error = GrowthError;

    fn try_from(records: Vec<DayRecord>) -> Result<Self, Self::Error> {
        GrowthSeries::from_records(records)
    }
}

impl From<GrowthSeries> for Vec<DayRecord> {
    fn from(series: GrowthSeries) -> Self {
        series.records
    }
}

impl<'a> IntoIterator for &'a GrowthSeries {
    type Item = &'a DayRecord;
    type IntoIter = std::slice::Iter<'a, DayRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
