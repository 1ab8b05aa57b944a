use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::excel_io::{cell_date, cell_day, cell_f64, first_sheet};
use crate::analysis::ActualWeight;
use crate::error::GrowthError;
use crate::models::{parse_date, GrowthSeries};

/// Which day a measurement belongs to, as written by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasurementDay {
    Day(u32),
    Date(NaiveDate),
}

/// An imported measurement row, not yet tied to a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRow {
    pub at: MeasurementDay,
    /// Blank cells clear the measurement
    pub weight: Option<f64>,
}

impl MeasurementRow {
    /// Map the row onto a day of `series`.
    pub fn resolve(&self, series: &GrowthSeries) -> Result<ActualWeight, GrowthError> {
        let day = match self.at {
            MeasurementDay::Day(day) => day,
            MeasurementDay::Date(date) => series.day_for_date(date).ok_or_else(|| {
                GrowthError::ValidationError(format!(
                    "measurement date {} is outside the series",
                    date.format("%d/%m/%Y")
                ))
            })?,
        };
        Ok(ActualWeight {
            day,
            weight: self.weight,
        })
    }
}

/// Resolve a batch of imported rows against a series.
pub fn resolve_measurements(
    rows: &[MeasurementRow],
    series: &GrowthSeries,
) -> Result<Vec<ActualWeight>, GrowthError> {
    rows.iter().map(|r| r.resolve(series)).collect()
}

#[derive(Debug, Deserialize)]
struct CsvMeasurement {
    day: Option<u32>,
    date: Option<String>,
    actual_weight: Option<f64>,
}

fn measurement_at(day: Option<u32>, date: Option<NaiveDate>, line: usize) -> Result<MeasurementDay, GrowthError> {
    match (day, date) {
        (Some(day), _) => Ok(MeasurementDay::Day(day)),
        (None, Some(date)) => Ok(MeasurementDay::Date(date)),
        (None, None) => Err(GrowthError::ParseError(format!(
            "row {line}: either day or date is required"
        ))),
    }
}

fn parse_csv_measurements<R: Read>(rdr: &mut csv::Reader<R>) -> Result<Vec<MeasurementRow>, GrowthError> {
    let mut rows = Vec::new();
    for (idx, result) in rdr.deserialize().enumerate() {
        let rec: CsvMeasurement = result?;
        let date = match rec.date.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => Some(parse_date(s)?),
            _ => None,
        };
        rows.push(MeasurementRow {
            at: measurement_at(rec.day, date, idx + 2)?,
            weight: rec.actual_weight,
        });
    }
    Ok(rows)
}

/// Read measurements from a CSV file with a `day` and/or `date` column
/// and an `actual_weight` column.
pub fn read_measurements_csv(path: impl AsRef<Path>) -> Result<Vec<MeasurementRow>, GrowthError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;
    parse_csv_measurements(&mut rdr)
}

pub fn read_measurements_csv_from_bytes(data: &[u8]) -> Result<Vec<MeasurementRow>, GrowthError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);
    parse_csv_measurements(&mut rdr)
}

/// Read measurements from the first sheet of an `.xlsx` workbook.
///
/// Columns are located by header name (`day`, `date`, `actual_weight`).
pub fn read_measurements_excel(path: impl AsRef<Path>) -> Result<Vec<MeasurementRow>, GrowthError> {
    let range = first_sheet(path.as_ref())?;
    let mut rows_iter = range.rows();
    let header: Vec<String> = rows_iter
        .next()
        .map(|h| h.iter().map(|c| c.to_string().trim().to_lowercase()).collect())
        .unwrap_or_default();
    let col = |name: &str| header.iter().position(|h| h == name);

    let weight_col = col("actual_weight").ok_or_else(|| {
        GrowthError::ParseError("missing actual_weight column".to_string())
    })?;
    let day_col = col("day");
    let date_col = col("date");

    let mut rows = Vec::new();
    for (idx, row) in rows_iter.enumerate() {
        if row.iter().all(|c| c.to_string().trim().is_empty()) {
            continue;
        }
        let line = idx + 2;
        let day = match day_col.and_then(|c| row.get(c)) {
            Some(cell) if !cell.to_string().trim().is_empty() => {
                let day = cell_day(cell).ok_or_else(|| {
                    GrowthError::ParseError(format!("row {line}: invalid day '{cell}'"))
                })?;
                Some(day)
            }
            _ => None,
        };
        let date = match date_col.and_then(|c| row.get(c)).and_then(cell_date) {
            Some(parsed) => Some(parsed?),
            None => None,
        };
        rows.push(MeasurementRow {
            at: measurement_at(day, date, line)?,
            weight: row.get(weight_col).and_then(cell_f64),
        });
    }
    Ok(rows)
}

/// Read measurements, picking the parser from the file extension.
pub fn read_measurements(path: impl AsRef<Path>) -> Result<Vec<MeasurementRow>, GrowthError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ext.as_str() {
        "csv" => read_measurements_csv(path),
        "xlsx" => read_measurements_excel(path),
        _ => Err(GrowthError::ParseError(format!(
            "Unsupported measurement file: .{ext}. Use .csv or .xlsx"
        ))),
    }
}
