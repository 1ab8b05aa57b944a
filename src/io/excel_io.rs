use std::path::Path;

use calamine::{open_workbook, Data, DataType, Range, Reader, Xlsx};
use chrono::{Days, NaiveDate};
use rust_xlsxwriter::{Format, Workbook};

use crate::error::GrowthError;
use crate::models::{parse_date, DayRecord, GrowthPhase, GrowthSeries};

const HEADERS: [&str; 5] = ["day", "date", "phase", "predicted_weight", "actual_weight"];

static EMPTY_CELL: Data = Data::Empty;

/// Cell range of the first worksheet of an `.xlsx` workbook.
pub(crate) fn first_sheet(path: &Path) -> Result<Range<Data>, GrowthError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| GrowthError::Excel("No sheets found in workbook".to_string()))?;
    Ok(workbook.worksheet_range(&sheet_name)?)
}

pub(crate) fn cell_f64(cell: &Data) -> Option<f64> {
    cell.get_float()
        .or_else(|| cell.get_int().map(|i| i as f64))
        .or_else(|| cell.get_string().and_then(|s| s.trim().parse().ok()))
}

fn date_from_serial(serial: f64) -> Result<NaiveDate, GrowthError> {
    let days = serial.floor();
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .filter(|_| days.is_finite() && days >= 0.0)
        .and_then(|epoch| epoch.checked_add_days(Days::new(days as u64)))
        .ok_or_else(|| GrowthError::ParseError(format!("Excel date serial {serial} out of range")))
}

/// Whole, positive day index from a cell.
pub(crate) fn cell_day(cell: &Data) -> Option<u32> {
    cell_f64(cell)
        .filter(|d| *d >= 1.0 && d.fract() == 0.0 && *d <= f64::from(u32::MAX))
        .map(|d| d as u32)
}

/// Date cells may be typed Excel dates or `YYYY-MM-DD` / `DD/MM/YYYY` text.
pub(crate) fn cell_date(cell: &Data) -> Option<Result<NaiveDate, GrowthError>> {
    let text = match cell {
        Data::DateTime(dt) => return Some(date_from_serial(dt.as_f64())),
        Data::DateTimeIso(iso) => iso.get(..10).unwrap_or(iso.as_str()).to_string(),
        _ => cell.as_string()?,
    };
    if text.trim().is_empty() {
        return None;
    }
    Some(parse_date(&text))
}

/// Read a growth series from an Excel (.xlsx) file.
///
/// Expects a first sheet with the columns
/// day, date, phase, predicted_weight, actual_weight
/// and a header row.
pub fn read_excel(path: impl AsRef<Path>) -> Result<GrowthSeries, GrowthError> {
    let range = first_sheet(path.as_ref())?;
    let mut records = Vec::new();

    for (idx, row) in range.rows().enumerate().skip(1) {
        if row.iter().all(|c| c.is_empty()) {
            continue;
        }
        let line = idx + 1;
        let field = |col: usize| row.get(col).unwrap_or(&EMPTY_CELL);

        let day = cell_day(field(0))
            .ok_or_else(|| GrowthError::ParseError(format!("row {line}: missing or invalid day")))?;
        let date = cell_date(field(1))
            .ok_or_else(|| GrowthError::ParseError(format!("row {line}: missing date")))??;
        let phase: GrowthPhase = field(2).as_string().unwrap_or_default().parse()?;
        let predicted_weight = cell_f64(field(3)).ok_or_else(|| {
            GrowthError::ParseError(format!("row {line}: missing predicted_weight"))
        })?;

        records.push(DayRecord {
            day,
            date,
            predicted_weight,
            phase,
            actual_weight: cell_f64(field(4)),
        });
    }

    GrowthSeries::from_records(records)
}

/// Write a growth series to an Excel (.xlsx) file.
pub fn write_excel(series: &GrowthSeries, path: impl AsRef<Path>) -> Result<(), GrowthError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();
    let grams = Format::new().set_num_format("0.00");

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }

    for (i, rec) in series.iter().enumerate() {
        let row = i as u32 + 1;
        worksheet.write_number(row, 0, rec.day)?;
        worksheet.write_string(row, 1, rec.date.format("%Y-%m-%d").to_string())?;
        worksheet.write_string(row, 2, rec.phase.to_string())?;
        worksheet.write_number_with_format(row, 3, rec.predicted_weight, &grams)?;
        if let Some(actual) = rec.actual_weight {
            worksheet.write_number_with_format(row, 4, actual, &grams)?;
        }
    }

    workbook.save(path.as_ref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::GrowthEngine;
    use crate::models::GrowthSpec;

    #[test]
    fn test_excel_roundtrip() {
        let spec = GrowthSpec::new(5.0, 260.0, 35, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let mut series = GrowthEngine::default().simulate(&spec).unwrap().series;
        series.set_actual_weight(10, Some(31.25));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.xlsx");
        write_excel(&series, &path).unwrap();

        let loaded = read_excel(&path).unwrap();
        assert_eq!(loaded.len(), 35);
        assert_eq!(loaded.get(10).unwrap().actual_weight, Some(31.25));
        assert_eq!(loaded.get(11).unwrap().actual_weight, None);
        assert_eq!(loaded.get(35).unwrap().phase, GrowthPhase::Saturacao);
        assert_eq!(loaded.start_date(), series.start_date());
    }

    #[test]
    fn test_cell_helpers() {
        assert_eq!(cell_f64(&Data::Float(2.5)), Some(2.5));
        assert_eq!(cell_f64(&Data::Int(3)), Some(3.0));
        assert_eq!(cell_f64(&Data::String(" 4.5 ".to_string())), Some(4.5));
        assert_eq!(cell_f64(&Data::Empty), None);

        let d = cell_date(&Data::String("15/03/2025".to_string())).unwrap().unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        assert!(cell_date(&Data::Empty).is_none());

        let iso = cell_date(&Data::DateTimeIso("2025-03-15T00:00:00".to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(iso, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
    }

    #[test]
    fn test_cell_day_whole_positive_only() {
        assert_eq!(cell_day(&Data::Float(12.0)), Some(12));
        assert_eq!(cell_day(&Data::Int(1)), Some(1));
        assert_eq!(cell_day(&Data::Float(3.7)), None);
        assert_eq!(cell_day(&Data::Float(-4.0)), None);
        assert_eq!(cell_day(&Data::Int(0)), None);
    }

    #[test]
    fn test_date_from_serial() {
        // 45658 is 2025-01-01 in the 1900 date system
        assert_eq!(
            date_from_serial(45658.25).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
        assert!(date_from_serial(-1.0).is_err());
    }
}
