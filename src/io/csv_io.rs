use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::GrowthError;
use crate::models::{DayRecord, GrowthPhase, GrowthSeries};

/// CSV row structure for one day of a series.
#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct SeriesRow {
    day: u32,
    date: NaiveDate,
    phase: String,
    predicted_weight: f64,
    actual_weight: Option<f64>,
}

fn parse_csv_records<R: Read>(rdr: &mut csv::Reader<R>) -> Result<GrowthSeries, GrowthError> {
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let row: SeriesRow = result?;
        let phase: GrowthPhase = row.phase.parse()?;
        records.push(DayRecord {
            day: row.day,
            date: row.date,
            predicted_weight: row.predicted_weight,
            phase,
            actual_weight: row.actual_weight,
        });
    }
    GrowthSeries::from_records(records)
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).flexible(true).trim(csv::Trim::All);
    builder
}

/// Read a growth series from a CSV file.
///
/// Expects the columns `day, date, phase, predicted_weight, actual_weight`.
pub fn read_csv(path: impl AsRef<Path>) -> Result<GrowthSeries, GrowthError> {
    let mut rdr = reader_builder().from_path(path.as_ref())?;
    parse_csv_records(&mut rdr)
}

/// Read a growth series from CSV bytes.
pub fn read_csv_from_bytes(data: &[u8]) -> Result<GrowthSeries, GrowthError> {
    let mut rdr = reader_builder().from_reader(data);
    parse_csv_records(&mut rdr)
}

fn write_records<W: std::io::Write>(
    wtr: &mut csv::Writer<W>,
    series: &GrowthSeries,
) -> Result<(), GrowthError> {
    for rec in series {
        wtr.serialize(SeriesRow {
            day: rec.day,
            date: rec.date,
            phase: rec.phase.to_string(),
            predicted_weight: rec.predicted_weight,
            actual_weight: rec.actual_weight,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a growth series to a CSV file.
pub fn write_csv(series: &GrowthSeries, path: impl AsRef<Path>) -> Result<(), GrowthError> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    write_records(&mut wtr, series)
}

/// Render a growth series as CSV text.
pub fn write_csv_to_string(series: &GrowthSeries) -> Result<String, GrowthError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    write_records(&mut wtr, series)?;
    let bytes = wtr
        .into_inner()
        .map_err(|e| GrowthError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| GrowthError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{generate_series, solve_logistic_parameters};
    use crate::models::GrowthSpec;

    fn sample() -> GrowthSeries {
        let spec = GrowthSpec::new(5.0, 40.0, 5, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        generate_series(&spec, &solve_logistic_parameters(&spec))
    }

    #[test]
    fn test_header_and_blank_actuals() {
        let text = write_csv_to_string(&sample()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "day,date,phase,predicted_weight,actual_weight"
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("1,2025-03-01,"));
        assert!(first.ends_with(','));
    }

    #[test]
    fn test_read_csv_from_bytes() {
        let data = "day,date,phase,predicted_weight,actual_weight\n\
                    1,2025-03-01,Lenta,5.0,\n\
                    2,2025-03-02,Acelerada,12.5,11.0\n\
                    3,2025-03-03,Saturação,30.0,\n";
        let series = read_csv_from_bytes(data.as_bytes()).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.get(2).unwrap().actual_weight, Some(11.0));
        assert_eq!(series.get(3).unwrap().phase, GrowthPhase::Saturacao);
    }

    #[test]
    fn test_read_csv_rejects_bad_phase() {
        let data = b"day,date,phase,predicted_weight,actual_weight\n1,2025-03-01,Dormant,5.0,\n";
        assert!(read_csv_from_bytes(data).is_err());
    }

    #[test]
    fn test_file_roundtrip() {
        let mut series = sample();
        series.set_actual_weight(2, Some(9.5));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.csv");
        write_csv(&series, &path).unwrap();
        let loaded = read_csv(&path).unwrap();
        assert_eq!(loaded, series);
    }
}
