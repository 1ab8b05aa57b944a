mod actuals;
mod csv_io;
mod excel_io;
mod json_io;

use std::path::Path;

use crate::error::GrowthError;
use crate::models::GrowthSeries;

pub use actuals::{
    read_measurements, read_measurements_csv, read_measurements_csv_from_bytes,
    read_measurements_excel, resolve_measurements, MeasurementDay, MeasurementRow,
};
pub use csv_io::{read_csv, read_csv_from_bytes, write_csv, write_csv_to_string};
pub use excel_io::{read_excel, write_excel};
pub use json_io::{read_json, read_json_from_bytes, write_json};

/// Trait for reading a growth series from a file.
pub trait SeriesReader {
    fn read(&self, path: &Path) -> Result<GrowthSeries, GrowthError>;
}

/// Trait for writing a growth series to a file.
pub trait SeriesWriter {
    fn write(&self, series: &GrowthSeries, path: &Path) -> Result<(), GrowthError>;
}

/// CSV format reader/writer.
pub struct CsvFormat;

impl SeriesReader for CsvFormat {
    fn read(&self, path: &Path) -> Result<GrowthSeries, GrowthError> {
        read_csv(path)
    }
}

impl SeriesWriter for CsvFormat {
    fn write(&self, series: &GrowthSeries, path: &Path) -> Result<(), GrowthError> {
        write_csv(series, path)
    }
}

/// JSON format reader/writer.
#[derive(Default)]
pub struct JsonFormat {
    pub pretty: bool,
}

impl SeriesReader for JsonFormat {
    fn read(&self, path: &Path) -> Result<GrowthSeries, GrowthError> {
        read_json(path)
    }
}

impl SeriesWriter for JsonFormat {
    fn write(&self, series: &GrowthSeries, path: &Path) -> Result<(), GrowthError> {
        write_json(series, path, self.pretty)
    }
}

/// Excel (.xlsx) format reader/writer.
pub struct ExcelFormat;

impl SeriesReader for ExcelFormat {
    fn read(&self, path: &Path) -> Result<GrowthSeries, GrowthError> {
        read_excel(path)
    }
}

impl SeriesWriter for ExcelFormat {
    fn write(&self, series: &GrowthSeries, path: &Path) -> Result<(), GrowthError> {
        write_excel(series, path)
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Pick a reader from the file extension.
pub fn reader_for(path: &Path) -> Result<Box<dyn SeriesReader>, GrowthError> {
    match extension(path).as_str() {
        "csv" => Ok(Box::new(CsvFormat)),
        "json" => Ok(Box::new(JsonFormat::default())),
        "xlsx" => Ok(Box::new(ExcelFormat)),
        ext => Err(GrowthError::ParseError(format!(
            "Unsupported file format: .{ext}. Use .csv, .json, or .xlsx"
        ))),
    }
}

/// Pick a writer from the file extension.
pub fn writer_for(path: &Path, pretty: bool) -> Result<Box<dyn SeriesWriter>, GrowthError> {
    match extension(path).as_str() {
        "csv" => Ok(Box::new(CsvFormat)),
        "json" => Ok(Box::new(JsonFormat { pretty })),
        "xlsx" => Ok(Box::new(ExcelFormat)),
        ext => Err(GrowthError::ParseError(format!(
            "Unsupported output format: .{ext}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::GrowthEngine;
    use crate::models::GrowthSpec;
    use chrono::NaiveDate;

    fn sample_series() -> GrowthSeries {
        let spec = GrowthSpec::new(5.0, 260.0, 35, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        GrowthEngine::default().simulate(&spec).unwrap().series
    }

    #[test]
    fn test_csv_trait_roundtrip() {
        let series = sample_series();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.csv");

        let writer: &dyn SeriesWriter = &CsvFormat;
        writer.write(&series, &path).unwrap();

        let reader: &dyn SeriesReader = &CsvFormat;
        let loaded = reader.read(&path).unwrap();
        assert_eq!(loaded, series);
    }

    #[test]
    fn test_json_trait_roundtrip() {
        let series = sample_series();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.json");

        let writer: &dyn SeriesWriter = &JsonFormat { pretty: true };
        writer.write(&series, &path).unwrap();

        let reader: &dyn SeriesReader = &JsonFormat::default();
        assert_eq!(reader.read(&path).unwrap(), series);
    }

    #[test]
    fn test_dispatch_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let series = sample_series();
        for name in ["a.csv", "b.JSON", "c.xlsx"] {
            let path = dir.path().join(name);
            writer_for(&path, false).unwrap().write(&series, &path).unwrap();
            let loaded = reader_for(&path).unwrap().read(&path).unwrap();
            assert_eq!(loaded.len(), 35);
        }
        assert!(reader_for(Path::new("x.txt")).is_err());
        assert!(writer_for(Path::new("x"), false).is_err());
    }
}
