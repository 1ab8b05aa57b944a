use std::path::Path;

use serde::Deserialize;

use crate::error::GrowthError;
use crate::models::GrowthSeries;

/// A bare array of day records, or any object carrying one under `series`
/// (such as an exported simulation).
#[derive(Deserialize)]
#[serde(untagged)]
enum SeriesDocument {
    Bare(GrowthSeries),
    Wrapped { series: GrowthSeries },
}

impl From<SeriesDocument> for GrowthSeries {
    fn from(doc: SeriesDocument) -> Self {
        match doc {
            SeriesDocument::Bare(series) | SeriesDocument::Wrapped { series } => series,
        }
    }
}

/// Read a growth series from a JSON file.
pub fn read_json(path: impl AsRef<Path>) -> Result<GrowthSeries, GrowthError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let doc: SeriesDocument = serde_json::from_str(&content)?;
    Ok(doc.into())
}

/// Read a growth series from JSON bytes.
pub fn read_json_from_bytes(data: &[u8]) -> Result<GrowthSeries, GrowthError> {
    let content = std::str::from_utf8(data)
        .map_err(|e| GrowthError::ParseError(format!("Invalid UTF-8: {e}")))?;
    let doc: SeriesDocument = serde_json::from_str(content)?;
    Ok(doc.into())
}

/// Write any serializable value (a series or a full simulation) as JSON.
pub fn write_json<T: serde::Serialize + ?Sized>(
    value: &T,
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), GrowthError> {
    let content = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    std::fs::write(path.as_ref(), content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::GrowthEngine;
    use crate::models::GrowthSpec;
    use chrono::NaiveDate;

    fn spec() -> GrowthSpec {
        GrowthSpec::new(5.0, 120.0, 10, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
    }

    #[test]
    fn test_bare_series_roundtrip() {
        let sim = GrowthEngine::default().simulate(&spec()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.json");
        write_json(&sim.series, &path, true).unwrap();
        assert_eq!(read_json(&path).unwrap(), sim.series);
    }

    #[test]
    fn test_reads_simulation_document() {
        let sim = GrowthEngine::default().simulate(&spec()).unwrap();
        let data = serde_json::to_vec(&sim).unwrap();
        let series = read_json_from_bytes(&data).unwrap();
        assert_eq!(series, sim.series);
    }

    #[test]
    fn test_invalid_utf8() {
        let err = read_json_from_bytes(&[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, GrowthError::ParseError(_)));
    }
}
