use thiserror::Error;

/// Errors that can occur while simulating, reconciling or persisting growth curves.
#[derive(Error, Debug)]
pub enum GrowthError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Excel error: {0}")]
    Excel(String),

    #[cfg(feature = "store")]
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid growth spec: {0}")]
    InvalidSpec(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Day {day} is outside the series (1..={period_days})")]
    DayOutOfRange { day: u32, period_days: u32 },
}

impl From<calamine::Error> for GrowthError {
    fn from(e: calamine::Error) -> Self {
        GrowthError::Excel(e.to_string())
    }
}

impl From<calamine::XlsxError> for GrowthError {
    fn from(e: calamine::XlsxError) -> Self {
        GrowthError::Excel(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for GrowthError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        GrowthError::Excel(e.to_string())
    }
}
