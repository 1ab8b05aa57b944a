use serde::{Deserialize, Serialize};

/// Growth phase of a crop along its sigmoid curve.
///
/// Variants are declared in chronological order so the derived `Ord`
/// matches the order in which a healthy crop moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GrowthPhase {
    /// Lag phase: weight below 10% of carrying capacity.
    Lenta,
    /// Log phase: weight between 10% and 90% of carrying capacity.
    Acelerada,
    /// Plateau: weight above 90% of carrying capacity.
    #[serde(rename = "Saturação")]
    Saturacao,
}

impl GrowthPhase {
    pub const ALL: [GrowthPhase; 3] = [
        GrowthPhase::Lenta,
        GrowthPhase::Acelerada,
        GrowthPhase::Saturacao,
    ];

    /// Identifier stored in the `phase_id` column of persisted growth records.
    pub fn id(&self) -> u8 {
        match self {
            GrowthPhase::Lenta => 1,
            GrowthPhase::Acelerada => 2,
            GrowthPhase::Saturacao => 3,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(GrowthPhase::Lenta),
            2 => Some(GrowthPhase::Acelerada),
            3 => Some(GrowthPhase::Saturacao),
            _ => None,
        }
    }

    /// Conventional growth-stage name (lag, log, plateau).
    pub fn english_name(&self) -> &'static str {
        match self {
            GrowthPhase::Lenta => "lag",
            GrowthPhase::Acelerada => "log",
            GrowthPhase::Saturacao => "plateau",
        }
    }
}

impl std::fmt::Display for GrowthPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrowthPhase::Lenta => write!(f, "Lenta"),
            GrowthPhase::Acelerada => write!(f, "Acelerada"),
            GrowthPhase::Saturacao => write!(f, "Saturação"),
        }
    }
}

impl std::str::FromStr for GrowthPhase {
    type Err = crate::error::GrowthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenta" | "lag" | "1" => Ok(GrowthPhase::Lenta),
            "acelerada" | "log" | "2" => Ok(GrowthPhase::Acelerada),
            "saturação" | "saturacao" | "plateau" | "3" => Ok(GrowthPhase::Saturacao),
            _ => Err(crate::error::GrowthError::ParseError(format!(
                "Unknown growth phase: '{s}'"
            ))),
        }
    }
}
