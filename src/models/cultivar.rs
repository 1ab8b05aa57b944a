use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::GrowthSpec;
use crate::error::GrowthError;

/// Seedling weight assumed at transplant when a cultivar does not say otherwise.
pub const DEFAULT_INITIAL_WEIGHT: f64 = 5.0;

/// Reference data for a cultivated variety.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cultivar {
    pub id: u32,
    pub name: String,
    /// Days from transplant to harvest
    pub period_days: u32,
    /// Expected weight at harvest, in grams
    pub harvest_weight: f64,
    /// Weight at transplant, in grams
    #[serde(default = "default_initial_weight")]
    pub initial_weight: f64,
    /// Whether the cultivar is currently offered for planting
    #[serde(default = "default_selected")]
    pub selected: bool,
}

fn default_initial_weight() -> f64 {
    DEFAULT_INITIAL_WEIGHT
}

fn default_selected() -> bool {
    true
}

impl Cultivar {
    /// Build the simulation input for a planting of this cultivar.
    pub fn to_spec(&self, planting_date: NaiveDate) -> GrowthSpec {
        GrowthSpec::new(
            self.initial_weight,
            self.harvest_weight,
            self.period_days,
            planting_date,
        )
    }
}

/// A hydroponic bench (growing table) where a cultivar is planted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bench {
    pub id: u32,
    pub name: String,
}

/// Find a cultivar by numeric id or case-insensitive name.
pub fn find_cultivar<'a>(cultivars: &'a [Cultivar], query: &str) -> Result<&'a Cultivar, GrowthError> {
    let query = query.trim();
    let found = match query.parse::<u32>() {
        Ok(id) => cultivars.iter().find(|c| c.id == id),
        Err(_) => {
            let wanted = query.to_lowercase();
            cultivars.iter().find(|c| c.name.to_lowercase() == wanted)
        }
    };
    found.ok_or_else(|| GrowthError::ConfigError(format!("Unknown cultivar: '{query}'")))
}
