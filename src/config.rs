use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::SolverSettings;
use crate::error::GrowthError;
use crate::logging::LogConfig;
use crate::models::{find_cultivar, Bench, Cultivar, DEFAULT_INITIAL_WEIGHT};

/// Main application configuration, read from a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub solver: SolverSettings,
    pub logging: LogConfig,
    pub store: StoreConfig,
    /// Cultivar catalog
    pub cultivars: Vec<Cultivar>,
    pub benches: Vec<Bench>,
}

/// Location of the growth record database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("growth.db"),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            solver: SolverSettings::default(),
            logging: LogConfig::default(),
            store: StoreConfig::default(),
            cultivars: default_cultivars(),
            benches: vec![
                Bench {
                    id: 1,
                    name: "Bancada 1".to_string(),
                },
                Bench {
                    id: 2,
                    name: "Bancada 2".to_string(),
                },
            ],
        }
    }
}

fn default_cultivars() -> Vec<Cultivar> {
    [
        (1, "Alface Crespa", 35, 260.0),
        (2, "Alface Americana", 40, 350.0),
        (3, "Rúcula", 30, 120.0),
        (4, "Agrião", 28, 90.0),
    ]
    .into_iter()
    .map(|(id, name, period_days, harvest_weight)| Cultivar {
        id,
        name: name.to_string(),
        period_days,
        harvest_weight,
        initial_weight: DEFAULT_INITIAL_WEIGHT,
        selected: true,
    })
    .collect()
}

impl AppConfig {
    /// Load and validate a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GrowthError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            GrowthError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), cultivars = config.cultivars.len(), "loaded configuration");
        Ok(config)
    }

    /// Load `path` when given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, GrowthError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, GrowthError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, GrowthError> {
        toml::to_string_pretty(self).map_err(|e| GrowthError::ConfigError(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), GrowthError> {
        self.solver.validate()?;

        let mut ids: Vec<u32> = self.cultivars.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        if let Some(dup) = ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(GrowthError::ConfigError(format!(
                "duplicate cultivar id {}",
                dup[0]
            )));
        }
        for cultivar in &self.cultivars {
            if cultivar.period_days == 0 {
                return Err(GrowthError::ConfigError(format!(
                    "cultivar '{}' has a zero-day period",
                    cultivar.name
                )));
            }
            if !(cultivar.initial_weight > 0.0 && cultivar.harvest_weight > cultivar.initial_weight) {
                return Err(GrowthError::ConfigError(format!(
                    "cultivar '{}' must have 0 < initial_weight < harvest_weight",
                    cultivar.name
                )));
            }
        }

        let mut bench_ids: Vec<u32> = self.benches.iter().map(|b| b.id).collect();
        bench_ids.sort_unstable();
        if let Some(dup) = bench_ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(GrowthError::ConfigError(format!("duplicate bench id {}", dup[0])));
        }
        Ok(())
    }

    pub fn cultivar(&self, query: &str) -> Result<&Cultivar, GrowthError> {
        find_cultivar(&self.cultivars, query)
    }

    pub fn bench(&self, id: u32) -> Result<&Bench, GrowthError> {
        self.benches
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| GrowthError::ConfigError(format!("Unknown bench: {id}")))
    }

    /// Cultivars currently offered for planting.
    pub fn selected_cultivars(&self) -> impl Iterator<Item = &Cultivar> {
        self.cultivars.iter().filter(|c| c.selected)
    }
}
