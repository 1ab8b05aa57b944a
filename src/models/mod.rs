mod cultivar;
mod phase;
mod series;
mod spec;

pub use cultivar::{find_cultivar, Bench, Cultivar, DEFAULT_INITIAL_WEIGHT};
pub use phase::GrowthPhase;
pub use series::{DayRecord, GrowthSeries, PhaseSpan};
pub use spec::{parse_date, GrowthSpec, SpecKey};
