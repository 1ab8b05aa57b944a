mod growth_repo;

pub use growth_repo::{GrowthStore, SeriesKey, StoredSeries};
