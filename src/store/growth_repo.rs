use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::analysis::{GrowthEngine, Simulation};
use crate::error::GrowthError;
use crate::models::{DayRecord, GrowthPhase, GrowthSeries, GrowthSpec};

/// Identity of one planting: which cultivar went onto which bench, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    pub bench_id: u32,
    pub cultivar_id: u32,
    pub planting_date: NaiveDate,
}

/// Where a series handed out by [`GrowthStore::load_or_generate`] came from.
#[derive(Debug, Clone)]
pub enum StoredSeries {
    /// Records already persisted for the planting
    Loaded(GrowthSeries),
    /// Freshly simulated, not yet persisted
    Generated(Simulation),
}

impl StoredSeries {
    pub fn series(&self) -> &GrowthSeries {
        match self {
            StoredSeries::Loaded(series) => series,
            StoredSeries::Generated(sim) => &sim.series,
        }
    }

    pub fn into_series(self) -> GrowthSeries {
        match self {
            StoredSeries::Loaded(series) => series,
            StoredSeries::Generated(sim) => sim.series,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, StoredSeries::Loaded(_))
    }
}

/// SQLite persistence for growth records.
pub struct GrowthStore {
    conn: Mutex<Connection>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl GrowthStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GrowthError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened growth store");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, GrowthError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, GrowthError> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.ensure_table()?;
        Ok(store)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn ensure_table(&self) -> Result<(), GrowthError> {
        self.conn().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS growth_record (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              bench_id INTEGER NOT NULL,
              cultivar_id INTEGER NOT NULL,
              planting_date TEXT NOT NULL,
              measurement_date TEXT NOT NULL,
              phase_id INTEGER NOT NULL CHECK (phase_id IN (1, 2, 3)),
              expected_weight REAL NOT NULL,
              actual_weight REAL,
              UNIQUE (bench_id, cultivar_id, planting_date, measurement_date)
            );

            CREATE INDEX IF NOT EXISTS idx_growth_record_planting
              ON growth_record(bench_id, cultivar_id, planting_date);
            "#,
        )?;
        Ok(())
    }

    /// Insert or update every day of `series` in one transaction.
    ///
    /// Weights are stored rounded to two decimals. Returns the number of
    /// rows written.
    pub fn upsert_series(&self, key: &SeriesKey, series: &GrowthSeries) -> Result<usize, GrowthError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO growth_record (
                    bench_id,
                    cultivar_id,
                    planting_date,
                    measurement_date,
                    phase_id,
                    expected_weight,
                    actual_weight
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(bench_id, cultivar_id, planting_date, measurement_date) DO UPDATE SET
                    phase_id = excluded.phase_id,
                    expected_weight = excluded.expected_weight,
                    actual_weight = excluded.actual_weight
                "#,
            )?;
            for rec in series {
                written += stmt.execute(params![
                    key.bench_id,
                    key.cultivar_id,
                    key.planting_date,
                    rec.date,
                    rec.phase.id(),
                    round2(rec.predicted_weight),
                    rec.actual_weight.map(round2),
                ])?;
            }
        }
        tx.commit()?;
        tracing::info!(
            bench_id = key.bench_id,
            cultivar_id = key.cultivar_id,
            planting_date = %key.planting_date,
            rows = written,
            "saved growth records"
        );
        Ok(written)
    }

    /// Load the persisted series for a planting, ordered by measurement date.
    ///
    /// Day indices are rebuilt from row positions. Returns `None` when
    /// nothing is stored.
    pub fn load_series(&self, key: &SeriesKey) -> Result<Option<GrowthSeries>, GrowthError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            r#"
            SELECT
                measurement_date,
                phase_id,
                expected_weight,
                actual_weight
            FROM growth_record
            WHERE bench_id = ?1 AND cultivar_id = ?2 AND planting_date = ?3
            ORDER BY measurement_date ASC
            "#,
        )?;

        let rows = stmt
            .query_map(params![key.bench_id, key.cultivar_id, key.planting_date], |row| {
                Ok((
                    row.get::<_, NaiveDate>(0)?,
                    row.get::<_, u8>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if rows.is_empty() {
            return Ok(None);
        }

        let mut records = Vec::with_capacity(rows.len());
        for (idx, (date, phase_id, expected, actual)) in rows.into_iter().enumerate() {
            let phase = GrowthPhase::from_id(phase_id).ok_or_else(|| {
                GrowthError::ValidationError(format!("stored phase id {phase_id} is not 1, 2 or 3"))
            })?;
            records.push(DayRecord {
                day: idx as u32 + 1,
                date,
                predicted_weight: expected,
                phase,
                actual_weight: actual,
            });
        }
        tracing::debug!(rows = records.len(), "loaded growth records");
        GrowthSeries::from_records(records).map(Some)
    }

    /// Return stored records for a planting, or simulate `spec` when none exist.
    pub fn load_or_generate(
        &self,
        key: &SeriesKey,
        spec: &GrowthSpec,
        engine: &GrowthEngine,
    ) -> Result<StoredSeries, GrowthError> {
        match self.load_series(key)? {
            Some(series) => Ok(StoredSeries::Loaded(series)),
            None => Ok(StoredSeries::Generated(engine.simulate(spec)?)),
        }
    }

    /// Delete all records of a planting. Returns the number of rows removed.
    pub fn delete_series(&self, key: &SeriesKey) -> Result<usize, GrowthError> {
        let removed = self.conn().execute(
            "DELETE FROM growth_record WHERE bench_id = ?1 AND cultivar_id = ?2 AND planting_date = ?3",
            params![key.bench_id, key.cultivar_id, key.planting_date],
        )?;
        tracing::info!(rows = removed, "deleted growth records");
        Ok(removed)
    }

    /// Plantings with stored records, optionally limited to one bench.
    pub fn list_plantings(&self, bench_id: Option<u32>) -> Result<Vec<SeriesKey>, GrowthError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT bench_id, cultivar_id, planting_date
            FROM growth_record
            WHERE ?1 IS NULL OR bench_id = ?1
            ORDER BY planting_date ASC, bench_id ASC, cultivar_id ASC
            "#,
        )?;
        let keys = stmt
            .query_map(params![bench_id], |row| {
                Ok(SeriesKey {
                    bench_id: row.get(0)?,
                    cultivar_id: row.get(1)?,
                    planting_date: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    /// Number of rows stored for a planting.
    pub fn count_records(&self, key: &SeriesKey) -> Result<usize, GrowthError> {
        let count: Option<i64> = self
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM growth_record WHERE bench_id = ?1 AND cultivar_id = ?2 AND planting_date = ?3",
                params![key.bench_id, key.cultivar_id, key.planting_date],
                |row| row.get(0),
            )
            .optional()?;
        Ok(count.unwrap_or(0) as usize)
    }
}
