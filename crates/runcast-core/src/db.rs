// SQLite persistence for the administratively adjustable model weights.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::weights::ModelWeights;

/// SQLite-backed table of named model weights.
pub struct WeightDatabase {
    conn: Mutex<Connection>,
}

impl WeightDatabase {
    /// Open (or create) a SQLite database at `path` and ensure the weights
    /// table exists. Pass `":memory:"` for an ephemeral database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS model_weights (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                weight_name  TEXT NOT NULL UNIQUE,
                weight_value REAL NOT NULL,
                updated_at   TEXT NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Insert any weight from `weights` the table does not hold yet.
    /// Existing rows are left alone.
    pub fn seed(&self, weights: &ModelWeights) -> Result<()> {
        let conn = self.conn();
        let now = chrono::Utc::now().to_rfc3339();
        for (name, value) in weights.entries() {
            conn.execute(
                "INSERT OR IGNORE INTO model_weights (weight_name, weight_value, updated_at)
                 VALUES (?1, ?2, ?3)",
                params![name, value, now],
            )
            .with_context(|| format!("failed to seed weight {name}"))?;
        }
        Ok(())
    }

    /// Insert or overwrite a single weight.
    pub fn upsert(&self, name: &str, value: f64) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO model_weights (weight_name, weight_value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(weight_name) DO UPDATE SET
                weight_value = excluded.weight_value,
                updated_at = excluded.updated_at",
            params![name, value, chrono::Utc::now().to_rfc3339()],
        )
        .with_context(|| format!("failed to store weight {name}"))?;
        Ok(())
    }

    /// Replace the whole table with `weights` in one transaction.
    pub fn replace_all(&self, weights: &ModelWeights) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .context("failed to begin weight reset transaction")?;
        tx.execute("DELETE FROM model_weights", [])
            .context("failed to clear model weights")?;
        let now = chrono::Utc::now().to_rfc3339();
        for (name, value) in weights.entries() {
            tx.execute(
                "INSERT INTO model_weights (weight_name, weight_value, updated_at)
                 VALUES (?1, ?2, ?3)",
                params![name, value, now],
            )
            .with_context(|| format!("failed to store weight {name}"))?;
        }
        tx.commit().context("failed to commit weight reset")?;
        Ok(())
    }

    /// Every stored weight, including names this build no longer knows.
    pub fn load(&self) -> Result<HashMap<String, f64>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT weight_name, weight_value FROM model_weights")
            .context("failed to prepare load_weights query")?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)))
            .context("failed to query model weights")?;

        let mut weights = HashMap::new();
        for row in rows {
            let (name, value) = row.context("failed to read weight row")?;
            weights.insert(name, value);
        }
        Ok(weights)
    }

    /// When `name` was last written, as an RFC 3339 timestamp.
    pub fn updated_at(&self, name: &str) -> Result<Option<String>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT updated_at FROM model_weights WHERE weight_name = ?1")
            .context("failed to prepare updated_at query")?;
        let mut rows = stmt
            .query(params![name])
            .context("failed to query updated_at")?;
        match rows.next().context("failed to read updated_at row")? {
            Some(row) => Ok(Some(row.get(0).context("failed to read updated_at")?)),
            None => Ok(None),
        }
    }
}
