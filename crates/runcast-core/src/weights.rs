// Model weights: the named coefficients that parameterise the matchup
// calculator, and the store that serves consistent snapshots of them.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::db::WeightDatabase;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum WeightError {
    #[error("unknown model weight `{name}`")]
    UnknownWeight { name: String },

    #[error("model weight `{name}` must be finite, got {value}")]
    NonFinite { name: String, value: f64 },

    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

// ---------------------------------------------------------------------------
// ModelWeights
// ---------------------------------------------------------------------------

/// Every coefficient the calculator consumes. `Default` is the canonical
/// calibration; `woba_baseline` and `woba_to_runs` are jointly tuned so a
/// league-average matchup (wOBA 0.315) yields 0.115 runs per PA.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelWeights {
    pub pitcher_quality_factor: f64,
    pub platoon_advantage: f64,
    pub platoon_disadvantage: f64,
    pub high_k_interaction: f64,
    pub low_k_interaction: f64,
    pub park_factor_multiplier: f64,
    pub woba_to_runs: f64,
    pub woba_baseline: f64,
    pub arsenal_weight: f64,
}

impl Default for ModelWeights {
    fn default() -> Self {
        ModelWeights {
            pitcher_quality_factor: 0.015,
            platoon_advantage: 0.010,
            platoon_disadvantage: -0.015,
            high_k_interaction: -0.012,
            low_k_interaction: 0.010,
            park_factor_multiplier: 0.020,
            woba_to_runs: 4.6,
            woba_baseline: 0.290,
            arsenal_weight: 0.30,
        }
    }
}

impl ModelWeights {
    /// Weight names in storage order.
    pub const NAMES: [&'static str; 9] = [
        "pitcher_quality_factor",
        "platoon_advantage",
        "platoon_disadvantage",
        "high_k_interaction",
        "low_k_interaction",
        "park_factor_multiplier",
        "woba_to_runs",
        "woba_baseline",
        "arsenal_weight",
    ];

    pub fn is_known(name: &str) -> bool {
        Self::NAMES.contains(&name)
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut f64> {
        match name {
            "pitcher_quality_factor" => Some(&mut self.pitcher_quality_factor),
            "platoon_advantage" => Some(&mut self.platoon_advantage),
            "platoon_disadvantage" => Some(&mut self.platoon_disadvantage),
            "high_k_interaction" => Some(&mut self.high_k_interaction),
            "low_k_interaction" => Some(&mut self.low_k_interaction),
            "park_factor_multiplier" => Some(&mut self.park_factor_multiplier),
            "woba_to_runs" => Some(&mut self.woba_to_runs),
            "woba_baseline" => Some(&mut self.woba_baseline),
            "arsenal_weight" => Some(&mut self.arsenal_weight),
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        let mut copy = *self;
        copy.slot_mut(name).map(|v| *v)
    }

    /// Set one coefficient by name.
    pub fn set(&mut self, name: &str, value: f64) -> Result<(), WeightError> {
        if !value.is_finite() {
            return Err(WeightError::NonFinite {
                name: name.to_string(),
                value,
            });
        }
        let slot = self.slot_mut(name).ok_or_else(|| WeightError::UnknownWeight {
            name: name.to_string(),
        })?;
        *slot = value;
        Ok(())
    }

    /// `(name, value)` pairs in storage order.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        Self::NAMES
            .iter()
            .filter_map(|&name| self.get(name).map(|v| (name, v)))
            .collect()
    }

    /// Overlay a name -> value mapping on the defaults. Unknown names and
    /// non-finite values are skipped, so the result is always complete.
    pub fn from_map(map: &HashMap<String, f64>) -> Self {
        let mut weights = ModelWeights::default();
        for (name, &value) in map {
            if let Err(e) = weights.set(name, value) {
                warn!("ignoring stored weight: {}", e);
            }
        }
        weights
    }
}

// ---------------------------------------------------------------------------
// WeightStore
// ---------------------------------------------------------------------------

/// Shared, administratively adjustable weights.
///
/// Projections call [`WeightStore::snapshot`] once and compute against that
/// copy, so a concurrent [`WeightStore::update`] never splits a breakdown
/// across two calibrations.
pub struct WeightStore {
    current: RwLock<ModelWeights>,
    /// What `reset` restores: the defaults with config overrides applied.
    seed: ModelWeights,
    db: Option<WeightDatabase>,
}

impl WeightStore {
    /// A store with no persistence (tests, one-shot tools).
    pub fn in_memory(weights: ModelWeights) -> Self {
        WeightStore {
            current: RwLock::new(weights),
            seed: weights,
            db: None,
        }
    }

    /// Open a persistent store. `seed` (defaults overlaid with config
    /// overrides) fills in names the database does not hold yet; values
    /// already stored win.
    pub fn open(db: WeightDatabase, seed: &ModelWeights) -> anyhow::Result<Self> {
        db.seed(seed)?;
        let stored = db.load()?;
        let weights = ModelWeights::from_map(&stored);
        info!("Loaded {} model weights from database", stored.len());
        for (name, value) in seed.entries() {
            let current = weights.get(name).unwrap_or(value);
            if current != value {
                warn!(
                    "model weight {} is {} in the database, not the configured {}; \
                     run `weights reset` to apply the configuration",
                    name, current, value
                );
            }
        }
        Ok(WeightStore {
            current: RwLock::new(weights),
            seed: *seed,
            db: Some(db),
        })
    }

    /// A consistent copy of the current weights.
    pub fn snapshot(&self) -> ModelWeights {
        // ModelWeights is plain data, so a poisoned lock still holds a
        // complete value.
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Change one weight, persisting it first when backed by a database.
    pub fn update(&self, name: &str, value: f64) -> Result<(), WeightError> {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        let mut next = *guard;
        next.set(name, value)?;
        if let Some(db) = &self.db {
            db.upsert(name, value)?;
        }
        *guard = next;
        info!("Model weight {} set to {}", name, value);
        Ok(())
    }

    /// Restore every weight to the seed the store was opened with.
    pub fn reset(&self) -> Result<(), WeightError> {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        if let Some(db) = &self.db {
            db.replace_all(&self.seed)?;
        }
        *guard = self.seed;
        info!("Model weights reset to configured values");
        Ok(())
    }

    pub fn database(&self) -> Option<&WeightDatabase> {
        self.db.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_name() {
        let w = ModelWeights::default();
        let entries = w.entries();
        assert_eq!(entries.len(), ModelWeights::NAMES.len());
        assert_eq!(w.get("woba_to_runs"), Some(4.6));
        assert_eq!(w.get("woba_baseline"), Some(0.290));
        assert_eq!(w.get("arsenal_weight"), Some(0.30));
    }

    #[test]
    fn default_calibration_reproduces_league_runs_per_pa() {
        let w = ModelWeights::default();
        let runs = (0.315 - w.woba_baseline) * w.woba_to_runs;
        assert!((runs - 0.115).abs() < 1e-9);
    }

    #[test]
    fn get_unknown_is_none() {
        assert_eq!(ModelWeights::default().get("nope"), None);
    }

    #[test]
    fn set_rejects_unknown_and_non_finite() {
        let mut w = ModelWeights::default();
        assert!(matches!(
            w.set("bogus", 1.0),
            Err(WeightError::UnknownWeight { .. })
        ));
        assert!(matches!(
            w.set("woba_to_runs", f64::NAN),
            Err(WeightError::NonFinite { .. })
        ));
        assert_eq!(w, ModelWeights::default());
    }

    #[test]
    fn from_map_overlays_known_names_only() {
        let mut map = HashMap::new();
        map.insert("park_factor_multiplier".to_string(), 0.05);
        map.insert("legacy_weight".to_string(), 9.0);
        map.insert("woba_to_runs".to_string(), f64::INFINITY);
        let w = ModelWeights::from_map(&map);
        assert_eq!(w.park_factor_multiplier, 0.05);
        assert_eq!(w.woba_to_runs, 4.6);
        assert_eq!(w.pitcher_quality_factor, 0.015);
    }

    #[test]
    fn snapshot_is_isolated_from_later_updates() {
        let store = WeightStore::in_memory(ModelWeights::default());
        let before = store.snapshot();
        store.update("pitcher_quality_factor", 0.030).unwrap();
        assert_eq!(before.pitcher_quality_factor, 0.015);
        assert_eq!(store.snapshot().pitcher_quality_factor, 0.030);
    }

    #[test]
    fn failed_update_leaves_store_unchanged() {
        let store = WeightStore::in_memory(ModelWeights::default());
        assert!(store.update("bogus", 1.0).is_err());
        assert_eq!(store.snapshot(), ModelWeights::default());
    }

    #[test]
    fn reset_restores_defaults() {
        let store = WeightStore::in_memory(ModelWeights::default());
        store.update("arsenal_weight", 0.5).unwrap();
        store.reset().unwrap();
        assert_eq!(store.snapshot(), ModelWeights::default());
    }

    #[test]
    fn reset_reapplies_config_overrides_over_stored_values() {
        let db = WeightDatabase::open(":memory:").unwrap();
        db.upsert("woba_to_runs", 4.2).unwrap();

        let mut map = HashMap::new();
        map.insert("woba_to_runs".to_string(), 5.0);
        let seed = ModelWeights::from_map(&map);
        let store = WeightStore::open(db, &seed).unwrap();
        assert_eq!(store.snapshot().woba_to_runs, 4.2);

        store.reset().unwrap();
        assert_eq!(store.snapshot(), seed);
        let stored = store.database().unwrap().load().unwrap();
        assert_eq!(stored.get("woba_to_runs"), Some(&5.0));
    }

    #[test]
    fn persistent_store_round_trips_updates() {
        let db = WeightDatabase::open(":memory:").unwrap();
        let store = WeightStore::open(db, &ModelWeights::default()).unwrap();
        store.update("woba_to_runs", 4.8).unwrap();

        let stored = store.database().unwrap().load().unwrap();
        assert_eq!(stored.get("woba_to_runs"), Some(&4.8));
        assert_eq!(stored.len(), ModelWeights::NAMES.len());
    }

    #[test]
    fn stored_values_win_over_seed() {
        let db = WeightDatabase::open(":memory:").unwrap();
        db.upsert("park_factor_multiplier", 0.04).unwrap();

        let mut seed = ModelWeights::default();
        seed.park_factor_multiplier = 0.09;
        seed.arsenal_weight = 0.25;
        let store = WeightStore::open(db, &seed).unwrap();

        let w = store.snapshot();
        assert_eq!(w.park_factor_multiplier, 0.04);
        assert_eq!(w.arsenal_weight, 0.25);
    }
}
