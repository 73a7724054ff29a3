// Read interface the projection engine pulls its records through, and the
// in-memory implementation backed by a JSON dataset.
//
// The dataset is the boundary where raw exports become typed records:
// player ids are derived from names, team spellings are normalised, and
// every numeric cell passes through `Stat` so malformed values arrive as
// "absent".

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{
    CatcherProfile, Discipline, Hand, HitterProfile, HitterRecord, PitchArsenalEntry,
    PitchPerformance, PitcherProfile, PitcherRecord, Player, Role, SplitLine, Team,
    TeamDefenseAggregate,
};
use crate::player_id::make_player_id;
use crate::stat::Stat;
use crate::teams::{reference_teams, resolve_team_abbreviation};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse dataset {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Read interface
// ---------------------------------------------------------------------------

/// Lookups the engine needs. Implementations may fetch however they like;
/// only the shape of the returned records matters.
pub trait StatRepository {
    fn team(&self, id: &str) -> Option<Team>;
    fn teams(&self) -> Vec<Team>;
    fn player(&self, id: &str) -> Option<Player>;
    fn hitter_profile(&self, id: &str) -> Option<HitterProfile>;
    fn pitcher_profile(&self, id: &str) -> Option<PitcherProfile>;
    fn pitch_arsenal(&self, id: &str) -> Vec<PitchArsenalEntry>;
    fn hitter_vs_pitch(&self, id: &str) -> BTreeMap<String, PitchPerformance>;
    /// The hitter's split line against pitchers throwing with `hand`.
    fn platoon_split(&self, id: &str, hand: Hand) -> Option<SplitLine>;
    fn hitter_discipline(&self, id: &str) -> Option<Discipline>;
    fn pitcher_discipline(&self, id: &str) -> Option<Discipline>;
    fn catcher(&self, id: &str) -> Option<CatcherProfile>;
    /// The catcher who receives for `team_id`.
    fn team_catcher(&self, team_id: &str) -> Option<CatcherProfile>;
    fn team_defense(&self, team_id: &str) -> Option<TeamDefenseAggregate>;

    /// Assemble everything the calculator reads about a hitter. `None`
    /// only when the id does not name a player at all.
    fn hitter_record(&self, id: &str) -> Option<HitterRecord> {
        let player = self.player(id)?;
        let mut profile = self.hitter_profile(id).unwrap_or_default();
        profile.splits.vs_left = self.platoon_split(id, Hand::Left);
        profile.splits.vs_right = self.platoon_split(id, Hand::Right);
        profile.discipline = self.hitter_discipline(id);
        profile.vs_pitch = self.hitter_vs_pitch(id);
        Some(HitterRecord { player, profile })
    }

    /// Assemble everything the calculator reads about a pitcher.
    fn pitcher_record(&self, id: &str) -> Option<PitcherRecord> {
        let player = self.player(id)?;
        let mut profile = self.pitcher_profile(id).unwrap_or_default();
        profile.discipline = self.pitcher_discipline(id);
        profile.arsenal = self.pitch_arsenal(id);
        Some(PitcherRecord { player, profile })
    }
}

// ---------------------------------------------------------------------------
// Dataset rows
// ---------------------------------------------------------------------------

/// How a row names its player: an explicit id, or a display name the id
/// is derived from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlayerKey {
    pub player_id: Option<String>,
    pub name: Option<String>,
}

impl PlayerKey {
    fn resolve(&self) -> Option<String> {
        self.player_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .or_else(|| self.name.as_deref().and_then(make_player_id))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerRow {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub team: Option<String>,
    pub role: Role,
    #[serde(default, deserialize_with = "lenient_hand")]
    pub bats: Option<Hand>,
    #[serde(default, deserialize_with = "lenient_hand")]
    pub throws: Option<Hand>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HitterRow {
    #[serde(flatten)]
    pub key: PlayerKey,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(flatten)]
    pub profile: HitterProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PitcherRow {
    #[serde(flatten)]
    pub key: PlayerKey,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default, deserialize_with = "lenient_hand")]
    pub throws: Option<Hand>,
    #[serde(flatten)]
    pub profile: PitcherProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArsenalRow {
    #[serde(flatten)]
    pub key: PlayerKey,
    #[serde(flatten)]
    pub pitch: PitchArsenalEntry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VsPitchRow {
    #[serde(flatten)]
    pub key: PlayerKey,
    #[serde(flatten)]
    pub performance: PitchPerformance,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatcherRow {
    #[serde(flatten)]
    pub key: PlayerKey,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub framing_runs: Stat,
    #[serde(default)]
    pub blocking_runs: Stat,
    #[serde(default)]
    pub arm_runs: Stat,
    #[serde(default)]
    pub pop_time: Stat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FielderRow {
    #[serde(flatten)]
    pub key: PlayerKey,
    pub team: String,
    #[serde(default)]
    pub outs_above_average: Stat,
    #[serde(default)]
    pub fielding_runs_prevented: Stat,
}

/// Everything a dataset file may hold. All sections are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub teams: Vec<Team>,
    pub players: Vec<PlayerRow>,
    pub hitters: Vec<HitterRow>,
    pub pitchers: Vec<PitcherRow>,
    pub arsenal: Vec<ArsenalRow>,
    pub hitter_vs_pitch: Vec<VsPitchRow>,
    pub catchers: Vec<CatcherRow>,
    pub fielders: Vec<FielderRow>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let text = std::fs::read_to_string(path).map_err(|e| DatasetError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&text).map_err(|e| DatasetError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Hand codes from exports are sometimes blank or junk; those read as
/// "not recorded".
fn lenient_hand<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Hand>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Hand::from_code))
}

// ---------------------------------------------------------------------------
// MemoryRepository
// ---------------------------------------------------------------------------

/// A [`StatRepository`] over an in-memory dataset.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    teams: BTreeMap<String, Team>,
    players: HashMap<String, Player>,
    hitters: HashMap<String, HitterProfile>,
    pitchers: HashMap<String, PitcherProfile>,
    /// Catchers in dataset order per team; the first listed receives.
    catchers: HashMap<String, CatcherProfile>,
    catcher_order: Vec<String>,
    defense: HashMap<String, TeamDefenseAggregate>,
}

impl MemoryRepository {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let dataset = Dataset::load(path)?;
        let repo = Self::from_dataset(dataset);
        info!(
            "Loaded dataset {}: {} players, {} hitters, {} pitchers",
            path.display(),
            repo.players.len(),
            repo.hitters.len(),
            repo.pitchers.len()
        );
        Ok(repo)
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        let mut repo = MemoryRepository::default();

        for team in reference_teams() {
            repo.teams.insert(team.id.clone(), team);
        }
        for team in dataset.teams {
            repo.teams.insert(team.id.clone(), team);
        }

        for row in dataset.players {
            let Some(id) = row
                .id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .or_else(|| make_player_id(&row.name))
            else {
                warn!("skipping player row with blank name");
                continue;
            };
            let team_id = repo.team_id_for(row.team.as_deref());
            // Later rows for the same id win.
            repo.players.insert(
                id.clone(),
                Player {
                    id,
                    name: row.name.trim().to_string(),
                    team_id,
                    role: row.role,
                    bats: row.bats,
                    throws: row.throws,
                },
            );
        }

        for row in dataset.hitters {
            let Some(id) = repo.ensure_player(&row.key, row.team.as_deref(), Role::Hitter) else {
                warn!("skipping hitter row without a player id or name");
                continue;
            };
            let mut profile = row.profile;
            profile.vs_pitch = normalise_vs_pitch(std::mem::take(&mut profile.vs_pitch));
            repo.hitters.insert(id, profile);
        }

        for row in dataset.pitchers {
            let Some(id) = repo.ensure_player(&row.key, row.team.as_deref(), Role::Pitcher) else {
                warn!("skipping pitcher row without a player id or name");
                continue;
            };
            if let (Some(hand), Some(player)) = (row.throws, repo.players.get_mut(&id)) {
                player.throws = Some(hand);
            }
            let mut profile = row.profile;
            let mut arsenal = Vec::with_capacity(profile.arsenal.len());
            for pitch in std::mem::take(&mut profile.arsenal) {
                merge_pitch(&mut arsenal, pitch);
            }
            profile.arsenal = arsenal;
            repo.pitchers.insert(id, profile);
        }

        for row in dataset.arsenal {
            let Some(id) = repo.ensure_player(&row.key, None, Role::Pitcher) else {
                warn!("skipping arsenal row without a player id or name");
                continue;
            };
            merge_pitch(&mut repo.pitchers.entry(id).or_default().arsenal, row.pitch);
        }

        for row in dataset.hitter_vs_pitch {
            let Some(id) = repo.ensure_player(&row.key, None, Role::Hitter) else {
                warn!("skipping vs-pitch row without a player id or name");
                continue;
            };
            let mut performance = row.performance;
            performance.pitch_type = pitch_type_code(&performance.pitch_type);
            repo.hitters
                .entry(id)
                .or_default()
                .vs_pitch
                .insert(performance.pitch_type.clone(), performance);
        }

        for row in dataset.catchers {
            let Some(id) = repo.ensure_player(&row.key, row.team.as_deref(), Role::Hitter) else {
                warn!("skipping catcher row without a player id or name");
                continue;
            };
            let team_id = repo
                .team_id_for(row.team.as_deref())
                .or_else(|| repo.players.get(&id).and_then(|p| p.team_id.clone()));
            if !repo.catchers.contains_key(&id) {
                repo.catcher_order.push(id.clone());
            }
            repo.catchers.insert(
                id.clone(),
                CatcherProfile {
                    player_id: id,
                    team_id,
                    framing_runs: row.framing_runs,
                    blocking_runs: row.blocking_runs,
                    arm_runs: row.arm_runs,
                    pop_time: row.pop_time,
                },
            );
        }

        for row in dataset.fielders {
            let Some(team_id) = repo.team_id_for(Some(&row.team)) else {
                debug!("fielder row for unknown team {:?} ignored", row.team);
                continue;
            };
            let aggregate = repo
                .defense
                .entry(team_id.clone())
                .or_insert_with(|| TeamDefenseAggregate {
                    team_id,
                    ..TeamDefenseAggregate::default()
                });
            aggregate.outs_above_average += row.outs_above_average.get().unwrap_or(0.0);
            aggregate.fielding_runs_prevented += row.fielding_runs_prevented.get().unwrap_or(0.0);
            aggregate.fielders += 1;
        }

        repo
    }

    /// Canonical team id for a raw team cell, or `None` for free agents
    /// and unknown clubs.
    fn team_id_for(&self, raw: Option<&str>) -> Option<String> {
        let raw = raw?.trim();
        if let Some(abbr) = resolve_team_abbreviation(raw) {
            return Some(abbr.to_string());
        }
        self.teams
            .values()
            .find(|t| {
                t.id.eq_ignore_ascii_case(raw)
                    || t.abbreviation.eq_ignore_ascii_case(raw)
                    || t.name.eq_ignore_ascii_case(raw)
            })
            .map(|t| t.id.clone())
    }

    /// Resolve a row's player, creating a bare player record when the row
    /// names someone the players section did not list.
    fn ensure_player(&mut self, key: &PlayerKey, team: Option<&str>, role: Role) -> Option<String> {
        let id = key.resolve()?;
        let team_id = self.team_id_for(team);
        match self.players.get_mut(&id) {
            Some(player) => {
                if player.team_id.is_none() {
                    player.team_id = team_id;
                }
            }
            None => {
                let name = key.name.clone().unwrap_or_else(|| id.clone());
                self.players.insert(
                    id.clone(),
                    Player {
                        id: id.clone(),
                        name,
                        team_id,
                        role,
                        bats: None,
                        throws: None,
                    },
                );
            }
        }
        Some(id)
    }
}

/// Upper-case pitch type code ("ff " -> "FF").
fn pitch_type_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Add `pitch` to `arsenal`, replacing an earlier entry for the same pitch
/// type.
fn merge_pitch(arsenal: &mut Vec<PitchArsenalEntry>, mut pitch: PitchArsenalEntry) {
    pitch.pitch_type = pitch_type_code(&pitch.pitch_type);
    match arsenal.iter_mut().find(|p| p.pitch_type == pitch.pitch_type) {
        Some(existing) => *existing = pitch,
        None => arsenal.push(pitch),
    }
}

/// Re-key a hitter's embedded vs-pitch table by pitch type code. An entry
/// with no `pitch_type` of its own takes the map key.
fn normalise_vs_pitch(
    table: BTreeMap<String, PitchPerformance>,
) -> BTreeMap<String, PitchPerformance> {
    table
        .into_iter()
        .map(|(key, mut performance)| {
            let code = if performance.pitch_type.trim().is_empty() {
                pitch_type_code(&key)
            } else {
                pitch_type_code(&performance.pitch_type)
            };
            performance.pitch_type = code.clone();
            (code, performance)
        })
        .collect()
}

impl StatRepository for MemoryRepository {
    fn team(&self, id: &str) -> Option<Team> {
        self.teams
            .get(id)
            .cloned()
            .or_else(|| self.team_id_for(Some(id)).and_then(|tid| self.teams.get(&tid).cloned()))
    }

    fn teams(&self) -> Vec<Team> {
        self.teams.values().cloned().collect()
    }

    fn player(&self, id: &str) -> Option<Player> {
        self.players.get(id).cloned()
    }

    fn hitter_profile(&self, id: &str) -> Option<HitterProfile> {
        self.hitters.get(id).cloned()
    }

    fn pitcher_profile(&self, id: &str) -> Option<PitcherProfile> {
        self.pitchers.get(id).cloned()
    }

    fn pitch_arsenal(&self, id: &str) -> Vec<PitchArsenalEntry> {
        self.pitchers
            .get(id)
            .map(|p| p.arsenal.clone())
            .unwrap_or_default()
    }

    fn hitter_vs_pitch(&self, id: &str) -> BTreeMap<String, PitchPerformance> {
        self.hitters
            .get(id)
            .map(|h| h.vs_pitch.clone())
            .unwrap_or_default()
    }

    fn platoon_split(&self, id: &str, hand: Hand) -> Option<SplitLine> {
        self.hitters
            .get(id)
            .and_then(|h| h.splits.against(hand).copied())
    }

    fn hitter_discipline(&self, id: &str) -> Option<Discipline> {
        self.hitters.get(id).and_then(|h| h.discipline)
    }

    fn pitcher_discipline(&self, id: &str) -> Option<Discipline> {
        self.pitchers.get(id).and_then(|p| p.discipline)
    }

    fn catcher(&self, id: &str) -> Option<CatcherProfile> {
        self.catchers.get(id).cloned()
    }

    fn team_catcher(&self, team_id: &str) -> Option<CatcherProfile> {
        self.catcher_order
            .iter()
            .filter_map(|id| self.catchers.get(id))
            .find(|c| c.team_id.as_deref() == Some(team_id))
            .cloned()
    }

    fn team_defense(&self, team_id: &str) -> Option<TeamDefenseAggregate> {
        self.defense.get(team_id).cloned()
    }
}
