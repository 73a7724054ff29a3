// Repository-driven entry points.
//
// Resolves ids into records, reads the weight store exactly once per
// request, and hands plain data to the engine.

use runcast_core::model::{
    CatcherProfile, Hand, HitterRecord, PitcherRecord, TeamDefenseAggregate,
};
use runcast_core::player_id::make_player_id;
use runcast_core::repository::StatRepository;
use runcast_core::weights::WeightStore;
use serde::Deserialize;
use tracing::{debug, info};

use crate::matchup::{calculate_matchup, MatchupBreakdown, MatchupContext};
use crate::projection::{project_game, GameContext, GameProjection};

/// A game to project, by player and team id.
///
/// Lineup entries that do not resolve (including blank strings) become
/// empty slots. Ids may also be given as display names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameRequest {
    pub home_pitcher: Option<String>,
    pub away_pitcher: Option<String>,
    pub home_lineup: Vec<String>,
    pub away_lineup: Vec<String>,
    /// Overrides the home park.
    pub park_factor: Option<f64>,
    /// Defaults to the home starter's club.
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    /// Defaults to the first catcher listed for the club.
    pub home_catcher: Option<String>,
    pub away_catcher: Option<String>,
}

/// A single batter against a single pitcher.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MatchupRequest {
    pub pitcher: String,
    pub hitter: String,
    pub park_factor: Option<f64>,
    pub pitcher_hand: Option<Hand>,
    pub catcher: Option<String>,
    /// Club fielding behind the pitcher.
    pub fielding_team: Option<String>,
}

/// Project `request` against the current weights.
///
/// `default_park_factor` applies when the request gives no park factor
/// and no home club can be determined.
pub fn project_from_repository<R: StatRepository + ?Sized>(
    repo: &R,
    weights: &WeightStore,
    request: &GameRequest,
    default_park_factor: f64,
) -> GameProjection {
    let snapshot = weights.snapshot();

    let home_pitcher = request
        .home_pitcher
        .as_deref()
        .and_then(|id| resolve_pitcher(repo, id));
    let away_pitcher = request
        .away_pitcher
        .as_deref()
        .and_then(|id| resolve_pitcher(repo, id));
    let home_lineup = resolve_lineup(repo, &request.home_lineup);
    let away_lineup = resolve_lineup(repo, &request.away_lineup);

    let home_team = request
        .home_team
        .clone()
        .or_else(|| home_pitcher.as_ref().and_then(|p| p.player.team_id.clone()));
    let away_team = request
        .away_team
        .clone()
        .or_else(|| away_pitcher.as_ref().and_then(|p| p.player.team_id.clone()));

    let home_catcher = resolve_catcher(
        repo,
        request.home_catcher.as_deref(),
        home_team.as_deref(),
    );
    let away_catcher = resolve_catcher(
        repo,
        request.away_catcher.as_deref(),
        away_team.as_deref(),
    );
    let home_defense = home_team.as_deref().and_then(|t| team_defense(repo, t));
    let away_defense = away_team.as_deref().and_then(|t| team_defense(repo, t));

    let park_factor = request
        .park_factor
        .filter(|p| p.is_finite() && *p > 0.0)
        .or_else(|| {
            home_team
                .as_deref()
                .and_then(|t| repo.team(t))
                .map(|t| t.park_factor)
        })
        .unwrap_or(default_park_factor);

    let ctx = GameContext {
        home_pitcher_hand: None,
        away_pitcher_hand: None,
        home_catcher: home_catcher.as_ref(),
        away_catcher: away_catcher.as_ref(),
        home_defense: home_defense.as_ref(),
        away_defense: away_defense.as_ref(),
    };

    info!(
        "Projecting game: {:?} @ {:?} (park {:.2})",
        away_team, home_team, park_factor
    );

    project_game(
        home_pitcher.as_ref(),
        away_pitcher.as_ref(),
        &home_lineup,
        &away_lineup,
        park_factor,
        &snapshot,
        &ctx,
    )
}

/// Calculate one matchup against the current weights. `None` when either
/// id does not resolve.
pub fn matchup_from_repository<R: StatRepository + ?Sized>(
    repo: &R,
    weights: &WeightStore,
    request: &MatchupRequest,
    default_park_factor: f64,
) -> Option<MatchupBreakdown> {
    let snapshot = weights.snapshot();
    let pitcher = resolve_pitcher(repo, &request.pitcher)?;
    let hitter = resolve_hitter(repo, &request.hitter)?;

    let fielding_team = request
        .fielding_team
        .clone()
        .or_else(|| pitcher.player.team_id.clone());
    let catcher = resolve_catcher(repo, request.catcher.as_deref(), fielding_team.as_deref());
    let defense = fielding_team.as_deref().and_then(|t| team_defense(repo, t));

    let ctx = MatchupContext {
        park_factor: request
            .park_factor
            .filter(|p| p.is_finite() && *p > 0.0)
            .unwrap_or(default_park_factor),
        pitcher_hand: request.pitcher_hand,
        catcher: catcher.as_ref(),
        defense: defense.as_ref(),
    };
    Some(calculate_matchup(&pitcher, &hitter, &snapshot, &ctx))
}

// ---------------------------------------------------------------------------
// Resolution helpers
// ---------------------------------------------------------------------------

/// Candidate ids for a raw request entry: as given, then derived from it
/// as a display name.
fn candidate_ids(raw: &str) -> impl Iterator<Item = String> {
    let trimmed = raw.trim().to_string();
    let derived = make_player_id(&trimmed).filter(|d| *d != trimmed);
    std::iter::once(trimmed)
        .filter(|id| !id.is_empty())
        .chain(derived)
}

fn resolve_pitcher<R: StatRepository + ?Sized>(repo: &R, raw: &str) -> Option<PitcherRecord> {
    let found = candidate_ids(raw).find_map(|id| repo.pitcher_record(&id));
    if found.is_none() {
        debug!("pitcher {raw:?} not found; league average used");
    }
    found
}

fn resolve_hitter<R: StatRepository + ?Sized>(repo: &R, raw: &str) -> Option<HitterRecord> {
    candidate_ids(raw).find_map(|id| repo.hitter_record(&id))
}

fn resolve_lineup<R: StatRepository + ?Sized>(
    repo: &R,
    ids: &[String],
) -> Vec<Option<HitterRecord>> {
    ids.iter()
        .map(|raw| {
            let hitter = resolve_hitter(repo, raw);
            if hitter.is_none() {
                debug!("lineup entry {raw:?} not found; slot skipped");
            }
            hitter
        })
        .collect()
}

fn resolve_catcher<R: StatRepository + ?Sized>(
    repo: &R,
    explicit: Option<&str>,
    team: Option<&str>,
) -> Option<CatcherProfile> {
    match explicit {
        Some(raw) => candidate_ids(raw).find_map(|id| repo.catcher(&id)),
        None => team.and_then(|t| team_key(repo, t)).and_then(|t| repo.team_catcher(&t)),
    }
}

fn team_defense<R: StatRepository + ?Sized>(
    repo: &R,
    team: &str,
) -> Option<TeamDefenseAggregate> {
    team_key(repo, team).and_then(|t| repo.team_defense(&t))
}

/// Canonical id for a team given by id, abbreviation or name.
fn team_key<R: StatRepository + ?Sized>(repo: &R, team: &str) -> Option<String> {
    repo.team(team).map(|t| t.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use runcast_core::repository::MemoryRepository;
    use runcast_core::weights::ModelWeights;

    fn repo() -> MemoryRepository {
        let json = r#"{
            "players": [
                {"name": "Home Ace", "team": "SEA", "role": "pitcher", "throws": "R"},
                {"name": "Road Arm", "team": "BOS", "role": "pitcher", "throws": "L"},
                {"name": "Lead Off", "team": "BOS", "role": "hitter", "bats": "L"}
            ],
            "pitchers": [
                {"name": "Home Ace", "xfip": 3.1, "avg_innings_per_start": 6.2}
            ],
            "hitters": [
                {"name": "Lead Off", "woba": 0.350, "xwoba": 0.340}
            ],
            "catchers": [{"name": "Sea Catcher", "team": "SEA", "framing_runs": 6}],
            "fielders": [{"name": "Sea Glove", "team": "SEA", "outs_above_average": 15}]
        }"#;
        MemoryRepository::from_dataset(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn home_park_and_battery_come_from_home_starter_club() {
        let repo = repo();
        let store = WeightStore::in_memory(ModelWeights::default());
        let request = GameRequest {
            home_pitcher: Some("home_ace".into()),
            away_pitcher: Some("Road Arm".into()),
            away_lineup: vec!["lead_off".into(), "".into(), "nobody".into()],
            ..GameRequest::default()
        };
        let g = project_from_repository(&repo, &store, &request, 1.0);
        assert!((g.park_factor - 0.95).abs() < 1e-9);
        assert_eq!(g.away_matchups.len(), 1);
        assert_eq!(g.data_quality.skipped_slots, 2);
        let m = &g.away_matchups[0].breakdown;
        assert!(m.signals.catcher && m.signals.defense);
        assert!(g.away_pitcher.resolved);
        assert_eq!(g.away_pitcher.name, "Road Arm");
    }

    #[test]
    fn explicit_park_factor_wins() {
        let repo = repo();
        let store = WeightStore::in_memory(ModelWeights::default());
        let request = GameRequest {
            home_pitcher: Some("home_ace".into()),
            park_factor: Some(1.10),
            ..GameRequest::default()
        };
        let g = project_from_repository(&repo, &store, &request, 1.0);
        assert!((g.park_factor - 1.10).abs() < 1e-9);

        let neutral = GameRequest::default();
        let g = project_from_repository(&repo, &store, &neutral, 1.02);
        assert!((g.park_factor - 1.02).abs() < 1e-9);
    }

    #[test]
    fn weights_are_read_per_request() {
        let repo = repo();
        let store = WeightStore::in_memory(ModelWeights::default());
        let request = MatchupRequest {
            pitcher: "home_ace".into(),
            hitter: "lead_off".into(),
            ..MatchupRequest::default()
        };
        let before = matchup_from_repository(&repo, &store, &request, 1.0).unwrap();
        store.update("woba_to_runs", 5.0).unwrap();
        let after = matchup_from_repository(&repo, &store, &request, 1.0).unwrap();
        assert!(after.runs_per_pa > before.runs_per_pa);
        assert_eq!(before.projected_woba, after.projected_woba);
    }

    #[test]
    fn embedded_lowercase_pitch_tables_feed_the_arsenal_blend() {
        let json = r#"{
            "hitters": [
                {"name": "Lead Off", "woba": 0.320, "vs_pitch": {"ff": {"woba": 0.500, "pa": 40}}}
            ],
            "pitchers": [
                {"name": "Starter", "xfip": 4.0,
                 "arsenal": [{"pitch_type": "ff", "usage_pct": 60, "woba_against": 0.315}]}
            ],
            "arsenal": [
                {"name": "Starter", "pitch_type": "FF", "usage_pct": 60, "woba_against": 0.315}
            ]
        }"#;
        let repo = MemoryRepository::from_dataset(serde_json::from_str(json).unwrap());
        let store = WeightStore::in_memory(ModelWeights::default());
        let request = MatchupRequest {
            pitcher: "starter".into(),
            hitter: "lead_off".into(),
            ..MatchupRequest::default()
        };
        let b = matchup_from_repository(&repo, &store, &request, 1.0).unwrap();
        let arsenal = b.arsenal.expect("pitch-level data on both sides");
        assert_eq!(arsenal.lines.len(), 1);
        let ff = &arsenal.lines[0];
        assert_eq!(ff.pitch_type, "FF");
        assert!(ff.hitter_has_data);
        assert!((ff.hitter_woba - 0.500).abs() < 1e-12);
    }

    #[test]
    fn matchup_needs_both_players() {
        let repo = repo();
        let store = WeightStore::in_memory(ModelWeights::default());
        let request = MatchupRequest {
            pitcher: "ghost".into(),
            hitter: "lead_off".into(),
            ..MatchupRequest::default()
        };
        assert!(matchup_from_repository(&repo, &store, &request, 1.0).is_none());
    }

    #[test]
    fn names_resolve_like_ids() {
        let ids: Vec<String> = candidate_ids(" Lead Off ").collect();
        assert_eq!(ids, vec!["Lead Off".to_string(), "lead_off".to_string()]);
        let ids: Vec<String> = candidate_ids("lead_off").collect();
        assert_eq!(ids, vec!["lead_off".to_string()]);
        assert_eq!(candidate_ids("  ").count(), 0);
    }
}
