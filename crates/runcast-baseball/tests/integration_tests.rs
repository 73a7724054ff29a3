// Integration tests for the projection engine.
//
// These load the fixture dataset through the repository and drive the
// public API end to end: id resolution, weight snapshots, matchup
// breakdowns and full-game projections.

use std::path::Path;

use runcast_baseball::league::{MAX_PROJECTED_WOBA, MIN_PROJECTED_WOBA, MIN_RUNS_PER_PA};
use runcast_baseball::matchup::Advantage;
use runcast_baseball::{
    matchup_from_repository, project_from_repository, GameProjection, GameRequest,
    MatchupRequest,
};
use runcast_core::db::WeightDatabase;
use runcast_core::repository::{MemoryRepository, StatRepository};
use runcast_core::weights::{ModelWeights, WeightStore};

// ===========================================================================
// Test helpers
// ===========================================================================

const FIXTURE: &str = "tests/fixtures/dataset.json";

fn fixture_repo() -> MemoryRepository {
    MemoryRepository::load(Path::new(FIXTURE)).expect("fixture dataset should load")
}

fn home_lineup() -> Vec<String> {
    [
        "julio_rodriguez",
        "jp_crawford",
        "cal_raleigh",
        "randy_arozarena",
        "mitch_garver",
        "luke_raley",
        "jorge_polanco",
        "dylan_moore",
        "victor_robles",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn away_lineup() -> Vec<String> {
    [
        "Jarren Duran",
        "Rafael Devers",
        "Alex Bregman",
        "Triston Casas",
        "Wilyer Abreu",
        "Masataka Yoshida",
        "Ceddanne Rafaela",
        "Connor Wong",
        "Trevor Story",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn full_request() -> GameRequest {
    GameRequest {
        home_pitcher: Some("logan_gilbert".into()),
        away_pitcher: Some("brayan_bello".into()),
        home_lineup: home_lineup(),
        away_lineup: away_lineup(),
        ..GameRequest::default()
    }
}

fn project(request: &GameRequest) -> GameProjection {
    let store = WeightStore::in_memory(ModelWeights::default());
    project_from_repository(&fixture_repo(), &store, request, 1.0)
}

// ===========================================================================
// Dataset boundary
// ===========================================================================

#[test]
fn fixture_players_resolve_by_derived_id() {
    let repo = fixture_repo();
    let julio = repo.player("julio_rodriguez").expect("diacritics folded");
    assert_eq!(julio.team_id.as_deref(), Some("SEA"));
    assert!(repo.player("jp_crawford").is_some());

    let gilbert = repo.pitcher_record("logan_gilbert").unwrap();
    assert_eq!(gilbert.player.team_id.as_deref(), Some("SEA"));
    assert_eq!(gilbert.profile.arsenal.len(), 5);
    assert_eq!(gilbert.profile.innings_pitched.get(), Some(208.2));
}

#[test]
fn malformed_cells_arrive_as_absent() {
    let repo = fixture_repo();
    let bello = repo.pitch_arsenal("brayan_bello");
    let ff = bello.iter().find(|p| p.pitch_type == "FF").unwrap();
    assert!(!ff.woba_against.is_present());

    let vs = repo.hitter_vs_pitch("julio_rodriguez");
    assert!(vs.values().all(|p| !p.xwoba.is_present()));
}

// ===========================================================================
// Full game
// ===========================================================================

#[test]
fn full_game_projection_is_complete_and_bounded() {
    let g = project(&full_request());

    assert_eq!(g.home_matchups.len(), 9);
    assert_eq!(g.away_matchups.len(), 9);
    assert!((g.park_factor - 0.95).abs() < 1e-9, "Seattle park from home starter");

    for m in g.home_matchups.iter().chain(&g.away_matchups) {
        let b = &m.breakdown;
        assert!((MIN_PROJECTED_WOBA..=MAX_PROJECTED_WOBA).contains(&b.projected_woba));
        assert!(b.runs_per_pa >= MIN_RUNS_PER_PA);
        assert!((m.expected_runs - b.runs_per_pa * m.expected_pa).abs() < 1e-12);
    }

    assert!((g.f5.total - (g.f5.home + g.f5.away)).abs() < 1e-12);
    assert!((g.full_game.total - (g.full_game.home + g.full_game.away)).abs() < 1e-12);
    assert!(g.full_game.home > g.f5.home);
    assert!(g.full_game.away > g.f5.away);
    assert!((0.0..=1.0).contains(&g.home_win_probability));
}

#[test]
fn starter_innings_drive_bullpen_split() {
    let g = project(&full_request());
    // Gilbert records 6.5 IP/start; Bello falls back to 162.1 / 28.
    assert!((g.home_pitcher.estimated_innings - 6.5).abs() < 1e-9);
    assert!((g.away_pitcher.estimated_innings - 162.1 / 28.0).abs() < 1e-9);
    assert!((g.bullpen.home_bullpen_innings - 2.5).abs() < 1e-9);

    let expected_away = g.f5.away * 6.5 / 5.0 + g.bullpen.away_runs;
    assert!((g.full_game.away - expected_away).abs() < 1e-9);
}

#[test]
fn optional_signals_are_counted() {
    let g = project(&full_request());
    let q = &g.data_quality;
    assert_eq!(q.pitchers_with_arsenal, 2);
    assert_eq!(q.skipped_slots, 0);
    // Even lineup slots carry platoon splits in the fixture.
    assert_eq!(q.hitters_with_platoon_split, 10);
    assert!(q.hitters_with_arsenal_matchup > 0);
    assert!(g.away_matchups.iter().all(|m| m.breakdown.signals.catcher));
    assert!(g.home_matchups.iter().all(|m| m.breakdown.signals.defense));
}

#[test]
fn partial_lineup_degrades_gracefully() {
    let full = project(&full_request());

    let mut request = full_request();
    request.away_lineup[2] = "not a player".into();
    request.away_lineup[6] = String::new();
    let partial = project(&request);

    assert_eq!(partial.away_matchups.len(), 7);
    assert_eq!(partial.data_quality.skipped_slots, 2);
    assert!(partial.f5.away < full.f5.away);
    assert_eq!(partial.f5.home, full.f5.home);
}

#[test]
fn unknown_pitcher_projects_as_league_average() {
    let mut request = full_request();
    request.home_pitcher = Some("mystery_arm".into());
    request.home_team = Some("SEA".into());
    let g = project(&request);

    assert!(!g.home_pitcher.resolved);
    assert_eq!(g.home_pitcher.name, "Unknown");
    assert_eq!(g.home_pitcher.estimated_innings, 5.0);
    assert_eq!(g.away_matchups.len(), 9);
    assert_eq!(g.data_quality.unresolved_pitchers, 1);
}

#[test]
fn projection_is_repeatable() {
    let a = project(&full_request());
    let b = project(&full_request());
    assert_eq!(a, b);
}

#[test]
fn projection_serializes_to_json() {
    let g = project(&full_request());
    let json = serde_json::to_value(&g).unwrap();
    assert!(json["f5"]["total"].is_number());
    let first = &json["away_matchups"][0];
    assert_eq!(first["lineup_position"], 1);
    assert!(first["steps"].as_array().unwrap().len() >= 10);
    assert!(first["advantage"].is_string());
}

// ===========================================================================
// Matchups and weights
// ===========================================================================

#[test]
fn single_matchup_reports_arsenal_lines() {
    let store = WeightStore::in_memory(ModelWeights::default());
    let request = MatchupRequest {
        pitcher: "logan_gilbert".into(),
        hitter: "Jarren Duran".into(),
        ..MatchupRequest::default()
    };
    let b = matchup_from_repository(&fixture_repo(), &store, &request, 1.0).unwrap();
    let arsenal = b.arsenal.expect("both players have pitch-level data");
    // The 4% knuckle curve is under the noise floor.
    assert_eq!(arsenal.lines.len(), 4);
    assert!(arsenal.lines.iter().all(|l| l.pitch_type != "KC"));
    assert!(matches!(
        b.advantage,
        Advantage::Hitter | Advantage::Neutral | Advantage::Pitcher
    ));
}

#[test]
fn persisted_weight_update_changes_next_projection_only() {
    let db = WeightDatabase::open(":memory:").unwrap();
    let store = WeightStore::open(db, &ModelWeights::default()).unwrap();
    let repo = fixture_repo();

    let before = project_from_repository(&repo, &store, &full_request(), 1.0);
    store.update("park_factor_multiplier", 0.0).unwrap();
    let after = project_from_repository(&repo, &store, &full_request(), 1.0);

    // Seattle suppresses runs, so removing the park term raises them.
    assert!(after.f5.total > before.f5.total);
    let stored = store.database().unwrap().load().unwrap();
    assert_eq!(stored.get("park_factor_multiplier"), Some(&0.0));
}
