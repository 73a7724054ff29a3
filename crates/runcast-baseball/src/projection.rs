// Lineup and game projection.
//
// Runs the matchup calculator over both lineups, weights each batter by the
// share of plate appearances its lineup slot sees, sums to a first-five
// total per side, then extends to nine innings: the starter's share is
// scaled from the F5 figure and the remaining innings are charged at the
// bullpen rate.

use std::borrow::Cow;

use runcast_core::model::{
    CatcherProfile, Hand, HitterRecord, PitcherRecord, TeamDefenseAggregate,
};
use runcast_core::weights::ModelWeights;
use serde::Serialize;
use tracing::{debug, warn};

use crate::league::{expected_starter_innings, LEAGUE_PA_PER_INNING, LEAGUE_RUNS_PER_INNING};
use crate::matchup::{calculate_matchup, MatchupBreakdown, MatchupContext};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Share of a lineup's plate appearances by batting-order slot. Sums to 1.
pub const LINEUP_PA_SHARES: [f64; 9] = [
    0.137, 0.130, 0.123, 0.116, 0.109, 0.103, 0.097, 0.093, 0.092,
];

/// Share reported for a slot past the ninth. `project_lineup` never
/// reaches one.
const EXTRA_SLOT_PA_SHARE: f64 = 0.09;

pub const F5_INNINGS: f64 = 5.0;
pub const GAME_INNINGS: f64 = 9.0;

/// Relievers allow slightly more than the league rate.
pub const BULLPEN_INEFFICIENCY: f64 = 1.05;

/// Fraction of the raw win-probability edge that is kept.
const WIN_PROBABILITY_SHRINK: f64 = 0.5;

/// Plate-appearance share for a zero-based lineup slot.
pub fn pa_share(slot: usize) -> f64 {
    LINEUP_PA_SHARES
        .get(slot)
        .copied()
        .unwrap_or(EXTRA_SLOT_PA_SHARE)
}

/// Plate appearances a lineup sees over the first five innings.
pub fn f5_plate_appearances() -> f64 {
    LEAGUE_PA_PER_INNING * F5_INNINGS
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Optional per-side signals. "Home" fields describe the home club's
/// battery and fielders, which the away lineup faces.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameContext<'a> {
    pub home_pitcher_hand: Option<Hand>,
    pub away_pitcher_hand: Option<Hand>,
    pub home_catcher: Option<&'a CatcherProfile>,
    pub away_catcher: Option<&'a CatcherProfile>,
    pub home_defense: Option<&'a TeamDefenseAggregate>,
    pub away_defense: Option<&'a TeamDefenseAggregate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitcherSummary {
    pub id: String,
    pub name: String,
    pub throws: Option<Hand>,
    pub estimated_innings: f64,
    pub era: Option<f64>,
    pub xfip: Option<f64>,
    pub k_per_9: Option<f64>,
    pub has_arsenal: bool,
    /// False when the slot named no known pitcher and league averages stood in.
    pub resolved: bool,
}

/// A batter's matchup placed in the lineup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineupMatchup {
    /// One-based batting-order slot.
    pub lineup_position: usize,
    pub pa_share: f64,
    pub expected_pa: f64,
    pub expected_runs: f64,
    #[serde(flatten)]
    pub breakdown: MatchupBreakdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunTotals {
    pub home: f64,
    pub away: f64,
    pub total: f64,
}

impl RunTotals {
    fn new(home: f64, away: f64) -> Self {
        RunTotals {
            home,
            away,
            total: home + away,
        }
    }
}

/// Innings each bullpen covers and the runs charged against it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BullpenBreakdown {
    pub runs_per_inning: f64,
    /// Innings pitched by the home bullpen (the away lineup bats against it).
    pub home_bullpen_innings: f64,
    pub away_bullpen_innings: f64,
    /// Runs the home lineup scores off the away bullpen.
    pub home_runs: f64,
    /// Runs the away lineup scores off the home bullpen.
    pub away_runs: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DataQuality {
    pub home_hitters: usize,
    pub away_hitters: usize,
    pub skipped_slots: usize,
    /// Lineup entries past the ninth slot.
    pub dropped_slots: usize,
    pub hitters_with_platoon_split: usize,
    pub hitters_with_arsenal_matchup: usize,
    pub pitchers_with_arsenal: usize,
    pub unresolved_pitchers: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameProjection {
    pub home_pitcher: PitcherSummary,
    pub away_pitcher: PitcherSummary,
    pub park_factor: f64,
    /// Home lineup against the away starter.
    pub home_matchups: Vec<LineupMatchup>,
    /// Away lineup against the home starter.
    pub away_matchups: Vec<LineupMatchup>,
    pub f5: RunTotals,
    /// Runs scored off each starter over the full expected outing.
    pub starter_runs: RunTotals,
    pub full_game: RunTotals,
    pub bullpen: BullpenBreakdown,
    pub home_win_probability: f64,
    pub data_quality: DataQuality,
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Project a full game.
///
/// A `None` pitcher is projected as league average; `None` lineup slots
/// contribute nothing. Never fails.
pub fn project_game(
    home_pitcher: Option<&PitcherRecord>,
    away_pitcher: Option<&PitcherRecord>,
    home_lineup: &[Option<HitterRecord>],
    away_lineup: &[Option<HitterRecord>],
    park_factor: f64,
    weights: &ModelWeights,
    ctx: &GameContext<'_>,
) -> GameProjection {
    let park = if park_factor.is_finite() && park_factor > 0.0 {
        park_factor
    } else {
        warn!("invalid park factor {park_factor}, using neutral");
        1.0
    };

    let home_starter = resolve_pitcher(home_pitcher);
    let away_starter = resolve_pitcher(away_pitcher);
    let home_ip = expected_starter_innings(&home_starter.profile);
    let away_ip = expected_starter_innings(&away_starter.profile);

    let away_ctx = MatchupContext {
        park_factor: park,
        pitcher_hand: ctx.home_pitcher_hand,
        catcher: ctx.home_catcher,
        defense: ctx.home_defense,
    };
    let home_ctx = MatchupContext {
        park_factor: park,
        pitcher_hand: ctx.away_pitcher_hand,
        catcher: ctx.away_catcher,
        defense: ctx.away_defense,
    };

    let away_matchups = project_lineup(&home_starter, away_lineup, weights, &away_ctx);
    let home_matchups = project_lineup(&away_starter, home_lineup, weights, &home_ctx);

    let f5 = RunTotals::new(side_runs(&home_matchups), side_runs(&away_matchups));

    // Each lineup faces the opposing starter for the full expected outing, then
    // that club's bullpen for whatever is left.
    let bullpen_rate = LEAGUE_RUNS_PER_INNING * BULLPEN_INEFFICIENCY;
    let home_bullpen_innings = (GAME_INNINGS - home_ip).max(0.0);
    let away_bullpen_innings = (GAME_INNINGS - away_ip).max(0.0);
    let bullpen = BullpenBreakdown {
        runs_per_inning: bullpen_rate,
        home_bullpen_innings,
        away_bullpen_innings,
        home_runs: bullpen_rate * away_bullpen_innings * park,
        away_runs: bullpen_rate * home_bullpen_innings * park,
    };

    let starter_runs = RunTotals::new(
        f5.home * (away_ip / F5_INNINGS),
        f5.away * (home_ip / F5_INNINGS),
    );
    let full_game = RunTotals::new(
        starter_runs.home + bullpen.home_runs,
        starter_runs.away + bullpen.away_runs,
    );

    let data_quality = assess_quality(
        home_lineup,
        away_lineup,
        &home_matchups,
        &away_matchups,
        [home_pitcher.is_some(), away_pitcher.is_some()],
        [&*home_starter, &*away_starter],
    );

    debug!(
        "projected {} @ {}: F5 {:.2}-{:.2}, full {:.2}-{:.2}",
        away_starter.player.name,
        home_starter.player.name,
        f5.away,
        f5.home,
        full_game.away,
        full_game.home
    );

    GameProjection {
        home_pitcher: summarize(&home_starter, home_ip, home_pitcher.is_some()),
        away_pitcher: summarize(&away_starter, away_ip, away_pitcher.is_some()),
        park_factor: park,
        home_matchups,
        away_matchups,
        f5,
        starter_runs,
        full_game,
        bullpen,
        home_win_probability: home_win_probability(full_game.home, full_game.away),
        data_quality,
    }
}

/// Project every resolvable batter in the first nine slots of `lineup`
/// against `pitcher`. Later slots would push the side past its F5
/// plate-appearance budget and are ignored.
pub fn project_lineup(
    pitcher: &PitcherRecord,
    lineup: &[Option<HitterRecord>],
    weights: &ModelWeights,
    ctx: &MatchupContext<'_>,
) -> Vec<LineupMatchup> {
    if lineup.len() > LINEUP_PA_SHARES.len() {
        warn!(
            "lineup has {} slots; slots past {} are dropped",
            lineup.len(),
            LINEUP_PA_SHARES.len()
        );
    }
    let f5_pa = f5_plate_appearances();

    lineup
        .iter()
        .take(LINEUP_PA_SHARES.len())
        .enumerate()
        .filter_map(|(slot, hitter)| {
            let hitter = hitter.as_ref()?;
            let breakdown = calculate_matchup(pitcher, hitter, weights, ctx);
            let share = pa_share(slot);
            let expected_pa = f5_pa * share;
            Some(LineupMatchup {
                lineup_position: slot + 1,
                pa_share: share,
                expected_pa,
                expected_runs: breakdown.runs_per_pa * expected_pa,
                breakdown,
            })
        })
        .collect()
}

fn side_runs(matchups: &[LineupMatchup]) -> f64 {
    matchups.iter().map(|m| m.expected_runs).sum()
}

fn resolve_pitcher(pitcher: Option<&PitcherRecord>) -> Cow<'_, PitcherRecord> {
    match pitcher {
        Some(p) => Cow::Borrowed(p),
        None => Cow::Owned(PitcherRecord::league_average()),
    }
}

fn summarize(pitcher: &PitcherRecord, innings: f64, resolved: bool) -> PitcherSummary {
    let p = &pitcher.profile;
    PitcherSummary {
        id: pitcher.player.id.clone(),
        name: pitcher.player.name.clone(),
        throws: pitcher.player.throws,
        estimated_innings: innings,
        era: p.era.get(),
        xfip: p.xfip.get(),
        k_per_9: p.k_per_9.get(),
        has_arsenal: !p.arsenal.is_empty(),
        resolved,
    }
}

/// Home share of projected runs, pulled halfway back toward a coin flip.
pub fn home_win_probability(home_runs: f64, away_runs: f64) -> f64 {
    let total = home_runs + away_runs;
    if total <= 0.0 {
        return 0.5;
    }
    let raw = home_runs / total;
    0.5 + (raw - 0.5) * WIN_PROBABILITY_SHRINK
}

fn assess_quality(
    home_lineup: &[Option<HitterRecord>],
    away_lineup: &[Option<HitterRecord>],
    home_matchups: &[LineupMatchup],
    away_matchups: &[LineupMatchup],
    pitchers_resolved: [bool; 2],
    starters: [&PitcherRecord; 2],
) -> DataQuality {
    let all = || home_matchups.iter().chain(away_matchups);
    let slots = LINEUP_PA_SHARES.len();
    let batting = home_lineup.len().min(slots) + away_lineup.len().min(slots);
    let mut quality = DataQuality {
        home_hitters: home_matchups.len(),
        away_hitters: away_matchups.len(),
        skipped_slots: batting - home_matchups.len() - away_matchups.len(),
        dropped_slots: home_lineup.len().saturating_sub(slots)
            + away_lineup.len().saturating_sub(slots),
        hitters_with_platoon_split: all().filter(|m| m.breakdown.signals.platoon_split).count(),
        hitters_with_arsenal_matchup: all().filter(|m| m.breakdown.signals.arsenal).count(),
        pitchers_with_arsenal: starters
            .iter()
            .filter(|p| !p.profile.arsenal.is_empty())
            .count(),
        unresolved_pitchers: pitchers_resolved.iter().filter(|r| !**r).count(),
        warnings: Vec::new(),
    };

    let hitters = quality.home_hitters + quality.away_hitters;
    if quality.skipped_slots > 0 {
        quality
            .warnings
            .push(format!("{} lineup slots had no player record", quality.skipped_slots));
    }
    if quality.dropped_slots > 0 {
        quality.warnings.push(format!(
            "{} lineup entries past the ninth slot were dropped",
            quality.dropped_slots
        ));
    }
    if quality.unresolved_pitchers > 0 {
        quality.warnings.push(format!(
            "{} starting pitchers unresolved; league average used",
            quality.unresolved_pitchers
        ));
    }
    if hitters > 0 && quality.hitters_with_platoon_split == 0 {
        quality
            .warnings
            .push("no hitter had a platoon split against the opposing starter".into());
    }
    if quality.pitchers_with_arsenal == 0 {
        quality
            .warnings
            .push("no starting pitcher had arsenal data".into());
    }
    for w in &quality.warnings {
        warn!("low data quality: {w}");
    }
    quality
}
