// League-average constants and the fallback chains that resolve each metric
// the engine reads.
//
// Every chain is declared once here. Call sites ask for a metric and get a
// number back, plus where it came from when the breakdown reports it.

use runcast_core::model::{
    Discipline, HitterProfile, PitchArsenalEntry, PitchPerformance, PitcherProfile, SplitLine,
};
use runcast_core::stat::Stat;
use serde::Serialize;

// ---------------------------------------------------------------------------
// League averages
// ---------------------------------------------------------------------------

pub const LEAGUE_WOBA: f64 = 0.315;
pub const LEAGUE_XFIP: f64 = 4.10;
pub const LEAGUE_K_RATE: f64 = 22.5;
pub const LEAGUE_K_PER_9: f64 = 9.0;
pub const LEAGUE_RUNS_PER_INNING: f64 = 0.50;
pub const LEAGUE_PA_PER_INNING: f64 = 4.3;
/// Batters faced per nine innings, for converting K% to K/9.
pub const PA_PER_NINE: f64 = LEAGUE_PA_PER_INNING * 9.0;

// ---------------------------------------------------------------------------
// Clamp bands
// ---------------------------------------------------------------------------

/// Projected wOBA never leaves this band.
pub const MIN_PROJECTED_WOBA: f64 = 0.250;
pub const MAX_PROJECTED_WOBA: f64 = 0.420;

/// Runs per PA never leaves this band. The floor keeps every batter
/// contributing something.
pub const MIN_RUNS_PER_PA: f64 = 0.020;
pub const MAX_RUNS_PER_PA: f64 = 0.600;

// ---------------------------------------------------------------------------
// Fallback chains
// ---------------------------------------------------------------------------

/// First present value in `chain`.
pub fn first_present(chain: &[Stat]) -> Option<f64> {
    chain.iter().find_map(|s| s.get())
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Recorded,
    Fallback,
    LeagueAverage,
}

/// A hitter's overall baseline: the mean of wOBA and xwOBA, either one
/// standing in for the other, league average when both are absent.
pub fn hitter_overall_woba(profile: &HitterProfile) -> (f64, f64, Source) {
    match (profile.woba.get(), profile.xwoba.get()) {
        (Some(w), Some(x)) => (w, x, Source::Recorded),
        (Some(w), None) => (w, w, Source::Fallback),
        (None, Some(x)) => (x, x, Source::Fallback),
        (None, None) => (LEAGUE_WOBA, LEAGUE_WOBA, Source::LeagueAverage),
    }
}

/// wOBA from a platoon split, if the split recorded one.
pub fn split_woba(split: &SplitLine) -> Option<f64> {
    split.woba.get()
}

/// xFIP -> ERA -> league xFIP.
pub fn pitcher_xfip(profile: &PitcherProfile) -> (f64, Source) {
    if let Some(x) = profile.xfip.get() {
        (x, Source::Recorded)
    } else if let Some(era) = profile.era.get() {
        (era, Source::Fallback)
    } else {
        (LEAGUE_XFIP, Source::LeagueAverage)
    }
}

/// K/9 -> K% scaled to nine innings -> league K/9.
pub fn pitcher_k_per_9(profile: &PitcherProfile) -> (f64, Source) {
    if let Some(k9) = profile.k_per_9.get() {
        (k9, Source::Recorded)
    } else if let Some(k_pct) = profile.k_rate.get() {
        (k_pct * PA_PER_NINE / 100.0, Source::Fallback)
    } else {
        (LEAGUE_K_PER_9, Source::LeagueAverage)
    }
}

/// Hitter K% (0-100), league average when absent.
pub fn hitter_k_rate(profile: &HitterProfile) -> f64 {
    profile.k_rate.get().unwrap_or(LEAGUE_K_RATE)
}

/// Out-of-zone swing rate, if the discipline block recorded one.
pub fn chase_rate(discipline: Option<&Discipline>) -> Option<f64> {
    discipline.and_then(|d| d.chase_rate.get())
}

/// wOBA allowed on one pitch: wOBA -> xwOBA -> league average.
pub fn pitch_woba_allowed(pitch: &PitchArsenalEntry) -> f64 {
    first_present(&[pitch.woba_against, pitch.xwoba_against]).unwrap_or(LEAGUE_WOBA)
}

/// A hitter's wOBA against a pitch type: wOBA -> xwOBA -> league average.
pub fn hitter_woba_vs_pitch(performance: Option<&PitchPerformance>) -> f64 {
    performance
        .and_then(|p| first_present(&[p.woba, p.xwoba]))
        .unwrap_or(LEAGUE_WOBA)
}

/// Innings a starter is expected to cover: recorded IP/start, else total
/// IP over games started, else five. Clamped to [4, 7].
pub fn expected_starter_innings(profile: &PitcherProfile) -> f64 {
    const MIN_INNINGS: f64 = 4.0;
    const MAX_INNINGS: f64 = 7.0;
    const DEFAULT_INNINGS: f64 = 5.0;

    if let Some(avg) = profile.avg_innings_per_start.positive() {
        return avg.clamp(MIN_INNINGS, MAX_INNINGS);
    }
    match (profile.innings_pitched.get(), profile.games_started.positive()) {
        (Some(ip), Some(gs)) => (ip / gs).clamp(MIN_INNINGS, MAX_INNINGS),
        _ => DEFAULT_INNINGS,
    }
}
