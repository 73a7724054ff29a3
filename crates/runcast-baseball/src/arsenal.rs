// Pitch-arsenal matchup: blends a pitcher's per-pitch results with the
// hitter's results against the same pitch types, weighted by usage.

use std::collections::BTreeMap;

use runcast_core::model::{PitchArsenalEntry, PitchPerformance};
use serde::Serialize;

use crate::league::{hitter_woba_vs_pitch, pitch_woba_allowed};

/// Pitches thrown this often or less (percent) are noise and skipped.
pub const USAGE_NOISE_FLOOR: f64 = 5.0;

/// One qualifying pitch in the arsenal blend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitchLine {
    pub pitch_type: String,
    pub pitch_name: String,
    pub usage_pct: f64,
    pub pitcher_woba: f64,
    pub hitter_woba: f64,
    /// Mean of the pitcher's and hitter's wOBA on this pitch.
    pub matchup_woba: f64,
    /// False when the hitter had no recorded results against this pitch.
    pub hitter_has_data: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArsenalMatchup {
    /// Usage-weighted matchup wOBA; `None` when no pitch qualified.
    pub weighted_woba: Option<f64>,
    pub total_usage: f64,
    pub lines: Vec<PitchLine>,
}

/// Blend `arsenal` against `vs_pitch` (keyed by upper-case pitch type).
pub fn calculate_arsenal_matchup(
    arsenal: &[PitchArsenalEntry],
    vs_pitch: &BTreeMap<String, PitchPerformance>,
) -> ArsenalMatchup {
    let mut lines = Vec::new();
    let mut weighted_sum = 0.0;
    let mut total_usage = 0.0;

    for pitch in arsenal {
        let Some(usage) = pitch.usage_pct.get().filter(|u| *u > USAGE_NOISE_FLOOR) else {
            continue;
        };
        let key = pitch.pitch_type.trim().to_uppercase();
        let performance = vs_pitch.get(&key);
        let pitcher_woba = pitch_woba_allowed(pitch);
        let hitter_woba = hitter_woba_vs_pitch(performance);
        let matchup_woba = (pitcher_woba + hitter_woba) / 2.0;

        weighted_sum += matchup_woba * usage;
        total_usage += usage;

        let pitch_name = if pitch.pitch_name.trim().is_empty() {
            key.clone()
        } else {
            pitch.pitch_name.clone()
        };
        lines.push(PitchLine {
            pitch_type: key,
            pitch_name,
            usage_pct: usage,
            pitcher_woba,
            hitter_woba,
            matchup_woba,
            hitter_has_data: performance
                .is_some_and(|p| p.woba.is_present() || p.xwoba.is_present()),
        });
    }

    let weighted_woba = (total_usage > 0.0).then(|| weighted_sum / total_usage);

    ArsenalMatchup {
        weighted_woba,
        total_usage,
        lines,
    }
}
