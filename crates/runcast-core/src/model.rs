// Statistical records supplied to the projection engine.
//
// Rates follow the leaderboard conventions: wOBA-scale values are decimals
// (0.315), percentages are 0-100 (K% 22.5, chase 31.0), and per-nine rates
// are per nine innings. Every optional metric is a `Stat`.

use crate::stat::Stat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Batting or throwing hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    #[serde(rename = "R", alias = "r", alias = "Right")]
    Right,
    #[serde(rename = "L", alias = "l", alias = "Left")]
    Left,
    #[serde(rename = "S", alias = "s", alias = "B", alias = "Switch")]
    Switch,
}

impl Hand {
    /// Parse a handedness code ("R", "L", "S", "B" or the spelled-out form).
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "R" | "RIGHT" => Some(Hand::Right),
            "L" | "LEFT" => Some(Hand::Left),
            "S" | "B" | "SWITCH" | "BOTH" => Some(Hand::Switch),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Hand::Right => "R",
            Hand::Left => "L",
            Hand::Switch => "S",
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Pitcher,
    Hitter,
}

/// A club and its park run-scoring factor (1.0 = neutral).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub abbreviation: String,
    pub league: String,
    pub division: String,
    pub park_factor: f64,
}

/// A rostered player. `team_id` is `None` for free agents.
///
/// Handedness is `None` when the source did not record it. A pitcher
/// with no recorded hand is treated as right-handed when choosing a split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub team_id: Option<String>,
    pub role: Role,
    pub bats: Option<Hand>,
    pub throws: Option<Hand>,
}

impl Player {
    pub fn throws_or_default(&self) -> Hand {
        self.throws.unwrap_or(Hand::Right)
    }
}

// ---------------------------------------------------------------------------
// Hitters
// ---------------------------------------------------------------------------

/// One side of a hitter's platoon split.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitLine {
    pub pa: Stat,
    pub woba: Stat,
    pub avg: Stat,
    pub obp: Stat,
    pub slg: Stat,
    pub k_rate: Stat,
    pub bb_rate: Stat,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatoonSplits {
    pub vs_left: Option<SplitLine>,
    pub vs_right: Option<SplitLine>,
}

impl PlatoonSplits {
    /// The split line against a pitcher throwing with `hand`.
    pub fn against(&self, hand: Hand) -> Option<&SplitLine> {
        match hand {
            Hand::Left => self.vs_left.as_ref(),
            // Switch-pitchers are read as right-handed.
            Hand::Right | Hand::Switch => self.vs_right.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vs_left.is_none() && self.vs_right.is_none()
    }
}

/// Plate-discipline metrics. For a pitcher these are the rates induced.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Discipline {
    /// Out-of-zone swing rate (O-Swing%).
    pub chase_rate: Stat,
    pub zone_contact_rate: Stat,
    pub swinging_strike_rate: Stat,
}

/// A hitter's results against one pitch type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchPerformance {
    pub pitch_type: String,
    pub pa: Stat,
    pub woba: Stat,
    pub xwoba: Stat,
    pub whiff_rate: Stat,
    pub run_value: Stat,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HitterProfile {
    pub pa: Stat,
    pub avg: Stat,
    pub obp: Stat,
    pub slg: Stat,
    pub ops: Stat,
    pub woba: Stat,
    pub xwoba: Stat,
    pub wrc_plus: Stat,
    pub drc_plus: Stat,
    pub k_rate: Stat,
    pub bb_rate: Stat,
    pub iso: Stat,
    pub barrel_rate: Stat,
    pub hard_hit_rate: Stat,
    pub avg_exit_velo: Stat,
    pub splits: PlatoonSplits,
    pub discipline: Option<Discipline>,
    /// Keyed by upper-case pitch type code ("FF", "SL", ...).
    pub vs_pitch: BTreeMap<String, PitchPerformance>,
}

// ---------------------------------------------------------------------------
// Pitchers
// ---------------------------------------------------------------------------

/// One pitch in a pitcher's arsenal. `usage_pct` is 0-100.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchArsenalEntry {
    pub pitch_type: String,
    pub pitch_name: String,
    pub usage_pct: Stat,
    pub woba_against: Stat,
    pub xwoba_against: Stat,
    pub whiff_rate: Stat,
    pub put_away_rate: Stat,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PitcherProfile {
    pub games: Stat,
    pub games_started: Stat,
    pub innings_pitched: Stat,
    pub era: Stat,
    pub xera: Stat,
    pub fip: Stat,
    pub xfip: Stat,
    pub whip: Stat,
    pub k_per_9: Stat,
    pub bb_per_9: Stat,
    pub hr_per_9: Stat,
    pub k_rate: Stat,
    pub bb_rate: Stat,
    pub gb_rate: Stat,
    pub hr_fb_rate: Stat,
    pub avg_innings_per_start: Stat,
    pub xwoba_against: Stat,
    pub hard_hit_against: Stat,
    pub whiff_rate: Stat,
    pub discipline: Option<Discipline>,
    pub arsenal: Vec<PitchArsenalEntry>,
}

// ---------------------------------------------------------------------------
// Catching and defense
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatcherProfile {
    pub player_id: String,
    pub team_id: Option<String>,
    pub framing_runs: Stat,
    pub blocking_runs: Stat,
    pub arm_runs: Stat,
    pub pop_time: Stat,
}

/// Fielding value summed over a team's fielders.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamDefenseAggregate {
    pub team_id: String,
    pub outs_above_average: f64,
    pub fielding_runs_prevented: f64,
    pub fielders: usize,
}

// ---------------------------------------------------------------------------
// Assembled records
// ---------------------------------------------------------------------------

/// A hitter with the profile the engine reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitterRecord {
    pub player: Player,
    pub profile: HitterProfile,
}

/// A pitcher with the profile the engine reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitcherRecord {
    pub player: Player,
    pub profile: PitcherProfile,
}

impl PitcherRecord {
    /// Stand-in for an unresolvable pitcher: no recorded stats, so every
    /// metric falls back to league average.
    pub fn league_average() -> Self {
        PitcherRecord {
            player: Player {
                id: String::new(),
                name: "Unknown".into(),
                team_id: None,
                role: Role::Pitcher,
                bats: None,
                throws: None,
            },
            profile: PitcherProfile::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_codes_parse() {
        assert_eq!(Hand::from_code("r"), Some(Hand::Right));
        assert_eq!(Hand::from_code(" L "), Some(Hand::Left));
        assert_eq!(Hand::from_code("B"), Some(Hand::Switch));
        assert_eq!(Hand::from_code("Switch"), Some(Hand::Switch));
        assert_eq!(Hand::from_code("X"), None);
    }

    #[test]
    fn hand_deserializes_from_codes() {
        let hands: Vec<Hand> = serde_json::from_str(r#"["R", "L", "S", "B", "Left"]"#).unwrap();
        assert_eq!(
            hands,
            vec![Hand::Right, Hand::Left, Hand::Switch, Hand::Switch, Hand::Left]
        );
    }

    #[test]
    fn splits_pick_side_by_pitcher_hand() {
        let splits = PlatoonSplits {
            vs_left: Some(SplitLine {
                woba: Stat::new(0.360),
                ..SplitLine::default()
            }),
            vs_right: Some(SplitLine {
                woba: Stat::new(0.300),
                ..SplitLine::default()
            }),
        };
        assert_eq!(splits.against(Hand::Left).unwrap().woba.get(), Some(0.360));
        assert_eq!(splits.against(Hand::Right).unwrap().woba.get(), Some(0.300));
        assert!(!splits.is_empty());
        assert!(PlatoonSplits::default().is_empty());
    }

    #[test]
    fn handedness_defaults_to_right() {
        let p = PitcherRecord::league_average().player;
        assert_eq!(p.throws_or_default(), Hand::Right);
        assert_eq!(p.name, "Unknown");
    }

    #[test]
    fn profile_deserializes_partial_record() {
        let json = r#"{"woba": "0.341", "k_rate": "19.5%", "xwoba": "-"}"#;
        let h: HitterProfile = serde_json::from_str(json).unwrap();
        assert_eq!(h.woba.get(), Some(0.341));
        assert_eq!(h.k_rate.get(), Some(19.5));
        assert!(!h.xwoba.is_present());
        assert!(h.splits.is_empty());
        assert!(h.vs_pitch.is_empty());
    }
}
