// Single batter-vs-pitcher projection.
//
// Starts from the hitter's baseline wOBA, applies an ordered chain of
// additive adjustments, clamps the result and converts it to expected runs
// per plate appearance. Every step is recorded with the values substituted
// into it so the whole figure can be audited.

use runcast_core::model::{
    CatcherProfile, Hand, HitterRecord, PitcherRecord, TeamDefenseAggregate,
};
use runcast_core::weights::ModelWeights;
use serde::Serialize;

use crate::arsenal::{calculate_arsenal_matchup, ArsenalMatchup};
use crate::league::{
    chase_rate, hitter_k_rate, hitter_overall_woba, pitcher_k_per_9, pitcher_xfip, split_woba,
    Source, LEAGUE_XFIP, MAX_PROJECTED_WOBA, MAX_RUNS_PER_PA, MIN_PROJECTED_WOBA,
    MIN_RUNS_PER_PA,
};

// ---------------------------------------------------------------------------
// Fixed interaction constants
// ---------------------------------------------------------------------------

const HIGH_CHASE: f64 = 35.0;
const LOW_CHASE: f64 = 28.0;
const CHASE_PENALTY: f64 = -0.008;
const DISCIPLINE_BONUS: f64 = 0.005;

const HIGH_K_PER_9: f64 = 10.0;
const HIGH_K_RATE: f64 = 25.0;
const LOW_K_PER_9: f64 = 7.0;
const LOW_K_RATE: f64 = 18.0;

/// wOBA per framing run saved by the receiving catcher.
const FRAMING_COEFFICIENT: f64 = 0.0005;
/// wOBA per out above average of the fielding team.
const DEFENSE_COEFFICIENT: f64 = 0.0002;

const HITTER_ADVANTAGE_WOBA: f64 = 0.340;
const PITCHER_ADVANTAGE_WOBA: f64 = 0.290;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Per-matchup inputs that are not part of either player's record.
#[derive(Debug, Clone, Copy)]
pub struct MatchupContext<'a> {
    pub park_factor: f64,
    /// Overrides the pitcher record's throwing hand.
    pub pitcher_hand: Option<Hand>,
    /// Catcher receiving for the pitcher.
    pub catcher: Option<&'a CatcherProfile>,
    /// Defense behind the pitcher.
    pub defense: Option<&'a TeamDefenseAggregate>,
}

impl Default for MatchupContext<'_> {
    fn default() -> Self {
        MatchupContext {
            park_factor: 1.0,
            pitcher_hand: None,
            catcher: None,
            defense: None,
        }
    }
}

impl MatchupContext<'_> {
    /// A neutral park with no optional signals.
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn with_park(park_factor: f64) -> Self {
        MatchupContext {
            park_factor,
            ..Self::default()
        }
    }
}

/// One recorded calculation step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupStep {
    pub name: &'static str,
    pub formula: String,
    pub values: String,
    pub result: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Advantage {
    Hitter,
    Pitcher,
    Neutral,
}

impl Advantage {
    fn classify(projected_woba: f64) -> Self {
        if projected_woba > HITTER_ADVANTAGE_WOBA {
            Advantage::Hitter
        } else if projected_woba < PITCHER_ADVANTAGE_WOBA {
            Advantage::Pitcher
        } else {
            Advantage::Neutral
        }
    }
}

/// Which optional signals fed the projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SignalsUsed {
    pub platoon_split: bool,
    pub arsenal: bool,
    pub discipline: bool,
    pub catcher: bool,
    pub defense: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupBreakdown {
    pub hitter_id: String,
    pub hitter_name: String,
    pub pitcher_id: String,
    pub pitcher_name: String,
    pub steps: Vec<MatchupStep>,
    /// Per-pitch blend, when the arsenal step ran.
    pub arsenal: Option<ArsenalMatchup>,
    pub baseline_woba: f64,
    /// Plate appearances behind the platoon split used as the baseline.
    pub split_pa: Option<f64>,
    pub total_adjustment: f64,
    pub projected_woba: f64,
    pub runs_per_pa: f64,
    pub advantage: Advantage,
    pub signals: SignalsUsed,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Project `hitter` against `pitcher` under `weights`.
///
/// Total: missing data falls back to league averages, a non-positive or
/// non-finite park factor is read as neutral, and the result always lies
/// inside [`MIN_PROJECTED_WOBA`]..=[`MAX_PROJECTED_WOBA`] and
/// [`MIN_RUNS_PER_PA`]..=[`MAX_RUNS_PER_PA`].
pub fn calculate_matchup(
    pitcher: &PitcherRecord,
    hitter: &HitterRecord,
    weights: &ModelWeights,
    ctx: &MatchupContext<'_>,
) -> MatchupBreakdown {
    let hp = &hitter.profile;
    let pp = &pitcher.profile;
    let mut steps = Vec::with_capacity(12);
    let mut signals = SignalsUsed::default();

    let known_pitcher_hand = ctx.pitcher_hand.or(pitcher.player.throws);
    let facing = ctx
        .pitcher_hand
        .unwrap_or_else(|| pitcher.player.throws_or_default());

    // 1. Baseline
    let split = hp
        .splits
        .against(facing)
        .and_then(|line| split_woba(line).map(|w| (w, line.pa.get())));
    let (baseline, split_pa) = match split {
        Some((woba, pa)) => {
            signals.platoon_split = true;
            let sample = pa.map_or_else(|| "unknown".to_string(), |pa| format!("{pa:.0}"));
            steps.push(MatchupStep {
                name: "Baseline wOBA",
                formula: format!("wOBA vs {}HP (platoon split)", hand_letter(facing)),
                values: format!("{woba:.3} over {sample} PA"),
                result: woba,
            });
            (woba, pa)
        }
        None => {
            let (woba, xwoba, source) = hitter_overall_woba(hp);
            let baseline = (woba + xwoba) / 2.0;
            let formula = match source {
                Source::LeagueAverage => "League average wOBA (no hitter data)",
                _ => "(wOBA + xwOBA) / 2",
            };
            steps.push(MatchupStep {
                name: "Baseline wOBA",
                formula: formula.to_string(),
                values: format!("({woba:.3} + {xwoba:.3}) / 2"),
                result: baseline,
            });
            (baseline, None)
        }
    };

    // 2. Arsenal
    let arsenal = if pp.arsenal.is_empty() || hp.vs_pitch.is_empty() {
        None
    } else {
        Some(calculate_arsenal_matchup(&pp.arsenal, &hp.vs_pitch))
    };
    let arsenal_adj = match arsenal.as_ref().and_then(|a| a.weighted_woba) {
        Some(arsenal_woba) => {
            signals.arsenal = true;
            let adj = (arsenal_woba - baseline) * weights.arsenal_weight;
            steps.push(MatchupStep {
                name: "Arsenal Matchup",
                formula: format!("(Arsenal wOBA - Baseline) × {}", weights.arsenal_weight),
                values: format!(
                    "({arsenal_woba:.3} - {baseline:.3}) × {}",
                    weights.arsenal_weight
                ),
                result: adj,
            });
            adj
        }
        None => {
            steps.push(skipped("Arsenal Matchup", "no pitch-level data for both players"));
            0.0
        }
    };

    // 3. Pitcher quality. A lower xFIP than league pulls the hitter down.
    let (xfip, xfip_source) = pitcher_xfip(pp);
    let pitcher_stat = match xfip_source {
        Source::Recorded => "Pitcher xFIP",
        Source::Fallback => "Pitcher ERA (no xFIP)",
        Source::LeagueAverage => "League xFIP (no pitcher data)",
    };
    let pitcher_adj = (xfip - LEAGUE_XFIP) * weights.pitcher_quality_factor;
    steps.push(MatchupStep {
        name: "Pitcher Quality",
        formula: format!(
            "({pitcher_stat} - League xFIP) × {}",
            weights.pitcher_quality_factor
        ),
        values: format!(
            "({xfip:.2} - {LEAGUE_XFIP:.2}) × {}",
            weights.pitcher_quality_factor
        ),
        result: pitcher_adj,
    });

    // 4. Handedness. A split baseline already carries it.
    let platoon_adj = match (signals.platoon_split, hitter.player.bats, known_pitcher_hand) {
        (false, Some(bats), Some(throws)) => {
            let throws = if throws == Hand::Switch { Hand::Right } else { throws };
            let (adj, label) = if bats == Hand::Switch || bats != throws {
                (weights.platoon_advantage, "Platoon advantage")
            } else {
                (weights.platoon_disadvantage, "Same-side matchup")
            };
            steps.push(MatchupStep {
                name: "Platoon",
                formula: label.to_string(),
                values: format!("bats {bats} vs throws {throws}"),
                result: adj,
            });
            adj
        }
        (true, ..) => {
            steps.push(skipped("Platoon", "included in split baseline"));
            0.0
        }
        _ => {
            steps.push(skipped("Platoon", "handedness not recorded"));
            0.0
        }
    };

    // 5. Discipline
    let discipline_adj = match (
        chase_rate(hp.discipline.as_ref()),
        chase_rate(pp.discipline.as_ref()),
    ) {
        (Some(h_chase), Some(p_chase)) => {
            signals.discipline = true;
            let (adj, label) = if h_chase > HIGH_CHASE && p_chase > HIGH_CHASE {
                (CHASE_PENALTY, "Free swinger vs chase-inducer")
            } else if h_chase < LOW_CHASE && p_chase < LOW_CHASE {
                (DISCIPLINE_BONUS, "Patient hitter vs in-zone pitcher")
            } else {
                (0.0, "Neutral discipline matchup")
            };
            steps.push(MatchupStep {
                name: "Plate Discipline",
                formula: label.to_string(),
                values: format!("H chase {h_chase:.1}%, P chase {p_chase:.1}%"),
                result: adj,
            });
            adj
        }
        _ => {
            steps.push(skipped("Plate Discipline", "chase rates not recorded"));
            0.0
        }
    };

    // 6. Strikeout interaction
    let (k9, k9_source) = pitcher_k_per_9(pp);
    let k9_note = match k9_source {
        Source::Recorded => "",
        Source::Fallback => " (from K%)",
        Source::LeagueAverage => " (league)",
    };
    let k_rate = hitter_k_rate(hp);
    let (k_adj, k_label) = if k9 > HIGH_K_PER_9 && k_rate > HIGH_K_RATE {
        (weights.high_k_interaction, "High-K matchup")
    } else if k9 < LOW_K_PER_9 && k_rate < LOW_K_RATE {
        (weights.low_k_interaction, "Low-K matchup")
    } else {
        (0.0, "Neutral K matchup")
    };
    steps.push(MatchupStep {
        name: "K-Rate Interaction",
        formula: k_label.to_string(),
        values: format!("P K/9 {k9:.1}{k9_note}, H K% {k_rate:.1}"),
        result: k_adj,
    });

    // 7. Park
    let park = if ctx.park_factor.is_finite() && ctx.park_factor > 0.0 {
        ctx.park_factor
    } else {
        1.0
    };
    let park_adj = (park - 1.0) * weights.park_factor_multiplier;
    steps.push(MatchupStep {
        name: "Park Factor",
        formula: format!("(Park Factor - 1.0) × {}", weights.park_factor_multiplier),
        values: format!("({park:.2} - 1.0) × {}", weights.park_factor_multiplier),
        result: park_adj,
    });

    // 8. Catcher framing
    let framing_adj = match ctx.catcher.and_then(|c| c.framing_runs.get()) {
        Some(framing) => {
            signals.catcher = true;
            let adj = -framing * FRAMING_COEFFICIENT;
            steps.push(MatchupStep {
                name: "Catcher Framing",
                formula: format!("-Framing Runs × {FRAMING_COEFFICIENT}"),
                values: format!("-{framing:.1} × {FRAMING_COEFFICIENT}"),
                result: adj,
            });
            adj
        }
        None => {
            steps.push(skipped("Catcher Framing", "no catcher data"));
            0.0
        }
    };

    // 9. Team defense
    let defense_adj = match ctx.defense {
        Some(defense) => {
            signals.defense = true;
            let oaa = defense.outs_above_average;
            let adj = -oaa * DEFENSE_COEFFICIENT;
            steps.push(MatchupStep {
                name: "Team Defense",
                formula: format!("-Team OAA × {DEFENSE_COEFFICIENT}"),
                values: format!("-{oaa:.1} × {DEFENSE_COEFFICIENT}"),
                result: adj,
            });
            adj
        }
        None => {
            steps.push(skipped("Team Defense", "no defense data"));
            0.0
        }
    };

    // 10. Sum and clamp
    let total = arsenal_adj
        + pitcher_adj
        + platoon_adj
        + discipline_adj
        + k_adj
        + park_adj
        + framing_adj
        + defense_adj;
    steps.push(MatchupStep {
        name: "Total Adjustment",
        formula: "Arsenal + Pitcher + Platoon + Discipline + K-Rate + Park + Catcher + Defense"
            .to_string(),
        values: format!(
            "{arsenal_adj:.4} + {pitcher_adj:.4} + {platoon_adj:.4} + {discipline_adj:.4} + \
             {k_adj:.4} + {park_adj:.4} + {framing_adj:.4} + {defense_adj:.4}"
        ),
        result: total,
    });

    let projected = (baseline + total).clamp(MIN_PROJECTED_WOBA, MAX_PROJECTED_WOBA);
    steps.push(MatchupStep {
        name: "Projected wOBA",
        formula: format!(
            "Baseline + Adjustments (clamped {MIN_PROJECTED_WOBA:.3}-{MAX_PROJECTED_WOBA:.3})"
        ),
        values: format!("{baseline:.3} + {total:.4}"),
        result: projected,
    });

    // 11. Runs
    let runs_per_pa = ((projected - weights.woba_baseline) * weights.woba_to_runs)
        .clamp(MIN_RUNS_PER_PA, MAX_RUNS_PER_PA);
    steps.push(MatchupStep {
        name: "Runs per PA",
        formula: format!(
            "(Projected wOBA - {}) × {} (clamped {MIN_RUNS_PER_PA:.3}-{MAX_RUNS_PER_PA:.3})",
            weights.woba_baseline, weights.woba_to_runs
        ),
        values: format!(
            "({projected:.3} - {}) × {}",
            weights.woba_baseline, weights.woba_to_runs
        ),
        result: runs_per_pa,
    });

    MatchupBreakdown {
        hitter_id: hitter.player.id.clone(),
        hitter_name: hitter.player.name.clone(),
        pitcher_id: pitcher.player.id.clone(),
        pitcher_name: pitcher.player.name.clone(),
        steps,
        arsenal,
        baseline_woba: baseline,
        split_pa,
        total_adjustment: total,
        projected_woba: projected,
        runs_per_pa,
        advantage: Advantage::classify(projected),
        signals,
    }
}

fn skipped(name: &'static str, reason: &str) -> MatchupStep {
    MatchupStep {
        name,
        formula: format!("not applied: {reason}"),
        values: String::new(),
        result: 0.0,
    }
}

fn hand_letter(hand: Hand) -> &'static str {
    match hand {
        Hand::Left => "L",
        Hand::Right | Hand::Switch => "R",
    }
}
