//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Clamp bands: projected wOBA and runs per PA never leave their bands
//! 2. Monotonicity: a better hitter never projects worse, a better pitcher
//!    never projects better for the hitter
//! 3. Lineup aggregation: identical batters sum to rate × F5 plate appearances

use proptest::prelude::*;
use runcast_baseball::league::{
    MAX_PROJECTED_WOBA, MAX_RUNS_PER_PA, MIN_PROJECTED_WOBA, MIN_RUNS_PER_PA,
};
use runcast_baseball::projection::{f5_plate_appearances, project_lineup};
use runcast_baseball::{calculate_matchup, MatchupContext};
use runcast_core::model::{HitterRecord, PitcherRecord, Player, Role};
use runcast_core::stat::Stat;
use runcast_core::weights::ModelWeights;

// ── Builders ─────────────────────────────────────────────────────────

fn hitter(woba: f64, k_rate: f64) -> HitterRecord {
    let mut h = HitterRecord {
        player: Player {
            id: "h".into(),
            name: "H".into(),
            team_id: None,
            role: Role::Hitter,
            bats: None,
            throws: None,
        },
        profile: Default::default(),
    };
    h.profile.woba = Stat::new(woba);
    h.profile.xwoba = Stat::new(woba);
    h.profile.k_rate = Stat::new(k_rate);
    h
}

fn pitcher(xfip: f64, k_per_9: f64) -> PitcherRecord {
    let mut p = PitcherRecord::league_average();
    p.profile.xfip = Stat::new(xfip);
    p.profile.k_per_9 = Stat::new(k_per_9);
    p
}

// ── Strategies ───────────────────────────────────────────────────────

fn arb_woba() -> impl Strategy<Value = f64> {
    0.0..0.800_f64
}

fn arb_xfip() -> impl Strategy<Value = f64> {
    0.5..9.0_f64
}

fn arb_park() -> impl Strategy<Value = f64> {
    0.80..1.30_f64
}

proptest! {
    #[test]
    fn outputs_stay_inside_clamp_bands(
        woba in arb_woba(),
        xfip in arb_xfip(),
        k9 in 3.0..15.0_f64,
        k_rate in 5.0..40.0_f64,
        park in arb_park(),
    ) {
        let b = calculate_matchup(
            &pitcher(xfip, k9),
            &hitter(woba, k_rate),
            &ModelWeights::default(),
            &MatchupContext::with_park(park),
        );
        prop_assert!(b.projected_woba >= MIN_PROJECTED_WOBA);
        prop_assert!(b.projected_woba <= MAX_PROJECTED_WOBA);
        prop_assert!(b.runs_per_pa >= MIN_RUNS_PER_PA);
        prop_assert!(b.runs_per_pa <= MAX_RUNS_PER_PA);
    }

    #[test]
    fn better_hitter_never_projects_fewer_runs(
        woba in arb_woba(),
        bump in 0.001..0.100_f64,
        xfip in arb_xfip(),
        park in arb_park(),
    ) {
        let w = ModelWeights::default();
        let ctx = MatchupContext::with_park(park);
        let p = pitcher(xfip, 9.0);
        let low = calculate_matchup(&p, &hitter(woba, 20.0), &w, &ctx);
        let high = calculate_matchup(&p, &hitter(woba + bump, 20.0), &w, &ctx);
        prop_assert!(high.projected_woba >= low.projected_woba);
        prop_assert!(high.runs_per_pa >= low.runs_per_pa);
    }

    #[test]
    fn better_pitcher_never_helps_the_hitter(
        woba in arb_woba(),
        xfip in 1.0..9.0_f64,
        drop in 0.01..1.0_f64,
    ) {
        let w = ModelWeights::default();
        let ctx = MatchupContext::neutral();
        let h = hitter(woba, 20.0);
        let worse = calculate_matchup(&pitcher(xfip, 9.0), &h, &w, &ctx);
        let better = calculate_matchup(&pitcher(xfip - drop, 9.0), &h, &w, &ctx);
        prop_assert!(better.projected_woba <= worse.projected_woba);
    }

    #[test]
    fn identical_lineup_sums_to_rate_times_f5_pa(woba in 0.250..0.420_f64) {
        let w = ModelWeights::default();
        let lineup: Vec<Option<HitterRecord>> = (0..9).map(|_| Some(hitter(woba, 20.0))).collect();
        let matchups = project_lineup(
            &PitcherRecord::league_average(),
            &lineup,
            &w,
            &MatchupContext::neutral(),
        );
        let r = matchups[0].breakdown.runs_per_pa;
        let total: f64 = matchups.iter().map(|m| m.expected_runs).sum();
        prop_assert!((total - r * f5_plate_appearances()).abs() < 1e-9);
    }
}
