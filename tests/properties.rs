//! Property tests for the progression engine
//!
//! Every domain goes through the same engine, so the invariants are checked
//! across all presets with arbitrary inputs and pinned rolls.

use proptest::prelude::*;

use proficiency::progression::factors::{repeat_factor, variety_factor, VarietyTuning};
use proficiency::progression::rolls::MAX_ROLL;
use proficiency::progression::{
    advance_proficiency, gain_instrument_proficiency, gain_magic_proficiency, gain_singing_proficiency,
    gain_summoning_proficiency, round2, AbilityEffect, Activity, EffectSignals, EventBase, GainPlan, GateParams, LevelMatchup,
    MagicEvent, MagicProfile, MaintenanceTick, Outcome, PerformanceEvent, ProfileSet, ScriptedRng, SingingEvent,
    SummonEvent, PROFICIENCY_MILESTONES,
};

// =============================================================================
// Strategies
// =============================================================================

fn activity() -> impl Strategy<Value = Activity> {
    prop_oneof![Just(Activity::Practice), Just(Activity::Spar), Just(Activity::Battle)]
}

fn outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![Just(Outcome::Success), Just(Outcome::Partial), Just(Outcome::Fail)]
}

/// Integer cap and a 2-decimal proficiency at or below it
fn p_and_cap() -> impl Strategy<Value = (f64, f64)> {
    (1u32..=100).prop_flat_map(|cap| (0u32..=cap * 100).prop_map(move |cents| (cents as f64 / 100.0, cap as f64)))
}

fn roll() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), Just(MAX_ROLL), 0.0f64..1.0]
}

/// Recent action ids drawn from a small pool
fn recent_ids() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(0u8..8, 0..12).prop_map(|ids| ids.into_iter().map(|i| format!("act:{}", i)).collect())
}

#[derive(Debug, Clone)]
struct Inputs {
    p: f64,
    cap: f64,
    activity: Activity,
    outcome: Outcome,
    actor: f64,
    opponent: f64,
    n_same: u32,
    recent: Vec<String>,
    is_new_use: bool,
    roll: f64,
}

fn inputs() -> impl Strategy<Value = Inputs> {
    (
        p_and_cap(),
        activity(),
        outcome(),
        1.0f64..60.0,
        -10.0f64..10.0,
        0u32..30,
        recent_ids(),
        any::<bool>(),
        roll(),
    )
        .prop_map(|((p, cap), activity, outcome, actor, diff, n_same, recent, is_new_use, roll)| Inputs {
            p,
            cap,
            activity,
            outcome,
            actor,
            opponent: (actor + diff).max(1.0),
            n_same,
            recent,
            is_new_use,
            roll,
        })
}

/// Run one event of every domain with the same inputs
fn every_domain(input: &Inputs, profiles: &ProfileSet) -> Vec<f64> {
    let base = EventBase::new(input.p, input.cap, input.activity, LevelMatchup::new(input.actor, input.opponent))
        .with_thresholds(&PROFICIENCY_MILESTONES);
    let mut results = Vec::with_capacity(7);

    for profile in [&profiles.magic, &profiles.weapon] {
        let mut event = MagicEvent::new(base, input.outcome);
        event.n_same = input.n_same;
        event.recent = &input.recent;
        event.is_new_use = input.is_new_use;
        let mut rng = ScriptedRng::constant(input.roll);
        results.push(gain_magic_proficiency(&event, profile, &mut rng));
    }

    let mut song = PerformanceEvent::new(base, input.outcome, 3);
    song.n_same = input.n_same;
    song.recent = &input.recent;
    results.push(gain_instrument_proficiency(&song, &profiles.instrument, &mut ScriptedRng::constant(input.roll)));

    let mut verse = SingingEvent::new(base, input.outcome, 5.0);
    verse.n_same = input.n_same;
    verse.recent = &input.recent;
    verse.enemies_pressuring = 2;
    verse.is_stop_event = input.is_new_use;
    results.push(gain_singing_proficiency(&verse, &profiles.singing, &mut ScriptedRng::constant(input.roll)));

    let effect = SummonEvent::AbilityEffect(AbilityEffect {
        base,
        outcome: input.outcome,
        was_effectful: true,
        signals: EffectSignals { effectiveness_pct: Some(80.0), targets_affected: Some(4), ..Default::default() },
        n_same_ability: input.n_same,
        recent_abilities: &input.recent,
    });
    let tick = SummonEvent::MaintenanceTick(MaintenanceTick {
        base,
        maintained_sec: 6.0,
        enemies_engaged: 3,
        allies_benefiting: 2,
        n_same_summon: input.n_same,
    });
    for event in [effect, tick] {
        results.push(gain_summoning_proficiency(&event, &profiles.summoning, &mut ScriptedRng::constant(input.roll)));
    }
    results
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn test_never_decreases_and_respects_cap(input in inputs()) {
        let profiles = ProfileSet::default();
        for next in every_domain(&input, &profiles) {
            prop_assert!(next >= input.p, "{} dropped below {}", next, input.p);
            prop_assert!(next <= input.cap, "{} exceeded cap {}", next, input.cap);
            prop_assert_eq!(round2(next), next);
        }
    }

    #[test]
    fn test_at_cap_is_unchanged(cap in 1u32..=100, mut input in inputs()) {
        input.p = cap as f64;
        input.cap = cap as f64;
        let profiles = ProfileSet::default();
        for next in every_domain(&input, &profiles) {
            prop_assert_eq!(next, input.p);
        }
    }

    #[test]
    fn test_zero_context_weight_short_circuits(mut input in inputs()) {
        input.activity = Activity::Practice;
        let mut profiles = ProfileSet::default();
        profiles.magic.curve.context.practice = 0.0;
        profiles.weapon.curve.context.practice = 0.0;
        profiles.instrument.curve.context.practice = 0.0;
        profiles.singing.curve.context.practice = 0.0;
        profiles.summoning.curve.context.practice = 0.0;
        for next in every_domain(&input, &profiles) {
            prop_assert_eq!(next, input.p);
        }
    }

    #[test]
    fn test_zero_weight_consumes_no_roll((p, cap) in p_and_cap(), n_same in 0u32..30) {
        let mut profile = MagicProfile::spells();
        profile.curve.context.battle = 0.0;
        let mut event = MagicEvent::new(EventBase::new(p, cap, Activity::Battle, LevelMatchup::even(10.0)), Outcome::Success);
        event.n_same = n_same;
        event.is_new_use = true;
        let mut rng = ScriptedRng::constant(0.0);
        prop_assert_eq!(gain_magic_proficiency(&event, &profile, &mut rng), p);
        prop_assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn test_gate_boundaries(cents in 0u32..5000, delta_milli in 21u32..60) {
        let p = cents as f64 / 100.0;
        let cap = p + 10.0;
        let delta = delta_milli as f64 / 1000.0;
        let gate = GateParams::new(0.020, 0.060, 0.12);
        let plan = GainPlan::new(delta, gate);
        prop_assert!(gate.probability(delta) < 1.0);

        let mut low = ScriptedRng::constant(0.0);
        prop_assert_eq!(advance_proficiency(p, cap, &plan, &mut low), round2(p + delta));

        let mut high = ScriptedRng::constant(MAX_ROLL);
        prop_assert_eq!(advance_proficiency(p, cap, &plan, &mut high), p);
    }

    #[test]
    fn test_large_delta_always_applies(cents in 0u32..5000, delta_milli in 60u32..500) {
        let p = cents as f64 / 100.0;
        let delta = delta_milli as f64 / 1000.0;
        let plan = GainPlan::new(delta, GateParams::new(0.020, 0.060, 0.12));
        let mut rng = ScriptedRng::constant(MAX_ROLL);
        prop_assert_eq!(advance_proficiency(p, p + 10.0, &plan, &mut rng), round2(p + delta));
    }

    #[test]
    fn test_repeat_decay_holds_floor(n in 0u32..10_000, floor in 0.0f64..0.9) {
        let now = repeat_factor(n, floor);
        let next = repeat_factor(n + 1, floor);
        prop_assert!(next <= now);
        prop_assert!(next < now || next == floor);
        prop_assert!(now >= floor);
        prop_assert!(now <= 1.0);
    }

    #[test]
    fn test_variety_bonus_bounded(recent in recent_ids(), max_bonus in 0.0f64..1.0, window in 0usize..16, target in 0usize..8) {
        let tuning = VarietyTuning { max_bonus, window, target_distinct: target };
        let v = variety_factor(&recent, &tuning);
        prop_assert!(v >= 1.0);
        prop_assert!(v <= 1.0 + max_bonus + 1e-12);
    }

    #[test]
    fn test_round2_idempotent(x in -1.0e6f64..1.0e6) {
        let once = round2(x);
        prop_assert_eq!(round2(once), once);
    }
}
