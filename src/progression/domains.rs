//! Domain entry points
//!
//! Each function turns a domain event into a [`GainPlan`] using its profile
//! and hands it to the one shared engine.

use rand::Rng;

use super::context::{AttributeMatchup, EventBase, Outcome};
use super::engine::{advance_proficiency, unchanged, GainPlan};
use super::factors::{self, EffectSignals, FactorKind};
use super::profiles::{MagicProfile, PerformanceProfile, SingingProfile, SummoningProfile};

// =============================================================================
// Magic / weapon
// =============================================================================

/// A spell cast or weapon/armor use
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagicEvent<'a> {
    pub base: EventBase<'a>,
    pub outcome: Outcome,
    /// Consecutive prior uses of the same technique
    pub n_same: u32,
    pub recent: &'a [String],
    /// First time this technique has ever been used
    pub is_new_use: bool,
    pub attribute: Option<AttributeMatchup>,
    /// Free-form situational multiplier from the caller
    pub situational: Option<f64>,
    /// Base gain scale (same-type dual wielding uses 1.5)
    pub gain_scale: f64,
}

impl<'a> MagicEvent<'a> {
    pub fn new(base: EventBase<'a>, outcome: Outcome) -> Self {
        Self {
            base,
            outcome,
            n_same: 0,
            recent: &[],
            is_new_use: false,
            attribute: None,
            situational: None,
            gain_scale: 1.0,
        }
    }
}

pub fn magic_plan(event: &MagicEvent<'_>, profile: &MagicProfile) -> GainPlan {
    let curve = &profile.curve;
    let mut plan = curve
        .plan(profile.base_gain, &event.base, event.outcome)
        .with(FactorKind::Repeat, factors::repeat_factor(event.n_same, curve.min_repeat_factor))
        .with(FactorKind::Variety, factors::variety_factor(event.recent, &curve.variety));

    if let Some(matchup) = event.attribute {
        plan.push(FactorKind::Attribute, factors::attribute_factor(matchup, &profile.attribute));
    }
    if let Some(situational) = event.situational {
        plan.push(FactorKind::Situational, situational);
    }
    if event.gain_scale != 1.0 {
        plan.push(FactorKind::GainScale, event.gain_scale);
    }
    plan.with_new_use(event.is_new_use.then_some(profile.new_use))
}

/// Next magic or weapon proficiency
pub fn gain_magic_proficiency<R: Rng>(event: &MagicEvent<'_>, profile: &MagicProfile, rng: &mut R) -> f64 {
    let plan = magic_plan(event, profile);
    advance_proficiency(event.base.current, event.base.cap, &plan, rng)
}

// =============================================================================
// Instrument
// =============================================================================

/// One instrument song resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceEvent<'a> {
    pub base: EventBase<'a>,
    pub outcome: Outcome,
    pub n_same: u32,
    pub recent: &'a [String],
    /// Allies or enemies the song actually affected
    pub targets_affected: u32,
}

impl<'a> PerformanceEvent<'a> {
    pub fn new(base: EventBase<'a>, outcome: Outcome, targets_affected: u32) -> Self {
        Self { base, outcome, n_same: 0, recent: &[], targets_affected }
    }
}

pub fn instrument_plan(event: &PerformanceEvent<'_>, profile: &PerformanceProfile) -> GainPlan {
    let curve = &profile.curve;
    curve
        .plan(profile.base_gain, &event.base, event.outcome)
        .with(FactorKind::Repeat, factors::repeat_factor(event.n_same, curve.min_repeat_factor))
        .with(FactorKind::Variety, factors::variety_factor(event.recent, &curve.variety))
        .with(FactorKind::Crowd, factors::crowd_factor(event.targets_affected, &profile.crowd))
}

/// Next instrument proficiency
pub fn gain_instrument_proficiency<R: Rng>(
    event: &PerformanceEvent<'_>,
    profile: &PerformanceProfile,
    rng: &mut R,
) -> f64 {
    let plan = instrument_plan(event, profile);
    advance_proficiency(event.base.current, event.base.cap, &plan, rng)
}

// =============================================================================
// Singing
// =============================================================================

/// One singing tick, or the frame the singer stops
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingingEvent<'a> {
    pub base: EventBase<'a>,
    pub outcome: Outcome,
    pub maintained_sec: f64,
    pub is_stop_event: bool,
    pub n_same: u32,
    pub recent: &'a [String],
    pub allies_affected: u32,
    pub enemies_pressuring: u32,
    /// Room acoustics, 0..1
    pub acoustic_quality: Option<f64>,
    /// Timing with other performers, 0..1
    pub ensemble_synergy: Option<f64>,
}

impl<'a> SingingEvent<'a> {
    pub fn new(base: EventBase<'a>, outcome: Outcome, maintained_sec: f64) -> Self {
        Self {
            base,
            outcome,
            maintained_sec,
            is_stop_event: false,
            n_same: 0,
            recent: &[],
            allies_affected: 0,
            enemies_pressuring: 0,
            acoustic_quality: None,
            ensemble_synergy: None,
        }
    }
}

pub fn singing_plan(event: &SingingEvent<'_>, profile: &SingingProfile) -> GainPlan {
    let curve = &profile.curve;
    let mut plan = curve
        .plan(profile.base_gain, &event.base, event.outcome)
        .with(FactorKind::Repeat, factors::repeat_factor(event.n_same, curve.min_repeat_factor))
        .with(FactorKind::Variety, factors::variety_factor(event.recent, &curve.variety))
        .with(FactorKind::Crowd, factors::crowd_factor(event.allies_affected, &profile.crowd))
        .with(FactorKind::Pressure, factors::pressure_factor(event.enemies_pressuring, &profile.pressure))
        .with(FactorKind::Uptime, factors::uptime_factor(event.maintained_sec, &profile.uptime))
        .with(FactorKind::Acoustic, factors::soft_bonus(event.acoustic_quality, &profile.acoustic))
        .with(FactorKind::Ensemble, factors::soft_bonus(event.ensemble_synergy, &profile.ensemble));

    if event.is_stop_event {
        plan.push(FactorKind::StopBonus, 1.0 + profile.stop_bonus);
    }
    plan
}

/// Next singing proficiency
pub fn gain_singing_proficiency<R: Rng>(event: &SingingEvent<'_>, profile: &SingingProfile, rng: &mut R) -> f64 {
    let plan = singing_plan(event, profile);
    advance_proficiency(event.base.current, event.base.cap, &plan, rng)
}

// =============================================================================
// Summoning
// =============================================================================

/// A summon was brought out
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummonCast<'a> {
    pub base: EventBase<'a>,
    pub outcome: Outcome,
    pub n_same_summon: u32,
    pub recent_summons: &'a [String],
}

/// A summon ability resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityEffect<'a> {
    pub base: EventBase<'a>,
    pub outcome: Outcome,
    /// True only if the ability produced a measurable effect
    pub was_effectful: bool,
    pub signals: EffectSignals,
    pub n_same_ability: u32,
    pub recent_abilities: &'a [String],
}

/// Periodic tick while a summon is kept alive in combat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaintenanceTick<'a> {
    pub base: EventBase<'a>,
    /// Seconds since the last tick
    pub maintained_sec: f64,
    pub enemies_engaged: u32,
    pub allies_benefiting: u32,
    pub n_same_summon: u32,
}

/// The three summoning lifecycle events
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SummonEvent<'a> {
    Cast(SummonCast<'a>),
    AbilityEffect(AbilityEffect<'a>),
    MaintenanceTick(MaintenanceTick<'a>),
}

impl<'a> SummonEvent<'a> {
    pub fn base(&self) -> &EventBase<'a> {
        match self {
            SummonEvent::Cast(e) => &e.base,
            SummonEvent::AbilityEffect(e) => &e.base,
            SummonEvent::MaintenanceTick(e) => &e.base,
        }
    }
}

/// Build the summoning plan. `None` means the event teaches nothing.
pub fn summoning_plan(event: &SummonEvent<'_>, profile: &SummoningProfile) -> Option<GainPlan> {
    let curve = &profile.curve;
    match event {
        SummonEvent::Cast(cast) => Some(
            curve
                .plan(profile.cast_gain, &cast.base, cast.outcome)
                .with(FactorKind::Repeat, factors::repeat_factor(cast.n_same_summon, curve.min_repeat_factor))
                .with(FactorKind::Variety, factors::variety_factor(cast.recent_summons, &curve.variety)),
        ),
        SummonEvent::AbilityEffect(effect) => {
            if !effect.was_effectful {
                return None;
            }
            Some(
                curve
                    .plan(profile.effect_gain, &effect.base, effect.outcome)
                    .with(FactorKind::Repeat, factors::repeat_factor(effect.n_same_ability, curve.min_repeat_factor))
                    .with(FactorKind::Variety, factors::variety_factor(effect.recent_abilities, &curve.variety))
                    .with(
                        FactorKind::Effectiveness,
                        factors::combined_effectiveness(&effect.signals, &profile.effectiveness),
                    ),
            )
        }
        SummonEvent::MaintenanceTick(tick) => Some(
            curve
                .plan(profile.maintenance_gain, &tick.base, Outcome::Success)
                .with(FactorKind::Repeat, factors::repeat_factor(tick.n_same_summon, curve.min_repeat_factor))
                .with(
                    FactorKind::Maintenance,
                    factors::maintenance_weight(
                        tick.maintained_sec,
                        tick.enemies_engaged,
                        tick.allies_benefiting,
                        &profile.maintenance,
                    ),
                ),
        ),
    }
}

/// Next summoning proficiency
pub fn gain_summoning_proficiency<R: Rng>(
    event: &SummonEvent<'_>,
    profile: &SummoningProfile,
    rng: &mut R,
) -> f64 {
    let base = event.base();
    match summoning_plan(event, profile) {
        Some(plan) => advance_proficiency(base.current, base.cap, &plan, rng),
        None => unchanged(base.current),
    }
}

/// Call when a summon successfully spawns
pub fn on_summon_cast<R: Rng>(cast: SummonCast<'_>, profile: &SummoningProfile, rng: &mut R) -> f64 {
    gain_summoning_proficiency(&SummonEvent::Cast(cast), profile, rng)
}

/// Call when a summon ability resolves
pub fn on_summon_ability_effect<R: Rng>(effect: AbilityEffect<'_>, profile: &SummoningProfile, rng: &mut R) -> f64 {
    gain_summoning_proficiency(&SummonEvent::AbilityEffect(effect), profile, rng)
}

/// Call every few seconds while a summon is maintained in combat
pub fn on_summon_maintenance_tick<R: Rng>(tick: MaintenanceTick<'_>, profile: &SummoningProfile, rng: &mut R) -> f64 {
    gain_summoning_proficiency(&SummonEvent::MaintenanceTick(tick), profile, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::context::{Activity, LevelMatchup};
    use crate::progression::rolls::ScriptedRng;
    use rand::rngs::mock::StepRng;

    fn battle(p: f64, cap: f64) -> EventBase<'static> {
        EventBase::new(p, cap, Activity::Battle, LevelMatchup::even(12.0))
    }

    #[test]
    fn test_magic_plan_selects_factors() {
        let recent = vec!["fire:bolt".to_string(), "ice:lance".to_string()];
        let mut event = MagicEvent::new(battle(10.0, 40.0), Outcome::Success);
        event.recent = &recent;
        event.attribute = Some(AttributeMatchup::new(10.0, 20.0));
        event.situational = Some(0.8);

        let plan = magic_plan(&event, &MagicProfile::spells());
        assert_eq!(plan.factor(FactorKind::Repeat), Some(1.0));
        assert!((plan.factor(FactorKind::Variety).unwrap() - 1.125).abs() < 1e-9);
        assert!((plan.factor(FactorKind::Attribute).unwrap() - 1.1).abs() < 1e-9);
        assert_eq!(plan.factor(FactorKind::Situational), Some(0.8));
        assert_eq!(plan.factor(FactorKind::GainScale), None);
        assert_eq!(plan.new_use, None);
        assert_eq!(plan.factor(FactorKind::Crowd), None);
    }

    #[test]
    fn test_new_use_scenario() {
        let profile = MagicProfile::spells();
        let mut event = MagicEvent::new(battle(22.15, 40.0), Outcome::Success);
        event.is_new_use = true;

        let plan = magic_plan(&event, &profile);
        assert_eq!(plan.new_use.map(|n| n.chance), Some(0.95));

        let mut rng = ScriptedRng::constant(0.9);
        let next = gain_magic_proficiency(&event, &profile, &mut rng);
        assert!(next > 22.15);
        assert!(next <= 40.0);

        let mut rng = ScriptedRng::constant(0.96);
        assert_eq!(gain_magic_proficiency(&event, &profile, &mut rng), 22.15);
    }

    #[test]
    fn test_choke_applies_without_explicit_thresholds() {
        let profile = MagicProfile::spells();
        let event = MagicEvent::new(battle(12.0, 40.0), Outcome::Success);
        let choke = magic_plan(&event, &profile).factor(FactorKind::UnlockChoke);
        assert!((choke.unwrap() - 1.0 / 3.0).abs() < 1e-12);

        let opted_out = MagicEvent::new(battle(12.0, 40.0).with_thresholds(&[]), Outcome::Success);
        assert_eq!(magic_plan(&opted_out, &profile).factor(FactorKind::UnlockChoke), Some(1.0));
    }

    #[test]
    fn test_dual_wield_scale() {
        let profile = MagicProfile::weapons();
        let single = MagicEvent::new(battle(5.0, 40.0), Outcome::Success);
        let dual = MagicEvent { gain_scale: 1.5, ..single };
        let a = magic_plan(&single, &profile).raw_delta();
        let b = magic_plan(&dual, &profile).raw_delta();
        assert!((b - a * 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_instrument_crowd_teaches_more() {
        let profile = PerformanceProfile::default();
        let solo = PerformanceEvent::new(battle(20.0, 60.0), Outcome::Success, 1);
        let crowd = PerformanceEvent::new(battle(20.0, 60.0), Outcome::Success, 5);
        assert!(instrument_plan(&crowd, &profile).raw_delta() > instrument_plan(&solo, &profile).raw_delta());
    }

    #[test]
    fn test_instrument_fail_is_unchanged() {
        let profile = PerformanceProfile::default();
        let event = PerformanceEvent::new(battle(20.0, 60.0), Outcome::Fail, 3);
        let mut rng = StepRng::new(0, 0);
        assert_eq!(gain_instrument_proficiency(&event, &profile, &mut rng), 20.0);
    }

    #[test]
    fn test_singing_stop_bonus() {
        let profile = SingingProfile::default();
        let tick = SingingEvent::new(battle(37.42, 68.0), Outcome::Success, 5.0);
        let stop = SingingEvent { is_stop_event: true, ..tick };
        let a = singing_plan(&tick, &profile).raw_delta();
        let b = singing_plan(&stop, &profile).raw_delta();
        assert!((b - a * 1.12).abs() < 1e-12);
    }

    #[test]
    fn test_singing_acoustics_bounded() {
        let profile = SingingProfile::default();
        let mut event = SingingEvent::new(battle(10.0, 40.0), Outcome::Success, 4.0);
        event.acoustic_quality = Some(1.0);
        event.ensemble_synergy = Some(1.0);
        let plan = singing_plan(&event, &profile);
        assert!(plan.factor(FactorKind::Acoustic).unwrap() <= 1.15);
        assert!(plan.factor(FactorKind::Ensemble).unwrap() <= 1.18);
    }

    #[test]
    fn test_ineffectual_ability_teaches_nothing() {
        let profile = SummoningProfile::default();
        let event = SummonEvent::AbilityEffect(AbilityEffect {
            base: battle(10.0, 40.0),
            outcome: Outcome::Success,
            was_effectful: false,
            signals: EffectSignals::default(),
            n_same_ability: 0,
            recent_abilities: &[],
        });
        assert!(summoning_plan(&event, &profile).is_none());

        let mut rng = ScriptedRng::constant(0.0);
        assert_eq!(gain_summoning_proficiency(&event, &profile, &mut rng), 10.0);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn test_effective_ability_uses_effectiveness() {
        let profile = SummoningProfile::default();
        let recent = vec!["water:soothe".to_string(), "water:surge".to_string()];
        let effect = AbilityEffect {
            base: battle(22.15, 40.0),
            outcome: Outcome::Success,
            was_effectful: true,
            signals: EffectSignals {
                effectiveness_pct: Some(65.0),
                targets_affected: Some(3),
                control_landed: false,
                damage_pct_hp: None,
                heal_pct_hp: Some(18.0),
            },
            n_same_ability: 0,
            recent_abilities: &recent,
        };
        let plan = summoning_plan(&SummonEvent::AbilityEffect(effect), &profile).unwrap();
        let eff = plan.factor(FactorKind::Effectiveness).unwrap();
        assert!(eff > 1.0 && eff <= 2.0);
        assert_eq!(plan.base_gain, 0.08);
    }

    #[test]
    fn test_maintenance_tick_plan() {
        let profile = SummoningProfile::default();
        let tick = SummonEvent::MaintenanceTick(MaintenanceTick {
            base: battle(22.15, 40.0),
            maintained_sec: 6.0,
            enemies_engaged: 2,
            allies_benefiting: 4,
            n_same_summon: 2,
        });
        let plan = summoning_plan(&tick, &profile).unwrap();
        assert_eq!(plan.base_gain, 0.03);
        assert!(plan.factor(FactorKind::Maintenance).is_some());
        assert_eq!(plan.factor(FactorKind::Variety), None);
    }

    #[test]
    fn test_summon_cast_wrapper() {
        let profile = SummoningProfile::default();
        let recent = vec!["fire:elemental".to_string()];
        let cast = SummonCast {
            base: EventBase::new(27.15, 40.0, Activity::Battle, LevelMatchup::new(12.0, 13.0)),
            outcome: Outcome::Success,
            n_same_summon: 1,
            recent_summons: &recent,
        };
        let mut rng = StepRng::new(0, 0);
        let next = on_summon_cast(cast, &profile, &mut rng);
        assert!(next > 27.15);
        assert!(next < 27.25);
    }
}
