//! Domain configurations
//!
//! One engine, several parameter tables. Each profile only carries numbers;
//! which factors a domain uses is decided in `domains`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TuningError;
use super::cap::CapFormula;
use super::context::{ContextWeights, EventBase, Outcome, OutcomeWeights};
use super::engine::{GainPlan, GateParams, NewUse, PartialFail};
use super::factors::{
    self, AttributeCurve, CappedRamp, EffectivenessTuning, FactorKind, LevelCurve,
    MaintenanceTuning, SoftBonus, UnlockTuning, UptimeTuning, VarietyTuning,
};

/// Proficiency domains that ship with a preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Magic,
    Weapon,
    Instrument,
    Singing,
    Summoning,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::Magic,
        Domain::Weapon,
        Domain::Instrument,
        Domain::Singing,
        Domain::Summoning,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Domain::Magic => "magic",
            Domain::Weapon => "weapon",
            Domain::Instrument => "instrument",
            Domain::Singing => "singing",
            Domain::Summoning => "summoning",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown domain '{}'", s))
    }
}

// =============================================================================
// Shared curve
// =============================================================================

/// Constants shared by the factor pipeline of every domain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveTuning {
    pub context: ContextWeights,
    pub level: LevelCurve,
    pub min_repeat_factor: f64,
    pub variety: VarietyTuning,
    pub unlock: UnlockTuning,
    pub cap_softener_k: f64,
    pub outcome: OutcomeWeights,
    pub gate: GateParams,
    #[serde(default)]
    pub partial_fail: PartialFail,
}

impl Default for CurveTuning {
    fn default() -> Self {
        Self {
            context: ContextWeights::default(),
            level: LevelCurve::default(),
            min_repeat_factor: 0.45,
            variety: VarietyTuning::default(),
            unlock: UnlockTuning::default(),
            cap_softener_k: 0.9,
            outcome: OutcomeWeights::default(),
            gate: GateParams::default(),
            partial_fail: PartialFail::default(),
        }
    }
}

impl CurveTuning {
    /// Start a plan with the factors every domain shares:
    /// context, level, unlock choke and cap taper.
    pub fn plan(&self, base_gain: f64, event: &EventBase<'_>, outcome: Outcome) -> GainPlan {
        GainPlan::new(base_gain, self.gate)
            .with(FactorKind::Context, factors::context_weight(event.activity, &self.context))
            .with(FactorKind::Level, factors::level_factor(event.level, &self.level))
            .with(
                FactorKind::UnlockChoke,
                factors::unlock_choke(event.current, event.thresholds, &self.unlock),
            )
            .with(
                FactorKind::CapGap,
                factors::cap_gap_factor(event.current, event.cap, self.cap_softener_k),
            )
            .with_outcome(outcome, factors::outcome_weight(outcome, &self.outcome))
            .with_partial_fail(self.partial_fail)
    }

    pub fn validate(&self, profile: &'static str) -> Result<(), TuningError> {
        let c = &self.context;
        for (name, w) in [("practice", c.practice), ("spar", c.spar), ("battle", c.battle)] {
            non_negative(profile, name, w)?;
        }
        let o = &self.outcome;
        for (name, w) in [("success", o.success), ("partial", o.partial), ("fail", o.fail)] {
            non_negative(profile, name, w)?;
        }
        match self.level {
            LevelCurve::Tiered { trivial, equal, slope, max } => {
                non_negative(profile, "level.trivial", trivial)?;
                non_negative(profile, "level.equal", equal)?;
                non_negative(profile, "level.slope", slope)?;
                non_negative(profile, "level.max", max)?;
            }
            LevelCurve::Linear { slope, min, max } => {
                non_negative(profile, "level.slope", slope)?;
                non_negative(profile, "level.min", min)?;
                if max < min {
                    return Err(TuningError::invalid(profile, "level.max below level.min"));
                }
            }
        }
        probability(profile, "min_repeat_factor", self.min_repeat_factor)?;
        non_negative(profile, "variety.max_bonus", self.variety.max_bonus)?;
        if self.variety.window == 0 {
            return Err(TuningError::invalid(profile, "variety.window must be at least 1"));
        }
        non_negative(profile, "unlock.window", self.unlock.window)?;
        non_negative(profile, "unlock.choke", self.unlock.choke)?;
        non_negative(profile, "cap_softener_k", self.cap_softener_k)?;

        let g = &self.gate;
        non_negative(profile, "gate.tau_low", g.tau_low)?;
        non_negative(profile, "gate.tau_high", g.tau_high)?;
        probability(profile, "gate.p_small_min", g.p_small_min)?;
        if g.tau_high < g.tau_low {
            return Err(TuningError::invalid(profile, "gate.tau_high below gate.tau_low"));
        }
        probability(profile, "partial_fail.chance", self.partial_fail.chance)?;
        probability(profile, "partial_fail.factor", self.partial_fail.factor)?;
        Ok(())
    }
}

fn non_negative(profile: &'static str, field: &str, value: f64) -> Result<(), TuningError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TuningError::invalid(profile, format!("{} must be a non-negative number, got {}", field, value)))
    }
}

fn probability(profile: &'static str, field: &str, value: f64) -> Result<(), TuningError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TuningError::invalid(profile, format!("{} must be within [0, 1], got {}", field, value)))
    }
}

fn ramp(profile: &'static str, field: &str, r: &CappedRamp) -> Result<(), TuningError> {
    non_negative(profile, field, r.per_unit)?;
    if r.max < 1.0 {
        return Err(TuningError::invalid(profile, format!("{}.max must be at least 1", field)));
    }
    Ok(())
}

fn cap_formula(profile: &'static str, cap: &CapFormula) -> Result<(), TuningError> {
    non_negative(profile, "cap.base", cap.base)?;
    non_negative(profile, "cap.rate", cap.rate)
}

// =============================================================================
// Magic / weapon
// =============================================================================

/// Spell and weapon proficiency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagicProfile {
    pub base_gain: f64,
    pub curve: CurveTuning,
    pub attribute: AttributeCurve,
    /// Applied when the caller flags a first use
    pub new_use: NewUse,
    pub cap: CapFormula,
}

impl MagicProfile {
    /// Elemental and school spell proficiency
    pub fn spells() -> Self {
        Self {
            base_gain: 1.0,
            curve: CurveTuning {
                context: ContextWeights::new(0.2, 0.6, 1.0),
                level: LevelCurve::Tiered { trivial: 0.05, equal: 1.0, slope: 0.1, max: 1.75 },
                min_repeat_factor: 0.30,
                variety: VarietyTuning { max_bonus: 0.25, window: 10, target_distinct: 4 },
                unlock: UnlockTuning { window: 2.5, choke: 1.0 / 3.0 },
                cap_softener_k: 0.9,
                outcome: OutcomeWeights::new(1.0, 0.5, 0.0),
                gate: GateParams::new(0.0, 1.0, 0.0),
                partial_fail: PartialFail::default(),
            },
            attribute: AttributeCurve { slope: 0.01, min: 0.7, max: 1.3 },
            new_use: NewUse { multiplier: 1.25, chance: 0.95 },
            cap: CapFormula::default(),
        }
    }

    /// Weapon and armor proficiency: linear level curve
    pub fn weapons() -> Self {
        let spells = Self::spells();
        Self {
            curve: CurveTuning {
                level: LevelCurve::Linear { slope: 0.1, min: 0.25, max: 1.75 },
                ..spells.curve
            },
            ..spells
        }
    }

    pub fn validate(&self, profile: &'static str) -> Result<(), TuningError> {
        non_negative(profile, "base_gain", self.base_gain)?;
        self.curve.validate(profile)?;
        if self.attribute.max < self.attribute.min {
            return Err(TuningError::invalid(profile, "attribute.max below attribute.min"));
        }
        non_negative(profile, "new_use.multiplier", self.new_use.multiplier)?;
        probability(profile, "new_use.chance", self.new_use.chance)?;
        cap_formula(profile, &self.cap)
    }
}

impl Default for MagicProfile {
    fn default() -> Self {
        Self::spells()
    }
}

// =============================================================================
// Performance
// =============================================================================

/// Instrument songs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceProfile {
    pub base_gain: f64,
    pub curve: CurveTuning,
    /// Targets affected beyond the first
    pub crowd: CappedRamp,
    #[serde(default)]
    pub cap: CapFormula,
}

impl Default for PerformanceProfile {
    fn default() -> Self {
        Self {
            base_gain: 0.065,
            curve: CurveTuning {
                context: ContextWeights::new(0.20, 0.65, 1.0),
                level: LevelCurve::Tiered { trivial: 0.05, equal: 0.35, slope: 0.12, max: 1.0 },
                min_repeat_factor: 0.45,
                variety: VarietyTuning::default(),
                unlock: UnlockTuning { window: 8.0, choke: 0.35 },
                cap_softener_k: 0.9,
                outcome: OutcomeWeights::new(1.0, 0.25, 0.0),
                gate: GateParams::new(0.020, 0.060, 0.12),
                partial_fail: PartialFail::default(),
            },
            crowd: CappedRamp::new(0.08, 1.30),
            cap: CapFormula::default(),
        }
    }
}

impl PerformanceProfile {
    pub fn validate(&self, profile: &'static str) -> Result<(), TuningError> {
        non_negative(profile, "base_gain", self.base_gain)?;
        self.curve.validate(profile)?;
        ramp(profile, "crowd", &self.crowd)?;
        cap_formula(profile, &self.cap)
    }
}

/// Sung performances: crowd plus pressure, uptime, acoustics, ensemble
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingingProfile {
    pub base_gain: f64,
    pub curve: CurveTuning,
    pub crowd: CappedRamp,
    pub pressure: CappedRamp,
    pub uptime: UptimeTuning,
    pub acoustic: SoftBonus,
    pub ensemble: SoftBonus,
    /// Consolidation bonus on the frame the singer stops
    pub stop_bonus: f64,
    #[serde(default)]
    pub cap: CapFormula,
}

impl Default for SingingProfile {
    fn default() -> Self {
        Self {
            base_gain: 0.072,
            curve: CurveTuning {
                context: ContextWeights::new(0.28, 0.72, 1.0),
                level: LevelCurve::Tiered { trivial: 0.05, equal: 0.32, slope: 0.11, max: 1.0 },
                min_repeat_factor: 0.45,
                variety: VarietyTuning::default(),
                unlock: UnlockTuning { window: 8.0, choke: 0.35 },
                cap_softener_k: 0.9,
                outcome: OutcomeWeights::new(1.0, 0.30, 0.0),
                gate: GateParams::new(0.018, 0.055, 0.12),
                partial_fail: PartialFail::default(),
            },
            crowd: CappedRamp::new(0.08, 1.30),
            pressure: CappedRamp::new(0.09, 1.30),
            uptime: UptimeTuning { sec_norm: 4.0, exponent: 0.6 },
            acoustic: SoftBonus::new(0.10, 1.15),
            ensemble: SoftBonus::new(0.12, 1.18),
            stop_bonus: 0.12,
            cap: CapFormula::default(),
        }
    }
}

impl SingingProfile {
    pub fn validate(&self, profile: &'static str) -> Result<(), TuningError> {
        non_negative(profile, "base_gain", self.base_gain)?;
        self.curve.validate(profile)?;
        ramp(profile, "crowd", &self.crowd)?;
        ramp(profile, "pressure", &self.pressure)?;
        non_negative(profile, "uptime.sec_norm", self.uptime.sec_norm)?;
        non_negative(profile, "uptime.exponent", self.uptime.exponent)?;
        non_negative(profile, "acoustic.k", self.acoustic.k)?;
        non_negative(profile, "ensemble.k", self.ensemble.k)?;
        non_negative(profile, "stop_bonus", self.stop_bonus)?;
        cap_formula(profile, &self.cap)
    }
}

// =============================================================================
// Summoning
// =============================================================================

/// Summoning: casts, ability effects and maintenance ticks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummoningProfile {
    pub cast_gain: f64,
    pub effect_gain: f64,
    pub maintenance_gain: f64,
    pub curve: CurveTuning,
    pub effectiveness: EffectivenessTuning,
    pub maintenance: MaintenanceTuning,
    #[serde(default)]
    pub cap: CapFormula,
}

impl Default for SummoningProfile {
    fn default() -> Self {
        Self {
            cast_gain: 0.10,
            effect_gain: 0.08,
            maintenance_gain: 0.03,
            curve: CurveTuning {
                context: ContextWeights::new(0.20, 0.70, 1.00),
                level: LevelCurve::Tiered { trivial: 0.05, equal: 0.30, slope: 0.12, max: 1.00 },
                min_repeat_factor: 0.45,
                variety: VarietyTuning::default(),
                unlock: UnlockTuning { window: 6.0, choke: 0.35 },
                cap_softener_k: 0.90,
                outcome: OutcomeWeights::new(1.00, 0.40, 0.00),
                gate: GateParams::new(0.020, 0.060, 0.12),
                partial_fail: PartialFail::default(),
            },
            effectiveness: EffectivenessTuning::default(),
            maintenance: MaintenanceTuning::default(),
            cap: CapFormula::default(),
        }
    }
}

impl SummoningProfile {
    pub fn validate(&self, profile: &'static str) -> Result<(), TuningError> {
        non_negative(profile, "cast_gain", self.cast_gain)?;
        non_negative(profile, "effect_gain", self.effect_gain)?;
        non_negative(profile, "maintenance_gain", self.maintenance_gain)?;
        self.curve.validate(profile)?;
        let e = &self.effectiveness;
        non_negative(profile, "effectiveness.floor", e.floor)?;
        non_negative(profile, "effectiveness.curve_k", e.curve_k)?;
        non_negative(profile, "effectiveness.max_total", e.max_total)?;
        let m = &self.maintenance;
        if !(m.sec_norm > 0.0) {
            return Err(TuningError::invalid(profile, "maintenance.sec_norm must be positive"));
        }
        non_negative(profile, "maintenance.exponent", m.exponent)?;
        ramp(profile, "maintenance.pressure", &m.pressure)?;
        ramp(profile, "maintenance.benefit", &m.benefit)?;
        cap_formula(profile, &self.cap)
    }
}

// =============================================================================
// Profile set
// =============================================================================

/// Every shipped preset, as stored in `progression.ron`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileSet {
    pub magic: MagicProfile,
    pub weapon: MagicProfile,
    pub instrument: PerformanceProfile,
    pub singing: SingingProfile,
    pub summoning: SummoningProfile,
}

impl Default for ProfileSet {
    fn default() -> Self {
        Self {
            magic: MagicProfile::spells(),
            weapon: MagicProfile::weapons(),
            instrument: PerformanceProfile::default(),
            singing: SingingProfile::default(),
            summoning: SummoningProfile::default(),
        }
    }
}

impl ProfileSet {
    pub fn validate(&self) -> Result<(), TuningError> {
        self.magic.validate("magic")?;
        self.weapon.validate("weapon")?;
        self.instrument.validate("instrument")?;
        self.singing.validate("singing")?;
        self.summoning.validate("summoning")
    }

    /// Cap formula of a domain's preset
    pub fn cap(&self, domain: Domain) -> CapFormula {
        match domain {
            Domain::Magic => self.magic.cap,
            Domain::Weapon => self.weapon.cap,
            Domain::Instrument => self.instrument.cap,
            Domain::Singing => self.singing.cap,
            Domain::Summoning => self.summoning.cap,
        }
    }

    /// The shared curve of a domain's preset
    pub fn curve(&self, domain: Domain) -> &CurveTuning {
        match domain {
            Domain::Magic => &self.magic.curve,
            Domain::Weapon => &self.weapon.curve,
            Domain::Instrument => &self.instrument.curve,
            Domain::Singing => &self.singing.curve,
            Domain::Summoning => &self.summoning.curve,
        }
    }
}
