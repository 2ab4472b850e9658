//! Factor providers
//!
//! Small pure functions that turn one aspect of an event into a
//! dimensionless multiplier. Factors never read each other's outputs;
//! the engine multiplies them together.

use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use super::context::{Activity, AttributeMatchup, ContextWeights, LevelMatchup, Outcome, OutcomeWeights};

/// Which aspect of the event a factor was computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactorKind {
    Context,
    Level,
    Repeat,
    Variety,
    UnlockChoke,
    CapGap,
    Attribute,
    Situational,
    GainScale,
    Effectiveness,
    Maintenance,
    Crowd,
    Pressure,
    Uptime,
    Acoustic,
    Ensemble,
    StopBonus,
}

impl FactorKind {
    pub fn name(&self) -> &'static str {
        match self {
            FactorKind::Context => "context",
            FactorKind::Level => "level",
            FactorKind::Repeat => "repeat",
            FactorKind::Variety => "variety",
            FactorKind::UnlockChoke => "unlock_choke",
            FactorKind::CapGap => "cap_gap",
            FactorKind::Attribute => "attribute",
            FactorKind::Situational => "situational",
            FactorKind::GainScale => "gain_scale",
            FactorKind::Effectiveness => "effectiveness",
            FactorKind::Maintenance => "maintenance",
            FactorKind::Crowd => "crowd",
            FactorKind::Pressure => "pressure",
            FactorKind::Uptime => "uptime",
            FactorKind::Acoustic => "acoustic",
            FactorKind::Ensemble => "ensemble",
            FactorKind::StopBonus => "stop_bonus",
        }
    }
}

/// One computed multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub kind: FactorKind,
    pub value: f64,
}

impl Factor {
    pub fn new(kind: FactorKind, value: f64) -> Self {
        Self { kind, value }
    }
}

// =============================================================================
// Tuning records
// =============================================================================

/// Shape of the level/difficulty factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LevelCurve {
    /// Near-zero against trivial opposition, a flat floor at equal level,
    /// then a capped slope per level the opposition is above the actor.
    Tiered {
        trivial: f64,
        equal: f64,
        slope: f64,
        max: f64,
    },
    /// `clamp(1 + slope * diff, min, max)`
    Linear { slope: f64, min: f64, max: f64 },
}

impl Default for LevelCurve {
    fn default() -> Self {
        LevelCurve::Tiered { trivial: 0.05, equal: 0.30, slope: 0.12, max: 1.0 }
    }
}

/// Clamped linear attribute matchup: `clamp(1 + slope * diff, min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeCurve {
    pub slope: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for AttributeCurve {
    fn default() -> Self {
        Self { slope: 0.01, min: 0.7, max: 1.3 }
    }
}

/// Variety bonus over a rolling window of recent action ids
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarietyTuning {
    pub max_bonus: f64,
    /// How many of the most recent ids are considered
    pub window: usize,
    /// Distinct ids needed for the full bonus
    pub target_distinct: usize,
}

impl Default for VarietyTuning {
    fn default() -> Self {
        Self { max_bonus: 0.25, window: 10, target_distinct: 4 }
    }
}

/// Gain suppression just above a milestone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnlockTuning {
    /// Width of the choke window above each threshold
    pub window: f64,
    /// Multiplier applied inside the window
    pub choke: f64,
}

impl Default for UnlockTuning {
    fn default() -> Self {
        Self { window: 8.0, choke: 0.35 }
    }
}

/// `min(max, 1 + per_unit * units)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CappedRamp {
    pub per_unit: f64,
    pub max: f64,
}

impl CappedRamp {
    pub fn new(per_unit: f64, max: f64) -> Self {
        Self { per_unit, max }
    }

    pub fn at(&self, units: f64) -> f64 {
        let units = if units.is_finite() { units.max(0.0) } else { 0.0 };
        (1.0 + self.per_unit * units).min(self.max)
    }
}

/// Bounded bonus for a 0..1 quality signal: `min(max, 1 + k * q)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoftBonus {
    pub k: f64,
    pub max: f64,
}

impl SoftBonus {
    pub fn new(k: f64, max: f64) -> Self {
        Self { k, max }
    }
}

/// Diminishing returns on sustained uptime
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UptimeTuning {
    /// Seconds that count as one learning unit
    pub sec_norm: f64,
    pub exponent: f64,
}

/// Shaping of how much of an action's potential was realized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectivenessTuning {
    /// Minimum weight for a real but tiny effect
    pub floor: f64,
    pub curve_k: f64,
    /// Bonus per additional target affected
    pub multi_target_k: f64,
    /// Bonus when a control effect landed
    pub control_bonus: f64,
    /// Upper bound of the combined score
    pub max_total: f64,
}

impl Default for EffectivenessTuning {
    fn default() -> Self {
        Self { floor: 0.10, curve_k: 0.75, multi_target_k: 0.5, control_bonus: 0.5, max_total: 2.0 }
    }
}

/// Trickle for keeping an effect alive under real stakes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceTuning {
    pub sec_norm: f64,
    pub exponent: f64,
    /// Per engaged enemy
    pub pressure: CappedRamp,
    /// Per benefiting ally beyond the first
    pub benefit: CappedRamp,
}

impl Default for MaintenanceTuning {
    fn default() -> Self {
        Self {
            sec_norm: 5.0,
            exponent: 0.60,
            pressure: CappedRamp::new(0.08, 1.30),
            benefit: CappedRamp::new(0.06, 1.25),
        }
    }
}

/// Raw effect measurements for an ability resolution
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EffectSignals {
    /// 0..100, fraction of the ability's potential realized
    pub effectiveness_pct: Option<f64>,
    /// Units that received a nonzero effect
    pub targets_affected: Option<u32>,
    pub control_landed: bool,
    /// Damage as % of target max HP, summed over targets
    pub damage_pct_hp: Option<f64>,
    /// Healing actually restored as % of target max HP
    pub heal_pct_hp: Option<f64>,
}

// =============================================================================
// Providers
// =============================================================================

fn finite(x: Option<f64>) -> Option<f64> {
    x.filter(|v| v.is_finite())
}

fn clamp01(x: f64) -> f64 {
    if x.is_finite() {
        x.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Weight of the setting the action happened in
pub fn context_weight(activity: Activity, weights: &ContextWeights) -> f64 {
    weights.weight(activity)
}

/// Weight of the action's outcome
pub fn outcome_weight(outcome: Outcome, weights: &OutcomeWeights) -> f64 {
    weights.weight(outcome)
}

/// Difficulty scaling from the level gap to the opposition
pub fn level_factor(matchup: LevelMatchup, curve: &LevelCurve) -> f64 {
    let d = matchup.difference();
    match *curve {
        LevelCurve::Tiered { trivial, equal, slope, max } => {
            if !d.is_finite() {
                equal
            } else if d < -1.0 {
                trivial
            } else if d <= 0.0 {
                equal
            } else {
                (equal + slope * d).min(max)
            }
        }
        LevelCurve::Linear { slope, min, max } => {
            if !d.is_finite() {
                return 1.0_f64.clamp(min, max);
            }
            (1.0 + slope * d).clamp(min, max)
        }
    }
}

/// Diminishing returns for the same action back-to-back
pub fn repeat_factor(n_same: u32, min_factor: f64) -> f64 {
    let f = 1.0 / (1.0 + (1.0 + n_same as f64).ln());
    f.max(min_factor)
}

/// Bonus for mixing distinct actions within the recent window
pub fn variety_factor<T: Eq + Hash>(recent: &[T], tuning: &VarietyTuning) -> f64 {
    if recent.is_empty() || tuning.window == 0 {
        return 1.0;
    }
    let start = recent.len().saturating_sub(tuning.window);
    let distinct = recent[start..].iter().collect::<HashSet<_>>().len();
    let t = if tuning.target_distinct == 0 {
        1.0
    } else {
        (distinct as f64 / tuning.target_distinct as f64).min(1.0)
    };
    1.0 + tuning.max_bonus * t
}

/// Choke gains right after a milestone has been crossed
pub fn unlock_choke(p: f64, thresholds: &[f64], tuning: &UnlockTuning) -> f64 {
    let inside = thresholds
        .iter()
        .any(|t| p >= *t && p <= *t + tuning.window);
    if inside {
        tuning.choke
    } else {
        1.0
    }
}

/// Smooth taper as the proficiency approaches its cap
pub fn cap_gap_factor(p: f64, cap: f64, softener_k: f64) -> f64 {
    if !cap.is_finite() || cap <= 0.0 || !p.is_finite() {
        return 0.0;
    }
    let gap = (cap - p).max(0.0);
    (gap / cap).powf(softener_k)
}

/// Attribute matchup against the opposition
pub fn attribute_factor(matchup: AttributeMatchup, curve: &AttributeCurve) -> f64 {
    let d = matchup.opponent - matchup.actor;
    if !d.is_finite() {
        return 1.0;
    }
    (1.0 + curve.slope * d).clamp(curve.min, curve.max)
}

/// Floor-bounded power curve over a 0..100 effectiveness percentage.
/// Missing data counts as full credit.
pub fn effectiveness_weight(pct: Option<f64>, tuning: &EffectivenessTuning) -> f64 {
    match finite(pct) {
        None => 1.0,
        Some(pct) => {
            let x = pct.clamp(0.0, 100.0) / 100.0;
            x.powf(tuning.curve_k).max(tuning.floor)
        }
    }
}

/// Effectiveness combined with multi-target and measured-impact bonuses
pub fn combined_effectiveness(signals: &EffectSignals, tuning: &EffectivenessTuning) -> f64 {
    let base = effectiveness_weight(signals.effectiveness_pct, tuning);
    let dmg = clamp01(finite(signals.damage_pct_hp).unwrap_or(0.0) / 100.0);
    let heal = clamp01(finite(signals.heal_pct_hp).unwrap_or(0.0) / 100.0);
    let ctrl = if signals.control_landed { tuning.control_bonus } else { 0.0 };
    let targets = signals.targets_affected.unwrap_or(1).max(1);

    let spread = 1.0 + tuning.multi_target_k * (targets - 1) as f64;
    (base * spread * (1.0 + dmg + heal + ctrl)).min(tuning.max_total)
}

/// Duration and stakes of keeping an effect alive
pub fn maintenance_weight(
    maintained_sec: f64,
    enemies_engaged: u32,
    allies_benefiting: u32,
    tuning: &MaintenanceTuning,
) -> f64 {
    let sec = if maintained_sec.is_finite() { maintained_sec.max(0.0) } else { 0.0 };
    let time = (sec / tuning.sec_norm.max(1e-6)).powf(tuning.exponent);
    let pressure = tuning.pressure.at(enemies_engaged as f64);
    let benefit = tuning.benefit.at(allies_benefiting.saturating_sub(1) as f64);
    time * pressure * benefit
}

/// More targets affected at once teaches slightly more
pub fn crowd_factor(targets_affected: u32, ramp: &CappedRamp) -> f64 {
    ramp.at(targets_affected.saturating_sub(1) as f64)
}

/// Hostiles pressuring the actor
pub fn pressure_factor(enemies: u32, ramp: &CappedRamp) -> f64 {
    ramp.at(enemies as f64)
}

/// Normalized uptime with diminishing returns. Instant pulses count as 1.
pub fn uptime_factor(maintained_sec: f64, tuning: &UptimeTuning) -> f64 {
    if !maintained_sec.is_finite() || maintained_sec <= 0.0 || tuning.sec_norm <= 0.0 {
        return 1.0;
    }
    (maintained_sec / tuning.sec_norm).powf(tuning.exponent)
}

/// Bounded bonus for a 0..1 quality signal (acoustics, ensemble timing)
pub fn soft_bonus(quality: Option<f64>, bonus: &SoftBonus) -> f64 {
    let q = clamp01(quality.unwrap_or(0.0));
    (1.0 + bonus.k * q).min(bonus.max)
}
