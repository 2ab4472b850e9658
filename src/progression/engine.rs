//! Progression core
//!
//! One pipeline shared by every proficiency domain: multiply the factors,
//! clamp to the headroom under the cap, then roll the stochastic gate.
//! Domains only decide which factors go into a [`GainPlan`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::context::Outcome;
use super::factors::{Factor, FactorKind};

/// Round to 2 decimal places
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Truncate to 2 decimal places
pub fn floor2(x: f64) -> f64 {
    (x * 100.0).floor() / 100.0
}

/// Chance gate: large deltas always apply, tiny ones rarely,
/// with a linear ramp in between.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateParams {
    pub tau_low: f64,
    pub tau_high: f64,
    /// Probability for deltas at or below `tau_low`
    pub p_small_min: f64,
}

impl GateParams {
    pub fn new(tau_low: f64, tau_high: f64, p_small_min: f64) -> Self {
        Self { tau_low, tau_high, p_small_min }
    }

    /// Probability that a delta of this size is applied
    pub fn probability(&self, delta: f64) -> f64 {
        if delta >= self.tau_high {
            1.0
        } else if delta <= self.tau_low || self.tau_high <= self.tau_low {
            self.p_small_min
        } else {
            let t = (delta - self.tau_low) / (self.tau_high - self.tau_low);
            self.p_small_min + (1.0 - self.p_small_min) * t
        }
    }
}

impl Default for GateParams {
    fn default() -> Self {
        Self::new(0.020, 0.060, 0.12)
    }
}

/// Chance for a failed attempt to still teach a fraction of the success gain
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PartialFail {
    pub chance: f64,
    /// Fraction of the success-path delta applied on a lucky fail
    pub factor: f64,
}

impl PartialFail {
    pub fn is_active(&self) -> bool {
        self.chance > 0.0 && self.factor > 0.0
    }
}

/// First use of a new technique: boosted delta with a fixed high chance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewUse {
    pub multiplier: f64,
    pub chance: f64,
}

impl Default for NewUse {
    fn default() -> Self {
        Self { multiplier: 1.25, chance: 0.95 }
    }
}

/// Everything the engine needs for one progression call
#[derive(Debug, Clone, PartialEq)]
pub struct GainPlan {
    pub base_gain: f64,
    pub factors: Vec<Factor>,
    pub outcome: Outcome,
    pub outcome_weight: f64,
    pub new_use: Option<NewUse>,
    pub gate: GateParams,
    pub partial_fail: PartialFail,
}

impl GainPlan {
    pub fn new(base_gain: f64, gate: GateParams) -> Self {
        Self {
            base_gain,
            factors: Vec::with_capacity(12),
            outcome: Outcome::Success,
            outcome_weight: 1.0,
            new_use: None,
            gate,
            partial_fail: PartialFail::default(),
        }
    }

    /// Append a factor
    pub fn with(mut self, kind: FactorKind, value: f64) -> Self {
        self.factors.push(Factor::new(kind, value));
        self
    }

    pub fn push(&mut self, kind: FactorKind, value: f64) {
        self.factors.push(Factor::new(kind, value));
    }

    pub fn with_outcome(mut self, outcome: Outcome, weight: f64) -> Self {
        self.outcome = outcome;
        self.outcome_weight = weight;
        self
    }

    pub fn with_new_use(mut self, new_use: Option<NewUse>) -> Self {
        self.new_use = new_use;
        self
    }

    pub fn with_partial_fail(mut self, partial_fail: PartialFail) -> Self {
        self.partial_fail = partial_fail;
        self
    }

    /// Value of the first factor of a kind, if present
    pub fn factor(&self, kind: FactorKind) -> Option<f64> {
        self.factors.iter().find(|f| f.kind == kind).map(|f| f.value)
    }

    /// Activity weight. Plans without a context factor count as fully weighted.
    pub fn context_weight(&self) -> f64 {
        self.factor(FactorKind::Context).unwrap_or(1.0)
    }

    /// Product of all factors. Any non-finite or negative factor zeroes it.
    pub fn product(&self) -> f64 {
        self.factors.iter().fold(1.0, |acc, f| {
            if f.value.is_finite() && f.value >= 0.0 {
                acc * f.value
            } else {
                0.0
            }
        })
    }

    /// Raw delta on the success path, before the outcome weight
    pub fn success_delta(&self) -> f64 {
        let raw = self.base_gain * self.product();
        let raw = match self.new_use {
            Some(n) => raw * n.multiplier,
            None => raw,
        };
        if raw.is_finite() {
            raw.max(0.0)
        } else {
            0.0
        }
    }

    /// Raw delta for the plan's own outcome
    pub fn raw_delta(&self) -> f64 {
        match self.outcome {
            Outcome::Fail => 0.0,
            _ => self.success_delta() * self.outcome_weight.max(0.0),
        }
    }

    fn breakdown(&self) -> String {
        self.factors
            .iter()
            .map(|f| format!("{}={:.4}", f.kind.name(), f.value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Room left under the cap. Non-positive or invalid caps leave none.
pub fn headroom(p: f64, cap: f64) -> f64 {
    if !cap.is_finite() || cap <= 0.0 {
        return 0.0;
    }
    (cap - p).max(0.0)
}

/// Probability the gate would apply a given candidate delta under a plan
pub fn gain_probability(plan: &GainPlan, delta: f64) -> f64 {
    match plan.new_use {
        Some(n) => n.chance,
        None => plan.gate.probability(delta),
    }
}

fn normalize_current(p: f64) -> f64 {
    if p.is_nan() || p == f64::NEG_INFINITY {
        log::warn!("Invalid proficiency {} normalized to 0", p);
        0.0
    } else {
        p
    }
}

/// The value an event that teaches nothing leaves behind
pub fn unchanged(p: f64) -> f64 {
    round2(normalize_current(p))
}

fn apply(p: f64, delta: f64, cap: f64) -> f64 {
    let next = round2(p + delta);
    if next > cap {
        floor2(p + delta).max(round2(p))
    } else {
        next
    }
}

/// Compute the next proficiency value.
///
/// Never lowers `p`, never raises it above `cap`, and always returns a
/// value rounded to 2 decimals. Consumes at most one draw from `rng`.
pub fn advance_proficiency<R: Rng>(p: f64, cap: f64, plan: &GainPlan, rng: &mut R) -> f64 {
    let p = normalize_current(p);
    if p == f64::INFINITY {
        log::warn!("Infinite proficiency left as is");
        return p;
    }
    let kept = round2(p);

    log::trace!(
        "gain plan P={:.2} cap={:.2} g0={} outcome={:?}x{} [{}]",
        p,
        cap,
        plan.base_gain,
        plan.outcome,
        plan.outcome_weight,
        plan.breakdown()
    );

    if plan.context_weight() <= 0.0 {
        return kept;
    }

    let room = headroom(p, cap);

    if plan.outcome == Outcome::Fail {
        if !plan.partial_fail.is_active() {
            return kept;
        }
        let candidate = plan.success_delta().min(room);
        if candidate <= 0.0 {
            return kept;
        }
        let roll: f64 = rng.gen();
        if roll < plan.partial_fail.chance {
            let delta = candidate * plan.partial_fail.factor.clamp(0.0, 1.0);
            log::debug!("Partial-fail gain {:.4} (roll {:.3})", delta, roll);
            return apply(p, delta, cap);
        }
        return kept;
    }

    let delta = plan.raw_delta().min(room);
    if delta <= 0.0 {
        return kept;
    }

    let probability = gain_probability(plan, delta);
    let roll: f64 = rng.gen();
    if roll < probability {
        let next = apply(p, delta, cap);
        log::debug!("Gain applied: {:.2} -> {:.2} (delta {:.4}, roll {:.3} < {:.3})", p, next, delta, roll, probability);
        next
    } else {
        log::debug!("Gain gated: delta {:.4} (roll {:.3} >= {:.3})", delta, roll, probability);
        kept
    }
}
