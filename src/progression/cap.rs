//! Proficiency caps and milestones
//!
//! The cap is the ceiling a proficiency may grow to at the character's
//! current level and attributes. Milestones mark unlock tiers.

use serde::{Deserialize, Serialize};

/// Unlock tiers shared by every proficiency track
pub const PROFICIENCY_MILESTONES: [f64; 10] =
    [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];

/// Level at which a plain cap formula reaches 100
pub const CAP_LEVEL_FOR_100: u32 = 50;

/// Base cap before level and attributes
pub const CAP_BASE: f64 = 1.0;

/// Compute a proficiency cap: `round(base + attribute_bonus + rate * level)`
pub fn proficiency_cap(level: u32, base: f64, attribute_bonus: f64, rate: f64) -> f64 {
    let cap = (base + attribute_bonus + rate * level as f64).round();
    if cap.is_finite() {
        cap.max(0.0)
    } else {
        0.0
    }
}

/// Cap formula parameters for one proficiency track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapFormula {
    /// Base constant (A0)
    pub base: f64,
    /// Growth per character level (r)
    pub rate: f64,
}

impl Default for CapFormula {
    fn default() -> Self {
        Self { base: CAP_BASE, rate: 1.0 }
    }
}

impl CapFormula {
    pub fn new(base: f64, rate: f64) -> Self {
        Self { base, rate }
    }

    /// Cap at a given level, with an attribute-derived bonus (A)
    pub fn cap_at(&self, level: u32, attribute_bonus: f64) -> f64 {
        proficiency_cap(level, self.base, attribute_bonus, self.rate)
    }
}

/// All milestones at or below a proficiency value
pub fn milestones_reached(p: f64) -> impl Iterator<Item = f64> {
    PROFICIENCY_MILESTONES.into_iter().filter(move |m| p >= *m)
}

/// The next milestone above a proficiency value, if any remain
pub fn next_milestone(p: f64) -> Option<f64> {
    PROFICIENCY_MILESTONES.into_iter().find(|m| p < *m)
}
