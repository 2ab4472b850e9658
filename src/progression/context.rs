//! Event context primitives
//!
//! The pieces every progression event carries: where the action happened,
//! how it turned out, and who it was against.

use serde::{Deserialize, Serialize};

use super::cap::PROFICIENCY_MILESTONES;

/// How "real" the setting of an action was
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    /// Training alone or with a dummy
    Practice,
    /// Sparring against an instructor or friendly opponent
    Spar,
    /// Real combat
    Battle,
}

impl Activity {
    pub fn name(&self) -> &'static str {
        match self {
            Activity::Practice => "practice",
            Activity::Spar => "spar",
            Activity::Battle => "battle",
        }
    }
}

/// Result of the action that triggered the progression event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    #[default]
    Success,
    Partial,
    Fail,
}

/// Weight per activity tier. A weight of 0 disables gains for that tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContextWeights {
    pub practice: f64,
    pub spar: f64,
    pub battle: f64,
}

impl ContextWeights {
    pub fn new(practice: f64, spar: f64, battle: f64) -> Self {
        Self { practice, spar, battle }
    }

    pub fn weight(&self, activity: Activity) -> f64 {
        match activity {
            Activity::Practice => self.practice,
            Activity::Spar => self.spar,
            Activity::Battle => self.battle,
        }
    }
}

impl Default for ContextWeights {
    fn default() -> Self {
        Self::new(0.2, 0.6, 1.0)
    }
}

/// Weight per outcome tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeWeights {
    pub success: f64,
    pub partial: f64,
    pub fail: f64,
}

impl OutcomeWeights {
    pub fn new(success: f64, partial: f64, fail: f64) -> Self {
        Self { success, partial, fail }
    }

    pub fn weight(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Success => self.success,
            Outcome::Partial => self.partial,
            Outcome::Fail => self.fail,
        }
    }
}

impl Default for OutcomeWeights {
    fn default() -> Self {
        Self::new(1.0, 0.5, 0.0)
    }
}

/// Actor level against the opposing side (or instructor)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelMatchup {
    pub actor: f64,
    /// Average level of the opposition
    pub opponent: f64,
}

impl LevelMatchup {
    pub fn new(actor: f64, opponent: f64) -> Self {
        Self { actor, opponent }
    }

    /// Same level on both sides
    pub fn even(level: f64) -> Self {
        Self::new(level, level)
    }

    /// Opponent level minus actor level
    pub fn difference(&self) -> f64 {
        self.opponent - self.actor
    }
}

/// Attribute of the actor against the opposing attribute
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeMatchup {
    pub actor: f64,
    pub opponent: f64,
}

impl AttributeMatchup {
    pub fn new(actor: f64, opponent: f64) -> Self {
        Self { actor, opponent }
    }
}

/// Fields every progression event carries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventBase<'a> {
    /// Current proficiency (2 decimals)
    pub current: f64,
    /// Current cap
    pub cap: f64,
    pub activity: Activity,
    pub level: LevelMatchup,
    /// Milestones that choke gains just after being crossed
    pub thresholds: &'a [f64],
}

impl<'a> EventBase<'a> {
    /// Event against the standard milestone table
    pub fn new(current: f64, cap: f64, activity: Activity, level: LevelMatchup) -> Self {
        Self { current, cap, activity, level, thresholds: &PROFICIENCY_MILESTONES }
    }

    /// Replace the choke thresholds. An empty slice disables the choke.
    pub fn with_thresholds(mut self, thresholds: &'a [f64]) -> Self {
        self.thresholds = thresholds;
        self
    }
}
