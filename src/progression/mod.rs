//! Proficiency progression
//!
//! Decides, after a character acts, whether and by how much a named
//! proficiency grows. One engine, one parameter table per domain.

pub mod cap;
pub mod context;
pub mod domains;
pub mod engine;
pub mod factors;
pub mod history;
pub mod profiles;
pub mod rolls;

pub use cap::{proficiency_cap, CapFormula, PROFICIENCY_MILESTONES};
pub use context::{Activity, AttributeMatchup, EventBase, LevelMatchup, Outcome};
pub use domains::{
    gain_instrument_proficiency, gain_magic_proficiency, gain_singing_proficiency,
    gain_summoning_proficiency, on_summon_ability_effect, on_summon_cast, on_summon_maintenance_tick,
    AbilityEffect, MagicEvent, MaintenanceTick, PerformanceEvent, SingingEvent, SummonCast, SummonEvent,
};
pub use engine::{advance_proficiency, round2, unchanged, GainPlan, GateParams, NewUse, PartialFail};
pub use factors::{EffectSignals, Factor, FactorKind};
pub use history::ActionHistory;
pub use profiles::{Domain, MagicProfile, PerformanceProfile, ProfileSet, SingingProfile, SummoningProfile};
pub use rolls::ScriptedRng;
