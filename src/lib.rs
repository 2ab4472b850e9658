//! Proficiency - stochastic skill progression for RPG characters
//!
//! After a character casts a spell, plays a song or keeps a summon alive,
//! this crate decides whether a proficiency grows and by how much.

pub mod progression;
pub mod data;
pub mod error;

// Re-export commonly used types
pub use error::TuningError;
pub use progression::{advance_proficiency, Activity, Domain, GainPlan, Outcome, ProfileSet};
