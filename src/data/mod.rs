//! Data loading
//!
//! Progression tuning is loaded from an external RON file so balance can
//! be adjusted without a rebuild.

pub mod loader;

pub use loader::{export_default_tuning, load_tuning, TuningLoader, TUNING_FILE};
