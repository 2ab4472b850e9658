//! Error types
//!
//! Progression itself never fails; only loading and saving tuning data can.

use thiserror::Error;

/// Tuning file errors
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid tuning for {profile}: {reason}")]
    Invalid { profile: &'static str, reason: String },
}

impl TuningError {
    pub fn invalid(profile: &'static str, reason: impl Into<String>) -> Self {
        TuningError::Invalid { profile, reason: reason.into() }
    }
}

impl From<ron::error::SpannedError> for TuningError {
    fn from(e: ron::error::SpannedError) -> Self {
        TuningError::Parse(e.to_string())
    }
}

impl From<ron::Error> for TuningError {
    fn from(e: ron::Error) -> Self {
        TuningError::Parse(e.to_string())
    }
}
