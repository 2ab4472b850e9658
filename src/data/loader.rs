//! RON tuning loader
//!
//! Loads progression profiles from an external RON file, with fallback to
//! the built-in presets.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::TuningError;
use crate::progression::ProfileSet;

/// File name of the tuning table inside a data directory
pub const TUNING_FILE: &str = "progression.ron";

/// Default data directory, relative to the working directory
pub const DEFAULT_DATA_DIR: &str = "assets/data";

/// Holds the active tuning and where it came from
#[derive(Debug, Clone)]
pub struct TuningLoader {
    pub profiles: ProfileSet,
    /// File the profiles were read from, `None` for built-in defaults
    pub source: Option<PathBuf>,
}

impl Default for TuningLoader {
    fn default() -> Self {
        Self { profiles: ProfileSet::default(), source: None }
    }
}

impl TuningLoader {
    /// Load from the default data directory or use the built-in presets
    pub fn new() -> Self {
        Self::from_dir(Path::new(DEFAULT_DATA_DIR))
    }

    /// Load from a data directory, falling back to built-in presets
    pub fn from_dir(dir: &Path) -> Self {
        let path = dir.join(TUNING_FILE);
        if !path.exists() {
            log::info!("No {} in {}, using built-in tuning", TUNING_FILE, dir.display());
            return Self::default();
        }
        match load_tuning(dir) {
            Ok(profiles) => {
                log::info!("Loaded progression tuning from {}", path.display());
                Self { profiles, source: Some(path) }
            }
            Err(e) => {
                log::warn!("Failed to load {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn profiles(&self) -> &ProfileSet {
        &self.profiles
    }

    pub fn is_default(&self) -> bool {
        self.source.is_none()
    }
}

/// Strictly load and validate the tuning table in `dir`
pub fn load_tuning(dir: &Path) -> Result<ProfileSet, TuningError> {
    let content = fs::read_to_string(dir.join(TUNING_FILE))?;
    let profiles: ProfileSet = ron::from_str(&content)?;
    profiles.validate()?;
    Ok(profiles)
}

/// Write the built-in presets to `dir` for easy editing
pub fn export_default_tuning(dir: &Path) -> Result<PathBuf, TuningError> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    let ron = ron::ser::to_string_pretty(&ProfileSet::default(), ron::ser::PrettyConfig::default())?;
    let path = dir.join(TUNING_FILE);
    fs::write(&path, ron)?;
    log::info!("Exported default tuning to {}", path.display());
    Ok(path)
}
