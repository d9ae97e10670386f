use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::HottakeError;
use crate::types::Tone;

/// Small persisted settings document, written only by the admin surface.
///
/// The pipeline re-reads it before every generation call, so tone edits made
/// mid-run apply to the next candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub tone: Tone,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, HottakeError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| HottakeError::Settings(format!("read {}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| HottakeError::Settings(format!("parse {}: {e}", path.display())))
    }

    /// Fail-open load: missing or unusable settings degrade to the default
    /// tone rather than aborting.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "Settings unavailable, using default tone");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), HottakeError> {
        let doc = serde_json::to_string_pretty(self)
            .map_err(|e| HottakeError::Settings(format!("serialize: {e}")))?;
        std::fs::write(path, doc)
            .map_err(|e| HottakeError::Settings(format!("write {}: {e}", path.display())))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = Settings { tone: Tone::Humoristic };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn missing_file_defaults_to_heated() {
        let settings = Settings::load_or_default(Path::new("/nonexistent/settings.json"));
        assert_eq!(settings.tone, Tone::Heated);
    }
}
