use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

const PREFS_FILE: &str = ".particle_field.json";

/// The one piece of state that survives restarts: whether the HUD chrome is
/// hidden. Loaded leniently, saved on every toggle.
#[derive(Clone, Copy, Default, Serialize, Deserialize, PartialEq, Debug)]
pub struct Preferences {
    #[serde(default)]
    pub hud_hidden: bool,
}

impl Preferences {
    pub fn default_path() -> PathBuf {
        PathBuf::from(PREFS_FILE)
    }

    pub fn load(path: &Path) -> Self {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Self::default();
        };

        match serde_json::from_str(&contents) {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!("ignoring unreadable preferences at {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) {
        let contents = match serde_json::to_string_pretty(self) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("could not serialize preferences: {e}");
                return;
            }
        };

        if let Err(e) = std::fs::write(path, contents) {
            warn!("could not save preferences to {}: {e}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("particle_field_prefs_{name}_{}", std::process::id()))
    }

    #[test]
    fn round_trips_through_a_file() {
        let path = temp_path("roundtrip");
        let prefs = Preferences { hud_hidden: true };
        prefs.save(&path);

        assert_eq!(Preferences::load(&path), prefs);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let prefs = Preferences::load(Path::new("definitely/not/here.json"));
        assert!(!prefs.hud_hidden);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "{not json").unwrap();

        assert_eq!(Preferences::load(&path), Preferences::default());
        let _ = std::fs::remove_file(&path);
    }
}
