//! Game settings.
//!
//! ```json
//! {
//!   "width": 320,
//!   "height": 240,
//!   "backgroundColor": "#202020",
//!   "framerate": 30,
//!   "difficulty": "hard"
//! }
//! ```
//!
//! Unknown keys are kept as extension options and can be read back with
//! [`GameSettings::extra`]. A few names belong to the game core itself and are
//! never accepted as extensions.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::render2d::Color;

/// Extension keys that would shadow game-core state.
pub const PROTECTED_KEYS: &[&str] = &[
    "scenes",
    "surface",
    "nextId",
    "pen",
    "paper",
    "interval",
    "init",
    "getUniqueId",
    "protectedKeys",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameSettings {
    /// Surface width. `None` keeps the surface's own width.
    pub width: Option<u32>,
    /// Surface height. `None` keeps the surface's own height.
    pub height: Option<u32>,
    pub background_color: Color,
    /// Ticks per second.
    pub framerate: u32,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            background_color: Color::WHITE,
            framerate: 60,
            extras: Map::new(),
        }
    }
}

impl GameSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.strip_protected();
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        log::debug!("Loading settings from {}", path.display());
        Self::from_json_str(&json)
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_framerate(mut self, framerate: u32) -> Self {
        self.framerate = framerate;
        self
    }

    /// Add an extension option. Protected names are logged and ignored.
    pub fn with_extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        if is_protected(key) {
            log::warn!("Ignoring protected settings key '{key}'");
        } else {
            self.extras.insert(key.to_string(), value.into());
        }
        self
    }

    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extras.get(key)
    }

    /// Drop protected extension keys. Returns how many were dropped.
    pub(crate) fn strip_protected(&mut self) -> usize {
        let before = self.extras.len();
        self.extras.retain(|key, _| {
            let protected = is_protected(key);
            if protected {
                log::warn!("Ignoring protected settings key '{key}'");
            }
            !protected
        });
        before - self.extras.len()
    }
}

fn is_protected(key: &str) -> bool {
    PROTECTED_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::EaselError;

    #[test]
    fn defaults_fill_missing_keys() {
        let settings = GameSettings::from_json_str("{}").unwrap();
        assert_eq!(settings, GameSettings::default());
        assert_eq!(settings.framerate, 60);
        assert_eq!(settings.background_color, Color::WHITE);
    }

    #[test]
    fn camel_case_keys_and_extras() {
        let settings = GameSettings::from_json_str(
            r##"{"width": 320, "backgroundColor": "#000", "framerate": 30, "difficulty": "hard"}"##,
        )
        .unwrap();
        assert_eq!(settings.width, Some(320));
        assert_eq!(settings.height, None);
        assert_eq!(settings.background_color, Color::BLACK);
        assert_eq!(settings.framerate, 30);
        assert_eq!(settings.extra("difficulty"), Some(&Value::from("hard")));
    }

    #[test]
    fn protected_keys_are_dropped() {
        let settings =
            GameSettings::from_json_str(r#"{"scenes": [], "nextId": 7, "lives": 3}"#).unwrap();
        assert!(settings.extra("scenes").is_none());
        assert!(settings.extra("nextId").is_none());
        assert_eq!(settings.extra("lives"), Some(&Value::from(3)));

        let settings = GameSettings::default().with_extra("pen", 1).with_extra("level", 2);
        assert_eq!(settings.extras.len(), 1);
    }

    #[test]
    fn bad_color_is_a_json_error() {
        let err = GameSettings::from_json_str(r#"{"backgroundColor": "blurple"}"#).unwrap_err();
        assert!(matches!(err, EaselError::Json(_)));
    }

    #[test]
    fn from_file_reads_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"height": 90, "framerate": 12}}"#).unwrap();
        let settings = GameSettings::from_file(file.path()).unwrap();
        assert_eq!(settings.height, Some(90));
        assert_eq!(settings.framerate, 12);

        let missing = GameSettings::from_file(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(EaselError::Io(_))));
    }
}
