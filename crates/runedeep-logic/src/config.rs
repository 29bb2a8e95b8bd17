//! Startup options, read once when a session begins.
//!
//! Options are stored as JSON. Missing fields take their defaults so an empty
//! object (`{}`) is a valid options file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actor::Species;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    pub player_name: String,
    pub species: Species,
    /// Show the welcome banner on restored games too.
    pub always_greet: bool,
    /// Pick up items automatically after stepping onto them.
    pub autopickup: bool,
    /// Walking into a closed door opens it.
    pub easy_open: bool,
    /// Fixed RNG seed; a fresh one is drawn when absent.
    pub seed: Option<u64>,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            player_name: "Adventurer".to_string(),
            species: Species::Human,
            always_greet: false,
            autopickup: true,
            easy_open: true,
            seed: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read options file: {0}")]
    Io(#[from] std::io::Error),
    #[error("options file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("player name must not be empty")]
    EmptyName,
}

impl GameOptions {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let options: GameOptions = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.player_name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let options = GameOptions::from_json("{}").unwrap();
        assert_eq!(options, GameOptions::default());
    }

    #[test]
    fn fields_override_defaults() {
        let options = GameOptions::from_json(
            r#"{"player_name": "Sigmund", "species": "Kenku", "easy_open": false, "seed": 7}"#,
        )
        .unwrap();
        assert_eq!(options.player_name, "Sigmund");
        assert_eq!(options.species, Species::Kenku);
        assert!(!options.easy_open);
        assert!(options.autopickup);
        assert_eq!(options.seed, Some(7));
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = GameOptions::from_json(r#"{"player_name": "  "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyName));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = GameOptions::from_json("{autopickup: yes}").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
