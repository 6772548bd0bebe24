// Client settings that influence the simulation

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors raised while loading or saving settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read settings {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// When the local player's predicted steps start animating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    /// Animate as soon as the walk request is sent
    #[default]
    AnimateImmediately,
    /// Wait for the server confirmation before animating
    AnimateOnConfirm,
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Interpolate sub-tile pixel offsets while a step is in flight
    pub smooth_movement: bool,
    /// Force every player walk request to run
    pub always_run: bool,
    /// Player step animation policy
    pub movement_mode: MovementMode,
    /// Fixed simulation step in milliseconds
    pub tick_ms: u64,
    /// Lifetime of a text overhead in milliseconds
    pub overhead_ttl_ms: u64,
    /// Maximum overheads kept per object
    pub max_overheads: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            smooth_movement: true,
            always_run: false,
            movement_mode: MovementMode::AnimateImmediately,
            tick_ms: 50,
            overhead_ttl_ms: 4000,
            max_overheads: 5,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document; missing keys fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let settings = Self::from_json(&text)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.smooth_movement);
        assert_eq!(settings.movement_mode, MovementMode::AnimateImmediately);
        assert_eq!(settings.tick_ms, 50);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            Settings::from_json(r#"{ "smooth_movement": false, "movement_mode": "animate_on_confirm" }"#)
                .unwrap();
        assert!(!settings.smooth_movement);
        assert_eq!(settings.movement_mode, MovementMode::AnimateOnConfirm);
        assert_eq!(settings.max_overheads, 5);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = Settings::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Settings::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut settings = Settings::default();
        settings.always_run = true;
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }
}
