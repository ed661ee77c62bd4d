//! Session configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes.

use crate::stroke::{CandidateBuilder, Color};
use crate::tools::{ToolKind, ToolSettings};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Minimum spacing between two cursor publications.
pub const DEFAULT_PRESENCE_INTERVAL_MS: u64 = 50;

/// Presence records older than this are not shown.
pub const DEFAULT_PRESENCE_STALE_AFTER_MS: u64 = 5 * 60 * 1000;

/// Upper bound of the stroke width setting.
pub const DEFAULT_MAX_STROKE_WIDTH: f64 = 20.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for a board session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub presence_interval_ms: u64,
    pub presence_stale_after_ms: u64,
    pub eraser_width_factor: f64,
    pub max_stroke_width: f64,
    pub default_tool: ToolKind,
    pub default_settings: ToolSettings,
    /// Background for boards created by this client.
    pub board_background: Color,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            presence_interval_ms: DEFAULT_PRESENCE_INTERVAL_MS,
            presence_stale_after_ms: DEFAULT_PRESENCE_STALE_AFTER_MS,
            eraser_width_factor: crate::stroke::DEFAULT_ERASER_WIDTH_FACTOR,
            max_stroke_width: DEFAULT_MAX_STROKE_WIDTH,
            default_tool: ToolKind::default(),
            default_settings: ToolSettings::default(),
            board_background: Color::WHITE,
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.presence_interval_ms == 0 {
            return Err(ConfigError::Invalid("presence_interval_ms must be > 0".into()));
        }
        if self.eraser_width_factor <= 0.0 {
            return Err(ConfigError::Invalid("eraser_width_factor must be > 0".into()));
        }
        let width = self.default_settings.stroke_width;
        if width <= 0.0 || width > self.max_stroke_width {
            return Err(ConfigError::Invalid(format!(
                "default stroke width {} outside (0, {}]",
                width, self.max_stroke_width
            )));
        }
        if !(0.0..=1.0).contains(&self.default_settings.opacity) {
            return Err(ConfigError::Invalid("default opacity must be within [0, 1]".into()));
        }
        Ok(())
    }

    pub fn presence_interval(&self) -> Duration {
        Duration::from_millis(self.presence_interval_ms)
    }

    pub fn presence_stale_after(&self) -> Duration {
        Duration::from_millis(self.presence_stale_after_ms)
    }

    pub fn candidate_builder(&self) -> CandidateBuilder {
        CandidateBuilder::new(self.eraser_width_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.presence_interval(), Duration::from_millis(50));
        assert_eq!(config.presence_stale_after(), Duration::from_secs(300));
        assert_eq!(config.default_tool, ToolKind::Pencil);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SessionConfig::from_json(
            r##"{ "presence_interval_ms": 100, "default_settings": { "stroke_color": "#ff0000" } }"##,
        )
        .unwrap();
        assert_eq!(config.presence_interval_ms, 100);
        assert_eq!(config.default_settings.stroke_color, Color::rgb(255, 0, 0));
        assert_eq!(config.default_settings.stroke_width, 2.0);
        assert_eq!(config.eraser_width_factor, 3.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            SessionConfig::from_json(r#"{ "presence_interval_ms": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SessionConfig::from_json(r#"{ "default_settings": { "stroke_width": 50 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SessionConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
