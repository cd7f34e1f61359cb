use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::history::DEFAULT_MAX_UNDO;

/// Tunables for an editor instance. Zero values fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Pointer travel, in pixels, before a handle press becomes a drag.
    pub activation_distance: f32,
    /// How long a press must be held before it becomes a drag. `0` turns the hold path off
    /// and leaves distance as the only activation rule.
    pub hold_delay_ms: u64,
    /// Pointer travel allowed while waiting out the hold delay.
    pub hold_tolerance: f32,
    pub max_undo: usize,
    pub palette_width: f32,
    pub placeholder: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            activation_distance: 8.,
            hold_delay_ms: 250,
            hold_tolerance: 5.,
            max_undo: DEFAULT_MAX_UNDO,
            palette_width: 280.,
            placeholder: "Type '/' for commands".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.activation_distance <= 0. {
            self.activation_distance = defaults.activation_distance;
        }
        if self.hold_tolerance <= 0. {
            self.hold_tolerance = defaults.hold_tolerance;
        }
        if self.max_undo == 0 {
            self.max_undo = defaults.max_undo;
        }
        if self.palette_width <= 0. {
            self.palette_width = defaults.palette_width;
        }
        self
    }

    /// `None` when the hold path is off.
    pub fn hold_delay(&self) -> Option<Duration> {
        (self.hold_delay_ms > 0).then(|| Duration::from_millis(self.hold_delay_ms))
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        Ok(config.with_defaults())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&content)?;
        tracing::info!(path = %path.display(), "loaded editor config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EditorConfig::from_json_str(r#"{ "holdDelayMs": 0, "maxUndo": 0 }"#).unwrap();
        assert_eq!(config.hold_delay(), None);
        assert_eq!(config.max_undo, DEFAULT_MAX_UNDO);
        assert_eq!(config.activation_distance, 8.);
    }

    #[test]
    fn zero_hold_delay_survives_normalisation() {
        let config = EditorConfig {
            hold_delay_ms: 0,
            palette_width: 0.,
            ..EditorConfig::default()
        }
        .with_defaults();
        assert_eq!(config.hold_delay_ms, 0);
        assert_eq!(config.palette_width, 280.);
        assert_eq!(
            EditorConfig::default().hold_delay(),
            Some(Duration::from_millis(250))
        );
    }
}
