//! # World Configuration
//!
//! Constructor-time settings for the streaming world. Every field has a
//! default, so an empty JSON object (or no file at all) yields a usable
//! configuration.
//!
//! ```json
//! { "render_distance": 4, "render_height": 1, "seed": 7, "idle_backoff_ms": 10 }
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted `render_distance` or `render_height`.
pub const MAX_RENDER_RADIUS: i32 = 64;

/// Errors raised while loading or validating a [`WorldConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file is not valid JSON for [`WorldConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field holds a value the world cannot run with.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for the chunk registry and its generation worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Horizontal chunk radius kept resident around the observer.
    pub render_distance: i32,
    /// Vertical chunk radius kept resident around the observer.
    pub render_height: i32,
    /// Seed for the terrain noise sources.
    pub seed: u32,
    /// How long the worker sleeps when the queue is empty, in milliseconds.
    pub idle_backoff_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            render_distance: 3,
            render_height: 1,
            seed: 0,
            idle_backoff_ms: 10,
        }
    }
}

impl WorldConfig {
    /// Parses and validates a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Checks that the radii lie in `0..=MAX_RENDER_RADIUS` and the backoff is
    /// non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, radius) in [
            ("render_distance", self.render_distance),
            ("render_height", self.render_height),
        ] {
            if !(0..=MAX_RENDER_RADIUS).contains(&radius) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be in 0..={}, got {}",
                    name, MAX_RENDER_RADIUS, radius
                )));
            }
        }
        if self.idle_backoff_ms == 0 {
            return Err(ConfigError::Invalid(
                "idle_backoff_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of chunk coordinates covered by one range scan.
    ///
    /// Negative radii count as zero.
    pub fn chunks_in_range(&self) -> usize {
        let span = |radius: i32| 2 * radius.max(0) as usize + 1;
        let width = span(self.render_distance);
        width * width * span(self.render_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = WorldConfig::from_json_str("{}").unwrap();
        assert_eq!(config, WorldConfig::default());
        assert_eq!(config.chunks_in_range(), 7 * 7 * 3);
    }

    #[test]
    fn partial_object_overrides_fields() {
        let config = WorldConfig::from_json_str(r#"{ "render_distance": 1, "seed": 9 }"#).unwrap();
        assert_eq!(config.render_distance, 1);
        assert_eq!(config.render_height, 1);
        assert_eq!(config.seed, 9);
    }

    #[test]
    fn negative_radius_is_rejected() {
        let err = WorldConfig::from_json_str(r#"{ "render_height": -1 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn oversized_radius_is_rejected() {
        let err = WorldConfig::from_json_str(r#"{ "render_distance": 100000 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = WorldConfig::from_json_str(r#"{ "render_height": 65 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let config = WorldConfig::from_json_str(r#"{ "render_distance": 64, "render_height": 64 }"#)
            .unwrap();
        assert_eq!(config.chunks_in_range(), 129 * 129 * 129);
    }

    #[test]
    fn zero_backoff_is_rejected() {
        let err = WorldConfig::from_json_str(r#"{ "idle_backoff_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = WorldConfig::from_json_str("{ render_distance: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
