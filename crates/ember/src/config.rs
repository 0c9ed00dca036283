//! # Game Configuration
//!
//! Loaded once at startup from a TOML file:
//!
//! ```toml
//! fps = 60
//! max_delta = 0.1
//! sleep = true
//!
//! [registry]
//! max_components = 32
//! membership = "on_activation"
//! ```
//!
//! Missing keys take their defaults, so an empty file is a valid config.

use std::path::Path;
use std::time::Duration;

use ember_core::RegistryConfig;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};

/// Default frame rate cap.
pub const DEFAULT_FPS: u32 = 60;

/// Default upper bound on a single frame's delta time, in seconds.
pub const DEFAULT_MAX_DELTA: f64 = 0.1;

/// Game loop and registry configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Target frames per second.
    pub fps: u32,
    /// Delta times above this are clamped (seconds).
    pub max_delta: f64,
    /// Sleep off the remainder of each frame's budget.
    ///
    /// Disable for headless runs that should go as fast as possible.
    pub sleep: bool,
    /// ECS registry settings.
    pub registry: RegistryConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            max_delta: DEFAULT_MAX_DELTA,
            sleep: true,
            registry: RegistryConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Config`] on malformed TOML or invalid values.
    pub fn from_toml_str(text: &str) -> GameResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| GameError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Config`] if the file cannot be read or is invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> GameResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| GameError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Checks every field, including the nested registry config.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Config`] naming the first invalid field.
    pub fn validate(&self) -> GameResult<()> {
        if self.fps == 0 || self.fps > 1000 {
            return Err(GameError::Config(format!(
                "fps must be between 1 and 1000, got {}",
                self.fps
            )));
        }
        if !(self.max_delta.is_finite() && self.max_delta > 0.0) {
            return Err(GameError::Config(format!(
                "max_delta must be positive, got {}",
                self.max_delta
            )));
        }
        self.registry
            .validate()
            .map_err(|e| GameError::Config(e.to_string()))
    }

    /// Whole milliseconds allotted to one frame.
    #[inline]
    #[must_use]
    pub const fn ms_per_frame(&self) -> u32 {
        1000 / self.fps
    }

    /// The per-frame budget as a [`Duration`].
    #[inline]
    #[must_use]
    pub fn frame_budget(&self) -> Duration {
        Duration::from_millis(u64::from(self.ms_per_frame()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::MembershipPolicy;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.fps, 60);
        assert_eq!(config.ms_per_frame(), 16);
        assert_eq!(config.frame_budget(), Duration::from_millis(16));
        assert!(config.sleep);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        assert_eq!(GameConfig::from_toml_str("").unwrap(), GameConfig::default());
    }

    #[test]
    fn test_parse_nested_registry() {
        let config = GameConfig::from_toml_str(
            r#"
            fps = 30
            sleep = false

            [registry]
            max_components = 8
            membership = "rematch"
            "#,
        )
        .unwrap();
        assert_eq!(config.ms_per_frame(), 33);
        assert!(!config.sleep);
        assert!((config.max_delta - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.registry.max_components, 8);
        assert_eq!(config.registry.membership, MembershipPolicy::Rematch);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(GameConfig::from_toml_str("fps = 0").is_err());
        assert!(GameConfig::from_toml_str("max_delta = -1.0").is_err());
        assert!(matches!(
            GameConfig::from_toml_str("[registry]\nmax_components = 0"),
            Err(GameError::Config(_))
        ));
        assert!(matches!(
            GameConfig::from_toml_str("fps = \"fast\""),
            Err(GameError::Config(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = GameConfig::load("/nonexistent/ember.toml").unwrap_err();
        assert!(err.to_string().contains("ember.toml"));
    }
}
