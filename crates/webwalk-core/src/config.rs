//! Configuration management for webwalk
//!
//! This module provides the walk configuration bag: step and visit bounds,
//! inter-step wait window, and selection order. Values load from a TOML
//! file with environment-variable overrides for the common knobs.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{Result, WalkError};

/// Configuration for one walk run
///
/// Loaded from `webwalk.toml` in the working directory when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Maximum execution attempts before the walk halts
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Minimum inter-step wait in milliseconds
    #[serde(default = "default_min_wait_ms")]
    pub min_wait_ms: u64,

    /// Maximum inter-step wait in milliseconds
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,

    /// Pick actions uniformly at random; false means sequential mode
    #[serde(default = "default_random_order")]
    pub random_order: bool,

    /// Maximum distinct visited locations before the walk halts
    #[serde(default = "default_max_visited_locations")]
    pub max_visited_locations: usize,

    /// Directory for diagnostic screenshots on fatal errors
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: PathBuf,
}

// Default value providers
fn default_max_steps() -> usize {
    50
}

fn default_min_wait_ms() -> u64 {
    1000
}

fn default_max_wait_ms() -> u64 {
    3000
}

fn default_random_order() -> bool {
    true
}

fn default_max_visited_locations() -> usize {
    20
}

fn default_screenshot_dir() -> PathBuf {
    PathBuf::from("./screenshots")
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            min_wait_ms: default_min_wait_ms(),
            max_wait_ms: default_max_wait_ms(),
            random_order: default_random_order(),
            max_visited_locations: default_max_visited_locations(),
            screenshot_dir: default_screenshot_dir(),
        }
    }
}

impl WalkConfig {
    /// Load configuration from a TOML file or use defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            debug!("Loaded configuration from {}", path.display());
            toml::from_str(&content)
                .map_err(|e| WalkError::Config(format!("failed to parse {}: {}", path.display(), e)))?
        } else {
            debug!("No configuration file at {}, using defaults", path.display());
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply environment-variable overrides
    ///
    /// Recognized variables: `MAX_STEPS`, `MIN_WAIT_TIME`, `MAX_WAIT_TIME`,
    /// `RANDOM_ORDER`, `MAX_VISITED_LOCATIONS`.
    pub fn apply_env_overrides(mut self) -> Result<Self> {
        if let Some(v) = parse_env("MAX_STEPS")? {
            debug!("MAX_STEPS override: {}", v);
            self.max_steps = v;
        }
        if let Some(v) = parse_env("MIN_WAIT_TIME")? {
            debug!("MIN_WAIT_TIME override: {}", v);
            self.min_wait_ms = v;
        }
        if let Some(v) = parse_env("MAX_WAIT_TIME")? {
            debug!("MAX_WAIT_TIME override: {}", v);
            self.max_wait_ms = v;
        }
        if let Ok(v) = std::env::var("RANDOM_ORDER") {
            debug!("RANDOM_ORDER override: {}", v);
            self.random_order = v != "false";
        }
        if let Some(v) = parse_env("MAX_VISITED_LOCATIONS")? {
            debug!("MAX_VISITED_LOCATIONS override: {}", v);
            self.max_visited_locations = v;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check bound and ordering constraints
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(WalkError::Config("max_steps must be positive".to_string()));
        }
        if self.max_visited_locations == 0 {
            return Err(WalkError::Config(
                "max_visited_locations must be positive".to_string(),
            ));
        }
        if self.min_wait_ms > self.max_wait_ms {
            return Err(WalkError::Config(format!(
                "min_wait_ms ({}) exceeds max_wait_ms ({})",
                self.min_wait_ms, self.max_wait_ms
            )));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| WalkError::Config(format!("invalid value for {}: {}", name, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WalkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_steps, 50);
        assert_eq!(config.max_visited_locations, 20);
        assert!(config.random_order);
    }

    #[test]
    fn test_zero_steps_rejected() {
        let config = WalkConfig {
            max_steps: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_visited_rejected() {
        let config = WalkConfig {
            max_visited_locations: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_wait_window_rejected() {
        let config = WalkConfig {
            min_wait_ms: 5000,
            max_wait_ms: 1000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = WalkConfig::load_or_default(&dir.path().join("webwalk.toml")).unwrap();
        assert_eq!(config.max_steps, 50);
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("webwalk.toml");
        std::fs::write(&path, "max_steps = 5\nrandom_order = false\n").unwrap();

        let config = WalkConfig::load_or_default(&path).unwrap();
        assert_eq!(config.max_steps, 5);
        assert!(!config.random_order);
        assert_eq!(config.min_wait_ms, 1000);
    }

    #[test]
    fn test_load_invalid_bounds_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("webwalk.toml");
        std::fs::write(&path, "max_steps = 0\n").unwrap();

        assert!(WalkConfig::load_or_default(&path).is_err());
    }
}
