//! Window-manager tuning knobs with TOML loading.

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, model::ChromeInsets};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Geometry and timing configuration for a [`crate::WindowManager`].
pub struct WindowManagerConfig {
    /// Space reserved for the menu bar and dock.
    pub chrome: ChromeInsets,
    /// Smallest width any window may have.
    pub min_window_width: i32,
    /// Smallest height any window may have.
    pub min_window_height: i32,
    /// Upper bound of the default width for windows opened without one.
    pub default_max_width: i32,
    /// Upper bound of the default height for windows opened without one.
    pub default_max_height: i32,
    /// Fraction of the viewport used for default window size.
    pub default_viewport_fraction: f64,
    /// Lower bound of rescaled size, as a fraction of the new viewport.
    pub responsive_min_fraction: f64,
    /// Upper bound of rescaled size, as a fraction of the new viewport.
    pub responsive_max_fraction: f64,
    /// Chrome reserved by the rescale height cap and vertical range.
    pub responsive_reserved_height: i32,
    /// Delay between a close request and surface removal.
    pub close_transition_ms: u64,
}

impl Default for WindowManagerConfig {
    fn default() -> Self {
        Self {
            chrome: ChromeInsets::default(),
            min_window_width: 300,
            min_window_height: 200,
            default_max_width: 800,
            default_max_height: 600,
            default_viewport_fraction: 0.7,
            responsive_min_fraction: 0.2,
            responsive_max_fraction: 0.9,
            responsive_reserved_height: 100,
            close_transition_ms: 200,
        }
    }
}

impl WindowManagerConfig {
    /// Parses a TOML document; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and [`ConfigError::Invalid`] when a value
    /// is out of range.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable by the geometry engine.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_window_width <= 0 || self.min_window_height <= 0 {
            return Err(ConfigError::Invalid(
                "minimum window size must be positive".to_string(),
            ));
        }
        if self.default_max_width < self.min_window_width
            || self.default_max_height < self.min_window_height
        {
            return Err(ConfigError::Invalid(
                "default size caps must not be below the minimum window size".to_string(),
            ));
        }
        if self.chrome.top < 0 || self.chrome.bottom < 0 || self.responsive_reserved_height < 0 {
            return Err(ConfigError::Invalid(
                "reserved chrome must not be negative".to_string(),
            ));
        }
        for (name, value) in [
            ("default_viewport_fraction", self.default_viewport_fraction),
            ("responsive_min_fraction", self.responsive_min_fraction),
            ("responsive_max_fraction", self.responsive_max_fraction),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }
        if self.responsive_min_fraction > self.responsive_max_fraction {
            return Err(ConfigError::Invalid(
                "responsive_min_fraction exceeds responsive_max_fraction".to_string(),
            ));
        }
        Ok(())
    }
}
