//! Engine configuration and policy constants.

use crate::error::{InkError, InkResult};
use crate::stroke::InkColor;
use serde::{Deserialize, Serialize};

/// Smallest allowed viewport scale.
pub const MIN_SCALE: f64 = 0.1;
/// Largest allowed viewport scale.
pub const MAX_SCALE: f64 = 10.0;
/// Hard cap on committed strokes; older strokes are trimmed past it.
pub const MAX_STROKES: usize = 500;
/// Maximum number of undo snapshots to keep.
pub const MAX_HISTORY: usize = 100;
/// Eraser radius in canvas units.
pub const ERASER_RADIUS: f64 = 10.0;

/// How lone finger contacts are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchMode {
    /// Fingers only navigate: one finger pans, two or more pinch-zoom.
    #[default]
    PanOnly,
    /// A lone finger draws (or erases); two or more fingers pinch-zoom.
    DrawWithFinger,
}

/// Tunable engine settings.
///
/// Missing fields in a JSON document fall back to the defaults, so a config
/// file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    pub max_strokes: usize,
    pub max_history: usize,
    pub eraser_radius: f64,
    /// Screen-space travel required before a move adds a point to the live stroke.
    pub min_sample_distance: f64,
    /// Longest stylus contact (ms) that still counts as a tap.
    pub tap_max_duration_ms: u64,
    pub touch_mode: TouchMode,
    pub default_color: InkColor,
    pub default_width: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            max_strokes: MAX_STROKES,
            max_history: MAX_HISTORY,
            eraser_radius: ERASER_RADIUS,
            min_sample_distance: 1.0,
            tap_max_duration_ms: 200,
            touch_mode: TouchMode::default(),
            default_color: InkColor::black(),
            default_width: 3.0,
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON and validate it.
    pub fn from_json(json: &str) -> InkResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config to pretty JSON.
    pub fn to_json(&self) -> InkResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every policy value is usable.
    pub fn validate(&self) -> InkResult<()> {
        if !(self.min_scale.is_finite() && self.max_scale.is_finite()) {
            return Err(InkError::InvalidConfig(
                "scale bounds must be finite".to_string(),
            ));
        }
        if self.min_scale <= 0.0 || self.min_scale > self.max_scale {
            return Err(InkError::InvalidConfig(format!(
                "scale bounds must satisfy 0 < min <= max, got [{}, {}]",
                self.min_scale, self.max_scale
            )));
        }
        if self.max_strokes == 0 {
            return Err(InkError::InvalidConfig(
                "max_strokes must be at least 1".to_string(),
            ));
        }
        if self.max_history == 0 {
            return Err(InkError::InvalidConfig(
                "max_history must be at least 1".to_string(),
            ));
        }
        if !(self.eraser_radius.is_finite() && self.eraser_radius > 0.0) {
            return Err(InkError::InvalidRadius(self.eraser_radius));
        }
        if !(self.default_width.is_finite() && self.default_width > 0.0) {
            return Err(InkError::InvalidWidth(self.default_width));
        }
        if !(self.min_sample_distance.is_finite() && self.min_sample_distance >= 0.0) {
            return Err(InkError::InvalidConfig(format!(
                "min_sample_distance must be finite and non-negative, got {}",
                self.min_sample_distance
            )));
        }
        Ok(())
    }
}
