//! Viewport module for pan/zoom transforms between screen and canvas space.

use crate::config::{MAX_SCALE, MIN_SCALE};
use crate::error::{InkError, InkResult, ensure_finite};
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Clamp a scale into `[min, max]`.
///
/// `0` and `-inf` map to `min`, `+inf` maps to `max`. Unlike `f64::clamp` this
/// never panics and never returns NaN.
pub fn clamp_scale_between(scale: f64, min: f64, max: f64) -> f64 {
    scale.min(max).max(min)
}

/// Clamp a scale into the default `[MIN_SCALE, MAX_SCALE]` range.
pub fn clamp_scale(scale: f64) -> f64 {
    clamp_scale_between(scale, MIN_SCALE, MAX_SCALE)
}

/// Scale + translate mapping from canvas space to screen space.
///
/// `screen = canvas * scale + translate`. The scale is always finite and
/// within `[min_scale, max_scale]`; every mutator checks its result and keeps
/// the previous state when the input is not finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ViewportState")]
pub struct Viewport {
    /// Current zoom factor.
    scale: f64,
    /// Current translation (pan), in screen pixels.
    translate: Vec2,
    /// Minimum allowed scale.
    min_scale: f64,
    /// Maximum allowed scale.
    max_scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: Vec2::ZERO,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
        }
    }
}

/// Unchecked serialized form of a [`Viewport`].
#[derive(Deserialize)]
struct ViewportState {
    scale: f64,
    translate: Vec2,
    min_scale: f64,
    max_scale: f64,
}

impl TryFrom<ViewportState> for Viewport {
    type Error = InkError;

    fn try_from(state: ViewportState) -> InkResult<Self> {
        let (min, max) = (state.min_scale, state.max_scale);
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(InkError::InvalidConfig(format!(
                "scale bounds must satisfy 0 < min <= max, got [{}, {}]",
                min, max
            )));
        }
        let mut viewport = Self::with_bounds(min, max);
        viewport.try_set(state.scale, state.translate)?;
        Ok(viewport)
    }
}

impl Viewport {
    /// Create an identity viewport with the default scale bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an identity viewport with custom scale bounds.
    ///
    /// Bounds are expected to be validated by [`EngineConfig::validate`](crate::EngineConfig::validate).
    pub fn with_bounds(min_scale: f64, max_scale: f64) -> Self {
        Self {
            scale: clamp_scale_between(1.0, min_scale, max_scale),
            translate: Vec2::ZERO,
            min_scale,
            max_scale,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate(&self) -> Vec2 {
        self.translate
    }

    pub fn min_scale(&self) -> f64 {
        self.min_scale
    }

    pub fn max_scale(&self) -> f64 {
        self.max_scale
    }

    /// Clamp a scale into this viewport's bounds.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        clamp_scale_between(scale, self.min_scale, self.max_scale)
    }

    /// Affine transform converting canvas coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.translate) * Affine::scale(self.clamp_scale(self.scale))
    }

    /// Affine transform converting screen coordinates to canvas coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.clamp_scale(self.scale)) * Affine::translate(-self.translate)
    }

    /// Convert a screen point to canvas coordinates.
    pub fn to_canvas(&self, screen_point: Point) -> Point {
        let scale = self.clamp_scale(self.scale);
        Point::new(
            (screen_point.x - self.translate.x) / scale,
            (screen_point.y - self.translate.y) / scale,
        )
    }

    /// Convert a canvas point to screen coordinates.
    pub fn to_screen(&self, canvas_point: Point) -> Point {
        let scale = self.clamp_scale(self.scale);
        Point::new(
            canvas_point.x * scale + self.translate.x,
            canvas_point.y * scale + self.translate.y,
        )
    }

    /// Replace scale and translation, keeping the old state on non-finite input.
    pub fn try_set(&mut self, scale: f64, translate: Vec2) -> InkResult<()> {
        if !scale.is_finite() {
            return Err(InkError::NonFiniteScale(scale));
        }
        ensure_finite(translate.to_point())?;
        self.scale = self.clamp_scale(scale);
        self.translate = translate;
        Ok(())
    }

    /// Pan by a delta in screen pixels.
    pub fn try_pan(&mut self, delta: Vec2) -> InkResult<()> {
        ensure_finite(delta.to_point())?;
        let translate = self.translate + delta;
        ensure_finite(translate.to_point())?;
        self.translate = translate;
        Ok(())
    }

    /// Zoom by `factor`, keeping the given screen point fixed.
    ///
    /// Returns `Ok(false)` when the clamped scale is unchanged.
    pub fn try_zoom_at(&mut self, anchor: Point, factor: f64) -> InkResult<bool> {
        if !factor.is_finite() {
            return Err(InkError::NonFiniteScale(factor));
        }
        ensure_finite(anchor)?;
        let new_scale = self.clamp_scale(self.scale * factor);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return Ok(false);
        }

        // Canvas point under the anchor must stay under the anchor.
        let canvas_anchor = self.to_canvas(anchor);
        let translate = Vec2::new(
            anchor.x - canvas_anchor.x * new_scale,
            anchor.y - canvas_anchor.y * new_scale,
        );
        self.try_set(new_scale, translate)?;
        Ok(true)
    }

    /// Viewport obtained by panning this one by `delta`, without mutating it.
    pub fn panned(&self, delta: Vec2) -> InkResult<Viewport> {
        let mut next = *self;
        next.try_pan(delta)?;
        Ok(next)
    }

    /// Viewport obtained from a two-contact pinch relative to this base state.
    ///
    /// The canvas point that sat under `start_mid` ends up under `current_mid`,
    /// and the scale is multiplied by `ratio` (then clamped).
    pub fn pinched(&self, start_mid: Point, current_mid: Point, ratio: f64) -> InkResult<Viewport> {
        if !ratio.is_finite() {
            return Err(InkError::NonFiniteScale(ratio));
        }
        ensure_finite(start_mid)?;
        ensure_finite(current_mid)?;
        let canvas_anchor = self.to_canvas(start_mid);
        let new_scale = self.clamp_scale(self.scale * ratio);
        let translate = Vec2::new(
            current_mid.x - canvas_anchor.x * new_scale,
            current_mid.y - canvas_anchor.y * new_scale,
        );
        let mut next = *self;
        next.try_set(new_scale, translate)?;
        Ok(next)
    }

    /// Reset to identity.
    pub fn reset(&mut self) {
        self.translate = Vec2::ZERO;
        self.scale = self.clamp_scale(1.0);
    }

    /// Fit the viewport so `bounds` (canvas space) fills `viewport` (screen space).
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64) {
        let padded = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );

        // Degenerate extents (a single dot, a straight horizontal line) keep scale 1 on that axis.
        let scale_x = if bounds.width() > f64::EPSILON {
            padded.width / bounds.width()
        } else {
            f64::INFINITY
        };
        let scale_y = if bounds.height() > f64::EPSILON {
            padded.height / bounds.height()
        } else {
            f64::INFINITY
        };
        let fitted = scale_x.min(scale_y);
        self.scale = if fitted.is_finite() {
            self.clamp_scale(fitted)
        } else {
            self.clamp_scale(1.0)
        };

        let bounds_center = bounds.center();
        let viewport_center = Point::new(viewport.width / 2.0, viewport.height / 2.0);
        self.translate = Vec2::new(
            viewport_center.x - bounds_center.x * self.scale,
            viewport_center.y - bounds_center.y * self.scale,
        );
    }
}
