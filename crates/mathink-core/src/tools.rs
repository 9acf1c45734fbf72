//! Tool settings and live stroke capture.

use crate::error::InkResult;
use crate::path::{InkPath, LivePath};
use crate::stroke::{InkColor, InkPoint, Stroke, StrokeStyle};
use serde::{Deserialize, Serialize};

/// Available ink tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Pen,
    Eraser,
}

/// Toolbar state: the active tool and the style applied to new ink.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ToolSettings {
    pub tool: ToolKind,
    pub style: StrokeStyle,
}

impl ToolSettings {
    pub fn new(tool: ToolKind, color: InkColor, width: f64) -> Self {
        Self {
            tool,
            style: StrokeStyle { color, width },
        }
    }
}

/// State of the stroke being captured.
#[derive(Debug, Clone, Default)]
pub enum CaptureState {
    /// No stroke in progress.
    #[default]
    Idle,
    /// A stroke is being drawn.
    Active {
        /// Stroke samples accumulated so far.
        stroke: Stroke,
        /// Incrementally built curve for `stroke`.
        path: LivePath,
    },
}

/// Owns the live stroke between `begin` and `end`.
#[derive(Debug, Clone, Default)]
pub struct StrokeCapture {
    state: CaptureState,
}

impl StrokeCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new live stroke, dropping any unfinished one.
    pub fn begin(&mut self, point: InkPoint, settings: &ToolSettings) -> InkResult<()> {
        let stroke = Stroke::new(point, settings.style, settings.tool)?;
        let mut path = LivePath::new(settings.style.width);
        path.push(point.pos());
        self.state = CaptureState::Active { stroke, path };
        Ok(())
    }

    /// Append a sample to the live stroke.
    ///
    /// Returns `Ok(false)` when no stroke is in progress.
    pub fn update(&mut self, point: InkPoint) -> InkResult<bool> {
        match &mut self.state {
            CaptureState::Active { stroke, path } => {
                stroke.push(point)?;
                path.push(point.pos());
                Ok(true)
            }
            CaptureState::Idle => Ok(false),
        }
    }

    /// Finish the live stroke and hand it over for committing.
    pub fn end(&mut self) -> Option<Stroke> {
        match std::mem::take(&mut self.state) {
            CaptureState::Active { stroke, .. } if !stroke.is_empty() => Some(stroke),
            _ => None,
        }
    }

    /// Drop the live stroke without committing.
    pub fn cancel(&mut self) {
        self.state = CaptureState::Idle;
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, CaptureState::Active { .. })
    }

    /// The live stroke, if one is being drawn.
    pub fn stroke(&self) -> Option<&Stroke> {
        match &self.state {
            CaptureState::Active { stroke, .. } => Some(stroke),
            CaptureState::Idle => None,
        }
    }

    /// Curve of the live stroke in canvas space.
    pub fn preview_path(&self) -> Option<InkPath> {
        match &self.state {
            CaptureState::Active { path, .. } => Some(path.path()),
            CaptureState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_default_is_pen() {
        let settings = ToolSettings::default();
        assert_eq!(settings.tool, ToolKind::Pen);
    }

    #[test]
    fn test_capture_lifecycle() {
        let mut capture = StrokeCapture::new();
        assert!(!capture.is_active());

        capture
            .begin(InkPoint::new(0.0, 0.0, 0), &ToolSettings::default())
            .unwrap();
        assert!(capture.is_active());

        assert!(capture.update(InkPoint::new(5.0, 5.0, 10)).unwrap());
        assert!(matches!(capture.preview_path(), Some(InkPath::Curve(_))));

        let stroke = capture.end().unwrap();
        assert_eq!(stroke.len(), 2);
        assert!(!capture.is_active());
        assert!(capture.end().is_none());
    }

    #[test]
    fn test_update_without_begin() {
        let mut capture = StrokeCapture::new();
        assert!(!capture.update(InkPoint::new(1.0, 1.0, 0)).unwrap());
        assert!(capture.stroke().is_none());
    }

    #[test]
    fn test_begin_rejects_bad_point() {
        let mut capture = StrokeCapture::new();
        let result = capture.begin(InkPoint::new(f64::NAN, 0.0, 0), &ToolSettings::default());
        assert!(result.is_err());
        assert!(!capture.is_active());
    }

    #[test]
    fn test_cancel_discards() {
        let mut capture = StrokeCapture::new();
        capture
            .begin(InkPoint::new(0.0, 0.0, 0), &ToolSettings::default())
            .unwrap();
        capture.cancel();
        assert!(capture.end().is_none());
    }

    #[test]
    fn test_new_stroke_uses_settings() {
        let mut capture = StrokeCapture::new();
        let settings = ToolSettings::new(ToolKind::Pen, InkColor::new(200, 0, 0, 255), 7.0);
        capture.begin(InkPoint::new(0.0, 0.0, 0), &settings).unwrap();
        let stroke = capture.end().unwrap();
        assert_eq!(stroke.color(), InkColor::new(200, 0, 0, 255));
        assert!((stroke.width() - 7.0).abs() < f64::EPSILON);
        assert!(stroke.is_dot());
    }
}
