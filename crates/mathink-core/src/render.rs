//! Render read model: what a host renderer draws each frame.
//!
//! Everything here is already in screen space. Renderers only read it.

use crate::path::InkPath;
use crate::stroke::{InkColor, Stroke, StrokeId};
use crate::tools::ToolKind;
use crate::viewport::Viewport;

/// One drawable stroke, resolved through the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStroke {
    /// Id of the committed stroke, `None` for the live stroke.
    pub id: Option<StrokeId>,
    /// Curve in screen space.
    pub path: InkPath,
    pub color: InkColor,
    /// Line width in screen pixels.
    pub width: f64,
    pub tool: ToolKind,
}

impl RenderStroke {
    /// Resolve a canvas-space curve of `stroke` into screen space.
    pub fn resolve(id: Option<StrokeId>, canvas_path: &InkPath, stroke: &Stroke, viewport: &Viewport) -> Self {
        let scale = viewport.scale();
        Self {
            id,
            path: canvas_path.transformed(viewport.transform(), scale),
            color: stroke.color(),
            width: stroke.width() * scale,
            tool: stroke.tool(),
        }
    }
}

/// Snapshot of everything visible on the surface.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderFrame {
    /// Committed strokes, back to front.
    pub strokes: Vec<RenderStroke>,
    /// The stroke being drawn, painted on top.
    pub live: Option<RenderStroke>,
    pub viewport: Viewport,
    /// Session revision this frame was built from.
    pub revision: u64,
}

impl RenderFrame {
    /// All strokes in paint order, live stroke last.
    pub fn iter(&self) -> impl Iterator<Item = &RenderStroke> {
        self.strokes.iter().chain(self.live.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.live.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::stroke_path;
    use crate::stroke::{InkPoint, StrokeStyle};
    use kurbo::{Point, Vec2};

    #[test]
    fn test_resolve_scales_width_and_path() {
        let stroke = Stroke::new(
            InkPoint::new(10.0, 20.0, 0),
            StrokeStyle::default(),
            ToolKind::Pen,
        )
        .unwrap();
        let mut viewport = Viewport::new();
        viewport.try_set(2.0, Vec2::new(5.0, 5.0)).unwrap();

        let resolved = RenderStroke::resolve(Some(stroke.id()), &stroke_path(&stroke), &stroke, &viewport);
        assert!((resolved.width - 6.0).abs() < f64::EPSILON);
        assert_eq!(
            resolved.path,
            InkPath::Dot {
                center: Point::new(25.0, 45.0),
                radius: 3.0
            }
        );
    }

    #[test]
    fn test_iter_puts_live_last() {
        let stroke = Stroke::new(InkPoint::new(0.0, 0.0, 0), StrokeStyle::default(), ToolKind::Pen).unwrap();
        let viewport = Viewport::new();
        let committed = RenderStroke::resolve(Some(stroke.id()), &stroke_path(&stroke), &stroke, &viewport);
        let live = RenderStroke::resolve(None, &stroke_path(&stroke), &stroke, &viewport);
        let frame = RenderFrame {
            strokes: vec![committed],
            live: Some(live),
            viewport,
            revision: 3,
        };
        let ids: Vec<Option<StrokeId>> = frame.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![Some(stroke.id()), None]);
        assert!(!frame.is_empty());
        assert!(RenderFrame::default().is_empty());
    }
}
