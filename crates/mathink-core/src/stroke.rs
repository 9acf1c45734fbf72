//! Stroke model: the vector representation of committed and live ink.

use crate::error::{InkError, InkResult, ensure_finite};
use crate::tools::ToolKind;
use kurbo::{Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a stroke.
pub type StrokeId = Uuid;

/// Serializable ink color (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InkColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl InkColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }
}

impl Default for InkColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for InkColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<InkColor> for Color {
    fn from(color: InkColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Visual properties applied to a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: InkColor,
    /// Ink width in canvas units. A dot renders with radius `width / 2`.
    pub width: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: InkColor::black(),
            width: 3.0,
        }
    }
}

/// A single ink sample in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InkPoint {
    pub x: f64,
    pub y: f64,
    /// Sample time in milliseconds.
    pub t: u64,
    /// Normalized pressure (0..=1), when the device reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
}

impl InkPoint {
    pub fn new(x: f64, y: f64, t: u64) -> Self {
        Self {
            x,
            y,
            t,
            pressure: None,
        }
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = Some(pressure);
        self
    }

    pub fn from_point(point: Point, t: u64) -> Self {
        Self::new(point.x, point.y, t)
    }

    /// Position as a kurbo point.
    pub fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Reject non-finite coordinates and normalize pressure.
    fn sanitized(self) -> InkResult<Self> {
        ensure_finite(self.pos())?;
        let pressure = self
            .pressure
            .filter(|p| p.is_finite())
            .map(|p| p.clamp(0.0, 1.0));
        Ok(Self { pressure, ..self })
    }
}

/// An ordered, append-only sequence of ink samples with its style.
///
/// A stroke always holds at least one point. One point is a dot; two or more
/// render as a smoothed line. Committed strokes are shared behind `Arc` and
/// never mutated again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    id: StrokeId,
    points: Vec<InkPoint>,
    style: StrokeStyle,
    tool: ToolKind,
}

impl Stroke {
    /// Start a stroke from its first sample.
    pub fn new(first: InkPoint, style: StrokeStyle, tool: ToolKind) -> InkResult<Self> {
        if !(style.width.is_finite() && style.width > 0.0) {
            return Err(InkError::InvalidWidth(style.width));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            points: vec![first.sanitized()?],
            style,
            tool,
        })
    }

    /// Build a stroke from a complete sample list.
    pub fn from_points(
        points: impl IntoIterator<Item = InkPoint>,
        style: StrokeStyle,
        tool: ToolKind,
    ) -> InkResult<Self> {
        let mut iter = points.into_iter();
        let first = iter.next().ok_or(InkError::EmptyStroke)?;
        let mut stroke = Self::new(first, style, tool)?;
        for point in iter {
            stroke.push(point)?;
        }
        Ok(stroke)
    }

    /// Append a sample.
    ///
    /// A timestamp earlier than the previous sample is raised to it so times
    /// stay monotonic within the stroke.
    pub fn push(&mut self, point: InkPoint) -> InkResult<()> {
        let mut point = point.sanitized()?;
        if let Some(last) = self.points.last() {
            point.t = point.t.max(last.t);
        }
        self.points.push(point);
        Ok(())
    }

    pub fn id(&self) -> StrokeId {
        self.id
    }

    pub fn points(&self) -> &[InkPoint] {
        &self.points
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn color(&self) -> InkColor {
        self.style.color
    }

    pub fn width(&self) -> f64 {
        self.style.width
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether this stroke renders as a filled disc.
    pub fn is_dot(&self) -> bool {
        self.points.len() == 1
    }

    pub fn last_point(&self) -> Option<&InkPoint> {
        self.points.last()
    }

    /// Distance from `target` to each sample point, in sample order.
    pub fn distances_to(&self, target: Point) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(move |p| p.pos().distance(target))
    }

    /// Whether any sample lies within `radius` of `target`.
    pub fn hit_test(&self, target: Point, radius: f64) -> bool {
        let radius_sq = radius * radius;
        self.points
            .iter()
            .any(|p| p.pos().distance_squared(target) <= radius_sq)
    }

    /// Axis-aligned bounds of the sample points (not inflated by width).
    pub fn bounds(&self) -> Rect {
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;

        for point in &self.points {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }

        Rect::new(min_x, min_y, max_x, max_y)
    }

    /// Bounds grown by half the ink width on every side.
    pub fn ink_bounds(&self) -> Rect {
        self.bounds().inflate(self.style.width / 2.0, self.style.width / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pen(points: &[(f64, f64)]) -> Stroke {
        Stroke::from_points(
            points
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| InkPoint::new(x, y, i as u64)),
            StrokeStyle::default(),
            ToolKind::Pen,
        )
        .unwrap()
    }

    #[test]
    fn test_single_point_is_dot() {
        let stroke = pen(&[(5.0, 5.0)]);
        assert!(stroke.is_dot());
        assert_eq!(stroke.len(), 1);
        assert!(!stroke.is_empty());
    }

    #[test]
    fn test_from_points_requires_one_point() {
        let result = Stroke::from_points(Vec::new(), StrokeStyle::default(), ToolKind::Pen);
        assert!(matches!(result, Err(InkError::EmptyStroke)));
    }

    #[test]
    fn test_push_appends_in_order() {
        let mut stroke = pen(&[(0.0, 0.0)]);
        stroke.push(InkPoint::new(10.0, 0.0, 5)).unwrap();
        stroke.push(InkPoint::new(20.0, 0.0, 9)).unwrap();
        let xs: Vec<f64> = stroke.points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 10.0, 20.0]);
    }

    #[test]
    fn test_push_rejects_non_finite() {
        let mut stroke = pen(&[(0.0, 0.0)]);
        assert!(stroke.push(InkPoint::new(f64::NAN, 0.0, 1)).is_err());
        assert!(stroke.push(InkPoint::new(0.0, f64::INFINITY, 1)).is_err());
        assert_eq!(stroke.len(), 1);
    }

    #[test]
    fn test_timestamps_stay_monotonic() {
        let mut stroke = Stroke::new(
            InkPoint::new(0.0, 0.0, 100),
            StrokeStyle::default(),
            ToolKind::Pen,
        )
        .unwrap();
        stroke.push(InkPoint::new(1.0, 0.0, 40)).unwrap();
        assert_eq!(stroke.points()[1].t, 100);
    }

    #[test]
    fn test_pressure_clamped() {
        let stroke = Stroke::new(
            InkPoint::new(0.0, 0.0, 0).with_pressure(1.7),
            StrokeStyle::default(),
            ToolKind::Pen,
        )
        .unwrap();
        assert_eq!(stroke.points()[0].pressure, Some(1.0));
    }

    #[test]
    fn test_invalid_width_rejected() {
        let style = StrokeStyle {
            width: 0.0,
            ..Default::default()
        };
        let result = Stroke::new(InkPoint::new(0.0, 0.0, 0), style, ToolKind::Pen);
        assert!(matches!(result, Err(InkError::InvalidWidth(_))));
    }

    #[test]
    fn test_bounds() {
        let stroke = pen(&[(0.0, 0.0), (100.0, 50.0), (50.0, 100.0)]);
        let bounds = stroke.bounds();
        assert!((bounds.x0).abs() < f64::EPSILON);
        assert!((bounds.y0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test_uses_sample_points() {
        let stroke = pen(&[(0.0, 0.0), (100.0, 0.0)]);
        assert!(stroke.hit_test(Point::new(3.0, 4.0), 5.0));
        // Midway between samples is far from both points.
        assert!(!stroke.hit_test(Point::new(50.0, 0.0), 5.0));
    }

    #[test]
    fn test_distances_to() {
        let stroke = pen(&[(0.0, 0.0), (3.0, 4.0)]);
        let distances: Vec<f64> = stroke.distances_to(Point::ZERO).collect();
        assert!((distances[0]).abs() < f64::EPSILON);
        assert!((distances[1] - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_color_conversion() {
        let ink = InkColor::new(10, 20, 30, 255);
        let color: Color = ink.into();
        assert_eq!(InkColor::from(color), ink);
    }
}
