//! Path builder: turns ink samples into smoothed, renderable curves.
//!
//! For three or more samples each interior sample `i` becomes the control
//! point of a quadratic segment ending at the midpoint of samples `i` and
//! `i + 1`; the final segment runs straight to the true last sample. The curve
//! therefore stays inside the hull of consecutive samples.

use crate::stroke::{Stroke, StrokeId};
use kurbo::{Affine, BezPath, Point};
use std::collections::HashMap;
use std::sync::Arc;

/// A renderable ink primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum InkPath {
    /// No samples; nothing to draw.
    Empty,
    /// A single sample, drawn as a filled disc.
    Dot { center: Point, radius: f64 },
    /// Two or more samples, stroked with the ink width.
    Curve(BezPath),
}

impl InkPath {
    /// Map this primitive through a uniform-scale transform.
    ///
    /// `scale` must be the scale factor of `affine`; it sizes dot radii.
    pub fn transformed(&self, affine: Affine, scale: f64) -> InkPath {
        match self {
            InkPath::Empty => InkPath::Empty,
            InkPath::Dot { center, radius } => InkPath::Dot {
                center: affine * *center,
                radius: radius * scale,
            },
            InkPath::Curve(path) => InkPath::Curve(affine * path.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, InkPath::Empty)
    }
}

/// Incrementally built curve for the stroke being drawn.
///
/// Each new sample appends at most one quadratic segment to `body`; only the
/// closing line to the latest sample is re-derived when the path is read.
#[derive(Debug, Clone, Default)]
pub struct LivePath {
    body: BezPath,
    last: Option<Point>,
    len: usize,
    radius: f64,
}

impl LivePath {
    /// Create an empty live path for ink of the given width.
    pub fn new(width: f64) -> Self {
        Self {
            body: BezPath::new(),
            last: None,
            len: 0,
            radius: width / 2.0,
        }
    }

    /// Append a sample.
    pub fn push(&mut self, point: Point) {
        match self.last {
            None => self.body.move_to(point),
            Some(prev) if self.len >= 2 => self.body.quad_to(prev, prev.midpoint(point)),
            Some(_) => {}
        }
        self.last = Some(point);
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current renderable curve.
    pub fn path(&self) -> InkPath {
        match (self.len, self.last) {
            (0, _) | (_, None) => InkPath::Empty,
            (1, Some(center)) => InkPath::Dot {
                center,
                radius: self.radius,
            },
            (_, Some(last)) => {
                let mut path = self.body.clone();
                path.line_to(last);
                InkPath::Curve(path)
            }
        }
    }
}

/// Build the curve for a complete sample sequence.
pub fn build_path(points: impl IntoIterator<Item = Point>, width: f64) -> InkPath {
    let mut live = LivePath::new(width);
    for point in points {
        live.push(point);
    }
    live.path()
}

/// Build the curve for a stroke.
pub fn stroke_path(stroke: &Stroke) -> InkPath {
    build_path(stroke.points().iter().map(|p| p.pos()), stroke.width())
}

/// Built curves of committed strokes, keyed by stroke id.
///
/// Committed strokes never change, so an entry is built once and reused until
/// the stroke leaves the canvas.
#[derive(Debug, Clone, Default)]
pub struct PathCache {
    paths: HashMap<StrokeId, Arc<InkPath>>,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached curve for a stroke, building it on first use.
    pub fn get_or_build(&mut self, stroke: &Stroke) -> Arc<InkPath> {
        self.paths
            .entry(stroke.id())
            .or_insert_with(|| Arc::new(stroke_path(stroke)))
            .clone()
    }

    /// Get a cached curve without building.
    pub fn get(&self, id: StrokeId) -> Option<Arc<InkPath>> {
        self.paths.get(&id).cloned()
    }

    /// Drop entries whose stroke is no longer present.
    pub fn retain<'a>(&mut self, live_ids: impl IntoIterator<Item = &'a StrokeId>) {
        let keep: std::collections::HashSet<StrokeId> = live_ids.into_iter().copied().collect();
        self.paths.retain(|id, _| keep.contains(id));
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::{InkPoint, StrokeStyle};
    use crate::tools::ToolKind;
    use kurbo::PathEl;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_empty_builds_nothing() {
        assert_eq!(build_path(Vec::new(), 2.0), InkPath::Empty);
    }

    #[test]
    fn test_single_point_is_disc() {
        let path = build_path(pts(&[(4.0, 5.0)]), 6.0);
        assert_eq!(
            path,
            InkPath::Dot {
                center: Point::new(4.0, 5.0),
                radius: 3.0
            }
        );
    }

    #[test]
    fn test_two_points_is_line() {
        let InkPath::Curve(path) = build_path(pts(&[(0.0, 0.0), (10.0, 0.0)]), 2.0) else {
            panic!("expected curve");
        };
        assert_eq!(
            path.elements(),
            &[
                PathEl::MoveTo(Point::new(0.0, 0.0)),
                PathEl::LineTo(Point::new(10.0, 0.0)),
            ]
        );
    }

    #[test]
    fn test_three_points_quadratic_midpoints() {
        let InkPath::Curve(path) =
            build_path(pts(&[(0.0, 0.0), (10.0, 10.0), (20.0, 0.0)]), 2.0)
        else {
            panic!("expected curve");
        };
        assert_eq!(
            path.elements(),
            &[
                PathEl::MoveTo(Point::new(0.0, 0.0)),
                PathEl::QuadTo(Point::new(10.0, 10.0), Point::new(15.0, 5.0)),
                PathEl::LineTo(Point::new(20.0, 0.0)),
            ]
        );
    }

    #[test]
    fn test_control_points_are_samples() {
        let samples = pts(&[(0.0, 0.0), (5.0, 8.0), (9.0, 2.0), (14.0, 7.0), (20.0, 1.0)]);
        let InkPath::Curve(path) = build_path(samples.clone(), 2.0) else {
            panic!("expected curve");
        };
        let controls: Vec<Point> = path
            .elements()
            .iter()
            .filter_map(|el| match el {
                PathEl::QuadTo(c, _) => Some(*c),
                _ => None,
            })
            .collect();
        assert_eq!(controls, samples[1..samples.len() - 1].to_vec());
        assert_eq!(path.elements().last(), Some(&PathEl::LineTo(samples[4])));
    }

    #[test]
    fn test_incremental_matches_batch() {
        let samples = pts(&[(0.0, 0.0), (3.0, 4.0), (8.0, 1.0), (12.0, 6.0)]);
        let mut live = LivePath::new(2.0);
        for (i, point) in samples.iter().enumerate() {
            live.push(*point);
            assert_eq!(live.path(), build_path(samples[..=i].to_vec(), 2.0));
        }
        assert_eq!(live.len(), 4);
    }

    #[test]
    fn test_transformed_dot_scales_radius() {
        let dot = InkPath::Dot {
            center: Point::new(1.0, 1.0),
            radius: 2.0,
        };
        let affine = Affine::translate((10.0, 0.0)) * Affine::scale(3.0);
        assert_eq!(
            dot.transformed(affine, 3.0),
            InkPath::Dot {
                center: Point::new(13.0, 3.0),
                radius: 6.0
            }
        );
    }

    #[test]
    fn test_cache_builds_once_and_prunes() {
        let stroke = Stroke::from_points(
            [InkPoint::new(0.0, 0.0, 0), InkPoint::new(5.0, 5.0, 1)],
            StrokeStyle::default(),
            ToolKind::Pen,
        )
        .unwrap();
        let mut cache = PathCache::new();
        let first = cache.get_or_build(&stroke);
        let second = cache.get_or_build(&stroke);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        cache.retain(std::iter::empty());
        assert!(cache.is_empty());
    }
}
