//! Eraser hit-testing: whole-stroke removal around a canvas point.

use crate::error::{InkError, InkResult, ensure_finite};
use crate::stroke::{Stroke, StrokeId};
use kurbo::Point;
use std::sync::Arc;

/// Check an eraser radius.
pub fn validate_radius(radius: f64) -> InkResult<f64> {
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(InkError::InvalidRadius(radius))
    }
}

/// Ids of strokes with at least one sample within `radius` of `point`.
///
/// Results are in z-order (back to front).
pub fn hits(strokes: &[Arc<Stroke>], point: Point, radius: f64) -> InkResult<Vec<StrokeId>> {
    let point = ensure_finite(point)?;
    let radius = validate_radius(radius)?;
    Ok(strokes
        .iter()
        .filter(|stroke| {
            // Cheap reject before touching every sample. Inclusive on all edges.
            let reach = stroke.bounds().inflate(radius, radius);
            let inside = point.x >= reach.x0
                && point.x <= reach.x1
                && point.y >= reach.y0
                && point.y <= reach.y1;
            inside && stroke.hit_test(point, radius)
        })
        .map(|stroke| stroke.id())
        .collect())
}

/// Stroke sequence with every stroke hit at `point` removed.
///
/// Returns `Ok(None)` when nothing is hit, so callers can skip recording
/// history for a no-op.
pub fn erase_at(
    strokes: &[Arc<Stroke>],
    point: Point,
    radius: f64,
) -> InkResult<Option<Vec<Arc<Stroke>>>> {
    let hit = hits(strokes, point, radius)?;
    if hit.is_empty() {
        return Ok(None);
    }
    Ok(Some(
        strokes
            .iter()
            .filter(|stroke| !hit.contains(&stroke.id()))
            .cloned()
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::{InkPoint, StrokeStyle};
    use crate::tools::ToolKind;

    fn stroke(points: &[(f64, f64)]) -> Arc<Stroke> {
        Arc::new(
            Stroke::from_points(
                points.iter().map(|&(x, y)| InkPoint::new(x, y, 0)),
                StrokeStyle::default(),
                ToolKind::Pen,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_hits_within_radius() {
        let strokes = vec![stroke(&[(0.0, 0.0), (10.0, 0.0)]), stroke(&[(100.0, 100.0)])];
        let hit = hits(&strokes, Point::new(12.0, 0.0), 5.0).unwrap();
        assert_eq!(hit, vec![strokes[0].id()]);
    }

    #[test]
    fn test_boundary_distance_counts() {
        let strokes = vec![stroke(&[(0.0, 0.0)])];
        let hit = hits(&strokes, Point::new(5.0, 0.0), 5.0).unwrap();
        assert_eq!(hit.len(), 1);
    }

    #[test]
    fn test_erase_removes_all_intersecting() {
        let strokes = vec![
            stroke(&[(0.0, 0.0), (10.0, 0.0)]),
            stroke(&[(50.0, 50.0)]),
            stroke(&[(2.0, 2.0)]),
        ];
        let remaining = erase_at(&strokes, Point::new(1.0, 1.0), 5.0).unwrap().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id(), strokes[1].id());
    }

    #[test]
    fn test_erase_miss_is_none() {
        let strokes = vec![stroke(&[(0.0, 0.0)])];
        assert!(erase_at(&strokes, Point::new(100.0, 0.0), 5.0).unwrap().is_none());
    }

    #[test]
    fn test_invalid_input_rejected() {
        let strokes = vec![stroke(&[(0.0, 0.0)])];
        assert!(matches!(
            hits(&strokes, Point::ZERO, 0.0),
            Err(InkError::InvalidRadius(_))
        ));
        assert!(matches!(
            hits(&strokes, Point::ZERO, -2.0),
            Err(InkError::InvalidRadius(_))
        ));
        assert!(matches!(
            hits(&strokes, Point::new(f64::NAN, 0.0), 5.0),
            Err(InkError::NonFiniteCoordinate { .. })
        ));
    }
}
