//! Error types for engine boundary checks.

use thiserror::Error;

/// Errors raised when an input is rejected at a function boundary.
///
/// The [`CanvasSession`](crate::CanvasSession) never hands these to the host for
/// drawing operations; it logs them and keeps its prior state.
#[derive(Debug, Error)]
pub enum InkError {
    #[error("Non-finite coordinate: ({x}, {y})")]
    NonFiniteCoordinate { x: f64, y: f64 },
    #[error("Non-finite scale: {0}")]
    NonFiniteScale(f64),
    #[error("Invalid eraser radius: {0}")]
    InvalidRadius(f64),
    #[error("Stroke has no points")]
    EmptyStroke,
    #[error("Invalid stroke width: {0}")]
    InvalidWidth(f64),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for engine boundary checks.
pub type InkResult<T> = Result<T, InkError>;

/// Reject a point with a NaN or infinite component.
pub(crate) fn ensure_finite(point: kurbo::Point) -> InkResult<kurbo::Point> {
    if point.x.is_finite() && point.y.is_finite() {
        Ok(point)
    } else {
        Err(InkError::NonFiniteCoordinate {
            x: point.x,
            y: point.y,
        })
    }
}
