//! Renderer trait abstraction.

use kurbo::Size;
use mathink_core::render::RenderFrame;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Nothing to render: the canvas has no strokes")]
    EmptyCanvas,
    #[error("Invalid image size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// Screen-space strokes to draw.
    pub frame: &'a RenderFrame,
    /// Target size in physical pixels.
    pub viewport_size: Size,
    /// Background color. Eraser-tagged ink is painted with it too.
    pub background_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(frame: &'a RenderFrame, viewport_size: Size) -> Self {
        Self {
            frame,
            viewport_size,
            background_color: Color::from_rgba8(255, 255, 255, 255),
        }
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }
}

/// Trait for rendering backends.
///
/// Implementations only read the frame; engine state is never touched.
pub trait Renderer: Send + Sync {
    /// Draw everything in the frame, back to front.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}
