//! CPU raster renderer producing an RGBA8 buffer, backed by tiny-skia.

use crate::renderer::{RenderContext, RenderError, RenderResult, Renderer};
use kurbo::{BezPath, PathEl};
use mathink_core::path::InkPath;
use mathink_core::render::RenderStroke;
use mathink_core::tools::ToolKind;
use peniko::Color;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, Transform};

/// Largest accepted image side, in pixels.
pub const MAX_DIMENSION: u32 = 8192;

/// Thinnest line drawn, so hairlines stay visible.
const MIN_WIDTH: f32 = 1.0;

/// Raw RGBA pixel data with its dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    /// RGBA pixel data (4 bytes per pixel, straight alpha), row major.
    pub rgba_data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl RasterImage {
    /// Pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let px = self.rgba_data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Software renderer drawing anti-aliased round-capped ink.
#[derive(Debug, Clone)]
pub struct RasterRenderer {
    pixmap: Pixmap,
}

impl RasterRenderer {
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(RenderError::InvalidSize { width, height });
        }
        let pixmap = Pixmap::new(width, height).ok_or(RenderError::InvalidSize { width, height })?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Premultiplied RGBA pixels.
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data()
    }

    pub fn into_image(self) -> RasterImage {
        let rgba_data = self
            .pixmap
            .pixels()
            .iter()
            .flat_map(|px| {
                let c = px.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        RasterImage {
            rgba_data,
            width: self.pixmap.width(),
            height: self.pixmap.height(),
        }
    }

    fn paint(&mut self, stroke: &RenderStroke, color: Color) {
        let paint = skia_paint(color);
        match &stroke.path {
            InkPath::Empty => {}
            InkPath::Dot { center, radius } => {
                let radius = (*radius as f32).max(MIN_WIDTH / 2.0);
                if let Some(circle) = PathBuilder::from_circle(center.x as f32, center.y as f32, radius) {
                    self.pixmap
                        .fill_path(&circle, &paint, FillRule::Winding, Transform::identity(), None);
                }
            }
            InkPath::Curve(path) => {
                let Some(path) = skia_path(path) else {
                    return;
                };
                let ink = Stroke {
                    width: (stroke.width as f32).max(MIN_WIDTH),
                    line_cap: LineCap::Round,
                    line_join: LineJoin::Round,
                    ..Default::default()
                };
                self.pixmap
                    .stroke_path(&path, &paint, &ink, Transform::identity(), None);
            }
        }
    }
}

impl Renderer for RasterRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        let background = self.background_color(ctx);
        self.pixmap.fill(skia_color(background));
        for stroke in ctx.frame.iter() {
            let color = match stroke.tool {
                ToolKind::Eraser => background,
                ToolKind::Pen => stroke.color.into(),
            };
            self.paint(stroke, color);
        }
        log::trace!(
            "rasterized {} strokes into {}x{}",
            ctx.frame.strokes.len(),
            self.width(),
            self.height()
        );
    }
}

fn skia_color(color: Color) -> tiny_skia::Color {
    let c = color.to_rgba8();
    tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn skia_paint(color: Color) -> Paint<'static> {
    let c = color.to_rgba8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(c.r, c.g, c.b, c.a);
    paint.anti_alias = true;
    paint
}

/// Convert a kurbo path to a tiny-skia path. `None` when it has no segments.
fn skia_path(path: &BezPath) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}
