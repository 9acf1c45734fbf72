//! Export pipeline: committed strokes to PNG to a recognition request.
//!
//! The image is framed to the ink, not to the on-screen viewport, so the
//! recognizer always sees the whole expression at a useful size.

use crate::raster::{RasterImage, RasterRenderer};
use crate::renderer::{RenderContext, RenderError, RenderResult, Renderer};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Rect, Size};
use mathink_core::path::stroke_path;
use mathink_core::render::{RenderFrame, RenderStroke};
use mathink_core::stroke::{InkColor, Stroke};
use mathink_core::viewport::Viewport;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Export image settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub width: u32,
    pub height: u32,
    /// Margin around the ink, in pixels.
    pub padding: f64,
    pub background: InkColor,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            padding: 24.0,
            background: InkColor::white(),
        }
    }
}

/// Request body for the handwriting recognition service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrRequest {
    /// PNG as a `data:image/png;base64,` URL.
    pub image_base64: String,
}

impl OcrRequest {
    pub fn from_png(png: &[u8]) -> Self {
        Self {
            image_base64: format!("data:image/png;base64,{}", STANDARD.encode(png)),
        }
    }
}

/// Union of the inked area of every stroke.
pub fn content_bounds(strokes: &[Arc<Stroke>]) -> Option<Rect> {
    strokes
        .iter()
        .map(|stroke| stroke.ink_bounds())
        .reduce(|acc, bounds| acc.union(bounds))
}

/// Rasterize strokes, framed to their bounds.
pub fn rasterize(strokes: &[Arc<Stroke>], options: &ExportOptions) -> RenderResult<RasterImage> {
    let bounds = content_bounds(strokes).ok_or(RenderError::EmptyCanvas)?;
    let mut renderer = RasterRenderer::new(options.width, options.height)?;

    let size = Size::new(options.width as f64, options.height as f64);
    let mut viewport = Viewport::new();
    viewport.fit_to_bounds(bounds, size, options.padding);

    let frame = RenderFrame {
        strokes: strokes
            .iter()
            .map(|stroke| RenderStroke::resolve(Some(stroke.id()), &stroke_path(stroke), stroke, &viewport))
            .collect(),
        live: None,
        viewport,
        revision: 0,
    };
    let ctx = RenderContext::new(&frame, size).with_background(options.background.into());
    renderer.build_scene(&ctx);

    log::debug!(
        "exported {} strokes at scale {:.3} into {}x{}",
        strokes.len(),
        viewport.scale(),
        options.width,
        options.height
    );
    Ok(renderer.into_image())
}

/// Encode an RGBA image as PNG.
pub fn encode_png(image: &RasterImage) -> RenderResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, image.width, image.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&image.rgba_data)?;
        writer.finish()?;
    }
    Ok(png_data)
}

/// Rasterize and encode strokes as PNG.
pub fn export_png(strokes: &[Arc<Stroke>], options: &ExportOptions) -> RenderResult<Vec<u8>> {
    encode_png(&rasterize(strokes, options)?)
}

/// Build the recognition request for a stroke snapshot.
pub fn ocr_request(strokes: &[Arc<Stroke>], options: &ExportOptions) -> RenderResult<OcrRequest> {
    Ok(OcrRequest::from_png(&export_png(strokes, options)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathink_core::canvas::CanvasSession;
    use mathink_core::stroke::InkPoint;

    const PNG_MAGIC: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

    fn session_with_line() -> CanvasSession {
        let mut session = CanvasSession::new();
        session.begin_stroke(InkPoint::new(10.0, 10.0, 0));
        session.extend_stroke(InkPoint::new(60.0, 30.0, 5));
        session.extend_stroke(InkPoint::new(110.0, 10.0, 10));
        session.end_stroke();
        session
    }

    #[test]
    fn test_empty_canvas_rejected() {
        let result = export_png(&[], &ExportOptions::default());
        assert!(matches!(result, Err(RenderError::EmptyCanvas)));
    }

    #[test]
    fn test_png_header() {
        let session = session_with_line();
        let png = export_png(&session.snapshot_for_export(), &ExportOptions::default()).unwrap();
        assert_eq!(&png[0..8], &PNG_MAGIC);
    }

    #[test]
    fn test_ink_is_framed_inside_padding() {
        let session = session_with_line();
        let options = ExportOptions {
            width: 200,
            height: 100,
            padding: 20.0,
            ..Default::default()
        };
        let image = rasterize(&session.snapshot_for_export(), &options).unwrap();

        // Padding band stays background.
        for x in 0..image.width {
            assert_eq!(image.pixel(x, 2), Some([255, 255, 255, 255]));
        }
        // Some ink landed on the canvas.
        assert!(image.rgba_data.chunks_exact(4).any(|px| px[0] < 128));
    }

    #[test]
    fn test_live_stroke_is_not_exported() {
        let mut session = session_with_line();
        session.begin_stroke(InkPoint::new(500.0, 500.0, 20));
        let snapshot = session.snapshot_for_export();
        assert_eq!(snapshot.len(), 1);
        let bounds = content_bounds(&snapshot).unwrap();
        assert!(bounds.x1 < 200.0);
    }

    #[test]
    fn test_ocr_request_shape() {
        let session = session_with_line();
        let request = ocr_request(&session.snapshot_for_export(), &ExportOptions::default()).unwrap();
        assert!(request.image_base64.starts_with("data:image/png;base64,"));

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("image_base64").is_some());

        let encoded = request.image_base64.trim_start_matches("data:image/png;base64,");
        let decoded = STANDARD.decode(encoded).unwrap();
        assert_eq!(&decoded[0..8], &PNG_MAGIC);
    }

    #[test]
    fn test_invalid_size_rejected() {
        let session = session_with_line();
        let options = ExportOptions {
            width: 0,
            ..Default::default()
        };
        assert!(matches!(
            rasterize(&session.snapshot_for_export(), &options),
            Err(RenderError::InvalidSize { .. })
        ));
    }
}
