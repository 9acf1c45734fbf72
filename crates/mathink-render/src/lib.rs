//! MathInk Render Library
//!
//! Renderer abstraction over the core render read model, a CPU raster
//! renderer, and the PNG export used for handwriting recognition.

pub mod export;
pub mod raster;
mod renderer;

pub use export::{ExportOptions, OcrRequest, content_bounds, encode_png, export_png, ocr_request, rasterize};
pub use raster::{RasterImage, RasterRenderer};
pub use renderer::{RenderContext, RenderError, RenderResult, Renderer};
