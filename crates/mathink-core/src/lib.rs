//! MathInk Core Library
//!
//! Platform-agnostic stroke capture and canvas transform engine for a
//! handwritten-math surface: stroke model, path smoothing, gesture
//! arbitration, eraser, undo history and the render read model.

pub mod canvas;
pub mod config;
pub mod eraser;
pub mod error;
pub mod gesture;
pub mod history;
pub mod input;
pub mod path;
pub mod render;
pub mod stroke;
pub mod tools;
pub mod viewport;

pub use canvas::{CanvasSession, SessionNotice};
pub use config::{EngineConfig, TouchMode, ERASER_RADIUS, MAX_HISTORY, MAX_SCALE, MAX_STROKES, MIN_SCALE};
pub use error::{InkError, InkResult};
pub use gesture::{GestureArbiter, GestureCommand, GestureKind};
pub use history::{History, StrokeList};
pub use input::{ContactId, DeviceKind, InputEvent, TouchPhase};
pub use path::{InkPath, LivePath, PathCache, build_path, stroke_path};
pub use render::{RenderFrame, RenderStroke};
pub use stroke::{InkColor, InkPoint, Stroke, StrokeId, StrokeStyle};
pub use tools::{StrokeCapture, ToolKind, ToolSettings};
pub use viewport::{Viewport, clamp_scale};
