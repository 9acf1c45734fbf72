//! Canvas session: the single owner of strokes, viewport, tools and history.

use crate::config::EngineConfig;
use crate::eraser;
use crate::error::InkResult;
use crate::gesture::{GestureArbiter, GestureCommand, GestureKind};
use crate::history::{History, StrokeList};
use crate::input::InputEvent;
use crate::path::{PathCache, stroke_path};
use crate::render::{RenderFrame, RenderStroke};
use crate::stroke::{InkColor, InkPoint, Stroke, StrokeId};
use crate::tools::{StrokeCapture, ToolKind, ToolSettings};
use crate::viewport::Viewport;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Host-visible events the session cannot report through return values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionNotice {
    /// The stroke cap was exceeded and the oldest strokes were dropped.
    StrokesTrimmed { count: usize },
}

/// One drawing surface.
///
/// All mutation goes through `&mut self`, so a session has exactly one writer.
/// Drawing operations never fail: invalid input is logged and ignored, and the
/// return value says whether anything changed.
#[derive(Debug, Clone)]
pub struct CanvasSession {
    config: EngineConfig,
    /// Committed strokes, back to front.
    strokes: StrokeList,
    /// The stroke in progress.
    capture: StrokeCapture,
    viewport: Viewport,
    settings: ToolSettings,
    history: History,
    arbiter: GestureArbiter,
    /// Built curves of committed strokes.
    paths: PathCache,
    notices: Vec<SessionNotice>,
    revision: u64,
}

impl Default for CanvasSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasSession {
    /// Create an empty session with the default configuration.
    pub fn new() -> Self {
        Self::build(EngineConfig::default())
    }

    /// Create an empty session with a custom configuration.
    pub fn with_config(config: EngineConfig) -> InkResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        Self {
            strokes: StrokeList::new(),
            capture: StrokeCapture::new(),
            viewport: Viewport::with_bounds(config.min_scale, config.max_scale),
            settings: ToolSettings::new(ToolKind::Pen, config.default_color, config.default_width),
            history: History::new(config.max_strokes, config.max_history),
            arbiter: GestureArbiter::new(&config),
            paths: PathCache::new(),
            notices: Vec::new(),
            revision: 0,
            config,
        }
    }

    // --- Strokes ---

    /// Start a live stroke at a canvas point with the current tool settings.
    ///
    /// An unfinished live stroke is committed first.
    pub fn begin_stroke(&mut self, point: InkPoint) -> bool {
        if self.capture.is_active() {
            self.end_stroke();
        }
        match self.capture.begin(point, &self.settings) {
            Ok(()) => {
                self.touch();
                log::trace!("stroke started at ({:.1}, {:.1})", point.x, point.y);
                true
            }
            Err(err) => {
                log::debug!("begin_stroke rejected: {}", err);
                false
            }
        }
    }

    /// Append a canvas point to the live stroke.
    pub fn extend_stroke(&mut self, point: InkPoint) -> bool {
        match self.capture.update(point) {
            Ok(true) => {
                self.touch();
                log::trace!("stroke point ({:.1}, {:.1})", point.x, point.y);
                true
            }
            Ok(false) => false,
            Err(err) => {
                log::debug!("extend_stroke rejected: {}", err);
                false
            }
        }
    }

    /// Commit the live stroke. A stroke with a single point commits as a dot.
    ///
    /// Returns the committed stroke's id, or `None` when no stroke was in progress.
    pub fn end_stroke(&mut self) -> Option<StrokeId> {
        let stroke = Arc::new(self.capture.end()?);
        let id = stroke.id();
        self.paths.get_or_build(&stroke);

        let points = stroke.len();
        let trimmed = self.history.commit(&mut self.strokes, |strokes| strokes.push(stroke));
        log::debug!("committed stroke {} with {} points", id, points);
        self.after_commit(trimmed);
        Some(id)
    }

    /// Drop the live stroke without committing it.
    pub fn cancel_stroke(&mut self) -> bool {
        if !self.capture.is_active() {
            return false;
        }
        self.capture.cancel();
        self.touch();
        log::debug!("live stroke cancelled");
        true
    }

    /// Remove every committed stroke with a sample within the eraser radius.
    ///
    /// Returns the number of strokes removed. Nothing is recorded in history
    /// when no stroke is hit.
    pub fn erase_at(&mut self, point: Point) -> usize {
        let remaining = match eraser::erase_at(&self.strokes, point, self.config.eraser_radius) {
            Ok(Some(remaining)) => remaining,
            Ok(None) => return 0,
            Err(err) => {
                log::debug!("erase_at rejected: {}", err);
                return 0;
            }
        };
        let removed = self.strokes.len() - remaining.len();
        let trimmed = self.history.commit(&mut self.strokes, |strokes| *strokes = remaining);
        log::debug!("erased {} strokes at ({:.1}, {:.1})", removed, point.x, point.y);
        self.after_commit(trimmed);
        removed
    }

    // --- History ---

    pub fn undo(&mut self) -> bool {
        if !self.history.undo(&mut self.strokes) {
            return false;
        }
        log::debug!("undo; {} strokes", self.strokes.len());
        self.touch();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.history.redo(&mut self.strokes) {
            return false;
        }
        log::debug!("redo; {} strokes", self.strokes.len());
        self.touch();
        true
    }

    /// Remove all committed strokes as one undoable step.
    ///
    /// Clearing an empty canvas does nothing and records no history.
    pub fn clear(&mut self) -> bool {
        if self.strokes.is_empty() {
            return false;
        }
        let count = self.strokes.len();
        let trimmed = self.history.commit(&mut self.strokes, |strokes| strokes.clear());
        log::debug!("cleared {} strokes", count);
        self.after_commit(trimmed);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- Tool settings ---

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.settings.tool = tool;
    }

    pub fn set_color(&mut self, color: InkColor) {
        self.settings.style.color = color;
    }

    /// Set the ink width for new strokes. Non-finite or non-positive widths are ignored.
    pub fn set_width(&mut self, width: f64) -> bool {
        if !(width.is_finite() && width > 0.0) {
            log::debug!("set_width rejected: {}", width);
            return false;
        }
        self.settings.style.width = width;
        true
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    // --- Viewport ---

    /// Pan the view by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        match self.viewport.try_pan(Vec2::new(dx, dy)) {
            Ok(()) => {
                self.touch();
                true
            }
            Err(err) => {
                log::debug!("pan rejected: {}", err);
                false
            }
        }
    }

    /// Multiply the scale by `scale_delta`, keeping `anchor` (screen space) fixed.
    pub fn zoom(&mut self, scale_delta: f64, anchor: Point) -> bool {
        match self.viewport.try_zoom_at(anchor, scale_delta) {
            Ok(true) => {
                self.touch();
                true
            }
            Ok(false) => false,
            Err(err) => {
                log::debug!("zoom rejected: {}", err);
                false
            }
        }
    }

    /// Return to scale 1 with no translation.
    pub fn reset_viewport(&mut self) {
        self.viewport.reset();
        self.touch();
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    // --- Input ---

    /// Feed one input event through the gesture arbiter.
    ///
    /// Returns true if the event changed strokes, the live stroke or the viewport.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match self.arbiter.handle(event, &self.viewport, self.settings.tool) {
            Some(command) => self.apply(command),
            None => false,
        }
    }

    /// End any active gesture, e.g. after the host lost its input source.
    ///
    /// A live stroke is committed with the points it has.
    pub fn interrupt(&mut self) -> bool {
        let mut changed = match self.arbiter.interrupt() {
            Some(command) => self.apply(command),
            None => false,
        };
        if self.capture.is_active() {
            changed |= self.end_stroke().is_some();
        }
        changed
    }

    /// Gesture currently driving the surface.
    pub fn active_gesture(&self) -> Option<GestureKind> {
        self.arbiter.kind()
    }

    fn apply(&mut self, command: GestureCommand) -> bool {
        match command {
            GestureCommand::BeginStroke(point) => self.begin_stroke(point),
            GestureCommand::ExtendStroke(point) => self.extend_stroke(point),
            GestureCommand::EndStroke { last } => {
                if let Some(point) = last {
                    self.extend_stroke(point);
                }
                self.end_stroke().is_some()
            }
            GestureCommand::CancelStroke => self.cancel_stroke(),
            GestureCommand::RestartStroke(point) => {
                let dropped = self.cancel_stroke();
                self.begin_stroke(point) || dropped
            }
            GestureCommand::EraseAt(point) => self.erase_at(point) > 0,
            GestureCommand::SetViewport(viewport) => {
                if viewport == self.viewport {
                    return false;
                }
                self.viewport = viewport;
                self.touch();
                log::trace!(
                    "viewport scale {:.3} translate ({:.1}, {:.1})",
                    viewport.scale(),
                    viewport.translate().x,
                    viewport.translate().y
                );
                true
            }
        }
    }

    // --- Read model ---

    /// Committed strokes, back to front.
    pub fn strokes(&self) -> &[Arc<Stroke>] {
        &self.strokes
    }

    /// The stroke being drawn, if any.
    pub fn live_stroke(&self) -> Option<&Stroke> {
        self.capture.stroke()
    }

    /// Committed strokes for export. Never includes the live stroke.
    pub fn snapshot_for_export(&self) -> StrokeList {
        self.strokes.clone()
    }

    /// Resolve the current state to screen-space curves.
    pub fn render_frame(&self) -> RenderFrame {
        let strokes = self
            .strokes
            .iter()
            .map(|stroke| {
                let path = self
                    .paths
                    .get(stroke.id())
                    .unwrap_or_else(|| Arc::new(stroke_path(stroke)));
                RenderStroke::resolve(Some(stroke.id()), &path, stroke, &self.viewport)
            })
            .collect();
        let live = self
            .capture
            .stroke()
            .zip(self.capture.preview_path())
            .map(|(stroke, path)| RenderStroke::resolve(None, &path, stroke, &self.viewport));

        RenderFrame {
            strokes,
            live,
            viewport: self.viewport,
            revision: self.revision,
        }
    }

    /// Counter bumped on every visible change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drain pending host notices.
    pub fn take_notices(&mut self) -> Vec<SessionNotice> {
        std::mem::take(&mut self.notices)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn after_commit(&mut self, trimmed: usize) {
        if trimmed > 0 {
            log::warn!(
                "stroke cap {} reached; dropped {} oldest strokes",
                self.history.max_strokes(),
                trimmed
            );
            // Fold into the pending notice so an undrained queue stays bounded.
            match self.notices.last_mut() {
                Some(SessionNotice::StrokesTrimmed { count }) => *count += trimmed,
                _ => self.notices.push(SessionNotice::StrokesTrimmed { count: trimmed }),
            }
        }
        let referenced: Vec<StrokeId> = self
            .strokes
            .iter()
            .map(|stroke| stroke.id())
            .chain(self.history.referenced_ids())
            .collect();
        self.paths.retain(&referenced);
        self.touch();
    }
}
