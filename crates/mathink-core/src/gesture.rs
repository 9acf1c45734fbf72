//! Gesture arbiter: routes contact streams to drawing, erasing, panning or
//! pinch-zooming.
//!
//! Precedence, highest first:
//! 1. A stylus contact always draws (or erases with the eraser tool), even
//!    while fingers rest on the surface.
//! 2. A lone finger pans.
//! 3. Two fingers pinch-zoom and pan together, relative to the viewport
//!    captured when the pinch started.
//!
//! A contact keeps the device kind it started with; later events that report
//! another kind do not re-route it.

use crate::config::{EngineConfig, TouchMode};
use crate::input::{Contact, ContactId, ContactTracker, DeviceKind, InputEvent, TouchPhase};
use crate::stroke::InkPoint;
use crate::tools::ToolKind;
use crate::viewport::Viewport;
use kurbo::Point;

/// Interpretation selected once per contact set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Draw,
    Erase,
    Pan,
    PinchZoom,
}

/// What the session should do in response to an input event.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureCommand {
    /// Start a live stroke at a canvas point.
    BeginStroke(InkPoint),
    /// Append a canvas point to the live stroke.
    ExtendStroke(InkPoint),
    /// Commit the live stroke, appending `last` first when present.
    EndStroke { last: Option<InkPoint> },
    /// Drop the live stroke without committing.
    CancelStroke,
    /// Drop the live stroke and start a new one at a canvas point.
    RestartStroke(InkPoint),
    /// Remove strokes around a canvas point.
    EraseAt(Point),
    /// Replace the viewport.
    SetViewport(Viewport),
}

/// Internal arbiter state.
#[derive(Debug, Clone, Default)]
enum ArbiterState {
    #[default]
    Idle,
    Drawing {
        contact: ContactId,
        kind: GestureKind,
        /// Screen position of the last sample forwarded to the stroke.
        last_sample: Point,
        /// Whether any move passed the sample-distance filter.
        moved: bool,
    },
    Panning {
        contact: ContactId,
        origin: Point,
        base: Viewport,
    },
    PanZooming {
        first: ContactId,
        second: ContactId,
        start_mid: Point,
        start_distance: f64,
        base: Viewport,
    },
}

/// Per-session gesture state machine.
#[derive(Debug, Clone)]
pub struct GestureArbiter {
    state: ArbiterState,
    contacts: ContactTracker,
    touch_mode: TouchMode,
    min_sample_distance: f64,
    tap_max_duration_ms: u64,
}

impl Default for GestureArbiter {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl GestureArbiter {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            state: ArbiterState::Idle,
            contacts: ContactTracker::new(),
            touch_mode: config.touch_mode,
            min_sample_distance: config.min_sample_distance,
            tap_max_duration_ms: config.tap_max_duration_ms,
        }
    }

    /// The active gesture, or `None` when idle.
    pub fn kind(&self) -> Option<GestureKind> {
        match &self.state {
            ArbiterState::Idle => None,
            ArbiterState::Drawing { kind, .. } => Some(*kind),
            ArbiterState::Panning { .. } => Some(GestureKind::Pan),
            ArbiterState::PanZooming { .. } => Some(GestureKind::PinchZoom),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, ArbiterState::Idle)
    }

    /// Number of contacts currently down, including ignored ones.
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    /// Classify one event against the current viewport and tool.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        viewport: &Viewport,
        tool: ToolKind,
    ) -> Option<GestureCommand> {
        match event.phase {
            TouchPhase::Start => {
                let contact = self.contacts.press(event)?;
                self.on_start(contact, event, viewport, tool)
            }
            TouchPhase::Move => {
                let contact = self.contacts.update(event)?;
                self.on_move(contact, event, viewport)
            }
            TouchPhase::End | TouchPhase::Cancel => {
                let contact = self.contacts.release(event)?;
                self.on_release(contact, event, viewport)
            }
        }
    }

    /// End whatever gesture is active and forget all contacts.
    ///
    /// A stroke in progress is committed with the samples it has.
    pub fn interrupt(&mut self) -> Option<GestureCommand> {
        self.contacts.clear();
        match std::mem::take(&mut self.state) {
            ArbiterState::Drawing {
                kind: GestureKind::Draw,
                ..
            } => Some(GestureCommand::EndStroke { last: None }),
            _ => None,
        }
    }

    fn on_start(
        &mut self,
        contact: Contact,
        event: &InputEvent,
        viewport: &Viewport,
        tool: ToolKind,
    ) -> Option<GestureCommand> {
        match (contact.device, &self.state) {
            // Stylus has precedence over finger navigation.
            (DeviceKind::Stylus, ArbiterState::Idle)
            | (DeviceKind::Stylus, ArbiterState::Panning { .. })
            | (DeviceKind::Stylus, ArbiterState::PanZooming { .. }) => {
                Some(self.start_drawing(contact, event, viewport, tool))
            }
            // ...and over finger ink. A finger that never moved was resting.
            (
                DeviceKind::Stylus,
                ArbiterState::Drawing {
                    contact: drawing,
                    kind,
                    moved,
                    ..
                },
            ) if self.is_finger(*drawing) => {
                let discard = *kind == GestureKind::Draw && !*moved;
                log::debug!("stylus {} takes over from finger {}", contact.id, drawing);
                match self.start_drawing(contact, event, viewport, tool) {
                    GestureCommand::BeginStroke(point) if discard => {
                        Some(GestureCommand::RestartStroke(point))
                    }
                    // Beginning a stroke commits the finger's live stroke.
                    command => Some(command),
                }
            }
            (DeviceKind::Stylus, ArbiterState::Drawing { .. }) => {
                log::trace!("ignoring extra stylus contact {}", contact.id);
                None
            }
            (DeviceKind::Touch, ArbiterState::Idle)
                if self.resting_finger(contact.id).is_some() =>
            {
                // Fingers left down through a stylus stroke pinch with the new one.
                let first = self.resting_finger(contact.id)?;
                self.start_pinch(first, contact.id, viewport);
                None
            }
            (DeviceKind::Touch, ArbiterState::Idle) => match self.touch_mode {
                TouchMode::PanOnly => {
                    self.state = ArbiterState::Panning {
                        contact: contact.id,
                        origin: contact.position,
                        base: *viewport,
                    };
                    None
                }
                TouchMode::DrawWithFinger => {
                    Some(self.start_drawing(contact, event, viewport, tool))
                }
            },
            (DeviceKind::Touch, ArbiterState::Panning { contact: first, .. }) => {
                let first = *first;
                self.start_pinch(first, contact.id, viewport);
                None
            }
            (
                DeviceKind::Touch,
                ArbiterState::Drawing {
                    contact: drawing,
                    kind: GestureKind::Draw,
                    moved: false,
                    ..
                },
            ) if self.is_finger(*drawing) => {
                // Second finger before the first one drew anything: it was a pinch.
                let first = *drawing;
                self.start_pinch(first, contact.id, viewport);
                Some(GestureCommand::CancelStroke)
            }
            (
                DeviceKind::Touch,
                ArbiterState::Drawing {
                    contact: drawing,
                    kind: GestureKind::Erase,
                    moved: false,
                    ..
                },
            ) if self.is_finger(*drawing) => {
                let first = *drawing;
                self.start_pinch(first, contact.id, viewport);
                None
            }
            (DeviceKind::Touch, _) => {
                log::trace!("finger contact {} resting; ignored", contact.id);
                None
            }
        }
    }

    fn on_move(
        &mut self,
        contact: Contact,
        event: &InputEvent,
        viewport: &Viewport,
    ) -> Option<GestureCommand> {
        let min_distance = self.min_sample_distance;
        match &mut self.state {
            ArbiterState::Drawing {
                contact: id,
                kind,
                last_sample,
                moved,
            } if *id == contact.id => {
                let canvas = viewport.to_canvas(contact.position);
                match kind {
                    GestureKind::Erase => {
                        *moved = true;
                        *last_sample = contact.position;
                        Some(GestureCommand::EraseAt(canvas))
                    }
                    _ => {
                        if contact.position.distance(*last_sample) < min_distance {
                            return None;
                        }
                        *moved = true;
                        *last_sample = contact.position;
                        Some(GestureCommand::ExtendStroke(ink_point(canvas, event)))
                    }
                }
            }
            ArbiterState::Panning {
                contact: id,
                origin,
                base,
            } if *id == contact.id => match base.panned(contact.position - *origin) {
                Ok(next) => Some(GestureCommand::SetViewport(next)),
                Err(err) => {
                    log::debug!("pan rejected: {}", err);
                    None
                }
            },
            ArbiterState::PanZooming {
                first,
                second,
                start_mid,
                start_distance,
                base,
            } if *first == contact.id || *second == contact.id => {
                let a = self.contacts.get(*first)?.position;
                let b = self.contacts.get(*second)?.position;
                let ratio = if *start_distance > f64::EPSILON {
                    a.distance(b) / *start_distance
                } else {
                    1.0
                };
                match base.pinched(*start_mid, a.midpoint(b), ratio) {
                    Ok(next) => Some(GestureCommand::SetViewport(next)),
                    Err(err) => {
                        log::debug!("pinch rejected: {}", err);
                        None
                    }
                }
            }
            _ => None,
        }
    }

    fn on_release(
        &mut self,
        contact: Contact,
        event: &InputEvent,
        viewport: &Viewport,
    ) -> Option<GestureCommand> {
        match std::mem::take(&mut self.state) {
            ArbiterState::Drawing {
                contact: id,
                kind,
                last_sample,
                moved,
            } if id == contact.id => {
                if kind == GestureKind::Erase {
                    return None;
                }
                let duration = contact.updated_at.saturating_sub(contact.started_at);
                let is_tap = !moved && duration <= self.tap_max_duration_ms;
                let last = if !is_tap && contact.position != last_sample {
                    Some(ink_point(viewport.to_canvas(contact.position), event))
                } else {
                    None
                };
                if event.phase == TouchPhase::Cancel {
                    log::debug!("stroke contact {} cancelled; committing partial stroke", id);
                }
                Some(GestureCommand::EndStroke { last })
            }
            ArbiterState::Panning { contact: id, .. } if id == contact.id => None,
            ArbiterState::PanZooming { first, second, .. }
                if first == contact.id || second == contact.id =>
            {
                // Continue as a one-finger pan with the remaining contact.
                let remaining = if first == contact.id { second } else { first };
                if let Some(rest) = self.contacts.get(remaining) {
                    self.state = ArbiterState::Panning {
                        contact: remaining,
                        origin: rest.position,
                        base: *viewport,
                    };
                }
                None
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    fn start_drawing(
        &mut self,
        contact: Contact,
        event: &InputEvent,
        viewport: &Viewport,
        tool: ToolKind,
    ) -> GestureCommand {
        let kind = match tool {
            ToolKind::Pen => GestureKind::Draw,
            ToolKind::Eraser => GestureKind::Erase,
        };
        self.state = ArbiterState::Drawing {
            contact: contact.id,
            kind,
            last_sample: contact.position,
            moved: false,
        };
        let canvas = viewport.to_canvas(contact.position);
        match kind {
            GestureKind::Erase => GestureCommand::EraseAt(canvas),
            _ => GestureCommand::BeginStroke(ink_point(canvas, event)),
        }
    }

    fn start_pinch(&mut self, first: ContactId, second: ContactId, viewport: &Viewport) {
        let (Some(a), Some(b)) = (self.contacts.get(first), self.contacts.get(second)) else {
            return;
        };
        self.state = ArbiterState::PanZooming {
            first,
            second,
            start_mid: a.position.midpoint(b.position),
            start_distance: a.position.distance(b.position),
            base: *viewport,
        };
    }

    /// A tracked finger other than `id`.
    fn resting_finger(&self, id: ContactId) -> Option<ContactId> {
        self.contacts
            .of_kind(DeviceKind::Touch)
            .map(|c| c.id)
            .find(|&other| other != id)
    }

    fn is_finger(&self, id: ContactId) -> bool {
        self.contacts
            .get(id)
            .is_some_and(|c| c.device == DeviceKind::Touch)
    }
}

fn ink_point(canvas: Point, event: &InputEvent) -> InkPoint {
    InkPoint {
        x: canvas.x,
        y: canvas.y,
        t: event.timestamp_ms,
        pressure: event.pressure,
    }
}
