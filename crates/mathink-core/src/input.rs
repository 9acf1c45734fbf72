//! Inbound input events and per-contact tracking.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Identifier the host assigns to a physical contact for its lifetime.
pub type ContactId = u64;

/// Kind of device producing a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Stylus,
    Touch,
}

/// Phase of a contact event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    /// Contact went down.
    Start,
    /// Contact moved.
    Move,
    /// Contact lifted.
    End,
    /// Contact lost (system interruption, palm rejection). Handled like `End`.
    Cancel,
}

impl TouchPhase {
    /// Whether this phase releases the contact.
    pub fn is_release(self) -> bool {
        matches!(self, TouchPhase::End | TouchPhase::Cancel)
    }
}

/// One contact sample from the host input layer, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub contact_id: ContactId,
    pub device: DeviceKind,
    pub phase: TouchPhase,
    pub screen_x: f64,
    pub screen_y: f64,
    /// Timestamp in milliseconds.
    pub timestamp_ms: u64,
    /// Normalized pressure (0.0 to 1.0, if available).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
}

impl InputEvent {
    pub fn new(
        contact_id: ContactId,
        device: DeviceKind,
        phase: TouchPhase,
        position: Point,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            contact_id,
            device,
            phase,
            screen_x: position.x,
            screen_y: position.y,
            timestamp_ms,
            pressure: None,
        }
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = Some(pressure);
        self
    }

    /// Screen position of the sample.
    pub fn position(&self) -> Point {
        Point::new(self.screen_x, self.screen_y)
    }

    pub fn has_finite_position(&self) -> bool {
        self.screen_x.is_finite() && self.screen_y.is_finite()
    }
}

/// A contact currently down on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub id: ContactId,
    /// Device kind as classified when the contact started. Never updated.
    pub device: DeviceKind,
    pub start: Point,
    pub position: Point,
    pub started_at: u64,
    pub updated_at: u64,
}

/// Tracks the contacts currently down, in press order.
#[derive(Debug, Clone, Default)]
pub struct ContactTracker {
    contacts: Vec<Contact>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new contact.
    ///
    /// Returns `None` for a duplicate start of an already-tracked contact or a
    /// start with a non-finite position.
    pub fn press(&mut self, event: &InputEvent) -> Option<Contact> {
        if !event.has_finite_position() || self.get(event.contact_id).is_some() {
            return None;
        }
        let contact = Contact {
            id: event.contact_id,
            device: event.device,
            start: event.position(),
            position: event.position(),
            started_at: event.timestamp_ms,
            updated_at: event.timestamp_ms,
        };
        self.contacts.push(contact);
        Some(contact)
    }

    /// Update a tracked contact's position.
    ///
    /// Non-finite positions are ignored and the last good position kept.
    pub fn update(&mut self, event: &InputEvent) -> Option<Contact> {
        let contact = self.contacts.iter_mut().find(|c| c.id == event.contact_id)?;
        if contact.device != event.device {
            log::trace!(
                "contact {} reported {:?} but started as {:?}; keeping original kind",
                contact.id,
                event.device,
                contact.device
            );
        }
        if event.has_finite_position() {
            contact.position = event.position();
        }
        contact.updated_at = contact.updated_at.max(event.timestamp_ms);
        Some(*contact)
    }

    /// Remove a contact, returning its final state.
    pub fn release(&mut self, event: &InputEvent) -> Option<Contact> {
        self.update(event)?;
        let index = self.contacts.iter().position(|c| c.id == event.contact_id)?;
        Some(self.contacts.remove(index))
    }

    pub fn get(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    /// Active contacts of one device kind, in press order.
    pub fn of_kind(&self, device: DeviceKind) -> impl Iterator<Item = &Contact> {
        self.contacts.iter().filter(move |c| c.device == device)
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
    }
}
