use crate::domain::model::{ContactPayload, ElementId};

pub const ESCAPE: &str = "Escape";

/// Input delivered to the controllers by the host page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    Click { target: ElementId },
    KeyDown { key: String },
    Resize,
    Scroll,
}

impl PageEvent {
    pub fn click(target: ElementId) -> Self {
        PageEvent::Click { target }
    }

    pub fn key(key: impl Into<String>) -> Self {
        PageEvent::KeyDown { key: key.into() }
    }

    pub fn escape() -> Self {
        Self::key(ESCAPE)
    }
}

/// Flags a handler raises on the event it was given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
    /// A header-aware scroll was already issued for this event.
    pub scroll_requested: bool,
}

impl EventOutcome {
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

/// Everything the host has to act on after one dispatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dispatch {
    pub outcome: EventOutcome,
    pub needs_animation_frame: bool,
    pub pending_submission: Option<ContactPayload>,
}
