//! C7 Event bus: typed session/viewport events, each gated by an interest bitmask, plus the
//! global pause/resume flags §4.6 describes.

use crate::change::ChangePtr;
use crate::constants::{session_events, viewport_events};

/// One session-level event, matching the bitmask table in §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Create,
    Edit,
    Undo,
    Clear,
    Transform,
    CreateCheckpoint,
    DestroyCheckpoint,
    Save,
    ChangesPaused,
    ChangesResumed,
    CreateViewport,
    DestroyViewport,
}

impl SessionEvent {
    pub fn bit(self) -> u32 {
        use session_events as e;
        match self {
            SessionEvent::Create => e::CREATE,
            SessionEvent::Edit => e::EDIT,
            SessionEvent::Undo => e::UNDO,
            SessionEvent::Clear => e::CLEAR,
            SessionEvent::Transform => e::TRANSFORM,
            SessionEvent::CreateCheckpoint => e::CREATE_CHECKPOINT,
            SessionEvent::DestroyCheckpoint => e::DESTROY_CHECKPOINT,
            SessionEvent::Save => e::SAVE,
            SessionEvent::ChangesPaused => e::CHANGES_PAUSED,
            SessionEvent::ChangesResumed => e::CHANGES_RESUMED,
            SessionEvent::CreateViewport => e::CREATE_VIEWPORT,
            SessionEvent::DestroyViewport => e::DESTROY_VIEWPORT,
        }
    }
}

/// One viewport-level event, matching the second bitmask table in §4.6. Disjoint from
/// `SessionEvent` — the two families are never compared against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportEvent {
    Create,
    Edit,
    Undo,
    Clear,
    Transform,
    Modify,
    Changes,
}

impl ViewportEvent {
    pub fn bit(self) -> u32 {
        use viewport_events as e;
        match self {
            ViewportEvent::Create => e::CREATE,
            ViewportEvent::Edit => e::EDIT,
            ViewportEvent::Undo => e::UNDO,
            ViewportEvent::Clear => e::CLEAR,
            ViewportEvent::Transform => e::TRANSFORM,
            ViewportEvent::Modify => e::MODIFY,
            ViewportEvent::Changes => e::CHANGES,
        }
    }

    /// EDIT on a positive serial, UNDO on a negative one (§4.5 Notification).
    pub fn edit_or_undo(change: &ChangePtr) -> Self {
        if change.is_undone() {
            ViewportEvent::Undo
        } else {
            ViewportEvent::Edit
        }
    }
}

/// A registered subscriber: an interest mask plus a callback. The callback plays the role
/// of the original's opaque `user_data_ptr` by simply capturing whatever state it needs.
pub struct Subscriber<E> {
    interest: u32,
    callback: Box<dyn FnMut(E, Option<&ChangePtr>)>,
}

impl<E: Copy> Subscriber<E> {
    pub fn new(interest: u32, callback: impl FnMut(E, Option<&ChangePtr>) + 'static) -> Self {
        Subscriber {
            interest,
            callback: Box::new(callback),
        }
    }

    pub fn set_interest(&mut self, interest: u32) {
        self.interest = interest;
    }

    pub fn interest(&self) -> u32 {
        self.interest
    }
}

impl Subscriber<SessionEvent> {
    /// Fires the callback iff the event's bit is set in the interest mask. Session events
    /// are not gated by the viewport-callback pause flag — only `changes_paused` governs
    /// whether edits happen at all, which is handled upstream of event emission.
    pub fn fire(&mut self, event: SessionEvent, change: Option<&ChangePtr>) {
        if self.interest & event.bit() != 0 {
            (self.callback)(event, change);
        }
    }
}

impl Subscriber<ViewportEvent> {
    /// Fires the callback iff the event's bit is set in the interest mask and the session
    /// has not paused viewport callbacks.
    pub fn fire(&mut self, event: ViewportEvent, change: Option<&ChangePtr>, callbacks_paused: bool) {
        if !callbacks_paused && self.interest & event.bit() != 0 {
            (self.callback)(event, change);
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
