//! C6 Viewport engine: fixed and floating windows over the computed stream, dirty
//! tracking, and affects-viewport notification.
//!
//! Ground-up rewrite — the teacher's `src/viewport.rs` is a terminal scroll window, not a
//! model of this shape. Grounded instead on
//! `examples/original_source/.../impl_/viewport_def.hpp` and `viewport.cpp`: the dirty flag
//! is the sign of the stored capacity, exactly as the original encodes it.

use crate::change::{ChangeKind, ChangePtr};
use crate::constants::limits::CAPACITY_LIMIT;
use crate::error::{EditError, Result};
use crate::event::{Subscriber, ViewportEvent};
use crate::materialize::{materialize, SegmentSource};
use crate::piece_table::PieceTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportKind {
    Fixed,
    Floating,
}

pub struct Viewport {
    /// The anchored offset a fixed viewport never moves from, and the base a floating
    /// viewport's `offset_adjustment` accumulates against.
    offset: i64,
    offset_adjustment: i64,
    kind: ViewportKind,
    /// Sign encodes dirtiness: negative means the buffer does not reflect the latest
    /// model state. Absolute value is the true capacity.
    raw_capacity: i64,
    /// Bytes actually populated on the last `get_data`; may be less than capacity near EOF.
    length: i64,
    buffer: Vec<u8>,
    subscriber: Option<Subscriber<ViewportEvent>>,
}

impl Viewport {
    pub fn new(offset: i64, capacity: i64, kind: ViewportKind) -> Result<Self> {
        if capacity <= 0 || capacity > CAPACITY_LIMIT {
            return Err(EditError::range(
                "VIEWPORT_CAPACITY_OUT_OF_RANGE",
                format!("viewport capacity {capacity} must be in (0, {CAPACITY_LIMIT}]"),
            ));
        }
        Ok(Viewport {
            offset,
            offset_adjustment: 0,
            kind,
            raw_capacity: -capacity,
            length: 0,
            buffer: Vec::new(),
            subscriber: None,
        })
    }

    pub fn set_subscriber(&mut self, subscriber: Subscriber<ViewportEvent>) {
        self.subscriber = Some(subscriber);
    }

    pub fn set_event_interest(&mut self, interest: u32) {
        if let Some(sub) = &mut self.subscriber {
            sub.set_interest(interest);
        }
    }

    pub fn capacity(&self) -> i64 {
        self.raw_capacity.abs()
    }

    pub fn is_dirty(&self) -> bool {
        self.raw_capacity < 0
    }

    pub fn has_changes(&self) -> bool {
        self.is_dirty()
    }

    pub fn is_floating(&self) -> bool {
        self.kind == ViewportKind::Floating
    }

    /// The window start as currently adjusted. Fixed viewports never accumulate
    /// adjustment, so this is just `offset` for them.
    pub fn get_offset(&self) -> i64 {
        (self.offset + self.offset_adjustment).max(0)
    }

    pub fn get_length(&self) -> i64 {
        self.length
    }

    pub fn get_following_byte_count(&self, computed_size: i64) -> i64 {
        computed_size - (self.get_offset() + self.length)
    }

    pub fn in_segment(&self, offset: i64) -> bool {
        let start = self.get_offset();
        offset >= start && offset < start + self.capacity()
    }

    fn mark_dirty(&mut self) {
        self.raw_capacity = -self.raw_capacity.abs();
    }

    fn mark_clean(&mut self) {
        self.raw_capacity = self.raw_capacity.abs();
    }

    pub fn modify(&mut self, offset: i64, capacity: i64, is_floating: bool) -> Result<()> {
        if capacity <= 0 || capacity > CAPACITY_LIMIT {
            return Err(EditError::range(
                "VIEWPORT_CAPACITY_OUT_OF_RANGE",
                format!("viewport capacity {capacity} must be in (0, {CAPACITY_LIMIT}]"),
            ));
        }
        self.offset = offset;
        self.offset_adjustment = 0;
        self.kind = if is_floating { ViewportKind::Floating } else { ViewportKind::Fixed };
        self.raw_capacity = -capacity;
        if let Some(sub) = &mut self.subscriber {
            sub.fire(ViewportEvent::Modify, None, false);
        }
        Ok(())
    }

    pub fn get_data(&mut self, table: &PieceTable, source: &mut dyn SegmentSource) -> Result<&[u8]> {
        if self.is_dirty() {
            let cap = self.capacity() as usize;
            self.buffer.resize(cap, 0);
            let n = materialize(table, source, self.get_offset(), &mut self.buffer)?;
            self.length = n as i64;
            self.mark_clean();
        }
        Ok(&self.buffer[..self.length as usize])
    }

    /// §4.5 affects-viewport predicate.
    pub fn affects(&self, change: &ChangePtr) -> bool {
        let start = self.get_offset();
        let end = start + self.capacity();
        match change.kind() {
            ChangeKind::Insert | ChangeKind::Delete => change.offset() <= end,
            ChangeKind::Overwrite => {
                let change_start = change.offset();
                let change_end = change_start + change.length();
                change_start < end && start < change_end
            }
        }
    }

    /// Applies a change's effect: marks the viewport dirty if affected, and for floating
    /// viewports only, adjusts `offset_adjustment` per §4.5 (INSERT grows it, DELETE
    /// shrinks it clamped to zero, OVERWRITE never adjusts it). Fires the matching
    /// EDIT/UNDO event unless viewport callbacks are paused.
    pub fn on_change(&mut self, change: &ChangePtr, callbacks_paused: bool) {
        if !self.affects(change) {
            return;
        }
        if self.is_floating() {
            match change.kind() {
                ChangeKind::Insert if change.offset() <= self.get_offset() => {
                    self.offset_adjustment += change.length();
                }
                ChangeKind::Delete if change.offset() <= self.get_offset() => {
                    let current = self.offset + self.offset_adjustment;
                    let shrunk = current - change.length();
                    self.offset_adjustment = shrunk.max(0) - self.offset;
                }
                _ => {}
            }
        }
        self.mark_dirty();
        if let Some(sub) = &mut self.subscriber {
            sub.fire(ViewportEvent::edit_or_undo(change), Some(change), callbacks_paused);
        }
    }

    pub fn on_clear(&mut self, callbacks_paused: bool) {
        self.mark_dirty();
        if let Some(sub) = &mut self.subscriber {
            sub.fire(ViewportEvent::Clear, None, callbacks_paused);
        }
    }

    pub fn on_transform(&mut self, callbacks_paused: bool) {
        self.mark_dirty();
        if let Some(sub) = &mut self.subscriber {
            sub.fire(ViewportEvent::Transform, None, callbacks_paused);
        }
    }

    /// Manual refresh notification for viewports still dirty after a batch of changes.
    pub fn notify_if_dirty(&mut self, callbacks_paused: bool) {
        if self.is_dirty() {
            if let Some(sub) = &mut self.subscriber {
                sub.fire(ViewportEvent::Changes, None, callbacks_paused);
            }
        }
    }
}

#[cfg(test)]
#[path = "viewport_tests.rs"]
mod tests;
