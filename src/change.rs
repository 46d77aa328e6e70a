//! C1 Change record and C2 Data store.
//!
//! A `Change` is an immutable, reference-counted value describing one delete, insert, or
//! overwrite. Payload bytes live inline when short, on the heap otherwise — the switchover
//! is transparent to callers, who only ever see a byte slice.

use std::sync::Arc;

/// The kind of edit a change represents. Overwrite is modeled elsewhere as a synthetic
/// delete followed by an insert; a `Change` itself never needs to decompose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Delete,
    Insert,
    Overwrite,
}

impl ChangeKind {
    pub fn as_char(self) -> char {
        match self {
            ChangeKind::Delete => 'D',
            ChangeKind::Insert => 'I',
            ChangeKind::Overwrite => 'O',
        }
    }
}

/// Payload storage for a change. Bytes shorter than 8 are kept inline on the stack;
/// anything longer is boxed. DELETE changes and the synthetic whole-file READ change at
/// serial 0 carry no payload bytes at all — their `length` is tracked separately, since
/// DELETE never materializes and READ segments materialize from the snapshot file, not
/// from the change.
#[derive(Debug, Clone)]
enum Payload {
    None,
    Inline { bytes: [u8; 8], len: u8 },
    Heap(Arc<[u8]>),
}

impl Payload {
    fn new(bytes: &[u8]) -> Self {
        if bytes.len() < 8 {
            let mut inline = [0u8; 8];
            inline[..bytes.len()].copy_from_slice(bytes);
            Payload::Inline {
                bytes: inline,
                len: bytes.len() as u8,
            }
        } else {
            Payload::Heap(Arc::from(bytes))
        }
    }

    fn as_slice(&self) -> &[u8] {
        match self {
            Payload::None => &[],
            Payload::Inline { bytes, len } => &bytes[..*len as usize],
            Payload::Heap(b) => b,
        }
    }
}

/// One immutable record of a user-visible (or synthetic) edit.
///
/// `serial` is positive while the change is active, negative once undone; serial 0 is
/// reserved for the synthetic "whole original file" change created at session open and for
/// the synthetic deletes an overwrite decomposes into.
#[derive(Debug, Clone)]
pub struct Change {
    serial: i64,
    kind: ChangeKind,
    offset: i64,
    length: i64,
    payload: Payload,
    transaction_bit: bool,
}

pub type ChangePtr = Arc<Change>;

impl Change {
    fn construct(
        serial: i64,
        kind: ChangeKind,
        offset: i64,
        length: i64,
        payload: Payload,
        transaction_bit: bool,
    ) -> ChangePtr {
        Arc::new(Change {
            serial,
            kind,
            offset,
            length,
            payload,
            transaction_bit,
        })
    }

    pub fn make_delete(serial: i64, offset: i64, length: i64, transaction_bit: bool) -> ChangePtr {
        debug_assert!(length >= 0);
        Self::construct(serial, ChangeKind::Delete, offset, length, Payload::None, transaction_bit)
    }

    pub fn make_insert(serial: i64, offset: i64, bytes: &[u8], transaction_bit: bool) -> ChangePtr {
        Self::construct(
            serial,
            ChangeKind::Insert,
            offset,
            bytes.len() as i64,
            Payload::new(bytes),
            transaction_bit,
        )
    }

    pub fn make_overwrite(serial: i64, offset: i64, bytes: &[u8], transaction_bit: bool) -> ChangePtr {
        Self::construct(
            serial,
            ChangeKind::Overwrite,
            offset,
            bytes.len() as i64,
            Payload::new(bytes),
            transaction_bit,
        )
    }

    /// A synthetic delete used internally to decompose an overwrite. Carries serial 0 and
    /// never appears in the user-visible change log.
    pub fn synthetic_delete(offset: i64, length: i64, transaction_bit: bool) -> ChangePtr {
        Self::make_delete(0, offset, length, transaction_bit)
    }

    /// The "whole original file" READ change synthesized at session open and at every
    /// checkpoint, serial 0, spanning `length` bytes of whatever file backs the model.
    pub fn whole_file(length: i64) -> ChangePtr {
        Self::construct(0, ChangeKind::Insert, 0, length, Payload::None, false)
    }

    pub fn serial(&self) -> i64 {
        self.serial
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn length(&self) -> i64 {
        self.length
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn kind_as_char(&self) -> char {
        self.kind.as_char()
    }

    pub fn transaction_bit(&self) -> bool {
        self.transaction_bit
    }

    /// Byte-pointer accessor; empty for DELETE and for the synthetic whole-file change.
    pub fn bytes(&self) -> &[u8] {
        self.payload.as_slice()
    }

    pub fn is_undone(&self) -> bool {
        self.serial < 0
    }

    /// A segment built from this change is a READ segment (materializes from the
    /// snapshot/checkpoint file) iff the change's serial is 0.
    pub fn is_read_origin(&self) -> bool {
        self.serial == 0
    }

    /// Flip the sign of this change's serial. Used only by undo/redo; returns a new
    /// `Change` rather than mutating the shared one, since segments may still reference
    /// the original through other `Arc` clones.
    pub fn flip_serial_sign(&self) -> ChangePtr {
        Self::construct(
            -self.serial,
            self.kind,
            self.offset,
            self.length,
            self.payload.clone(),
            self.transaction_bit,
        )
    }
}

#[cfg(test)]
#[path = "change_tests.rs"]
mod tests;
