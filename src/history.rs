//! C5 Change log, undo/redo, transactions, and checkpoints.
//!
//! The spec's model is a strictly linear active-log plus a single redo stack, grouped into
//! transactions by a one-bit tag — not a branching undo tree. This deliberately diverges
//! from the teacher's `src/history/mod.rs` `UndoTree` (which keeps multiple redo children
//! per node); the linear model is what §4.4 and the end-to-end scenarios in §8 describe.

use crate::change::{Change, ChangePtr};
use crate::error::{EditError, Result};
use crate::piece_table::PieceTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    None,
    Opened,
    InProgress,
}

/// One frame of the model stack. The bottom frame anchors on the session's snapshot file;
/// each checkpoint pushes a new frame anchored on its own checkpoint file. Older frames
/// keep their own (now immutable) active log.
#[derive(Debug)]
struct ModelFrame {
    table: PieceTable,
    active_log: Vec<ChangePtr>,
    redo_stack: Vec<ChangePtr>,
    /// Length of the file this frame's READ segments ultimately read from.
    origin_length: i64,
    /// Changes accumulated in frames below this one, so the displayed change count stays
    /// monotonically increasing across checkpoints.
    adjustment: i64,
}

impl ModelFrame {
    fn new(origin_length: i64, adjustment: i64) -> Self {
        ModelFrame {
            table: PieceTable::for_original(origin_length),
            active_log: Vec::new(),
            redo_stack: Vec::new(),
            origin_length,
            adjustment,
        }
    }
}

pub struct History {
    frames: Vec<ModelFrame>,
    transaction_state: TransactionState,
}

impl History {
    pub fn new(original_length: i64) -> Self {
        History {
            frames: vec![ModelFrame::new(original_length, 0)],
            transaction_state: TransactionState::None,
        }
    }

    pub fn table(&self) -> &PieceTable {
        &self.top().table
    }

    pub fn computed_size(&self) -> i64 {
        self.table().computed_size()
    }

    fn top(&self) -> &ModelFrame {
        self.frames.last().expect("model stack is never empty")
    }

    fn top_mut(&mut self) -> &mut ModelFrame {
        self.frames.last_mut().expect("model stack is never empty")
    }

    pub fn change_count(&self) -> i64 {
        self.top().adjustment + self.top().active_log.len() as i64
    }

    pub fn undo_count(&self) -> i64 {
        self.top().redo_stack.len() as i64
    }

    pub fn transaction_state(&self) -> TransactionState {
        self.transaction_state
    }

    pub fn checkpoint_count(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn last_change(&self) -> Option<&ChangePtr> {
        self.top().active_log.last()
    }

    pub fn last_undo(&self) -> Option<&ChangePtr> {
        self.top().redo_stack.last()
    }

    /// Looks up a change by the serial a caller would have in hand: a positive serial from
    /// `delete`/`insert`/`overwrite`/`redo`, or the negative serial `undo` hands back. The
    /// redo stack is checked both ways since a just-undone entry is stored with its serial
    /// already flipped negative, matching what `undo` returns directly.
    pub fn change_by_serial(&self, serial: i64) -> Option<&ChangePtr> {
        self.top()
            .active_log
            .iter()
            .find(|c| c.serial() == serial)
            .or_else(|| self.top().redo_stack.iter().find(|c| c.serial() == serial || c.serial() == -serial))
    }

    /// §4.4 transaction-bit assignment: toggles on every standalone edit, holds steady
    /// through an open transaction.
    fn next_transaction_bit(&self) -> bool {
        let previous_bit = self.top().active_log.last().map(|c| c.transaction_bit()).unwrap_or(false);
        match self.transaction_state {
            TransactionState::InProgress => previous_bit,
            TransactionState::None | TransactionState::Opened => !previous_bit,
        }
    }

    pub fn begin_transaction(&mut self) -> Result<()> {
        if self.transaction_state != TransactionState::None {
            return Err(EditError::state(
                "TRANSACTION_ALREADY_OPEN",
                "begin_transaction while already in a transaction",
            ));
        }
        self.transaction_state = TransactionState::Opened;
        Ok(())
    }

    pub fn end_transaction(&mut self) -> Result<()> {
        if self.transaction_state == TransactionState::None {
            return Err(EditError::state("NO_TRANSACTION", "end_transaction with none open"));
        }
        self.transaction_state = TransactionState::None;
        Ok(())
    }

    fn append(&mut self, change: ChangePtr) -> Result<i64> {
        self.top_mut().table.apply(&change)?;
        let serial = change.serial();
        if self.transaction_state == TransactionState::Opened {
            self.transaction_state = TransactionState::InProgress;
        }
        self.top_mut().active_log.push(change);
        self.top_mut().redo_stack.clear();
        Ok(serial)
    }

    pub fn delete(&mut self, offset: i64, length: i64) -> Result<i64> {
        let tx_bit = self.next_transaction_bit();
        let serial = 1 + self.top().active_log.len() as i64;
        self.append(Change::make_delete(serial, offset, length, tx_bit))
    }

    pub fn insert(&mut self, offset: i64, bytes: &[u8]) -> Result<i64> {
        let tx_bit = self.next_transaction_bit();
        let serial = 1 + self.top().active_log.len() as i64;
        self.append(Change::make_insert(serial, offset, bytes, tx_bit))
    }

    pub fn overwrite(&mut self, offset: i64, bytes: &[u8]) -> Result<i64> {
        let tx_bit = self.next_transaction_bit();
        let serial = 1 + self.top().active_log.len() as i64;
        self.append(Change::make_overwrite(serial, offset, bytes, tx_bit))
    }

    /// Pop the top of the active log, rebuild the model by replay, and push the flipped
    /// change onto the redo stack; repeats while consecutive changes share a transaction
    /// bit so a whole transaction unwinds atomically. Returns the negative serial of the
    /// last (outermost, i.e. earliest-in-the-transaction) change undone.
    pub fn undo(&mut self) -> Result<i64> {
        let mut last_serial = None;
        loop {
            let Some(change) = self.top_mut().active_log.pop() else {
                break;
            };
            let tx_bit = change.transaction_bit();
            let flipped = change.flip_serial_sign();
            last_serial = Some(flipped.serial());

            let origin_length = self.top().origin_length;
            let mut table = PieceTable::for_original(origin_length);
            for c in &self.top().active_log {
                table.apply(c)?;
            }
            self.top_mut().table = table;
            self.top_mut().redo_stack.push(flipped);

            match self.top().active_log.last() {
                Some(next) if next.transaction_bit() == tx_bit => continue,
                _ => break,
            }
        }
        last_serial.ok_or_else(|| EditError::state("NOTHING_TO_UNDO", "no active changes to undo"))
    }

    /// Pop the top of the redo stack and reapply it (flipping its serial back positive)
    /// without clearing the redo stack; continues while consecutive entries share a
    /// transaction bit. Returns the positive serial of the last change redone.
    pub fn redo(&mut self) -> Result<i64> {
        let mut last_serial = None;
        loop {
            let Some(change) = self.top_mut().redo_stack.pop() else {
                break;
            };
            let tx_bit = change.transaction_bit();
            let flipped = change.flip_serial_sign();
            self.top_mut().table.apply(&flipped)?;
            last_serial = Some(flipped.serial());
            self.top_mut().active_log.push(flipped);

            match self.top().redo_stack.last() {
                Some(next) if next.transaction_bit() == tx_bit => continue,
                _ => break,
            }
        }
        last_serial.ok_or_else(|| EditError::state("NOTHING_TO_REDO", "no undone changes to redo"))
    }

    /// Wipes the active log and redo stack and reinitializes the top frame's model to its
    /// origin READ segment.
    pub fn clear(&mut self) {
        let origin_length = self.top().origin_length;
        let frame = self.top_mut();
        frame.active_log.clear();
        frame.redo_stack.clear();
        frame.table = PieceTable::for_original(origin_length);
    }

    /// Push a fresh model frame anchored on a checkpoint file of `origin_length` bytes.
    /// The caller (Session) is responsible for having already flattened the computed
    /// stream to that file before calling this.
    pub fn push_checkpoint_frame(&mut self, origin_length: i64) {
        let carried = self.change_count();
        self.frames.push(ModelFrame::new(origin_length, carried));
    }

    pub fn pop_checkpoint_frame(&mut self) -> Result<()> {
        if self.frames.len() <= 1 {
            return Err(EditError::state(
                "NO_CHECKPOINT",
                "destroy_last_checkpoint with none open",
            ));
        }
        self.frames.pop();
        Ok(())
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
