//! C3 Piece-table model and the §4.2 update algorithm.
//!
//! The model is a flat, ordered `Vec<Segment>` — not a tree. The real omega-edit model
//! (`examples/original_source/.../impl_/model_def.hpp`) is itself `std::vector<segment_ptr>`,
//! and the update algorithm the spec describes is a linear walk with in-place splitting, so
//! a tree brings no benefit here and would only obscure the algorithm.

use std::sync::Arc;

use crate::change::{Change, ChangeKind, ChangePtr};
use crate::error::{EditError, Result};

/// One piece-table entry. READ segments (`change.is_read_origin()`) materialize from the
/// snapshot/checkpoint file that backs the model; all others are INSERT segments and
/// materialize from their change's payload.
#[derive(Debug, Clone)]
pub struct Segment {
    pub computed_offset: i64,
    pub computed_length: i64,
    pub change_offset: i64,
    pub change: ChangePtr,
}

impl Segment {
    pub fn is_read(&self) -> bool {
        self.change.is_read_origin()
    }

    /// 'R' for a READ segment, 'I' for an INSERT segment — mirrors the original's
    /// `omega_model_segment_kind_as_char`.
    pub fn kind_as_char(&self) -> char {
        if self.is_read() {
            'R'
        } else {
            'I'
        }
    }

    pub fn computed_end(&self) -> i64 {
        self.computed_offset + self.computed_length
    }
}

/// The active model: an ordered sequence of segments projecting the original bytes and the
/// change log's inserts onto the computed stream.
#[derive(Debug, Clone, Default)]
pub struct PieceTable {
    segments: Vec<Segment>,
}

impl PieceTable {
    pub fn empty() -> Self {
        PieceTable { segments: Vec::new() }
    }

    /// The model for a freshly opened file (or checkpoint) of `length` bytes: a single READ
    /// segment spanning the whole thing.
    pub fn for_original(length: i64) -> Self {
        let mut table = PieceTable::empty();
        if length > 0 {
            table.segments.push(Segment {
                computed_offset: 0,
                computed_length: length,
                change_offset: 0,
                change: Change::whole_file(length),
            });
        }
        table
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn computed_size(&self) -> i64 {
        self.segments
            .last()
            .map(|s| s.computed_end())
            .unwrap_or(0)
    }

    /// Invariant 3 (§3): segments tile `[0, computed_size)` without gap or overlap. Any
    /// mismatch is a fatal internal invariant violation — it is never the caller's to
    /// recover from.
    pub fn check_continuity(&self) {
        let mut expected = 0i64;
        for seg in &self.segments {
            if seg.computed_offset != expected {
                EditError::fatal(
                    "PIECE_TABLE_DISCONTINUITY",
                    format!(
                        "segment at computed_offset {} expected {}",
                        seg.computed_offset, expected
                    ),
                );
            }
            expected += seg.computed_length;
        }
    }

    /// Locate the first segment `s` with `s.computed_offset <= offset <= s.computed_end()`.
    /// Ties at a shared boundary resolve to the earlier segment, matching the accumulating
    /// walk the spec describes.
    fn locate(&self, offset: i64) -> Option<usize> {
        self.segments
            .iter()
            .position(|s| offset >= s.computed_offset && offset <= s.computed_end())
    }

    /// §4.2 apply: constructs no new changes itself, just threads `change` into the model.
    pub fn apply(&mut self, change: &ChangePtr) -> Result<()> {
        match change.kind() {
            ChangeKind::Insert | ChangeKind::Overwrite if self.segments.is_empty() => {
                // Overwrite on an empty model behaves like a plain insert: there is
                // nothing to delete yet.
                self.apply_insert(change)
            }
            ChangeKind::Overwrite => {
                let synthetic = Change::synthetic_delete(change.offset(), change.length(), change.transaction_bit());
                self.apply_delete(&synthetic)?;
                self.apply_insert(change)
            }
            ChangeKind::Insert => self.apply_insert(change),
            ChangeKind::Delete => self.apply_delete(change),
        }
    }

    fn apply_insert(&mut self, change: &ChangePtr) -> Result<()> {
        let offset = change.offset();
        let length = change.length();

        if self.segments.is_empty() {
            if offset != 0 {
                return Err(EditError::range(
                    "OFFSET_OUT_OF_RANGE",
                    format!("insert at offset {offset} on an empty model"),
                ));
            }
            if length > 0 {
                self.segments.push(Segment {
                    computed_offset: 0,
                    computed_length: length,
                    change_offset: 0,
                    change: change.clone(),
                });
            }
            return Ok(());
        }

        let idx = self.locate(offset).ok_or_else(|| {
            EditError::range(
                "OFFSET_OUT_OF_RANGE",
                format!("insert offset {offset} exceeds computed size {}", self.computed_size()),
            )
        })?;

        let seg = &self.segments[idx];
        let delta = offset - seg.computed_offset;
        let insert_idx = if delta > 0 && delta < seg.computed_length {
            let split = Segment {
                computed_offset: seg.computed_offset + delta,
                computed_length: seg.computed_length - delta,
                change_offset: seg.change_offset + delta,
                change: Arc::clone(&seg.change),
            };
            self.segments[idx].computed_length = delta;
            self.segments.insert(idx + 1, split);
            idx + 1
        } else if delta == seg.computed_length {
            idx + 1
        } else {
            idx
        };

        if length > 0 {
            self.segments.insert(
                insert_idx,
                Segment {
                    computed_offset: offset,
                    computed_length: length,
                    change_offset: 0,
                    change: change.clone(),
                },
            );
            for s in self.segments[insert_idx + 1..].iter_mut() {
                s.computed_offset += length;
            }
        }
        Ok(())
    }

    fn apply_delete(&mut self, change: &ChangePtr) -> Result<()> {
        let total_length = change.length();
        if total_length == 0 {
            return Ok(());
        }
        let offset = change.offset();

        let idx = self.locate(offset).ok_or_else(|| {
            EditError::range(
                "OFFSET_OUT_OF_RANGE",
                format!("delete offset {offset} exceeds computed size {}", self.computed_size()),
            )
        })?;

        let seg = &self.segments[idx];
        let delta = offset - seg.computed_offset;
        let mut iter = if delta > 0 && delta < seg.computed_length {
            let split = Segment {
                computed_offset: seg.computed_offset + delta,
                computed_length: seg.computed_length - delta,
                change_offset: seg.change_offset + delta,
                change: Arc::clone(&seg.change),
            };
            self.segments[idx].computed_length = delta;
            self.segments.insert(idx + 1, split);
            idx + 1
        } else if delta == seg.computed_length {
            idx + 1
        } else {
            idx
        };

        let mut remaining = total_length;
        while remaining > 0 {
            let seg_len = self
                .segments
                .get(iter)
                .ok_or_else(|| {
                    EditError::range(
                        "DELETE_PAST_END",
                        format!("delete at offset {offset} length {total_length} runs past the computed stream"),
                    )
                })?
                .computed_length;
            if remaining >= seg_len {
                self.segments.remove(iter);
                remaining -= seg_len;
            } else {
                let seg = &mut self.segments[iter];
                seg.computed_length -= remaining;
                seg.computed_offset += remaining - total_length;
                seg.change_offset += remaining;
                remaining = 0;
                iter += 1;
            }
        }

        for s in self.segments[iter..].iter_mut() {
            s.computed_offset -= total_length;
        }
        Ok(())
    }
}

impl std::fmt::Display for PieceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for seg in &self.segments {
            writeln!(
                f,
                "{} [{}, {}) change_offset={} serial={}",
                seg.kind_as_char(),
                seg.computed_offset,
                seg.computed_end(),
                seg.change_offset,
                seg.change.serial()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "piece_table_tests.rs"]
mod tests;
