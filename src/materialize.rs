//! C4 Segment materializer, shared by C6 (viewport), C8 (search), and C9 (save).
//!
//! The original implements this once (`populate_data_segment_` in `internal_fun.cpp`) and
//! reuses it from the viewport, search, and save paths rather than re-walking the piece
//! table four different ways; this module plays the same role here.

use std::io::{Read, Seek, SeekFrom};

use crate::error::{EditError, Result};
use crate::piece_table::PieceTable;

/// Anything the materializer can seek-and-read READ segments from: the session's snapshot
/// file, or (after a checkpoint) a checkpoint file.
pub trait SegmentSource {
    fn read_at(&mut self, offset: i64, buf: &mut [u8]) -> std::io::Result<usize>;
}

impl<T: Read + Seek> SegmentSource for T {
    fn read_at(&mut self, offset: i64, buf: &mut [u8]) -> std::io::Result<usize> {
        self.seek(SeekFrom::Start(offset as u64))?;
        let mut total = 0;
        while total < buf.len() {
            match self.read(&mut buf[total..])? {
                0 => break,
                n => total += n,
            }
        }
        Ok(total)
    }
}

/// Fill up to `buf.len()` bytes starting at `offset` of the computed stream. Returns the
/// number of bytes actually written — fewer than requested only when `offset` is near or
/// past the end of the computed stream.
///
/// A READ-segment I/O failure is fatal (§4.3): the piece table claims bytes exist there, so
/// a failure to read them means the on-disk state has drifted out from under the model.
pub fn materialize(table: &PieceTable, source: &mut dyn SegmentSource, offset: i64, buf: &mut [u8]) -> Result<usize> {
    if buf.is_empty() || offset >= table.computed_size() {
        return Ok(0);
    }

    let segments = table.segments();
    let mut read_offset = 0i64;
    let mut seg_idx = None;
    for (i, seg) in segments.iter().enumerate() {
        if seg.computed_offset != read_offset {
            EditError::fatal(
                "MATERIALIZE_DISCONTINUITY",
                format!("segment {i} at computed_offset {} expected {read_offset}", seg.computed_offset),
            );
        }
        read_offset += seg.computed_length;
        if offset < seg.computed_offset + seg.computed_length {
            seg_idx = Some(i);
            break;
        }
    }
    let Some(start_idx) = seg_idx else {
        return Ok(0);
    };

    let mut written = 0usize;
    let mut delta = offset - segments[start_idx].computed_offset;
    for seg in &segments[start_idx..] {
        if written >= buf.len() {
            break;
        }
        let remaining_capacity = (buf.len() - written) as i64;
        let amount = (seg.computed_length - delta).min(remaining_capacity);
        if amount <= 0 {
            delta = 0;
            continue;
        }
        let amount = amount as usize;
        if seg.is_read() {
            let read_at = seg.change_offset + delta;
            let got = source
                .read_at(read_at, &mut buf[written..written + amount])
                .map_err(|e| {
                    EditError::fatal(
                        "SNAPSHOT_READ_FAILED",
                        format!("reading snapshot at {read_at} for {amount} bytes: {e}"),
                    )
                })?;
            if got != amount {
                EditError::fatal(
                    "SNAPSHOT_SHORT_READ",
                    format!("expected {amount} bytes at {read_at}, got {got}"),
                );
            }
        } else {
            let bytes = seg.change.bytes();
            let start = (seg.change_offset + delta) as usize;
            buf[written..written + amount].copy_from_slice(&bytes[start..start + amount]);
        }
        written += amount;
        delta = 0;
    }
    Ok(written)
}

#[cfg(test)]
#[path = "materialize_tests.rs"]
mod tests;
