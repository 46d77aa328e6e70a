//! C9 Save engine: flatten a range of the computed stream to a destination file via a
//! temp-file-then-rename, with collision-avoidance renaming and an original-file
//! modified-since-snapshot guard.
//!
//! Grounded on spec §4.8 and the general temp-file/rename pattern
//! `examples/original_source/core/src/lib/` save logic uses (not individually retrieved
//! as its own file, but described identically in spec §4.8's numbered steps, which this
//! follows literally). The collision-avoidance naming and `tempfile`-based write-then-
//! rename idiom is generalized from the teacher's `tempfile` usage in
//! `src/document/tests.rs`, the only place the teacher reaches for that crate.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::constants::save_codes;
use crate::materialize::{materialize, SegmentSource};
use crate::piece_table::PieceTable;

#[derive(Debug, Clone, Copy, Default)]
pub struct SaveFlags {
    pub overwrite: bool,
    pub force_overwrite: bool,
}

/// When the destination is the session's original on-disk file, callers pass its path
/// alongside the session's snapshot path so the modified-since-snapshot guard can run.
pub struct OriginalFile<'a> {
    pub path: &'a Path,
    pub snapshot_path: &'a Path,
}

const CHUNK_SIZE: usize = 64 * 1024;

/// Writes `[range_offset, range_offset + adjusted_length)` of the computed stream to
/// `destination`, per spec §4.8's eight numbered steps. Returns `save_codes::OK` on
/// success or a distinct negative code per failure class.
pub fn save(
    table: &PieceTable,
    source: &mut dyn SegmentSource,
    computed_size: i64,
    range_offset: i64,
    range_length: i64,
    destination: &Path,
    flags: SaveFlags,
    original: Option<OriginalFile<'_>>,
) -> i32 {
    match try_save(table, source, computed_size, range_offset, range_length, destination, flags, original) {
        Ok(()) => save_codes::OK,
        Err(code) => code,
    }
}

fn try_save(
    table: &PieceTable,
    source: &mut dyn SegmentSource,
    computed_size: i64,
    range_offset: i64,
    range_length: i64,
    destination: &Path,
    flags: SaveFlags,
    original: Option<OriginalFile<'_>>,
) -> Result<(), i32> {
    let adjusted_length = if range_length <= 0 {
        computed_size - range_offset
    } else {
        range_length.min(computed_size - range_offset)
    };

    let dest_dir = destination.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let mut temp = tempfile::Builder::new()
        .prefix(".omega-edit-save.")
        .tempfile_in(dest_dir)
        .map_err(|_| save_codes::OPEN_FAILED)?;

    write_range(table, source, range_offset, adjusted_length, temp.as_file_mut())
        .map_err(|_| save_codes::WRITE_FAILED)?;
    temp.as_file_mut().sync_all().map_err(|_| save_codes::WRITE_FAILED)?;

    let on_disk_len = temp.as_file().metadata().map_err(|_| save_codes::WRITE_FAILED)?.len();
    if on_disk_len != adjusted_length as u64 {
        return Err(save_codes::SIZE_MISMATCH);
    }

    let overwriting_original = original.as_ref().is_some_and(|o| o.path == destination) && flags.overwrite;
    if overwriting_original {
        let o = original.as_ref().unwrap();
        if !flags.force_overwrite && destination_modified_after_snapshot(o.path, o.snapshot_path) {
            return Err(save_codes::ORIGINAL_MODIFIED);
        }
    }

    let final_destination = if destination.exists() {
        if flags.overwrite {
            fs::remove_file(destination).map_err(|_| save_codes::RENAME_FAILED)?;
            destination.to_path_buf()
        } else {
            available_name(destination).ok_or(save_codes::NO_AVAILABLE_NAME)?
        }
    } else {
        destination.to_path_buf()
    };

    temp.persist(&final_destination).map_err(|_| save_codes::RENAME_FAILED)?;

    if overwriting_original {
        let o = original.unwrap();
        touch(o.snapshot_path).map_err(|_| save_codes::RENAME_FAILED)?;
    }

    Ok(())
}

fn write_range(
    table: &PieceTable,
    source: &mut dyn SegmentSource,
    range_offset: i64,
    adjusted_length: i64,
    temp: &mut fs::File,
) -> std::io::Result<()> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut offset = range_offset;
    let mut remaining = adjusted_length;
    while remaining > 0 {
        let want = (remaining as usize).min(CHUNK_SIZE);
        let n = materialize(table, source, offset, &mut buf[..want])
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        if n == 0 {
            break;
        }
        temp.write_all(&buf[..n])?;
        offset += n as i64;
        remaining -= n as i64;
    }
    Ok(())
}

fn destination_modified_after_snapshot(destination: &Path, snapshot_path: &Path) -> bool {
    let dest_mtime = fs::metadata(destination).and_then(|m| m.modified());
    let snap_mtime = fs::metadata(snapshot_path).and_then(|m| m.modified());
    match (dest_mtime, snap_mtime) {
        (Ok(d), Ok(s)) => d > s,
        _ => false,
    }
}

fn touch(path: &Path) -> std::io::Result<()> {
    fs::OpenOptions::new().write(true).open(path)?.set_modified(SystemTime::now())
}

/// `base-1.ext`, `base-2.ext`, ... up to 1000 attempts, returning the first name that
/// doesn't already exist.
fn available_name(path: &Path) -> Option<PathBuf> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let stem = path.file_stem()?.to_string_lossy().into_owned();
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
    for n in 1..1000 {
        let name = match &ext {
            Some(e) => format!("{stem}-{n}.{e}"),
            None => format!("{stem}-{n}"),
        };
        let candidate = parent.join(name);
        if !candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
#[path = "save_tests.rs"]
mod tests;
