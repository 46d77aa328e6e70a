//! Session: ties C1-C9 together behind the public API surface §6 describes.
//!
//! Grounded on spec §3 "Session" / §4.9 lifecycle / §6 API surface. The viewport and
//! search-context collections (id-keyed maps with a monotonic counter) are loosely
//! informed by the teacher's `DocumentManager`-style id bookkeeping, though the primary
//! source throughout is the spec itself, since no teacher file models a session of this
//! shape.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::change::ChangePtr;
use crate::constants::paths;
use crate::error::{EditError, Result};
use crate::event::{SessionEvent, Subscriber};
use crate::history::{History, TransactionState};
use crate::save::{self, OriginalFile, SaveFlags};
use crate::search::SearchContext;
use crate::viewport::{Viewport, ViewportKind};

/// Construction-time knobs in the style of the teacher's `command_line::settings`
/// structs: plain data, a `Default` impl, no external config-file crate.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub checkpoint_dir: Option<PathBuf>,
}

pub struct Session {
    file_path: Option<PathBuf>,
    checkpoint_dir: PathBuf,
    snapshot: NamedTempFile,
    /// One entry per pushed checkpoint frame, parallel to `history`'s model stack (minus
    /// the bottom frame, which reads from `snapshot`). Dropping an entry deletes its file.
    checkpoint_files: Vec<NamedTempFile>,
    history: History,
    viewports: HashMap<u64, Viewport>,
    next_viewport_id: u64,
    search_contexts: HashMap<u64, SearchContext>,
    next_search_context_id: u64,
    subscriber: Option<Subscriber<SessionEvent>>,
    changes_paused: bool,
    viewport_callbacks_paused: bool,
}

impl Session {
    /// §4.9 step 1-4: resolve the checkpoint directory, snapshot `path`'s contents (if
    /// any) into a private file, seed the model stack, and emit `SESSION_EVT_CREATE`.
    pub fn open(
        path: Option<&Path>,
        subscriber: Option<Subscriber<SessionEvent>>,
        options: SessionOptions,
    ) -> Result<Self> {
        let checkpoint_dir = resolve_checkpoint_dir(path, &options);
        let mut snapshot = tempfile::Builder::new()
            .prefix(paths::SNAPSHOT_PREFIX)
            .tempfile_in(&checkpoint_dir)?;

        let origin_length = match path {
            Some(p) => {
                let bytes = fs::read(p)?;
                snapshot.write_all(&bytes)?;
                snapshot.flush()?;
                bytes.len() as i64
            }
            None => 0,
        };

        let mut session = Session {
            file_path: path.map(PathBuf::from),
            checkpoint_dir,
            snapshot,
            checkpoint_files: Vec::new(),
            history: History::new(origin_length),
            viewports: HashMap::new(),
            next_viewport_id: 1,
            search_contexts: HashMap::new(),
            next_search_context_id: 1,
            subscriber,
            changes_paused: false,
            viewport_callbacks_paused: false,
        };
        session.fire_session(SessionEvent::Create);
        Ok(session)
    }

    fn fire_session(&mut self, event: SessionEvent) {
        if let Some(sub) = &mut self.subscriber {
            sub.fire(event, None);
        }
    }

    /// A fresh handle reading whatever file currently backs the active model frame: the
    /// most recent checkpoint file, or the snapshot if no checkpoint is open.
    fn reopen_current_source(&self) -> Result<fs::File> {
        let path = self.checkpoint_files.last().map(|f| f.path()).unwrap_or_else(|| self.snapshot.path());
        Ok(fs::File::open(path)?)
    }

    // ---- accessors ----

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn checkpoint_dir(&self) -> &Path {
        &self.checkpoint_dir
    }

    pub fn computed_size(&self) -> i64 {
        self.history.computed_size()
    }

    pub fn change_count(&self) -> i64 {
        self.history.change_count()
    }

    pub fn undo_count(&self) -> i64 {
        self.history.undo_count()
    }

    pub fn transaction_state(&self) -> TransactionState {
        self.history.transaction_state()
    }

    pub fn checkpoint_count(&self) -> usize {
        self.history.checkpoint_count()
    }

    pub fn last_change(&self) -> Option<&ChangePtr> {
        self.history.last_change()
    }

    pub fn last_undo(&self) -> Option<&ChangePtr> {
        self.history.last_undo()
    }

    pub fn change_by_serial(&self, serial: i64) -> Option<&ChangePtr> {
        self.history.change_by_serial(serial)
    }

    // ---- edit API ----

    fn after_edit(&mut self, serial: i64, event: SessionEvent) -> Result<i64> {
        if let Some(change) = self.history.change_by_serial(serial).cloned() {
            for vp in self.viewports.values_mut() {
                vp.on_change(&change, self.viewport_callbacks_paused);
            }
        }
        self.fire_session(event);
        Ok(serial)
    }

    /// A session-wide pause makes every edit entry point a no-op returning 0,
    /// independent of viewport-callback pausing (§4.6).
    pub fn delete(&mut self, offset: i64, length: i64) -> Result<i64> {
        if self.changes_paused {
            return Ok(0);
        }
        let serial = self.history.delete(offset, length)?;
        self.after_edit(serial, SessionEvent::Edit)
    }

    pub fn insert(&mut self, offset: i64, bytes: &[u8]) -> Result<i64> {
        if self.changes_paused {
            return Ok(0);
        }
        let serial = self.history.insert(offset, bytes)?;
        self.after_edit(serial, SessionEvent::Edit)
    }

    pub fn overwrite(&mut self, offset: i64, bytes: &[u8]) -> Result<i64> {
        if self.changes_paused {
            return Ok(0);
        }
        let serial = self.history.overwrite(offset, bytes)?;
        self.after_edit(serial, SessionEvent::Edit)
    }

    pub fn undo_last(&mut self) -> Result<i64> {
        if self.changes_paused {
            return Ok(0);
        }
        let serial = self.history.undo()?;
        self.after_edit(serial, SessionEvent::Undo)
    }

    pub fn redo_last(&mut self) -> Result<i64> {
        if self.changes_paused {
            return Ok(0);
        }
        let serial = self.history.redo()?;
        self.after_edit(serial, SessionEvent::Edit)
    }

    pub fn begin_transaction(&mut self) -> Result<()> {
        self.history.begin_transaction()
    }

    pub fn end_transaction(&mut self) -> Result<()> {
        self.history.end_transaction()
    }

    pub fn clear(&mut self) {
        self.history.clear();
        for vp in self.viewports.values_mut() {
            vp.on_clear(self.viewport_callbacks_paused);
        }
        self.fire_session(SessionEvent::Clear);
    }

    pub fn pause_changes(&mut self) {
        self.changes_paused = true;
        self.fire_session(SessionEvent::ChangesPaused);
    }

    pub fn resume_changes(&mut self) {
        self.changes_paused = false;
        self.fire_session(SessionEvent::ChangesResumed);
    }

    pub fn pause_viewport_callbacks(&mut self) {
        self.viewport_callbacks_paused = true;
    }

    pub fn resume_viewport_callbacks(&mut self) {
        self.viewport_callbacks_paused = false;
    }

    pub fn notify_changed_viewports(&mut self) {
        let paused = self.viewport_callbacks_paused;
        for vp in self.viewports.values_mut() {
            vp.notify_if_dirty(paused);
        }
    }

    // ---- checkpoints ----

    /// Flattens the computed stream to a private checkpoint file and pushes a fresh
    /// model frame anchored on it (§3 "Model stack").
    pub fn create_checkpoint(&mut self) -> Result<()> {
        let size = self.computed_size();
        let mut buf = vec![0u8; size as usize];
        let mut source = self.reopen_current_source()?;
        let n = crate::materialize::materialize(self.history.table(), &mut source, 0, &mut buf)?;
        buf.truncate(n);

        let mut checkpoint = tempfile::Builder::new()
            .prefix(paths::CHECKPOINT_PREFIX)
            .tempfile_in(&self.checkpoint_dir)?;
        checkpoint.write_all(&buf)?;
        checkpoint.flush()?;

        self.history.push_checkpoint_frame(buf.len() as i64);
        self.checkpoint_files.push(checkpoint);
        self.fire_session(SessionEvent::CreateCheckpoint);
        Ok(())
    }

    pub fn destroy_last_checkpoint(&mut self) -> Result<()> {
        self.history.pop_checkpoint_frame()?;
        self.checkpoint_files.pop();
        for vp in self.viewports.values_mut() {
            vp.on_transform(self.viewport_callbacks_paused);
        }
        self.fire_session(SessionEvent::DestroyCheckpoint);
        Ok(())
    }

    /// §4.10: pushes a checkpoint (so the transform is undoable by destroying it), then
    /// rewrites `[offset, offset+length)` of the checkpoint's backing file in place via
    /// temp-file-then-atomic-rename, leaving the checkpoint frame's (empty) active log
    /// untouched — the transformed bytes are visible purely because its READ segment
    /// now reads different bytes from the same path.
    pub fn apply_transform(&mut self, mut transform: impl FnMut(u8) -> u8, offset: i64, length: i64) -> Result<()> {
        if offset < 0 || length < 0 {
            return Err(EditError::range(
                "TRANSFORM_RANGE_INVALID",
                "transform offset and length must be non-negative",
            ));
        }
        self.create_checkpoint()?;
        let backing_path = self.checkpoint_files.last().expect("just pushed").path().to_path_buf();

        let mut content = fs::read(&backing_path)?;
        let start = (offset as usize).min(content.len());
        let end = (offset as usize + length as usize).min(content.len());
        for byte in &mut content[start..end] {
            *byte = transform(*byte);
        }

        let dir = backing_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
        let mut replacement = tempfile::Builder::new().prefix(paths::CHECKPOINT_PREFIX).tempfile_in(dir)?;
        replacement.write_all(&content)?;
        replacement.flush()?;
        // Failure here leaves on-disk state inconsistent with the in-memory model (the
        // checkpoint frame still claims the old length/content) -- fatal per §4.10.
        if let Err(e) = replacement.persist(&backing_path) {
            EditError::fatal("TRANSFORM_REPLACE_FAILED", e.to_string());
        }

        for vp in self.viewports.values_mut() {
            vp.on_transform(self.viewport_callbacks_paused);
        }
        self.fire_session(SessionEvent::Transform);
        Ok(())
    }

    // ---- viewports ----

    pub fn create_viewport(&mut self, offset: i64, capacity: i64, is_floating: bool) -> Result<u64> {
        let kind = if is_floating { ViewportKind::Floating } else { ViewportKind::Fixed };
        let viewport = Viewport::new(offset, capacity, kind)?;
        let id = self.next_viewport_id;
        self.next_viewport_id += 1;
        self.viewports.insert(id, viewport);
        self.fire_session(SessionEvent::CreateViewport);
        Ok(id)
    }

    pub fn destroy_viewport(&mut self, id: u64) -> Result<()> {
        self.viewports
            .remove(&id)
            .ok_or_else(|| EditError::state("NO_SUCH_VIEWPORT", "destroy_viewport: unknown id"))?;
        self.fire_session(SessionEvent::DestroyViewport);
        Ok(())
    }

    pub fn viewport_modify(&mut self, id: u64, offset: i64, capacity: i64, is_floating: bool) -> Result<()> {
        self.viewport_mut(id)?.modify(offset, capacity, is_floating)
    }

    pub fn viewport_get_data(&mut self, id: u64) -> Result<&[u8]> {
        let mut source = self.reopen_current_source()?;
        let table = self.history.table();
        let viewport = self
            .viewports
            .get_mut(&id)
            .ok_or_else(|| EditError::state("NO_SUCH_VIEWPORT", "unknown viewport id"))?;
        viewport.get_data(table, &mut source)
    }

    pub fn viewport_set_event_interest(&mut self, id: u64, interest: u32) -> Result<()> {
        self.viewport_mut(id)?.set_event_interest(interest);
        Ok(())
    }

    fn viewport_mut(&mut self, id: u64) -> Result<&mut Viewport> {
        self.viewports.get_mut(&id).ok_or_else(|| EditError::state("NO_SUCH_VIEWPORT", "unknown viewport id"))
    }

    pub fn viewport(&self, id: u64) -> Result<&Viewport> {
        self.viewports.get(&id).ok_or_else(|| EditError::state("NO_SUCH_VIEWPORT", "unknown viewport id"))
    }

    // ---- search ----

    pub fn create_search_context(
        &mut self,
        pattern: &[u8],
        session_offset: i64,
        session_length: i64,
        case_insensitive: bool,
        reverse: bool,
    ) -> Result<u64> {
        let resolved_length =
            if session_length <= 0 { self.computed_size() - session_offset } else { session_length };
        let context = SearchContext::new(pattern, session_offset, resolved_length, case_insensitive, reverse)?;
        let id = self.next_search_context_id;
        self.next_search_context_id += 1;
        self.search_contexts.insert(id, context);
        Ok(id)
    }

    pub fn destroy_search_context(&mut self, id: u64) -> Result<()> {
        self.search_contexts
            .remove(&id)
            .ok_or_else(|| EditError::state("NO_SUCH_SEARCH_CONTEXT", "destroy_search_context: unknown id"))?;
        Ok(())
    }

    pub fn next_match(&mut self, id: u64, advance: i64) -> Result<bool> {
        let mut source = self.reopen_current_source()?;
        let table = self.history.table();
        let ctx = self
            .search_contexts
            .get_mut(&id)
            .ok_or_else(|| EditError::state("NO_SUCH_SEARCH_CONTEXT", "unknown search context id"))?;
        ctx.next_match(advance, table, &mut source)
    }

    pub fn search_context(&self, id: u64) -> Result<&SearchContext> {
        self.search_contexts
            .get(&id)
            .ok_or_else(|| EditError::state("NO_SUCH_SEARCH_CONTEXT", "unknown search context id"))
    }

    /// Composition-only convenience built purely on top of the public edit/search API
    /// (not a new core component) -- finds every non-overlapping match of `pattern` in
    /// `[offset, offset+length)` and overwrites it with `replacement`, restarting the
    /// search after each edit since matches downstream of an edit may have moved.
    /// Returns the number of replacements made.
    pub fn replace_all(
        &mut self,
        pattern: &[u8],
        replacement: &[u8],
        offset: i64,
        length: i64,
        case_insensitive: bool,
    ) -> Result<u64> {
        let mut replaced = 0u64;
        let mut cursor = offset;
        loop {
            let window_length = if length <= 0 { self.computed_size() - cursor } else { offset + length - cursor };
            if window_length < pattern.len() as i64 {
                break;
            }
            let ctx_id = self.create_search_context(pattern, cursor, window_length, case_insensitive, false)?;
            let found = self.next_match(ctx_id, 0)?;
            let match_offset = self.search_context(ctx_id)?.match_offset();
            self.destroy_search_context(ctx_id)?;
            if !found {
                break;
            }
            self.overwrite(match_offset, replacement)?;
            replaced += 1;
            cursor = match_offset + replacement.len() as i64;
        }
        Ok(replaced)
    }

    // ---- save ----

    pub fn save(&mut self, range_offset: i64, range_length: i64, destination: &Path, flags: SaveFlags) -> i32 {
        let computed_size = self.computed_size();
        let mut source = match self.reopen_current_source() {
            Ok(s) => s,
            Err(_) => return crate::constants::save_codes::OPEN_FAILED,
        };
        let original = self.file_path.as_deref().map(|p| OriginalFile { path: p, snapshot_path: self.snapshot.path() });
        let code = save::save(
            self.history.table(),
            &mut source,
            computed_size,
            range_offset,
            range_length,
            destination,
            flags,
            original,
        );
        if code == crate::constants::save_codes::OK {
            self.fire_session(SessionEvent::Save);
        }
        code
    }
}

fn resolve_checkpoint_dir(path: Option<&Path>, options: &SessionOptions) -> PathBuf {
    if let Some(dir) = &options.checkpoint_dir {
        return dir.clone();
    }
    if let Some(parent) = path.and_then(|p| p.parent()).filter(|p| !p.as_os_str().is_empty()) {
        return parent.to_path_buf();
    }
    // `std::env::temp_dir()` is infallible, so the spec's "current dir" fallback below
    // system temp is unreachable in practice.
    std::env::temp_dir()
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
