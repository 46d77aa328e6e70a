//! Tunable limits, filename patterns, and event bitmask values shared across the core.

pub mod limits {
    /// Maximum capacity of a single viewport, and the window size search tiles over.
    pub const CAPACITY_LIMIT: i64 = 1024 * 1024;

    /// Maximum search pattern length: half the viewport capacity limit.
    pub const PATTERN_LIMIT: i64 = CAPACITY_LIMIT / 2;
}

pub mod paths {
    /// Filename prefix for the private copy of the original input taken at
    /// session-open time, passed to `tempfile::Builder::prefix`.
    pub const SNAPSHOT_PREFIX: &str = ".OmegaEdit-orig.";

    /// Filename prefix for a checkpoint's flattened copy of the computed stream.
    pub const CHECKPOINT_PREFIX: &str = ".OmegaEdit-chk.";
}

pub mod save_codes {
    pub const OK: i32 = 0;

    /// Signals that OVERWRITE was requested but the on-disk file has been modified
    /// more recently than the session's snapshot.
    pub const ORIGINAL_MODIFIED: i32 = -100;

    pub const OPEN_FAILED: i32 = -1;
    pub const WRITE_FAILED: i32 = -2;
    pub const RENAME_FAILED: i32 = -3;
    pub const SIZE_MISMATCH: i32 = -4;
    pub const NO_AVAILABLE_NAME: i32 = -5;
}

/// Session event bitmask values. Each is a distinct power of two so a subscriber's
/// interest mask can combine any subset with bitwise OR.
pub mod session_events {
    pub const CREATE: u32 = 1 << 0;
    pub const EDIT: u32 = 1 << 1;
    pub const UNDO: u32 = 1 << 2;
    pub const CLEAR: u32 = 1 << 3;
    pub const TRANSFORM: u32 = 1 << 4;
    pub const CREATE_CHECKPOINT: u32 = 1 << 5;
    pub const DESTROY_CHECKPOINT: u32 = 1 << 6;
    pub const SAVE: u32 = 1 << 7;
    pub const CHANGES_PAUSED: u32 = 1 << 8;
    pub const CHANGES_RESUMED: u32 = 1 << 9;
    pub const CREATE_VIEWPORT: u32 = 1 << 10;
    pub const DESTROY_VIEWPORT: u32 = 1 << 11;

    /// All session events.
    pub const ALL: u32 = !0;
    /// No session events.
    pub const NONE: u32 = 0;
}

/// Viewport event bitmask values, disjoint from `session_events`.
pub mod viewport_events {
    pub const CREATE: u32 = 1 << 0;
    pub const EDIT: u32 = 1 << 1;
    pub const UNDO: u32 = 1 << 2;
    pub const CLEAR: u32 = 1 << 3;
    pub const TRANSFORM: u32 = 1 << 4;
    pub const MODIFY: u32 = 1 << 5;
    pub const CHANGES: u32 = 1 << 6;

    pub const ALL: u32 = !0;
    pub const NONE: u32 = 0;
}
