//! Error types for the edit core
//! Defines severity, category, machine-readable codes, and a crate-wide `Result`.

use std::fmt;

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Recoverable, caller can retry or ignore
    Warning,
    /// Operation failed, the session remains usable
    Error,
    /// Invariant violation; the session's in-memory state can no longer be trusted
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Category of the error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An offset, length, or capacity fell outside a valid range
    Range,
    /// Open/read/write/rename/remove/mkstemp/copy failure
    Io,
    /// Operation invalid for the session's current transaction/checkpoint state
    State,
    /// A piece-table or model invariant was violated
    Internal,
    /// Errors that don't fit another category
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range => write!(f, "Range"),
            Self::Io => write!(f, "Io"),
            Self::State => write!(f, "State"),
            Self::Internal => write!(f, "Internal"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// A structured error produced by the edit core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditError {
    pub severity: ErrorSeverity,
    pub kind: ErrorKind,
    /// Machine-readable error code, e.g. "ORIGINAL_MODIFIED"
    pub code: String,
    pub message: String,
}

impl EditError {
    pub fn new(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ErrorSeverity::Error,
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn range(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Range, code, message)
    }

    pub fn state(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::State, code, message)
    }

    pub fn warning(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ErrorSeverity::Warning,
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Construct and immediately abort the process. Piece-table continuity breaks, an
    /// unhandled change kind, a save write-count mismatch, and a transform atomic-replace
    /// failure are never the caller's to recover from.
    pub fn fatal(code: impl Into<String>, message: impl Into<String>) -> ! {
        let err = Self {
            severity: ErrorSeverity::Critical,
            kind: ErrorKind::Internal,
            code: code.into(),
            message: message.into(),
        };
        eprintln!("{err}");
        panic!("{err}");
    }

    pub fn contains_msg(&self, sub: &str) -> bool {
        self.message.contains(sub)
    }
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}({}): {}",
            self.severity, self.kind, self.code, self.message
        )
    }
}

impl std::error::Error for EditError {}

impl From<std::io::Error> for EditError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, "IO_ERROR", err.to_string())
    }
}

impl From<String> for EditError {
    fn from(msg: String) -> Self {
        Self::new(ErrorKind::Other, "GENERIC_ERROR", msg)
    }
}

impl From<&str> for EditError {
    fn from(msg: &str) -> Self {
        Self::new(ErrorKind::Other, "GENERIC_ERROR", msg)
    }
}

/// Result alias used throughout the edit core
pub type Result<T> = std::result::Result<T, EditError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
