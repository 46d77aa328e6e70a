//! C8 Search engine: windowed Boyer-Moore-Horspool substring search over the computed
//! stream, forward or reverse, with optional case folding.
//!
//! Grounded on `examples/original_source/core/src/lib/search.cpp`'s
//! `omega_search_next_match` — the tiled-window scan, stride computation, and
//! begin/continue bookkeeping are a direct port of that function's arithmetic. The
//! skip-table construction and byte-compare loop (`omega_find`/`impl_/find.*`) were not
//! present in the retrieved source, so those are a standard Horspool implementation;
//! reverse search is expressed by scanning a reversed copy of both pattern and window
//! rather than a mirrored skip table, which keeps one matcher routine for both directions.

use crate::constants::limits::PATTERN_LIMIT;
use crate::error::{EditError, Result};
use crate::materialize::{materialize, SegmentSource};
use crate::piece_table::PieceTable;

const MAX_SEGMENT_LENGTH: i64 = PATTERN_LIMIT << 1;

fn build_skip_table(pattern: &[u8]) -> [usize; 256] {
    let m = pattern.len();
    let mut table = [m; 256];
    for (i, &b) in pattern.iter().enumerate().take(m.saturating_sub(1)) {
        table[b as usize] = m - 1 - i;
    }
    table
}

/// Leftmost occurrence of `pattern` in `haystack`, or `None`.
fn horspool_find(haystack: &[u8], pattern: &[u8], skip: &[usize; 256]) -> Option<usize> {
    let m = pattern.len();
    let n = haystack.len();
    if m == 0 || m > n {
        return None;
    }
    let mut i = 0;
    while i <= n - m {
        let mut j = m - 1;
        while haystack[i + j] == pattern[j] {
            if j == 0 {
                return Some(i);
            }
            j -= 1;
        }
        i += skip[haystack[i + m - 1] as usize];
    }
    None
}

/// A resumable substring search over a fixed `[session_offset, session_offset +
/// session_length)` window of the computed stream.
pub struct SearchContext {
    case_insensitive: bool,
    reverse: bool,
    pattern_length: i64,
    /// The pattern actually compared against each window: reversed up front when
    /// `reverse` is set, so `horspool_find` only ever needs to scan left to right.
    search_pattern: Vec<u8>,
    skip_table: [usize; 256],
    session_offset: i64,
    session_length: i64,
    match_offset: i64,
}

impl SearchContext {
    /// `pattern` is copied and, if `case_insensitive`, lowercased once at creation time.
    /// `session_length` must already be resolved (the spec's "0 means to the end of the
    /// computed stream" default is a session-layer concern, not this context's).
    pub fn new(
        pattern: &[u8],
        session_offset: i64,
        session_length: i64,
        case_insensitive: bool,
        reverse: bool,
    ) -> Result<Self> {
        if pattern.is_empty() || pattern.len() as i64 > PATTERN_LIMIT {
            return Err(EditError::range(
                "PATTERN_LENGTH_OUT_OF_RANGE",
                format!("pattern length must be in (0, {PATTERN_LIMIT}]"),
            ));
        }
        if pattern.len() as i64 > session_length {
            return Err(EditError::range(
                "PATTERN_LONGER_THAN_SESSION_WINDOW",
                "pattern length exceeds the search window length",
            ));
        }
        let mut folded = pattern.to_vec();
        if case_insensitive {
            folded.make_ascii_lowercase();
        }
        let search_pattern = if reverse {
            let mut rev = folded.clone();
            rev.reverse();
            rev
        } else {
            folded
        };
        let skip_table = build_skip_table(&search_pattern);
        Ok(SearchContext {
            case_insensitive,
            reverse,
            pattern_length: pattern.len() as i64,
            search_pattern,
            skip_table,
            session_offset,
            session_length,
            match_offset: session_offset + session_length,
        })
    }

    pub fn is_reverse_search(&self) -> bool {
        self.reverse
    }

    pub fn session_offset(&self) -> i64 {
        self.session_offset
    }

    pub fn session_length(&self) -> i64 {
        self.session_length
    }

    pub fn pattern_length(&self) -> i64 {
        self.pattern_length
    }

    pub fn match_offset(&self) -> i64 {
        self.match_offset
    }

    fn last_offset(&self) -> i64 {
        self.session_offset + self.session_length
    }

    /// Advances the search and returns whether a match was found. On a miss, `match_offset`
    /// resets to the session window's right edge, matching the "no match yet" sentinel.
    pub fn next_match(
        &mut self,
        advance: i64,
        table: &PieceTable,
        source: &mut dyn SegmentSource,
    ) -> Result<bool> {
        debug_assert!(advance >= 0);
        let last_offset = self.last_offset();
        let is_begin = self.match_offset == last_offset;

        let mut search_length = if self.reverse {
            if is_begin {
                self.session_length
            } else {
                (self.match_offset - self.session_offset - advance + 1).max(0)
            }
        } else if is_begin {
            self.session_length
        } else {
            self.session_length - (self.match_offset - self.session_offset)
        };

        if self.pattern_length > search_length {
            self.match_offset = last_offset;
            return Ok(false);
        }

        let mut capacity = search_length.min(MAX_SEGMENT_LENGTH);
        let mut stride = 1 + capacity - self.pattern_length;
        let mut offset = if self.reverse {
            if is_begin {
                last_offset - capacity
            } else {
                self.match_offset - capacity - advance + 1
            }
        } else if is_begin {
            self.session_offset
        } else {
            self.match_offset + advance
        };

        let mut buf = vec![0u8; capacity as usize];
        loop {
            let n = materialize(table, source, offset, &mut buf)? as i64;
            let window = &buf[..n as usize];

            let folded;
            let scanned: &[u8] = if self.case_insensitive {
                folded = window.to_ascii_lowercase();
                &folded
            } else {
                window
            };

            let found = if self.reverse {
                let mut rev = scanned.to_vec();
                rev.reverse();
                horspool_find(&rev, &self.search_pattern, &self.skip_table)
                    .map(|idx| (n as usize) - idx - self.pattern_length as usize)
            } else {
                horspool_find(scanned, &self.search_pattern, &self.skip_table)
            };

            if let Some(start) = found {
                self.match_offset = offset + start as i64;
                return Ok(true);
            }

            if n != MAX_SEGMENT_LENGTH {
                break;
            }

            search_length -= stride;
            offset += if self.reverse { -stride } else { stride };
            capacity = search_length.min(MAX_SEGMENT_LENGTH);
            stride = 1 + capacity - self.pattern_length;
            buf.resize(capacity.max(0) as usize, 0);
        }

        self.match_offset = last_offset;
        Ok(false)
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
