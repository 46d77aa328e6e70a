use super::*;
use crate::history::History;
use std::io::Cursor;

/// Spec §8 scenario 6: search across splits, then re-search after an overwrite.
#[test]
fn search_across_splits_then_overwrite_case_sensitive() {
    let original = b"the NeEdLe is here";
    let mut h = History::new(original.len() as i64);
    let mut source = Cursor::new(original.to_vec());

    let size = h.computed_size();
    let mut ctx = SearchContext::new(b"needle", 0, size, true, false).unwrap();
    assert!(ctx.next_match(0, h.table(), &mut source).unwrap());
    assert_eq!(ctx.match_offset(), 4);

    h.overwrite(4, b"NEEDLE").unwrap();
    let size2 = h.computed_size();
    let mut ctx2 = SearchContext::new(b"NEEDLE", 0, size2, false, false).unwrap();
    assert!(ctx2.next_match(0, h.table(), &mut source).unwrap());
    assert_eq!(ctx2.match_offset(), 4);
}

#[test]
fn no_match_resets_to_session_end() {
    let original = b"abcdef";
    let h = History::new(original.len() as i64);
    let mut source = Cursor::new(original.to_vec());
    let size = h.computed_size();

    let mut ctx = SearchContext::new(b"zzz", 0, size, false, false).unwrap();
    assert!(!ctx.next_match(0, h.table(), &mut source).unwrap());
    assert_eq!(ctx.match_offset(), size);
}

#[test]
fn next_match_with_advance_finds_second_occurrence() {
    let original = b"ababab";
    let h = History::new(original.len() as i64);
    let mut source = Cursor::new(original.to_vec());
    let size = h.computed_size();

    let mut ctx = SearchContext::new(b"ab", 0, size, false, false).unwrap();
    assert!(ctx.next_match(0, h.table(), &mut source).unwrap());
    assert_eq!(ctx.match_offset(), 0);
    assert!(ctx.next_match(1, h.table(), &mut source).unwrap());
    assert_eq!(ctx.match_offset(), 2);
    assert!(ctx.next_match(1, h.table(), &mut source).unwrap());
    assert_eq!(ctx.match_offset(), 4);
    assert!(!ctx.next_match(1, h.table(), &mut source).unwrap());
}

#[test]
fn reverse_search_finds_rightmost_match_first() {
    let original = b"ababab";
    let h = History::new(original.len() as i64);
    let mut source = Cursor::new(original.to_vec());
    let size = h.computed_size();

    let mut ctx = SearchContext::new(b"ab", 0, size, false, true).unwrap();
    assert!(ctx.next_match(0, h.table(), &mut source).unwrap());
    assert_eq!(ctx.match_offset(), 4);
}

#[test]
fn pattern_longer_than_limit_is_rejected() {
    let h = History::new(0);
    let too_long = vec![b'a'; (PATTERN_LIMIT + 1) as usize];
    assert!(SearchContext::new(&too_long, 0, h.computed_size().max(too_long.len() as i64), false, false).is_err());
}

#[test]
fn empty_pattern_is_rejected() {
    assert!(SearchContext::new(b"", 0, 10, false, false).is_err());
}

#[test]
fn pattern_longer_than_session_window_is_rejected() {
    assert!(SearchContext::new(b"needle", 0, 3, false, false).is_err());
}

#[test]
fn search_spanning_a_window_boundary() {
    // Force a tiny window by searching with a pattern near PATTERN_LIMIT so the tiled
    // window logic's stride math is exercised instead of matching in one shot.
    let mut original = vec![b'x'; 100];
    let needle = b"FINDME";
    original.splice(90..90, needle.iter().copied());
    let h = History::new(original.len() as i64);
    let mut source = Cursor::new(original.clone());
    let size = h.computed_size();

    let mut ctx = SearchContext::new(needle, 0, size, false, false).unwrap();
    assert!(ctx.next_match(0, h.table(), &mut source).unwrap());
    assert_eq!(ctx.match_offset(), 90);
}
