use super::*;
use crate::change::Change;
use crate::history::History;
use std::io::Cursor;

fn get<'a>(vp: &'a mut Viewport, history: &History, original: &[u8]) -> &'a [u8] {
    let mut source = Cursor::new(original.to_vec());
    vp.get_data(history.table(), &mut source).unwrap()
}

#[test]
fn zero_capacity_is_rejected() {
    assert!(Viewport::new(0, 0, ViewportKind::Fixed).is_err());
}

#[test]
fn capacity_above_limit_is_rejected() {
    assert!(Viewport::new(0, CAPACITY_LIMIT + 1, ViewportKind::Fixed).is_err());
}

/// Spec §8 scenario 1: insert-then-read.
#[test]
fn insert_then_read() {
    let mut h = History::new(0);
    h.insert(0, b"0123456789").unwrap();
    let mut vp = Viewport::new(0, 100, ViewportKind::Fixed).unwrap();
    assert!(vp.has_changes());
    let data = get(&mut vp, &h, b"").to_vec();
    assert_eq!(data, b"0123456789");
    assert_eq!(vp.get_length(), 10);
    assert!(!vp.has_changes());
}

/// Spec §8 scenario 5: floating viewport follows inserts; fixed does not.
#[test]
fn floating_viewport_tracks_edits_before_it() {
    let mut h = History::new(0);
    h.insert(0, b"123456789").unwrap();

    let mut floating = Viewport::new(4, 4, ViewportKind::Floating).unwrap();
    let mut fixed = Viewport::new(4, 4, ViewportKind::Fixed).unwrap();
    assert_eq!(get(&mut floating, &h, b"").to_vec(), b"5678");
    assert_eq!(get(&mut fixed, &h, b"").to_vec(), b"5678");

    let serial = h.delete(0, 2).unwrap();
    let change = h.change_by_serial(serial).unwrap().clone();
    floating.on_change(&change, false);
    fixed.on_change(&change, false);

    assert_eq!(get(&mut floating, &h, b"").to_vec(), b"5678");
    assert_eq!(get(&mut fixed, &h, b"").to_vec(), b"789");
}

#[test]
fn floating_offset_clamps_to_zero_without_remembering_debt() {
    let mut h = History::new(0);
    h.insert(0, b"123456789").unwrap();
    let mut floating = Viewport::new(2, 4, ViewportKind::Floating).unwrap();

    let serial = h.delete(0, 9).unwrap();
    let change = h.change_by_serial(serial).unwrap().clone();
    floating.on_change(&change, false);
    assert_eq!(floating.get_offset(), 0);

    let insert_serial = h.insert(0, b"xx").unwrap();
    let insert_change = h.change_by_serial(insert_serial).unwrap().clone();
    floating.on_change(&insert_change, false);
    assert_eq!(floating.get_offset(), 2);
}

#[test]
fn affects_predicate_for_overwrite_requires_intersection() {
    let vp = Viewport::new(10, 5, ViewportKind::Fixed).unwrap(); // [10, 15)
    let inside = Change::make_overwrite(1, 12, b"zz", false); // [12, 14) intersects
    let before = Change::make_overwrite(1, 0, b"zz", false); // [0, 2) no intersection
    assert!(vp.affects(&inside));
    assert!(!vp.affects(&before));
}

#[test]
fn modify_resets_offset_and_marks_dirty() {
    let mut h = History::new(0);
    h.insert(0, b"0123456789").unwrap();
    let mut vp = Viewport::new(0, 100, ViewportKind::Fixed).unwrap();
    let _ = get(&mut vp, &h, b"");
    assert!(!vp.has_changes());

    vp.modify(2, 3, false).unwrap();
    assert!(vp.has_changes());
    assert_eq!(get(&mut vp, &h, b"").to_vec(), b"234");
}

#[test]
fn following_byte_count_can_go_negative_past_eof() {
    let vp = Viewport::new(8, 4, ViewportKind::Fixed).unwrap();
    assert_eq!(vp.get_following_byte_count(5), 5 - (8 + 0));
}
