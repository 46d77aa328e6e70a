use super::*;

#[test]
fn insert_stores_inline_for_short_payload() {
    let c = Change::make_insert(1, 0, b"hi", false);
    assert_eq!(c.length(), 2);
    assert_eq!(c.bytes(), b"hi");
    assert_eq!(c.kind_as_char(), 'I');
}

#[test]
fn insert_stores_heap_for_long_payload() {
    let payload = vec![b'x'; 64];
    let c = Change::make_insert(1, 0, &payload, false);
    assert_eq!(c.length(), 64);
    assert_eq!(c.bytes(), payload.as_slice());
}

#[test]
fn delete_has_no_bytes() {
    let c = Change::make_delete(1, 3, 5, false);
    assert_eq!(c.length(), 5);
    assert!(c.bytes().is_empty());
    assert_eq!(c.kind_as_char(), 'D');
}

#[test]
fn overwrite_kind_char() {
    let c = Change::make_overwrite(1, 0, b"zzz", false);
    assert_eq!(c.kind_as_char(), 'O');
}

#[test]
fn flip_serial_sign_negates_and_marks_undone() {
    let c = Change::make_insert(3, 0, b"abc", true);
    assert!(!c.is_undone());
    let flipped = c.flip_serial_sign();
    assert_eq!(flipped.serial(), -3);
    assert!(flipped.is_undone());
    assert_eq!(flipped.bytes(), b"abc");
    let back = flipped.flip_serial_sign();
    assert_eq!(back.serial(), 3);
    assert!(!back.is_undone());
}

#[test]
fn whole_file_is_read_origin() {
    let c = Change::whole_file(100);
    assert_eq!(c.serial(), 0);
    assert!(c.is_read_origin());
    assert_eq!(c.length(), 100);
}

#[test]
fn boundary_at_eight_bytes_goes_to_heap() {
    let payload = vec![b'y'; 8];
    let c = Change::make_insert(1, 0, &payload, false);
    assert_eq!(c.length(), 8);
    assert_eq!(c.bytes(), payload.as_slice());
}
