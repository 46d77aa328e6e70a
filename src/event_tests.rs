use super::*;
use crate::change::Change;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn session_subscriber_fires_only_on_interested_bits() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let log2 = Rc::clone(&log);
    let mut sub = Subscriber::new(SessionEvent::Edit.bit(), move |event: SessionEvent, _| {
        log2.borrow_mut().push(event);
    });

    sub.fire(SessionEvent::Create, None);
    sub.fire(SessionEvent::Edit, None);

    assert_eq!(log.borrow().as_slice(), &[SessionEvent::Edit]);
}

#[test]
fn session_subscriber_all_mask_fires_everything() {
    let log = Rc::new(RefCell::new(0usize));
    let log2 = Rc::clone(&log);
    let mut sub = Subscriber::new(crate::constants::session_events::ALL, move |_: SessionEvent, _| {
        *log2.borrow_mut() += 1;
    });
    sub.fire(SessionEvent::Create, None);
    sub.fire(SessionEvent::Save, None);
    assert_eq!(*log.borrow(), 2);
}

#[test]
fn viewport_subscriber_respects_global_pause() {
    let count = Rc::new(RefCell::new(0usize));
    let count2 = Rc::clone(&count);
    let mut sub = Subscriber::new(ViewportEvent::Edit.bit(), move |_: ViewportEvent, _| {
        *count2.borrow_mut() += 1;
    });

    sub.fire(ViewportEvent::Edit, None, true);
    assert_eq!(*count.borrow(), 0);

    sub.fire(ViewportEvent::Edit, None, false);
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn edit_or_undo_picks_by_serial_sign() {
    let change = Change::make_insert(1, 0, b"x", false);
    assert_eq!(ViewportEvent::edit_or_undo(&change), ViewportEvent::Edit);
    let undone = change.flip_serial_sign();
    assert_eq!(ViewportEvent::edit_or_undo(&undone), ViewportEvent::Undo);
}
