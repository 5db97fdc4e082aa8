//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use mnemokeys::host::{Handler, MemoryHost};
use mnemokeys::keymap::{ChordSequence, RawEvent, QUIT_CODE};

/// Parse chords, panicking on bad test input
pub fn seq(chords: &str) -> ChordSequence {
    chords.parse().expect("valid chord sequence")
}

/// A host with `text` typed, followed by a pause
pub fn host_typing(text: &str) -> MemoryHost {
    let mut host = MemoryHost::new();
    host.type_text(text).push_pause();
    host
}

/// A host that receives the quit key after `text`
pub fn host_quitting_after(text: &str) -> MemoryHost {
    let mut host = MemoryHost::new();
    host.type_text(text).push_event(RawEvent::Code(QUIT_CODE));
    host
}

/// A callback handler that logs `label` into the shared log when run
pub fn logging_handler(log: &Rc<RefCell<Vec<String>>>, label: &str) -> Handler {
    let log = Rc::clone(log);
    let label = label.to_string();
    Handler::callback(move || log.borrow_mut().push(label.clone()))
}

pub fn new_log() -> Rc<RefCell<Vec<String>>> {
    Rc::new(RefCell::new(Vec::new()))
}
