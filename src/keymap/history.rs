//! Recently typed keys, for debugging shortcuts

use super::decode::{decode, to_letter_verbose, RawEvent};
use crate::host::Host;

/// How many keys the log shows unless raw output is requested
const LOG_LENGTH: usize = 31;

/// The `nth` most recent key event (1 is the latest)
pub fn last_key<H: Host + ?Sized>(host: &H, nth: usize) -> Option<RawEvent> {
    if nth == 0 {
        return None;
    }
    let recent = host.last_key_events(nth);
    if recent.len() < nth {
        return None;
    }
    recent.into_iter().next()
}

/// The key typed before the latest one
pub fn before_last<H: Host + ?Sized>(host: &H) -> Option<RawEvent> {
    last_key(host, 2)
}

/// Recent keys, newest first
///
/// Readable form has one `| C-e` line per key (spaces spelled out);
/// `raw` lists every raw event instead.
pub fn key_log<H: Host + ?Sized>(host: &H, history_len: usize, raw: bool) -> String {
    let mut events = host.last_key_events(history_len);
    events.reverse();

    if raw {
        return events
            .iter()
            .map(|e| format!("{}\n", e))
            .collect();
    }

    events
        .iter()
        .take(LOG_LENGTH)
        .map(|event| {
            let text = decode(event)
                .code
                .and_then(to_letter_verbose)
                .unwrap_or_else(|| event.to_string());
            let text = if text == " " { "space".to_string() } else { text };
            format!("| {}\n", text)
        })
        .collect()
}
