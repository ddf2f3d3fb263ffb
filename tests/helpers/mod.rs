#![allow(dead_code)]
#[cfg(unix)]
pub mod fake_send_nsca;
pub mod mock_notifier;

use nsca_relay::event::JsonEvent;

/// Parses a JSON object literal into an event.
pub fn event(json: &str) -> JsonEvent {
    JsonEvent::from_line(json).expect("test event must be valid JSON")
}
