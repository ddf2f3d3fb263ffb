// src/formatting.rs

use crate::core::Event;

/// Replacement for embedded newlines; the NSCA record is line-oriented.
pub const NEWLINE_ESCAPE: &str = "<br/>";

/// Replacement for single quotes (a right single quotation mark entity).
pub const QUOTE_ESCAPE: &str = "&#146;";

/// Replacement for the record delimiter inside host and service names.
pub const DELIMITER_ESCAPE: &str = "&#126;";

/// Expands a message template against an event and escapes the result for
/// the wire.
pub fn format_message(template: &str, event: &dyn Event) -> String {
    escape_message(&event.interpolate(template))
}

/// Escapes newlines and single quotes. No other characters are touched.
///
/// Widening this set means revisiting the record delimiter as well; the two
/// are only safe together.
pub fn escape_message(text: &str) -> String {
    text.replace('\n', NEWLINE_ESCAPE).replace('\'', QUOTE_ESCAPE)
}

/// Escapes a host or service name so it stays a single wire field.
///
/// The message is the last field, so only the fields before it need the
/// delimiter replaced.
pub fn escape_field(text: &str, delimiter: char) -> String {
    text.replace('\n', NEWLINE_ESCAPE)
        .replace(delimiter, DELIMITER_ESCAPE)
}
