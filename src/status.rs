//! Validation of externally supplied check statuses.
//!
//! A status is accepted only if it round-trips exactly through integer
//! parsing and lies in the Nagios range. Anything else is sent as CRITICAL
//! with a diagnostic in place of the formatted message.

use crate::core::NagiosStatus;
use crate::formatting::escape_message;

/// The effective status for a record, and the message override if the raw
/// status was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCheck {
    pub status: NagiosStatus,
    pub diagnostic: Option<String>,
}

impl StatusCheck {
    /// The message to transmit: the diagnostic if there is one, else `message`.
    pub fn message_or(&self, message: String) -> String {
        self.diagnostic.clone().unwrap_or(message)
    }
}

/// Normalizes a raw status string.
pub fn normalize(raw: &str) -> StatusCheck {
    let parsed = match raw.parse::<i64>() {
        Ok(n) if n.to_string() == raw => n,
        _ => {
            return StatusCheck {
                status: NagiosStatus::Critical,
                diagnostic: Some(format!(
                    "status '{}' is not numeric",
                    escape_message(raw)
                )),
            };
        }
    };

    match NagiosStatus::from_code(parsed) {
        Some(status) => StatusCheck {
            status,
            diagnostic: None,
        },
        None => StatusCheck {
            status: NagiosStatus::Critical,
            diagnostic: Some(format!("status must be >= 0 and <= 3, not {}", parsed)),
        },
    }
}
