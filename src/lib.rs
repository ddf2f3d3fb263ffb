//! nsca-relay - Relays pipeline events to Nagios as passive check results
//!
//! This library provides the event model, status validation, message
//! formatting and the `send_nsca` based notifier used by the binary.

pub mod cli;
pub mod config;
pub mod core;
pub mod event;
pub mod formatting;
pub mod notification;
pub mod pipeline;
pub mod routing;
pub mod status;

// Re-export core types for convenience
pub use crate::core::*;
