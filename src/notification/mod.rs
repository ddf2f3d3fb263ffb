//! Delivery of passive check results to Nagios.
//!
//! The dispatcher derives check results from events and is agnostic of how
//! they are delivered; `send_nsca` is the production `Notifier`.
pub mod dispatcher;
pub mod send_nsca;

pub use dispatcher::{ConfigError, NotificationDispatcher};
pub use send_nsca::{NotifierError, SendNsca, Submission};
