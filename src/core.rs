//! Core domain types and service traits for nsca-relay
//!
//! This module defines the read-only event capability the dispatcher works
//! against, the records it derives from events, and the contract for the
//! external notifier that delivers them.

use crate::notification::send_nsca::{NotifierError, Submission};
use async_trait::async_trait;
use std::fmt;

/// A value read from an event field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// A single value, rendered as text.
    Scalar(String),
    /// An ordered list of values, rendered as text.
    Sequence(Vec<String>),
}

impl FieldValue {
    /// Returns the value as a sequence, wrapping a scalar in a one-element list.
    pub fn into_sequence(self) -> Vec<String> {
        match self {
            FieldValue::Scalar(value) => vec![value],
            FieldValue::Sequence(values) => values,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Scalar(value) => f.write_str(value),
            FieldValue::Sequence(values) => f.write_str(&values.join(",")),
        }
    }
}

/// Read-only view of a pipeline event.
///
/// The dispatcher never owns or mutates events; it only reads fields and
/// expands templates against them.
pub trait Event: fmt::Debug + Send + Sync {
    /// Returns the value of `field`, or `None` if the event does not carry it.
    fn get(&self, field: &str) -> Option<FieldValue>;

    /// Expands `%{field}` references in `template` against this event.
    fn interpolate(&self, template: &str) -> String;
}

/// A message delivered to an output by the host pipeline.
#[derive(Debug, Clone)]
pub enum PipelineMessage<E> {
    /// A regular event to process.
    Event(E),
    /// The pipeline is shutting down; no further events follow.
    Shutdown,
}

/// Passive check status understood by Nagios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NagiosStatus {
    Ok = 0,
    Warning = 1,
    Critical = 2,
    Unknown = 3,
}

impl NagiosStatus {
    /// Maps a numeric return code to a status, if it is in range.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::Warning),
            2 => Some(Self::Critical),
            3 => Some(Self::Unknown),
            _ => None,
        }
    }

    /// The numeric return code sent on the wire.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for NagiosStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One passive check result derived from an event, before status validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    /// The Nagios host the result is submitted for (already interpolated).
    pub target_host: String,
    /// The Nagios service the result is submitted for.
    pub service: String,
    /// The status exactly as it was read from the event or configuration.
    pub raw_status: String,
    /// The formatted and escaped plugin output.
    pub message: String,
}

/// Result of handling one event, or one record derived from it.
///
/// Only used for logging and metrics; nothing is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchOutcome {
    Delivered,
    SkippedMissingTool,
    SkippedFieldCountMismatch,
    SkippedNotMatched,
    NotifierError,
}

impl DispatchOutcome {
    /// A stable label for metrics and summaries.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::SkippedMissingTool => "skipped_missing_tool",
            Self::SkippedFieldCountMismatch => "skipped_field_count_mismatch",
            Self::SkippedNotMatched => "skipped_not_matched",
            Self::NotifierError => "notifier_error",
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Service Traits
// =============================================================================

/// Delivers validated check results to the monitoring daemon.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// A short name for logging (e.g., "send_nsca").
    fn name(&self) -> &str;

    /// Whether the notifier can currently be used.
    ///
    /// Called once per dispatched event; implementations must not cache it.
    fn is_available(&self) -> bool;

    /// A description of where the notifier lives, used in skip warnings.
    fn location(&self) -> String;

    /// Submits one check result.
    ///
    /// # Arguments
    /// * `record` - The record, with `message` already final
    /// * `status` - The validated status to send
    ///
    /// # Returns
    /// * `Ok(Submission)` if the notifier reported success
    /// * `Err(NotifierError)` for spawn failures, timeouts and nonzero exits
    async fn submit(
        &self,
        record: &NotificationRecord,
        status: NagiosStatus,
    ) -> Result<Submission, NotifierError>;
}
