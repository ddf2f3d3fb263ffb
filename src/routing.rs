//! Decides whether an event is routed to the output at all.

use crate::core::Event;
use serde::{Deserialize, Serialize};

/// Type and tag conditions an event must satisfy to reach the output.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct RouteFilter {
    /// Only events whose `@type` equals this value are handled.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Every one of these tags must be present in `@tags`.
    pub tags: Vec<String>,
    /// None of these tags may be present in `@tags`.
    pub exclude_tags: Vec<String>,
}

impl RouteFilter {
    /// Evaluates the filter against an event.
    pub fn matches(&self, event: &dyn Event) -> bool {
        if let Some(wanted) = &self.event_type {
            match event.get("@type") {
                Some(actual) if actual.to_string() == *wanted => {}
                _ => return false,
            }
        }

        if self.tags.is_empty() && self.exclude_tags.is_empty() {
            return true;
        }

        let present = event
            .get("@tags")
            .map(|tags| tags.into_sequence())
            .unwrap_or_default();

        self.tags.iter().all(|tag| present.contains(tag))
            && !self.exclude_tags.iter().any(|tag| present.contains(tag))
    }
}
