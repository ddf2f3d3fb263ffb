//! The notification dispatcher turns events into passive check results and
//! hands each one to a `Notifier`.
//!
//! Dispatch is best effort: skips and notifier failures are logged and
//! reported as outcomes, never returned as errors.

use crate::config::NscaConfig;
use crate::core::{DispatchOutcome, Event, NotificationRecord, Notifier, PipelineMessage};
use crate::formatting::format_message;
use crate::routing::RouteFilter;
use crate::status;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("You have set {set} but not {missing} - unsupported")]
    UnpairedField {
        set: &'static str,
        missing: &'static str,
    },
}

/// Where the service and status of each record come from.
#[derive(Debug, Clone, PartialEq)]
enum Mode {
    /// Parallel list fields, one record per element.
    PairedFields {
        status_field: String,
        service_field: String,
    },
    /// One record from the configured templates.
    Single {
        service: String,
        status: String,
    },
}

/// A candidate (service, raw status) pair before formatting.
type Candidate = (String, String);

/// Turns events into passive check results and submits them through a
/// [`Notifier`], one record at a time.
pub struct NotificationDispatcher<N: Notifier + ?Sized> {
    notifier: Arc<N>,
    route: RouteFilter,
    mode: Mode,
    nagios_host: String,
    message_format: String,
    finished_tx: watch::Sender<bool>,
}

impl<N: Notifier + ?Sized> NotificationDispatcher<N> {
    /// Validates the configuration and creates the dispatcher.
    ///
    /// Setting only one of `nagios_status_field` and `nagios_service_field`
    /// is rejected here rather than at dispatch time.
    pub fn register(config: &NscaConfig, notifier: Arc<N>) -> Result<Self, ConfigError> {
        let mode = match (&config.nagios_status_field, &config.nagios_service_field) {
            (Some(status_field), Some(service_field)) => Mode::PairedFields {
                status_field: status_field.clone(),
                service_field: service_field.clone(),
            },
            (None, None) => Mode::Single {
                service: config.nagios_service.clone(),
                status: config.nagios_status.clone().unwrap_or_default(),
            },
            (None, Some(_)) => {
                return Err(ConfigError::UnpairedField {
                    set: "nagios_service_field",
                    missing: "nagios_status_field",
                })
            }
            (Some(_), None) => {
                return Err(ConfigError::UnpairedField {
                    set: "nagios_status_field",
                    missing: "nagios_service_field",
                })
            }
        };

        let (finished_tx, _) = watch::channel(false);

        Ok(Self {
            notifier,
            route: config.route.clone(),
            mode,
            nagios_host: config.nagios_host.clone(),
            message_format: config.message_format.clone(),
            finished_tx,
        })
    }

    /// Returns a receiver that flips to `true` once the shutdown sentinel
    /// has been received.
    pub fn subscribe_finished(&self) -> watch::Receiver<bool> {
        self.finished_tx.subscribe()
    }

    /// Handles one message from the host pipeline.
    pub async fn receive<E: Event>(&self, message: PipelineMessage<E>) -> Vec<DispatchOutcome> {
        match message {
            PipelineMessage::Shutdown => {
                debug!("Shutdown received, nagios_nsca output finished");
                self.finished_tx.send_replace(true);
                Vec::new()
            }
            PipelineMessage::Event(event) => self.dispatch(&event).await,
        }
    }

    /// Derives check results from an event and submits them in order.
    ///
    /// Returns one outcome per submitted record, or a single skip outcome if
    /// the event was not processed.
    pub async fn dispatch(&self, event: &dyn Event) -> Vec<DispatchOutcome> {
        let outcomes = self.dispatch_inner(event).await;
        for outcome in &outcomes {
            metrics::counter!("nsca_dispatch_outcomes_total", "outcome" => outcome.as_str())
                .increment(1);
        }
        outcomes
    }

    async fn dispatch_inner(&self, event: &dyn Event) -> Vec<DispatchOutcome> {
        if !self.route.matches(event) {
            return vec![DispatchOutcome::SkippedNotMatched];
        }

        if !self.notifier.is_available() {
            warn!(
                send_nsca_bin = %self.notifier.location(),
                missed_event = ?event,
                "Skipping nagios_nsca output; send_nsca_bin file is missing"
            );
            return vec![DispatchOutcome::SkippedMissingTool];
        }

        let candidates = match self.candidates(event) {
            Some(candidates) => candidates,
            None => return vec![DispatchOutcome::SkippedFieldCountMismatch],
        };

        let mut outcomes = Vec::with_capacity(candidates.len());
        for (service, raw_status) in candidates {
            outcomes.push(self.send_event(event, service, raw_status).await);
        }
        outcomes
    }

    /// Returns the (service, status) pairs for an event, or `None` if the
    /// paired fields disagree in length.
    fn candidates(&self, event: &dyn Event) -> Option<Vec<Candidate>> {
        match &self.mode {
            Mode::Single { service, status } => Some(vec![(
                event.interpolate(service),
                event.interpolate(status),
            )]),
            Mode::PairedFields {
                status_field,
                service_field,
            } => {
                let statuses = read_sequence(event, status_field);
                let services = read_sequence(event, service_field);

                debug!(
                    statuses = %statuses.join(", "),
                    services = %services.join(", "),
                    "Read paired nagios fields"
                );

                if statuses.len() != services.len() {
                    warn!(
                        missed_event = ?event,
                        "Skipping nagios_nsca output; field {} had different number of entries to {}",
                        service_field,
                        status_field
                    );
                    return None;
                }

                Some(services.into_iter().zip(statuses).collect())
            }
        }
    }

    async fn send_event(
        &self,
        event: &dyn Event,
        service: String,
        raw_status: String,
    ) -> DispatchOutcome {
        let check = status::normalize(&raw_status);
        let record = NotificationRecord {
            target_host: event.interpolate(&self.nagios_host),
            service,
            message: check.message_or(format_message(&self.message_format, event)),
            raw_status,
        };

        match self.notifier.submit(&record, check.status).await {
            Ok(_) => DispatchOutcome::Delivered,
            Err(e) => {
                warn!(
                    status = ?e.exit_code(),
                    nagios_nsca_command = %e.command_line(),
                    error = %e,
                    missed_event = ?event,
                    "Skipping nagios_nsca output; error calling {}",
                    self.notifier.name()
                );
                DispatchOutcome::NotifierError
            }
        }
    }
}

fn read_sequence(event: &dyn Event, field: &str) -> Vec<String> {
    event
        .get(field)
        .map(|value| value.into_sequence())
        .unwrap_or_default()
}
