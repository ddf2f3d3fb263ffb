//! A minimal host pipeline: reads JSON-lines events and feeds them to the
//! dispatcher one at a time.

use crate::core::{DispatchOutcome, Notifier, PipelineMessage};
use crate::event::JsonEvent;
use crate::notification::NotificationDispatcher;
use anyhow::{Context, Result};
use std::collections::HashMap;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Counts of what happened while the pipeline ran.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineSummary {
    /// Events parsed and handed to the dispatcher.
    pub events: usize,
    /// Lines that could not be parsed as events.
    pub invalid_lines: usize,
    /// Outcomes reported by the dispatcher.
    pub outcomes: HashMap<DispatchOutcome, usize>,
}

impl PipelineSummary {
    /// Number of times `outcome` was reported.
    pub fn count(&self, outcome: DispatchOutcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    fn record(&mut self, outcomes: Vec<DispatchOutcome>) {
        for outcome in outcomes {
            *self.outcomes.entry(outcome).or_default() += 1;
        }
    }
}

/// Runs the pipeline until the input ends or shutdown is signalled.
///
/// Events are dispatched serially; a shutdown signal is only observed
/// between events, so a running submission always completes (bounded by the
/// notifier timeout) first. The shutdown sentinel is delivered to the
/// dispatcher in every case, including read errors. Lines that are not
/// valid UTF-8 or not JSON objects are counted and skipped. Dropping the shutdown
/// sender counts as a shutdown signal.
pub async fn run<R, N>(
    mut reader: R,
    dispatcher: &NotificationDispatcher<N>,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<PipelineSummary>
where
    R: AsyncBufRead + Unpin,
    N: Notifier + ?Sized,
{
    let mut buf = Vec::new();
    let mut summary = PipelineSummary::default();
    let mut line_no = 0usize;

    let read_result = loop {
        buf.clear();
        let read = tokio::select! {
            biased;
            _ = shutdown_rx.changed() => {
                info!("Pipeline received shutdown signal.");
                break Ok(());
            }
            read = reader.read_until(b'\n', &mut buf) => read,
        };

        match read {
            Ok(0) => {
                debug!("Input ended.");
                break Ok(());
            }
            Ok(_) => {}
            Err(e) => break Err(e),
        }
        line_no += 1;

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim_end_matches(['\n', '\r']),
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping input line that is not UTF-8");
                summary.invalid_lines += 1;
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let event = match JsonEvent::from_line(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping unparsable input line");
                summary.invalid_lines += 1;
                continue;
            }
        };

        summary.events += 1;
        let outcomes = dispatcher.receive(PipelineMessage::Event(event)).await;
        summary.record(outcomes);
    };

    dispatcher
        .receive(PipelineMessage::<JsonEvent>::Shutdown)
        .await;

    read_result.with_context(|| format!("failed reading input after line {}", line_no))?;

    info!(
        events = summary.events,
        invalid_lines = summary.invalid_lines,
        delivered = summary.count(DispatchOutcome::Delivered),
        failed = summary.count(DispatchOutcome::NotifierError),
        "Pipeline finished."
    );
    Ok(summary)
}
