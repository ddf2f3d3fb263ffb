//! A notifier that submits passive check results with the `send_nsca` tool.

use crate::config::NscaConfig;
use crate::core::{NagiosStatus, NotificationRecord, Notifier};
use crate::formatting::escape_field;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::{debug, instrument};

/// Field separator of the wire record, passed to `send_nsca -d`.
pub const DELIMITER: char = '~';

#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("failed to start `{command_line}`: {source}")]
    Spawn {
        command_line: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write check result to `{command_line}`: {source}")]
    Stdin {
        command_line: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for `{command_line}`: {source}")]
    Wait {
        command_line: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command_line}` did not finish within {after:?}")]
    TimedOut { command_line: String, after: Duration },

    #[error("`{command_line}` exited with {}", describe_code(.code))]
    ExitStatus {
        command_line: String,
        code: Option<i32>,
    },
}

impl NotifierError {
    /// The exit code of the tool, when it ran to completion.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            NotifierError::ExitStatus { code, .. } => *code,
            _ => None,
        }
    }

    /// The invocation that failed, as rendered for logs.
    pub fn command_line(&self) -> &str {
        match self {
            NotifierError::Spawn { command_line, .. }
            | NotifierError::Stdin { command_line, .. }
            | NotifierError::Wait { command_line, .. }
            | NotifierError::TimedOut { command_line, .. }
            | NotifierError::ExitStatus { command_line, .. } => command_line,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// A successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub command_line: String,
    pub elapsed: Duration,
}

/// Invokes `send_nsca` once per check result.
#[derive(Debug, Clone)]
pub struct SendNsca {
    bin: PathBuf,
    host: String,
    port: u16,
    config_file: Option<PathBuf>,
    timeout: Duration,
}

impl SendNsca {
    /// Creates a new `SendNsca` from the output configuration.
    pub fn new(config: &NscaConfig) -> Self {
        Self {
            bin: config.send_nsca_bin.clone(),
            host: config.host.clone(),
            port: config.port,
            config_file: config.send_nsca_config.clone(),
            timeout: config.timeout(),
        }
    }

    /// Overrides the time a single run may take.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Arguments passed to the binary. No shell is involved.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-H".to_string(),
            self.host.clone(),
            "-p".to_string(),
            self.port.to_string(),
            "-d".to_string(),
            DELIMITER.to_string(),
        ];
        if let Some(path) = &self.config_file {
            args.push("-c".to_string());
            args.push(path.display().to_string());
        }
        args
    }

    /// The invocation rendered the way an operator would type it.
    pub fn command_line(&self) -> String {
        let mut line = format!(
            "{} -H {} -p {} -d '{}'",
            self.bin.display(),
            self.host,
            self.port,
            DELIMITER
        );
        if let Some(path) = &self.config_file {
            line.push_str(&format!(" -c {}", path.display()));
        }
        line
    }

    /// Serializes one check result into the line fed to `send_nsca`.
    ///
    /// Host and service are escaped here; the message is expected to have
    /// been escaped when it was formatted.
    pub fn wire_record(record: &NotificationRecord, status: NagiosStatus) -> String {
        format!(
            "{host}{d}{service}{d}{status}{d}{message}\n",
            host = escape_field(&record.target_host, DELIMITER),
            service = escape_field(&record.service, DELIMITER),
            status = status.code(),
            message = record.message,
            d = DELIMITER
        )
    }

    async fn run(&self, payload: &str, command_line: &str) -> Result<ExitStatus, NotifierError> {
        let mut child = Command::new(&self.bin)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| NotifierError::Spawn {
                command_line: command_line.to_string(),
                source,
            })?;

        let deadline = tokio::time::Instant::now() + self.timeout;

        if let Some(mut stdin) = child.stdin.take() {
            let written = tokio::time::timeout_at(deadline, async {
                stdin.write_all(payload.as_bytes()).await?;
                stdin.shutdown().await
            })
            .await;
            match written {
                Ok(Ok(())) => {}
                // The tool may exit before reading; its exit status says why.
                Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {
                    debug!("send_nsca closed stdin before reading the check result");
                }
                Ok(Err(source)) => {
                    return Err(NotifierError::Stdin {
                        command_line: command_line.to_string(),
                        source,
                    });
                }
                Err(_) => return Err(self.timed_out(&mut child, command_line).await),
            }
        }

        let waited = tokio::time::timeout_at(deadline, child.wait()).await;
        match waited {
            Ok(Ok(status)) => Ok(status),
            Ok(Err(source)) => Err(NotifierError::Wait {
                command_line: command_line.to_string(),
                source,
            }),
            Err(_) => Err(self.timed_out(&mut child, command_line).await),
        }
    }

    async fn timed_out(&self, child: &mut Child, command_line: &str) -> NotifierError {
        if let Err(e) = child.kill().await {
            debug!(error = %e, "failed to kill timed out send_nsca");
        }
        NotifierError::TimedOut {
            command_line: command_line.to_string(),
            after: self.timeout,
        }
    }
}

#[async_trait]
impl Notifier for SendNsca {
    fn name(&self) -> &str {
        "send_nsca"
    }

    fn is_available(&self) -> bool {
        self.bin.exists()
    }

    fn location(&self) -> String {
        self.bin.display().to_string()
    }

    #[instrument(skip(self, record), fields(host = %record.target_host, service = %record.service))]
    async fn submit(
        &self,
        record: &NotificationRecord,
        status: NagiosStatus,
    ) -> Result<Submission, NotifierError> {
        let command_line = self.command_line();
        let payload = Self::wire_record(record, status);

        let start = Instant::now();
        let result = self.run(&payload, &command_line).await;
        let elapsed = start.elapsed();
        metrics::histogram!("send_nsca_duration_seconds").record(elapsed.as_secs_f64());

        let exit = result?;
        if exit.success() {
            debug!(elapsed_ms = elapsed.as_millis() as u64, "send_nsca succeeded");
            Ok(Submission {
                command_line,
                elapsed,
            })
        } else {
            Err(NotifierError::ExitStatus {
                command_line,
                code: exit.code(),
            })
        }
    }
}
