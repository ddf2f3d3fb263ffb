#![allow(dead_code)]
use async_trait::async_trait;
use nsca_relay::core::{NagiosStatus, NotificationRecord, Notifier};
use nsca_relay::notification::{NotifierError, Submission};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};
use std::time::Duration;

/// A mock Notifier that records what it is asked to submit and can be told
/// to be missing or to fail.
#[derive(Debug, Default)]
pub struct MockNotifier {
    missing: AtomicBool,
    fail_on_submit: AtomicBool,
    pub submitted: Mutex<Vec<(NotificationRecord, NagiosStatus)>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_missing(&self, missing: bool) {
        self.missing.store(missing, Ordering::SeqCst);
    }

    pub fn set_fail_on_submit(&self, fail: bool) {
        self.fail_on_submit.store(fail, Ordering::SeqCst);
    }

    /// (service, status code, message) of every submission, in order.
    pub fn triples(&self) -> Vec<(String, u8, String)> {
        self.submitted
            .lock()
            .unwrap()
            .iter()
            .map(|(record, status)| (record.service.clone(), status.code(), record.message.clone()))
            .collect()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    fn name(&self) -> &str {
        "mock_send_nsca"
    }

    fn is_available(&self) -> bool {
        !self.missing.load(Ordering::SeqCst)
    }

    fn location(&self) -> String {
        "/mock/send_nsca".to_string()
    }

    async fn submit(
        &self,
        record: &NotificationRecord,
        status: NagiosStatus,
    ) -> Result<Submission, NotifierError> {
        if self.fail_on_submit.load(Ordering::SeqCst) {
            return Err(NotifierError::ExitStatus {
                command_line: "/mock/send_nsca -H localhost -p 5667 -d '~'".to_string(),
                code: Some(2),
            });
        }
        self.submitted.lock().unwrap().push((record.clone(), status));
        Ok(Submission {
            command_line: "/mock/send_nsca -H localhost -p 5667 -d '~'".to_string(),
            elapsed: Duration::ZERO,
        })
    }
}
