//! End-to-end dispatch behaviour against a mock notifier.

use nsca_relay::{
    config::NscaConfig,
    core::DispatchOutcome,
    formatting::format_message,
    notification::NotificationDispatcher,
};
use std::sync::Arc;

mod helpers;
use helpers::{event, mock_notifier::MockNotifier};

const TEMPLATE: &str = "%{@source}: %{@message}";

fn paired_config() -> NscaConfig {
    NscaConfig {
        nagios_status_field: Some("level".to_string()),
        nagios_service_field: Some("svc".to_string()),
        message_format: TEMPLATE.to_string(),
        ..Default::default()
    }
}

fn single_config(status: &str) -> NscaConfig {
    NscaConfig {
        nagios_status: Some(status.to_string()),
        message_format: TEMPLATE.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_paired_fields_end_to_end() {
    let notifier = Arc::new(MockNotifier::new());
    let dispatcher = NotificationDispatcher::register(&paired_config(), notifier.clone()).unwrap();
    let e = event(
        r#"{"@source": "app", "@message": "it's\ndown", "level": ["0", "5"], "svc": ["web", "db"]}"#,
    );

    let outcomes = dispatcher.dispatch(&e).await;

    assert_eq!(outcomes, vec![DispatchOutcome::Delivered, DispatchOutcome::Delivered]);
    assert_eq!(
        notifier.triples(),
        vec![
            ("web".to_string(), 0, "app: it&#146;s<br/>down".to_string()),
            (
                "db".to_string(),
                2,
                "status must be >= 0 and <= 3, not 5".to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn test_accepted_statuses_keep_formatted_message() {
    for code in 0..=3u8 {
        let notifier = Arc::new(MockNotifier::new());
        let dispatcher =
            NotificationDispatcher::register(&single_config(&code.to_string()), notifier.clone())
                .unwrap();
        let e = event(r#"{"@source": "app", "@message": "ok"}"#);

        dispatcher.dispatch(&e).await;

        assert_eq!(
            notifier.triples(),
            vec![("LOGSTASH".to_string(), code, format_message(TEMPLATE, &e))]
        );
    }
}

#[tokio::test]
async fn test_rejected_statuses_send_critical_diagnostic() {
    for raw in ["abc", "1.0", "02", "+1"] {
        let notifier = Arc::new(MockNotifier::new());
        let dispatcher =
            NotificationDispatcher::register(&single_config(raw), notifier.clone()).unwrap();

        dispatcher.dispatch(&event(r#"{"@message": "ok"}"#)).await;

        assert_eq!(
            notifier.triples(),
            vec![(
                "LOGSTASH".to_string(),
                2,
                format!("status '{}' is not numeric", raw)
            )]
        );
    }

    for raw in ["-1", "4", "99"] {
        let notifier = Arc::new(MockNotifier::new());
        let dispatcher =
            NotificationDispatcher::register(&single_config(raw), notifier.clone()).unwrap();

        dispatcher.dispatch(&event(r#"{"@message": "ok"}"#)).await;

        let triples = notifier.triples();
        assert_eq!(triples[0].1, 2);
        assert_eq!(triples[0].2, format!("status must be >= 0 and <= 3, not {}", raw));
    }
}

#[tokio::test]
async fn test_paired_fields_submit_k_records_in_order() {
    let notifier = Arc::new(MockNotifier::new());
    let dispatcher = NotificationDispatcher::register(&paired_config(), notifier.clone()).unwrap();
    let e = event(
        r#"{"level": ["3", "2", "1", "0"], "svc": ["d", "c", "b", "a"]}"#,
    );

    let outcomes = dispatcher.dispatch(&e).await;

    assert_eq!(outcomes.len(), 4);
    let pairs: Vec<(String, u8)> = notifier
        .triples()
        .into_iter()
        .map(|(service, status, _)| (service, status))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("d".to_string(), 3),
            ("c".to_string(), 2),
            ("b".to_string(), 1),
            ("a".to_string(), 0)
        ]
    );
}

#[tokio::test]
async fn test_paired_fields_mismatch_submits_nothing() {
    let notifier = Arc::new(MockNotifier::new());
    let dispatcher = NotificationDispatcher::register(&paired_config(), notifier.clone()).unwrap();

    for json in [
        r#"{"level": ["0", "1"], "svc": ["web"]}"#,
        r#"{"level": ["0"]}"#,
        r#"{"svc": ["web", "db"]}"#,
    ] {
        let outcomes = dispatcher.dispatch(&event(json)).await;
        assert_eq!(outcomes, vec![DispatchOutcome::SkippedFieldCountMismatch]);
    }
    assert!(notifier.triples().is_empty());
}

#[tokio::test]
async fn test_missing_tool_until_it_appears() {
    let notifier = Arc::new(MockNotifier::new());
    notifier.set_missing(true);
    let dispatcher =
        NotificationDispatcher::register(&single_config("0"), notifier.clone()).unwrap();
    let e = event(r#"{"@message": "x"}"#);

    for _ in 0..3 {
        assert_eq!(
            dispatcher.dispatch(&e).await,
            vec![DispatchOutcome::SkippedMissingTool]
        );
    }
    assert!(notifier.triples().is_empty());

    notifier.set_missing(false);
    assert_eq!(dispatcher.dispatch(&e).await, vec![DispatchOutcome::Delivered]);
}

#[tokio::test]
async fn test_notifier_error_does_not_stick() {
    let notifier = Arc::new(MockNotifier::new());
    let dispatcher =
        NotificationDispatcher::register(&single_config("1"), notifier.clone()).unwrap();
    let e = event(r#"{"@message": "x"}"#);

    notifier.set_fail_on_submit(true);
    assert_eq!(dispatcher.dispatch(&e).await, vec![DispatchOutcome::NotifierError]);

    notifier.set_fail_on_submit(false);
    assert_eq!(dispatcher.dispatch(&e).await, vec![DispatchOutcome::Delivered]);
    assert_eq!(notifier.triples().len(), 1);
}
