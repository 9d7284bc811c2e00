// ABOUTME: Tests for signal decoding and notification encoding.
// ABOUTME: Pins the JSON shapes seen by callers on either side of an agent.

use std::time::Duration;

use serde_json::json;

use super::*;
use crate::error::AgentError;
use crate::queue::Priority;

#[test]
fn test_decode_tool_request_defaults() {
    let signal = Signal::from_json(r#"{"type": "tool_request", "params": {"path": "src"}}"#).unwrap();

    match signal {
        Signal::ToolRequest(req) => {
            assert_eq!(req.params, json!({"path": "src"}));
            assert_eq!(req.priority, Priority::Normal);
            assert!(req.request_id.is_none());
            assert!(req.cache_key.is_none());
        }
        other => panic!("Expected tool_request, got {:?}", other),
    }
}

#[test]
fn test_decode_tool_request_with_everything() {
    let raw = r#"{
        "type": "tool_request",
        "request_id": "r1",
        "params": {"q": 1},
        "priority": "high",
        "cache_key": "k"
    }"#;

    let expected = ToolRequest::new(json!({"q": 1}))
        .with_id("r1")
        .with_priority(Priority::High)
        .with_cache_key("k");
    assert_eq!(Signal::from_json(raw).unwrap(), Signal::ToolRequest(expected));
}

#[test]
fn test_decode_control_signals() {
    assert_eq!(
        Signal::from_json(r#"{"type": "cancel_request", "request_id": "r9"}"#).unwrap(),
        Signal::CancelRequest {
            request_id: "r9".into()
        }
    );
    assert_eq!(
        Signal::from_json(r#"{"type": "get_metrics"}"#).unwrap(),
        Signal::GetMetrics
    );
    assert_eq!(
        Signal::from_json(r#"{"type": "clear_cache"}"#).unwrap().kind(),
        "clear_cache"
    );
}

#[test]
fn test_unknown_type_decodes_to_unknown() {
    let signal = Signal::from_json(r#"{"type": "reboot"}"#).unwrap();
    assert_eq!(signal, Signal::Unknown);
    assert_eq!(signal.kind(), "unknown");
}

#[test]
fn test_malformed_signals_are_errors() {
    assert!(Signal::from_json("not json").is_err());
    assert!(Signal::from_json(r#"{"params": {}}"#).is_err());
    assert!(Signal::from_json(r#"{"type": "tool_request", "params": {}, "priority": "urgent"}"#).is_err());
}

#[test]
fn test_result_notification_shape() {
    let n = Notification::result("r1", json!({"ok": true}), Duration::from_millis(42), false, false);

    assert_eq!(
        serde_json::to_value(&n).unwrap(),
        json!({
            "type": "result",
            "request_id": "r1",
            "result": {"ok": true},
            "execution_time_ms": 42,
            "from_cache": false,
            "cancelled": false
        })
    );
}

#[test]
fn test_rate_limit_error_carries_retry_after() {
    let error = AgentError::RateLimited {
        retry_after: Duration::from_secs(40),
    };
    let n = Notification::error(Some("r2".into()), &error, false);

    let value = serde_json::to_value(&n).unwrap();
    assert_eq!(value["type"], json!("error"));
    assert_eq!(value["kind"], json!("rate_limited"));
    assert_eq!(value["retry_after_ms"], json!(40_000));
    assert!(n.is_terminal());
}

#[test]
fn test_error_without_request_omits_optional_fields() {
    let n = Notification::error(None, &AgentError::Unhandled("x".into()), false);
    let value = serde_json::to_value(&n).unwrap();

    assert!(value.get("request_id").is_none());
    assert!(value.get("retry_after_ms").is_none());
    assert_eq!(n.request_id(), None);
}

#[test]
fn test_progress_terminal_only_when_cancelled() {
    let queued = Notification::Progress {
        request_id: "r".into(),
        status: RequestStatus::Queued,
        position: Some(3),
    };
    assert!(!queued.is_terminal());
    assert_eq!(
        serde_json::to_value(&queued).unwrap(),
        json!({"type": "progress", "request_id": "r", "status": "queued", "position": 3})
    );

    assert!(!Notification::progress("r", RequestStatus::CancelRequested).is_terminal());
    assert!(Notification::progress("r", RequestStatus::Cancelled).is_terminal());
}

#[test]
fn test_metrics_report_is_flattened() {
    let report = crate::metrics::Metrics::new().report("analyze", 2, 1, 0);
    let value = serde_json::to_value(Notification::MetricsReport(report)).unwrap();

    assert_eq!(value["type"], json!("metrics_report"));
    assert_eq!(value["tool"], json!("analyze"));
    assert_eq!(value["total"], json!(0));
    assert_eq!(value["cache_size"], json!(2));
}

#[test]
fn test_notifications_round_trip() {
    let n = Notification::progress("r", RequestStatus::Running);
    let text = serde_json::to_string(&n).unwrap();
    assert_eq!(serde_json::from_str::<Notification>(&text).unwrap(), n);
}
