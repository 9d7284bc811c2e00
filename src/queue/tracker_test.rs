// ABOUTME: Tests for the request tracker promotion discipline.
// ABOUTME: Covers single-flight promotion, cancellation and opt-in concurrency.

use serde_json::json;

use super::request::{Priority, Request};
use super::tracker::{CancelOutcome, RequestTracker};
use crate::error::AgentError;

fn request(id: &str) -> Request {
    Request::new(json!({"id": id})).with_id(id)
}

#[test]
fn test_single_flight_promotes_one() {
    let mut tracker = RequestTracker::new(1);
    tracker.enqueue(request("first")).unwrap();
    tracker.enqueue(request("second")).unwrap();

    let promoted = tracker.promote().unwrap();
    assert_eq!(promoted.id, "first");
    assert!(tracker.promote().is_none());
    assert_eq!(tracker.active_count(), 1);
    assert_eq!(tracker.queue_len(), 1);

    tracker.complete("first").unwrap();
    assert_eq!(tracker.promote().unwrap().id, "second");
}

#[test]
fn test_promote_respects_priority() {
    let mut tracker = RequestTracker::new(1);
    tracker.enqueue(request("low").with_priority(Priority::Low)).unwrap();
    tracker.enqueue(request("high").with_priority(Priority::High)).unwrap();

    assert_eq!(tracker.promote().unwrap().id, "high");
}

#[test]
fn test_cancel_queued_removes_it() {
    let mut tracker = RequestTracker::new(1);
    tracker.enqueue(request("running")).unwrap();
    tracker.promote().unwrap();
    tracker.enqueue(request("waiting")).unwrap();

    match tracker.cancel("waiting") {
        CancelOutcome::Dequeued(r) => assert_eq!(r.id, "waiting"),
        other => panic!("Expected Dequeued, got {:?}", other),
    }

    tracker.complete("running").unwrap();
    assert!(tracker.promote().is_none());
    assert!(tracker.is_idle());
}

#[test]
fn test_cancel_active_flags_it() {
    let mut tracker = RequestTracker::new(1);
    tracker.enqueue(request("running")).unwrap();
    tracker.promote().unwrap();

    assert!(matches!(tracker.cancel("running"), CancelOutcome::Flagged));
    assert!(tracker.active().get("running").unwrap().cancelled);

    let finished = tracker.complete("running").unwrap();
    assert!(finished.cancelled);
}

#[test]
fn test_cancel_unknown() {
    let mut tracker = RequestTracker::new(1);
    assert!(matches!(tracker.cancel("ghost"), CancelOutcome::NotFound));
}

#[test]
fn test_enqueue_rejects_id_in_flight() {
    let mut tracker = RequestTracker::new(1);
    tracker.enqueue(request("dup")).unwrap();
    tracker.promote().unwrap();

    let err = tracker.enqueue(request("dup")).unwrap_err();
    assert_eq!(err, AgentError::DuplicateRequest("dup".into()));
}

#[test]
fn test_contains_queued_and_active() {
    let mut tracker = RequestTracker::new(1);
    tracker.enqueue(request("a")).unwrap();
    tracker.enqueue(request("b")).unwrap();
    tracker.promote().unwrap();

    assert!(tracker.contains("a"));
    assert!(tracker.contains("b"));
    assert!(!tracker.contains("c"));

    tracker.complete("a");
    assert!(!tracker.contains("a"));
}

#[test]
fn test_higher_concurrency_opt_in() {
    let mut tracker = RequestTracker::new(2);
    for id in ["a", "b", "c"] {
        tracker.enqueue(request(id)).unwrap();
    }

    assert_eq!(tracker.promote().unwrap().id, "a");
    assert_eq!(tracker.promote().unwrap().id, "b");
    assert!(tracker.promote().is_none());
    assert_eq!(tracker.active().max_concurrent(), 2);
}
