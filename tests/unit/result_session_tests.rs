/*!
 * Tests for the result session: loading, selection and refinement
 */

use std::sync::Arc;
use std::time::Duration;
use adscribe::errors::{RefinementError, ServiceError};
use adscribe::handoff::{Handoff, NavigationParams};
use adscribe::model::{ScriptDocument, ScriptLine};
use adscribe::providers::mock::MockScriptService;
use adscribe::session::{RefineOutcome, ResultSession, Selection, SessionView, SkipReason};
use crate::common;

fn open(service: &MockScriptService, document: ScriptDocument) -> ResultSession {
    let handoff = Handoff::from_generation(document, &common::eco_brief());
    ResultSession::from_handoff(Arc::new(service.clone()), handoff)
}

fn five_line_document() -> ScriptDocument {
    let mut document = common::eco_document();
    document.script.lines = (1..=5)
        .map(|n| ScriptLine::new(format!("Line number {}", n), format!("Direction {}", n)))
        .collect();
    document
}

fn shout(request: &adscribe::providers::RefineRequest) -> ScriptLine {
    ScriptLine::new(request.feedback.to_uppercase(), "Bold")
}

/// Only the refined line changes and the script keeps its length
#[tokio::test]
async fn test_refine_shouldOnlyTouchTheSelectedLine() {
    let service = MockScriptService::working().with_refine_response(shout);
    let original = five_line_document();
    let session = open(&service, original.clone());

    session.select_line(3).unwrap();
    session.set_feedback("louder");
    let outcome = session.refine_selected().await;
    assert_eq!(
        outcome,
        RefineOutcome::Applied {
            index: 3,
            line: ScriptLine::new("LOUDER", "Bold"),
        }
    );

    let refined = session.document().unwrap();
    assert_eq!(refined.line_count(), original.line_count());
    for (index, (before, after)) in original.script.lines.iter().zip(&refined.script.lines).enumerate() {
        if index == 3 {
            assert_eq!(after.text, "LOUDER");
        } else {
            assert_eq!(before, after, "line {} changed", index);
        }
    }
    assert_eq!(refined.art_direction, original.art_direction);
    assert_eq!(refined.script.estimated_duration, original.script.estimated_duration);
}

/// A failed refinement changes nothing and keeps the user's input for a retry
#[tokio::test]
async fn test_refine_withServiceFailure_shouldPreserveState() {
    let service = MockScriptService::failing();
    let session = open(&service, common::eco_document());
    session.select_line(1).unwrap();
    session.set_feedback("make it punchier");

    let outcome = session.refine_selected().await;
    assert!(matches!(
        outcome,
        RefineOutcome::Failed(RefinementError::Service(ServiceError::ApiError { status_code: 500, .. }))
    ));

    assert_eq!(session.document(), Some(common::eco_document()));
    assert_eq!(
        session.selection(),
        Selection::Selected {
            index: 1,
            feedback: "make it punchier".to_string(),
        }
    );
    assert!(session.last_error().unwrap().starts_with("Failed to refine script"));
    assert!(session.can_refine());
    assert!(!session.is_refining());
}

/// After a failure the user can retry, and a success clears the error
#[tokio::test]
async fn test_refine_retryAfterFailure_shouldClearError() {
    // Every second request fails
    let service = MockScriptService::intermittent(2);
    let session = open(&service, common::eco_document());

    session.select_line(0).unwrap();
    session.set_feedback("shorter");
    assert!(matches!(session.refine_selected().await, RefineOutcome::Applied { index: 0, .. }));

    session.select_line(1).unwrap();
    session.set_feedback("warmer");
    assert!(matches!(session.refine_selected().await, RefineOutcome::Failed(_)));
    assert!(session.last_error().is_some());
    assert_eq!(session.selection().feedback(), "warmer");

    assert!(matches!(session.refine_selected().await, RefineOutcome::Applied { index: 1, .. }));
    assert_eq!(session.last_error(), None);
    assert_eq!(service.refine_calls(), 3);
}

/// A second refine while one is outstanding makes no network call
#[tokio::test]
async fn test_refine_whileInFlight_shouldBeSingleFlight() {
    let (service, gate) = MockScriptService::gated();
    let session = open(&service, common::eco_document());
    session.select_line(0).unwrap();
    session.set_feedback("punchier");

    let (first, second) = tokio::join!(session.refine_selected(), async {
        tokio::task::yield_now().await;
        assert!(session.is_refining());
        assert!(!session.can_refine());
        assert_eq!(session.refine_label(), "Refining...");
        let second = session.refine_selected().await;
        gate.notify_one();
        second
    });

    assert!(matches!(first, RefineOutcome::Applied { index: 0, .. }));
    assert_eq!(second, RefineOutcome::Skipped(SkipReason::Busy));
    assert_eq!(service.refine_calls(), 1);
}

/// A burst of refine requests results in exactly one service call
#[tokio::test]
async fn test_refine_burst_shouldSendOneRequest() {
    let service = MockScriptService::slow(20);
    let session = open(&service, common::eco_document());
    session.select_line(1).unwrap();
    session.set_feedback("punchier");

    let outcomes = futures::future::join_all((0..5).map(|_| session.refine_selected())).await;

    let applied = outcomes.iter().filter(|o| matches!(o, RefineOutcome::Applied { .. })).count();
    let busy = outcomes.iter().filter(|o| **o == RefineOutcome::Skipped(SkipReason::Busy)).count();
    assert_eq!((applied, busy), (1, 4));
    assert_eq!(service.refine_calls(), 1);
}

/// Changing the selection mid-flight does not redirect the response
#[tokio::test]
async fn test_refine_withSelectionChangedMidFlight_shouldCommitCapturedIndex() {
    let (service, gate) = MockScriptService::gated();
    let session = open(&service, common::eco_document());
    session.select_line(0).unwrap();
    session.set_feedback("punchier");

    let (outcome, _) = tokio::join!(session.refine_selected(), async {
        tokio::task::yield_now().await;
        session.select_line(1).unwrap();
        session.set_feedback("calmer");
        gate.notify_one();
    });

    assert!(matches!(outcome, RefineOutcome::Applied { index: 0, .. }));
    let document = session.document().unwrap();
    assert!(document.script.lines[0].text.contains("refined: punchier"));
    assert_eq!(document.script.lines[1], common::eco_document().script.lines[1]);
    assert_eq!(service.last_refine().unwrap().script, common::eco_document().script.lines[0].text);
}

/// A response that arrives after the view closed is dropped
#[tokio::test]
async fn test_refine_withDisposeMidFlight_shouldDiscardResponse() {
    let (service, gate) = MockScriptService::gated();
    let session = open(&service, common::eco_document());
    session.select_line(1).unwrap();
    session.set_feedback("punchier");

    let (outcome, _) = tokio::join!(session.refine_selected(), async {
        tokio::task::yield_now().await;
        session.dispose();
        gate.notify_one();
    });

    assert_eq!(outcome, RefineOutcome::Discarded);
    assert_eq!(session.document(), Some(common::eco_document()));
    assert_eq!(service.refine_calls(), 1);
}

/// A refine abandoned by its caller frees the session for another attempt
#[tokio::test]
async fn test_refine_abandonedByTimeout_shouldAllowRetry() {
    let (service, gate) = MockScriptService::gated();
    let session = open(&service, common::eco_document());
    session.select_line(1).unwrap();
    session.set_feedback("make it punchier");

    let timed_out = tokio::time::timeout(Duration::from_millis(20), session.refine_selected()).await;
    assert!(timed_out.is_err());
    assert!(!session.is_refining());
    assert!(session.can_refine());
    assert!(session.last_error().unwrap().contains("cancelled"));
    assert_eq!(session.document(), Some(common::eco_document()));

    gate.notify_one();
    let retried = session.refine_selected().await;
    assert!(matches!(retried, RefineOutcome::Applied { index: 1, .. }));
    assert_eq!(session.last_error(), None);
    assert_eq!(service.refine_calls(), 2);
}

/// Clones are handles to the same session
#[test]
fn test_clone_shouldShareState() {
    let session = open(&MockScriptService::working(), common::eco_document());
    let handle = session.clone();

    handle.select_line(1).unwrap();
    assert!(session.selection().is_selected(1));
    assert_eq!(session.id(), handle.id());

    handle.dispose();
    assert!(session.is_disposed());
}

/// Absent and malformed payloads give a defined state and never panic
#[tokio::test]
async fn test_load_withBadPayloads_shouldNotPanic() {
    let service = MockScriptService::working();
    let cases = [
        ("", true),
        ("/results", true),
        ("/results?data=", true),
        ("/results?data=null", false),
        ("/results?data=%5B%5D", false),
        ("/results?data=%7B%22script%22%3A1%7D", false),
        ("/results?data=%FF%FE", false),
    ];

    for (location, expect_no_data) in cases {
        let session = ResultSession::load(Arc::new(service.clone()), &NavigationParams::parse(location));
        match session.view() {
            SessionView::NoData => assert!(expect_no_data, "{:?} should be an error", location),
            SessionView::Error(_) => assert!(!expect_no_data, "{:?} should be empty", location),
            SessionView::Ready(_) => panic!("{:?} should not load", location),
        }
        assert_eq!(session.refine_selected().await, RefineOutcome::Skipped(SkipReason::NotLoaded));
        assert!(session.art_direction().is_none());
        assert!(session.handoff().is_none());
    }
    assert_eq!(service.refine_calls(), 0);
}

/// The opaque inputs reach the refine request untouched
#[tokio::test]
async fn test_load_shouldPassInputsThroughToRefine() {
    let service = MockScriptService::working();
    let handoff = Handoff::new(common::eco_document(), Some("whatever the form said".to_string()));
    let location = handoff.to_location("/results").unwrap();

    let session = ResultSession::load(Arc::new(service.clone()), &NavigationParams::parse(&location));
    assert_eq!(session.original_inputs().as_deref(), Some("whatever the form said"));

    session.select_line(0).unwrap();
    session.set_feedback("friendlier");
    session.refine_selected().await;
    assert_eq!(
        service.last_refine().unwrap().original_inputs.as_deref(),
        Some("whatever the form said")
    );
}

/// After a refinement the handoff carries the updated document
#[tokio::test]
async fn test_handoff_afterRefine_shouldCarryRefinedDocument() {
    let service = MockScriptService::working().with_refine_response(shout);
    let session = open(&service, common::eco_document());
    session.select_line(0).unwrap();
    session.set_feedback("hey");
    session.refine_selected().await;

    let handoff = session.handoff().unwrap();
    assert_eq!(handoff.document.script.lines[0].text, "HEY");
    assert_eq!(handoff.original_inputs, Some(common::eco_brief().to_context()));
}
