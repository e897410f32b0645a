/*!
 * End-to-end tests for the generate, handoff and refine workflow
 */

use anyhow::Result;
use std::sync::Arc;
use adscribe::app_config::Config;
use adscribe::app_controller::Controller;
use adscribe::handoff::NavigationParams;
use adscribe::intake::{IntakeController, IntakePhase};
use adscribe::model::BriefField;
use adscribe::providers::ScriptService;
use adscribe::providers::http::HttpScriptService;
use adscribe::providers::mock::MockScriptService;
use adscribe::session::{RefineOutcome, ResultSession, Selection, SessionView};
use crate::common;
use crate::common::fake_service::FakeScriptServer;

/// The eco-friendly cleaning brief from form to refined line
#[tokio::test]
async fn test_ecoBrief_fullWorkflow_shouldRefineOnlyLineOne() -> Result<()> {
    let service: Arc<dyn ScriptService> = Arc::new(MockScriptService::working());

    // Fill in the form and submit it
    let intake = IntakeController::new(Arc::clone(&service));
    let brief = common::eco_brief();
    for field in BriefField::ALL {
        intake.update_field(field, brief.field(field));
    }
    let handoff = intake.submit_draft().await?;
    assert_eq!(intake.phase(), IntakePhase::HandedOff);

    // Navigate to the results view
    let location = handoff.to_location(&Config::default().results_path)?;
    let session = ResultSession::load(Arc::clone(&service), &NavigationParams::parse(&location));
    let loaded = session.document().expect("document should load");
    assert_eq!(loaded.line_count(), 2);
    assert_eq!(loaded.script.estimated_duration, "30s");

    // Select line 1, give feedback and refine
    session.select_line(1)?;
    session.set_feedback("make it punchier");
    let outcome = session.refine_selected().await;
    assert!(matches!(outcome, RefineOutcome::Applied { index: 1, .. }));

    let refined = session.document().expect("document should still be loaded");
    assert_eq!(refined.line_count(), 2);
    assert_eq!(refined.script.lines[0], loaded.script.lines[0]);
    assert_ne!(refined.script.lines[1], loaded.script.lines[1]);
    assert!(refined.script.lines[1].text.contains("make it punchier"));
    assert_eq!(refined.art_direction, loaded.art_direction);
    assert_eq!(refined.script.estimated_duration, "30s");
    assert_eq!(session.selection(), Selection::None);
    Ok(())
}

/// The same workflow over HTTP against a local fake service
#[tokio::test]
async fn test_workflow_overHttp_shouldSendExpectedRequests() -> Result<()> {
    let server = FakeScriptServer::builder()
        .route("/generate-script", 200, common::eco_document_json())
        .route(
            "/refine-script",
            200,
            r#"{"lines":[{"text":"Harsh chemicals? Not in this house!","voice_direction":"Punchy"}]}"#,
        )
        .start()
        .await;

    let mut config = Config::default();
    config.service.endpoint = server.endpoint().to_string();
    let service: Arc<dyn ScriptService> = Arc::new(HttpScriptService::from_config(&config.service)?);
    let controller = Controller::with_service(config, service);

    let handoff = controller.generate(common::eco_brief()).await?;
    assert_eq!(handoff.document, common::eco_document());

    let session = controller.open(&controller.location_for(&handoff)?);
    let line = controller.refine_line(&session, 1, "make it punchier").await?;
    assert_eq!(line.text, "Harsh chemicals? Not in this house!");

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/generate-script");
    let sent_brief: serde_json::Value = serde_json::from_str(&requests[0].body)?;
    assert_eq!(sent_brief["niche"], "Eco-Friendly Cleaning Products");
    assert_eq!(sent_brief["audience"], "environmentally conscious homeowners");

    assert_eq!(requests[1].path, "/refine-script");
    let sent_refine: serde_json::Value = serde_json::from_str(&requests[1].body)?;
    assert_eq!(sent_refine["script"], "Tired of harsh chemicals in your home?");
    assert_eq!(sent_refine["feedback"], "make it punchier");
    assert_eq!(sent_refine["original_inputs"], common::eco_brief().to_context());
    Ok(())
}

/// A generation failure leaves the form usable and nothing is handed off
#[tokio::test]
async fn test_generationFailure_overHttp_shouldKeepFormEditable() -> Result<()> {
    let server = FakeScriptServer::builder()
        .route("/generate-script", 500, r#"{"detail":"model overloaded"}"#)
        .start()
        .await;

    let service = HttpScriptService::new(server.endpoint(), std::time::Duration::from_secs(5))?;
    let intake = IntakeController::new(Arc::new(service));

    let result = intake.submit(common::eco_brief()).await;
    assert!(result.is_err());
    let error = intake.error().expect("error should be shown");
    assert!(error.starts_with("Failed to generate script"));
    assert!(error.contains("model overloaded"));
    assert!(intake.can_submit());
    assert_eq!(intake.draft(), common::eco_brief());
    Ok(())
}

/// A location that was cut short shows the error state
#[tokio::test]
async fn test_truncatedLocation_shouldShowErrorState() -> Result<()> {
    let controller = Controller::with_service(Config::default(), Arc::new(MockScriptService::working()));
    let handoff = controller.generate(common::eco_brief()).await?;
    let location = controller.location_for(&handoff)?;

    let truncated = &location[..location.len() / 2];
    let session = controller.open(truncated);
    assert!(matches!(session.view(), SessionView::Error(_)));
    assert!(session.select_line(0).is_err());
    Ok(())
}
