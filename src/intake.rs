/*!
 * Intake controller: the brief form and the generation request.
 *
 * The controller validates the brief before anything is sent, allows one
 * generation request at a time, and on success produces a `Handoff` for the
 * result session. After a successful handoff the controller is finished and
 * rejects further submissions.
 */

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::errors::{GenerationError, IntakeError};
use crate::handoff::Handoff;
use crate::model::{Brief, BriefField};
use crate::providers::ScriptService;
use crate::request_state::{InFlightGuard, RequestState};

/// Where the form is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakePhase {
    /// Editable, possibly showing the error of the last attempt
    Idle { error: Option<String> },
    /// A generation request is outstanding
    Submitting,
    /// The result was handed to a result session; terminal
    HandedOff,
}

#[derive(Debug, Default)]
struct IntakeState {
    draft: Brief,
    request: RequestState,
    validation_error: Option<String>,
}

impl IntakeState {
    fn phase(&self) -> IntakePhase {
        match &self.request {
            RequestState::InFlight => IntakePhase::Submitting,
            RequestState::Succeeded => IntakePhase::HandedOff,
            RequestState::Failed(reason) => IntakePhase::Idle {
                error: self.validation_error.clone().or_else(|| Some(reason.clone())),
            },
            RequestState::Idle => IntakePhase::Idle {
                error: self.validation_error.clone(),
            },
        }
    }
}

const GENERATION_CANCELLED: &str = "Script generation was cancelled before the service answered";

fn generation_request_state(state: &mut IntakeState) -> &mut RequestState {
    &mut state.request
}

/// Controller for one instance of the brief form
#[derive(Debug)]
pub struct IntakeController {
    service: Arc<dyn ScriptService>,
    state: Mutex<IntakeState>,
}

impl IntakeController {
    pub fn new(service: Arc<dyn ScriptService>) -> Self {
        Self {
            service,
            state: Mutex::new(IntakeState::default()),
        }
    }

    /// Current contents of the form
    pub fn draft(&self) -> Brief {
        self.state.lock().draft.clone()
    }

    /// Edit one form field. Ignored once the result has been handed off.
    pub fn update_field(&self, field: BriefField, value: impl Into<String>) -> bool {
        let mut state = self.state.lock();
        if state.phase() == IntakePhase::HandedOff {
            warn!("Ignoring edit of {}: brief already submitted", field);
            return false;
        }
        state.draft.set_field(field, value);
        true
    }

    pub fn phase(&self) -> IntakePhase {
        self.state.lock().phase()
    }

    /// Error message to show under the form, if any
    pub fn error(&self) -> Option<String> {
        match self.phase() {
            IntakePhase::Idle { error } => error,
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.state.lock().request.is_in_flight()
    }

    /// Whether the submit button should be enabled
    pub fn can_submit(&self) -> bool {
        matches!(self.phase(), IntakePhase::Idle { .. })
    }

    /// Submit button label; doubles as the in-progress indicator
    pub fn submit_label(&self) -> &'static str {
        if self.is_submitting() { "Generating..." } else { "Generate Script" }
    }

    /// Submit whatever is currently in the form
    pub async fn submit_draft(&self) -> Result<Handoff, IntakeError> {
        let brief = self.draft();
        self.submit(brief).await
    }

    /// Validate the brief, request a script and hand the result off.
    ///
    /// No request is sent when the brief is incomplete or another submission is
    /// outstanding. A failure leaves the form as it was so the user can retry.
    pub async fn submit(&self, brief: Brief) -> Result<Handoff, IntakeError> {
        {
            let mut state = self.state.lock();
            match state.phase() {
                IntakePhase::HandedOff => return Err(IntakeError::HandedOff),
                IntakePhase::Submitting => {
                    warn!("Ignoring submission: a script is already being generated");
                    return Err(IntakeError::Busy);
                }
                IntakePhase::Idle { .. } => {}
            }

            state.draft = brief.clone();
            if let Err(e) = brief.validate() {
                debug!("Brief rejected before dispatch: {}", e);
                state.validation_error = Some(e.to_string());
                return Err(e.into());
            }

            state.validation_error = None;
            state.request.begin().map_err(|_| IntakeError::Busy)?;
        }

        info!("Generating script for niche '{}' targeting '{}'", brief.niche, brief.audience);
        let guard = InFlightGuard::new(&self.state, generation_request_state, GENERATION_CANCELLED);
        let result = self.service.generate(&brief).await;
        guard.disarm();

        let mut state = self.state.lock();
        match result {
            Ok(document) => {
                state.request.succeed();
                info!(
                    "Script generated: {} lines, estimated duration {}",
                    document.line_count(),
                    document.script.estimated_duration
                );
                Ok(Handoff::from_generation(document, &brief))
            }
            Err(e) => {
                let error = GenerationError::from(e);
                error!("{}", error);
                state.request.fail(error.to_string());
                Err(error.into())
            }
        }
    }
}
