/*!
 * The result session: owner of one generated document for the lifetime of a results view.
 *
 * This module handles:
 * - Decoding the handoff into a document, or into an empty/error view
 * - Line selection and feedback capture
 * - Single-flight refinement of one line, committed at the index captured when
 *   the refinement started
 * - Dropping late responses once the session has been disposed
 */

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use crate::errors::{DeserializationError, RefinementError, SessionError};
use crate::handoff::{self, Handoff, NavigationParams};
use crate::model::{ArtDirection, ScriptDocument, ScriptLine};
use crate::providers::{RefineRequest, ScriptService};
use crate::request_state::{InFlightGuard, RequestState};

use super::selection::Selection;

/// What the results view displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionView {
    /// No payload was handed over
    NoData,
    /// A payload was handed over but could not be decoded
    Error(String),
    /// A document is loaded
    Ready(ScriptDocument),
}

impl SessionView {
    fn from_decode(result: Result<ScriptDocument, DeserializationError>) -> Self {
        match result {
            Ok(document) => Self::Ready(document),
            Err(DeserializationError::Missing) => Self::NoData,
            Err(e) => Self::Error(e.to_string()),
        }
    }

    pub fn document(&self) -> Option<&ScriptDocument> {
        match self {
            Self::Ready(document) => Some(document),
            _ => None,
        }
    }
}

/// Why `refine_selected` did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotLoaded,
    NoSelection,
    EmptyFeedback,
    /// Another refinement is still outstanding
    Busy,
    Disposed,
}

/// Result of a call to `refine_selected`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefineOutcome {
    /// The line at `index` was replaced by `line`
    Applied { index: usize, line: ScriptLine },
    /// The service call failed; nothing changed
    Failed(RefinementError),
    /// Preconditions were not met; no request was sent
    Skipped(SkipReason),
    /// The session was disposed while the request was outstanding
    Discarded,
}

#[derive(Debug)]
struct SessionState {
    view: SessionView,
    original_inputs: Option<String>,
    selection: Selection,
    refine: RequestState,
}

#[derive(Debug)]
struct SessionInner {
    id: Uuid,
    service: Arc<dyn ScriptService>,
    state: Mutex<SessionState>,
    disposed: AtomicBool,
}

/// Handle to a result session. Clones share the same session.
#[derive(Debug, Clone)]
pub struct ResultSession {
    inner: Arc<SessionInner>,
}

impl ResultSession {
    // =========================================================================
    // Loading
    // =========================================================================

    /// Open a session from navigation parameters.
    ///
    /// Never fails: a missing payload yields `SessionView::NoData` and an
    /// undecodable one yields `SessionView::Error`.
    pub fn load(service: Arc<dyn ScriptService>, params: &NavigationParams) -> Self {
        let view = SessionView::from_decode(handoff::decode_document(params));
        Self::new(service, view, params.inputs.clone())
    }

    /// Open a session directly from a typed handoff
    pub fn from_handoff(service: Arc<dyn ScriptService>, handoff: Handoff) -> Self {
        Self::new(service, SessionView::Ready(handoff.document), handoff.original_inputs)
    }

    fn new(service: Arc<dyn ScriptService>, view: SessionView, original_inputs: Option<String>) -> Self {
        let id = Uuid::new_v4();
        match &view {
            SessionView::Ready(document) => {
                info!("Session {} opened with {} script lines", short_id(&id), document.line_count());
            }
            SessionView::NoData => warn!("Session {} opened without script data", short_id(&id)),
            SessionView::Error(message) => error!("Session {} failed to load: {}", short_id(&id), message),
        }

        Self {
            inner: Arc::new(SessionInner {
                id,
                service,
                state: Mutex::new(SessionState {
                    view,
                    original_inputs,
                    selection: Selection::None,
                    refine: RequestState::Idle,
                }),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    // =========================================================================
    // Display accessors
    // =========================================================================

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn view(&self) -> SessionView {
        self.inner.state.lock().view.clone()
    }

    /// Snapshot of the current document
    pub fn document(&self) -> Option<ScriptDocument> {
        self.inner.state.lock().view.document().cloned()
    }

    pub fn art_direction(&self) -> Option<ArtDirection> {
        self.inner.state.lock().view.document().map(|d| d.art_direction.clone())
    }

    pub fn selection(&self) -> Selection {
        self.inner.state.lock().selection.clone()
    }

    pub fn original_inputs(&self) -> Option<String> {
        self.inner.state.lock().original_inputs.clone()
    }

    /// Message to show the user: the last refinement failure, or the load error
    pub fn last_error(&self) -> Option<String> {
        let state = self.inner.state.lock();
        if let Some(reason) = state.refine.failure() {
            return Some(reason.to_string());
        }
        match &state.view {
            SessionView::Error(message) => Some(message.clone()),
            _ => None,
        }
    }

    pub fn is_refining(&self) -> bool {
        self.inner.state.lock().refine.is_in_flight()
    }

    /// Whether the refine action should be enabled
    pub fn can_refine(&self) -> bool {
        let state = self.inner.state.lock();
        !self.is_disposed() && !state.refine.is_in_flight() && state.selection.ready_for_refine().is_some()
    }

    pub fn refine_label(&self) -> &'static str {
        if self.is_refining() { "Refining..." } else { "Refine Line" }
    }

    /// Handoff for the current document, e.g. to reopen the refined result
    pub fn handoff(&self) -> Option<Handoff> {
        let state = self.inner.state.lock();
        state
            .view
            .document()
            .map(|document| Handoff::new(document.clone(), state.original_inputs.clone()))
    }

    // =========================================================================
    // Selection and feedback
    // =========================================================================

    /// Toggle selection of the line at `index`; any typed feedback is cleared
    pub fn select_line(&self, index: usize) -> Result<Selection, SessionError> {
        if self.is_disposed() {
            return Err(SessionError::Disposed);
        }

        let mut state = self.inner.state.lock();
        let len = state.view.document().ok_or(SessionError::NotLoaded)?.line_count();
        if index >= len {
            return Err(SessionError::LineOutOfRange { index, len });
        }

        state.selection.toggle(index);
        debug!("Session {} selection is now {:?}", short_id(&self.inner.id), state.selection.index());
        Ok(state.selection.clone())
    }

    /// Store feedback for the selected line. Returns false, and stores nothing,
    /// when no line is selected.
    pub fn set_feedback(&self, text: impl Into<String>) -> bool {
        if self.is_disposed() {
            return false;
        }

        let stored = self.inner.state.lock().selection.set_feedback(text);
        if !stored {
            warn!("Ignoring feedback: no script line is selected");
        }
        stored
    }

    // =========================================================================
    // Refinement
    // =========================================================================

    /// Ask the service to rewrite the selected line using the current feedback.
    ///
    /// The line index and feedback are captured when this is called; the
    /// replacement is committed at that index even if the user selects another
    /// line while the request is outstanding.
    pub async fn refine_selected(&self) -> RefineOutcome {
        let (index, request) = {
            let mut state = self.inner.state.lock();
            match self.begin_refine(&mut state) {
                Ok(captured) => captured,
                Err(reason) => {
                    debug!("Session {} skipped refinement: {:?}", short_id(&self.inner.id), reason);
                    return RefineOutcome::Skipped(reason);
                }
            }
        };

        info!("Refining line {} with feedback: {}", index + 1, request.feedback);
        let guard = InFlightGuard::new(&self.inner.state, refine_request_state, REFINE_CANCELLED);
        let result = self.inner.service.refine(&request).await;
        guard.disarm();

        if self.is_disposed() {
            info!("Session {} was closed, discarding refinement of line {}", short_id(&self.inner.id), index + 1);
            return RefineOutcome::Discarded;
        }

        let replacement = result
            .map_err(RefinementError::from)
            .and_then(|response| response.into_replacement().ok_or(RefinementError::EmptyResponse));

        let mut state = self.inner.state.lock();
        match replacement {
            Ok(line) => {
                let committed = match &mut state.view {
                    SessionView::Ready(document) => document.replace_line(index, line.clone()).is_ok(),
                    _ => false,
                };
                // The view and line count are fixed once loaded
                debug_assert!(committed, "line {} vanished while refining", index);
                if !committed {
                    let error = RefinementError::LineUnavailable { line: index + 1 };
                    state.refine.fail(error.to_string());
                    return RefineOutcome::Failed(error);
                }

                state.selection.clear();
                state.refine.succeed();
                info!("Line {} refined", index + 1);
                RefineOutcome::Applied { index, line }
            }
            Err(error) => {
                error!("Refinement of line {} failed: {}", index + 1, error);
                state.refine.fail(error.to_string());
                RefineOutcome::Failed(error)
            }
        }
    }

    /// Check preconditions, capture the request and enter the in-flight state
    fn begin_refine(&self, state: &mut SessionState) -> Result<(usize, RefineRequest), SkipReason> {
        if self.is_disposed() {
            return Err(SkipReason::Disposed);
        }
        let document = state.view.document().ok_or(SkipReason::NotLoaded)?;
        if state.refine.is_in_flight() {
            return Err(SkipReason::Busy);
        }
        let (index, feedback) = match &state.selection {
            Selection::None => return Err(SkipReason::NoSelection),
            selection => selection.ready_for_refine().ok_or(SkipReason::EmptyFeedback)?,
        };
        let line = document.line(index).ok_or(SkipReason::NoSelection)?;

        let request = RefineRequest {
            script: line.text.clone(),
            feedback: feedback.to_string(),
            original_inputs: state.original_inputs.clone(),
        };
        state.refine.begin().map_err(|_| SkipReason::Busy)?;
        Ok((index, request))
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Tear the session down. Responses that arrive afterwards are discarded.
    pub fn dispose(&self) {
        if !self.inner.disposed.swap(true, Ordering::SeqCst) {
            debug!("Session {} disposed", short_id(&self.inner.id));
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }
}

const REFINE_CANCELLED: &str = "Refinement was cancelled before the service answered";

fn refine_request_state(state: &mut SessionState) -> &mut RequestState {
    &mut state.refine
}

fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}
