/*!
 * Mock script service for tests and offline runs.
 *
 * This module provides a service that simulates different behaviours:
 * - `MockScriptService::working()` - Always succeeds
 * - `MockScriptService::failing()` - Always fails with an API error
 * - `MockScriptService::gated()` - Holds every request until released
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

use crate::errors::ServiceError;
use crate::model::{ArtDirection, Brief, Script, ScriptDocument, ScriptLine, Typography};
use crate::providers::{RefineRequest, RefineResponse, ScriptService};

/// Behaviour mode for the mock service
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails every Nth request (counted across generate and refine)
    Intermittent { fail_every: usize },
    /// Always fails with a 500 error
    Failing,
    /// Succeeds after a delay
    Slow { delay_ms: u64 },
    /// Refinement answers with no lines
    Empty,
    /// Waits for a release on the gate before succeeding
    Gated(Arc<Notify>),
}

/// Calls observed by a mock service; shared between clones
#[derive(Debug, Default)]
pub struct CallLog {
    generate_calls: AtomicUsize,
    refine_calls: AtomicUsize,
    last_brief: Mutex<Option<Brief>>,
    last_refine: Mutex<Option<RefineRequest>>,
}

/// In-process stand-in for the script service
#[derive(Debug, Clone)]
pub struct MockScriptService {
    behavior: MockBehavior,
    calls: Arc<CallLog>,
    document: ScriptDocument,
    refine_response: Option<fn(&RefineRequest) -> ScriptLine>,
}

impl MockScriptService {
    /// Create a mock with the given behaviour, answering with `sample_document()`
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(CallLog::default()),
            document: sample_document(),
            refine_response: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock whose requests wait until the returned gate is notified.
    /// Each `notify_one()` releases one request.
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        (Self::new(MockBehavior::Gated(Arc::clone(&gate))), gate)
    }

    /// Answer generation requests with this document
    pub fn with_document(mut self, document: ScriptDocument) -> Self {
        self.document = document;
        self
    }

    /// Build the replacement line from the refine request
    pub fn with_refine_response(mut self, generator: fn(&RefineRequest) -> ScriptLine) -> Self {
        self.refine_response = Some(generator);
        self
    }

    /// Number of generation requests received
    pub fn generate_calls(&self) -> usize {
        self.calls.generate_calls.load(Ordering::SeqCst)
    }

    /// Number of refinement requests received
    pub fn refine_calls(&self) -> usize {
        self.calls.refine_calls.load(Ordering::SeqCst)
    }

    /// The most recent brief sent for generation
    pub fn last_brief(&self) -> Option<Brief> {
        self.calls.last_brief.lock().clone()
    }

    /// The most recent refinement request
    pub fn last_refine(&self) -> Option<RefineRequest> {
        self.calls.last_refine.lock().clone()
    }

    /// Apply the configured behaviour. `count` is the zero-based request number.
    async fn behave(&self, count: usize) -> Result<(), ServiceError> {
        match &self.behavior {
            MockBehavior::Working | MockBehavior::Empty => Ok(()),
            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ServiceError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                    })
                } else {
                    Ok(())
                }
            }
            MockBehavior::Failing => Err(ServiceError::ApiError {
                status_code: 500,
                message: "Simulated service failure".to_string(),
            }),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                Ok(())
            }
            MockBehavior::Gated(gate) => {
                gate.notified().await;
                Ok(())
            }
        }
    }

    fn total_calls(&self) -> usize {
        self.generate_calls() + self.refine_calls()
    }
}

#[async_trait]
impl ScriptService for MockScriptService {
    async fn generate(&self, brief: &Brief) -> Result<ScriptDocument, ServiceError> {
        let count = self.total_calls();
        self.calls.generate_calls.fetch_add(1, Ordering::SeqCst);
        *self.calls.last_brief.lock() = Some(brief.clone());

        self.behave(count).await?;
        Ok(self.document.clone())
    }

    async fn refine(&self, request: &RefineRequest) -> Result<RefineResponse, ServiceError> {
        let count = self.total_calls();
        self.calls.refine_calls.fetch_add(1, Ordering::SeqCst);
        *self.calls.last_refine.lock() = Some(request.clone());

        self.behave(count).await?;

        if matches!(self.behavior, MockBehavior::Empty) {
            return Ok(RefineResponse { lines: Vec::new() });
        }

        let line = match self.refine_response {
            Some(generator) => generator(request),
            None => ScriptLine::new(
                format!("{} (refined: {})", request.script, request.feedback),
                "Energetic",
            ),
        };
        Ok(RefineResponse { lines: vec![line] })
    }

    async fn test_connection(&self) -> Result<(), ServiceError> {
        match self.behavior {
            MockBehavior::Failing => Err(ServiceError::ConnectionError("Simulated outage".to_string())),
            _ => Ok(()),
        }
    }
}

/// A small two-line document for the eco-friendly cleaning brief
pub fn sample_document() -> ScriptDocument {
    ScriptDocument {
        script: Script {
            lines: vec![
                ScriptLine::new(
                    "Tired of harsh chemicals in your home?",
                    "Concerned, conversational",
                ),
                ScriptLine::new(
                    "Switch to natural, biodegradable cleaning that works.",
                    "Warm and confident",
                ),
            ],
            estimated_duration: "30s".to_string(),
        },
        art_direction: ArtDirection {
            visual_style: "Bright, airy lifestyle photography".to_string(),
            color_palette: vec![
                "#2E7D32".to_string(),
                "#A5D6A7".to_string(),
                "#FFFFFF".to_string(),
            ],
            typography: Typography {
                headings: "Montserrat Bold".to_string(),
                body: "Open Sans".to_string(),
            },
            key_elements: vec![
                "Plant-based ingredients".to_string(),
                "Sunlit kitchen".to_string(),
            ],
            layout: "Product centered with text overlay at the bottom".to_string(),
        },
    }
}
