/*!
 * Clients for the remote script generation service.
 *
 * - `http`: the real service, reached over HTTP with reqwest
 * - `mock`: in-process stand-in with scripted behaviours, used by tests and offline mode
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::ServiceError;
use crate::model::{Brief, ScriptDocument, ScriptLine};

pub mod http;
pub mod mock;

/// Request body for refining a single script line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefineRequest {
    /// Current text of the line being refined
    pub script: String,
    /// The user's feedback for that line
    pub feedback: String,
    /// Opaque context describing the original brief, passed through untouched
    pub original_inputs: Option<String>,
}

/// Response body of the refinement endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefineResponse {
    pub lines: Vec<ScriptLine>,
}

impl RefineResponse {
    /// The replacement line; only the first returned line is used
    pub fn into_replacement(self) -> Option<ScriptLine> {
        self.lines.into_iter().next()
    }
}

/// Common interface for anything that can generate and refine scripts
///
/// Implementations must be shareable across tasks since the intake controller
/// and the result session hold the same service behind an `Arc`.
#[async_trait]
pub trait ScriptService: Send + Sync + Debug {
    /// Generate a script and art direction for a brief
    async fn generate(&self, brief: &Brief) -> Result<ScriptDocument, ServiceError>;

    /// Rewrite one line according to the user's feedback
    async fn refine(&self, request: &RefineRequest) -> Result<RefineResponse, ServiceError>;

    /// Check that the service is reachable and healthy
    async fn test_connection(&self) -> Result<(), ServiceError>;
}
