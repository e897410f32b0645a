/*!
 * Error types for the adscribe application.
 *
 * Every failure is recovered at the component boundary and turned into a short
 * message for the user, so each enum here renders a human readable `Display`.
 * Nothing is retried automatically.
 */

use thiserror::Error;

use crate::model::BriefField;

/// Errors that can occur when talking to the remote script service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The request could not be sent or completed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// The response body did not have the expected shape
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// The service answered with a non-success status
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error body returned by the service
        message: String,
    },

    /// The service could not be reached or timed out
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// A required brief field was left empty
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    EmptyField(BriefField),
}

/// The generation request failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Failed to generate script: {0}")]
    Service(#[from] ServiceError),
}

/// The handoff payload could not be turned into a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeserializationError {
    /// No payload was present at all
    #[error("No script data available")]
    Missing,

    /// A payload was present but did not decode into a script document
    #[error("Failed to parse script data: {0}")]
    Malformed(String),
}

/// The refinement request failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefinementError {
    #[error("Failed to refine script: {0}")]
    Service(#[from] ServiceError),

    /// The service answered but returned no replacement line
    #[error("Failed to refine script: service returned no replacement line")]
    EmptyResponse,

    /// The refined line could not be put back into the script
    #[error("Failed to refine script: line {line} is no longer in the script")]
    LineUnavailable { line: usize },
}

/// Errors surfaced by the intake controller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntakeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// A generation request is already outstanding for this form
    #[error("A script is already being generated")]
    Busy,

    /// The form already handed its result off to a result session
    #[error("This brief has already been submitted")]
    HandedOff,
}

/// Errors surfaced by the result session for selection operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The session has no document to operate on
    #[error("No script data available")]
    NotLoaded,

    #[error("Line {index} does not exist (script has {len} lines)")]
    LineOutOfRange { index: usize, len: usize },

    /// The results view was torn down
    #[error("This results view has been closed")]
    Disposed,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Intake error: {0}")]
    Intake(#[from] IntakeError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Handoff error: {0}")]
    Deserialization(#[from] DeserializationError),

    #[error("Refinement error: {0}")]
    Refinement(#[from] RefinementError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
