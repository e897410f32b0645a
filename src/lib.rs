/*!
 * # adscribe - AI ad script generator client
 *
 * A Rust library for the client side of an AI ad script generator.
 *
 * ## Features
 *
 * - Brief intake with validation before anything is sent
 * - Script generation through a pluggable script service
 * - Handoff of the generated document to a results view through a URL query
 * - Single-line refinement driven by user feedback, one request at a time
 * - Late responses dropped once a results view has been closed
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `model`: Brief, script lines and art direction
 * - `intake`: The brief form and generation request
 * - `handoff`: Encoding and decoding of the results location
 * - `session`: The results view:
 *   - `session::result_session`: Document ownership and refinement
 *   - `session::selection`: Line selection and feedback
 * - `request_state`: Single-flight request lifecycle shared by both components
 * - `providers`: Script service implementations:
 *   - `providers::http`: HTTP client for the script service
 *   - `providers::mock`: In-memory service for offline use and tests
 * - `render`: Plain-text rendering of the results view
 * - `app_controller`: Main application controller and refine shell
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod handoff;
pub mod intake;
pub mod model;
pub mod providers;
pub mod render;
pub mod request_state;
pub mod session;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{
    AppError, DeserializationError, GenerationError, IntakeError, RefinementError, ServiceError, SessionError,
    ValidationError,
};
pub use handoff::{Handoff, NavigationParams};
pub use intake::{IntakeController, IntakePhase};
pub use model::{ArtDirection, Brief, BriefField, Script, ScriptDocument, ScriptLine, Typography};
pub use providers::{RefineRequest, RefineResponse, ScriptService};
pub use session::{RefineOutcome, ResultSession, Selection, SessionView, SkipReason};
