/*!
 * Result session: ownership of a generated document and the refine workflow.
 *
 * This module provides:
 * - `Selection`: which line is selected and the feedback typed for it
 * - `ResultSession`: the document owner driving single-line refinement
 */

pub mod result_session;
pub mod selection;

// Re-export main types
pub use result_session::{RefineOutcome, ResultSession, SessionView, SkipReason};
pub use selection::Selection;
