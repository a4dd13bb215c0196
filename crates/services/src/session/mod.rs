mod machine;
mod workflow;

// Public API of the review-session subsystem.
pub use crate::error::SessionError;
pub use machine::{ReviewPhase, ReviewSession, SubmissionOutcome};
pub use workflow::{ReviewWorkflow, SubmitResult};
