#![forbid(unsafe_code)]

pub mod cache;
pub mod error;
pub mod invalidate;
pub mod queries;
pub mod session;

pub use recall_core::Clock;

pub use cache::{PollTask, QueryCache, QueryPolicy, Topic};
pub use error::{QueryError, SessionError};
pub use invalidate::{InvalidateOptions, invalidate_progress};
pub use queries::Queries;
pub use session::{ReviewPhase, ReviewSession, ReviewWorkflow, SubmissionOutcome, SubmitResult};
