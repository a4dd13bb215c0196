//! Shared error types for the services crate.

use thiserror::Error;

use api::ApiError;

use crate::cache::Topic;

/// Errors emitted by the review-session orchestrator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session already completed")]
    Completed,
    #[error("cannot rate a card that has not been flipped")]
    NotFlipped,
    #[error("a submission is already in flight")]
    Busy,
    #[error("no submission in flight to resolve")]
    NoSubmissionInFlight,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Errors emitted by cached read operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QueryError {
    #[error("cached value for {topic:?} has an unexpected type")]
    TypeMismatch { topic: Topic },
    #[error(transparent)]
    Api(#[from] ApiError),
}
