use std::sync::Arc;

use api::StudyApi;
use recall_core::Clock;
use recall_core::model::{ReviewAck, ReviewRating};

use crate::cache::Topic;
use crate::error::SessionError;
use crate::invalidate::{InvalidateOptions, invalidate_progress};
use crate::queries::Queries;
use crate::session::machine::{ReviewSession, SubmissionOutcome};

/// Result of submitting one rating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResult {
    pub ack: ReviewAck,
    pub is_complete: bool,
}

/// Orchestrates session start and rated answering against the remote API.
///
/// The pure state machine lives in `ReviewSession`; this service wires it
/// to the network and to the cache-consistency contract: every confirmed
/// rating stales the due list, and the transition into `Complete` sweeps
/// the aggregate-progress topics so dashboards refetch.
#[derive(Clone)]
pub struct ReviewWorkflow {
    clock: Clock,
    api: Arc<dyn StudyApi>,
    queries: Queries,
    include_today_plan: bool,
}

impl ReviewWorkflow {
    #[must_use]
    pub fn new(clock: Clock, api: Arc<dyn StudyApi>, queries: Queries) -> Self {
        Self {
            clock,
            api,
            queries,
            include_today_plan: false,
        }
    }

    /// Also invalidate the today-plan topic when sessions complete.
    #[must_use]
    pub fn with_today_plan(mut self, include: bool) -> Self {
        self.include_today_plan = include;
        self
    }

    /// Start a new session over the current due list.
    ///
    /// Reads through the query cache; an empty list yields a session that
    /// is complete from the start ("all caught up"), not an error.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Query` when the due-card fetch fails. No
    /// partial session is produced in that case.
    pub async fn start(&self, limit: usize) -> Result<ReviewSession, SessionError> {
        let cards = self.queries.due_cards(limit).await?;
        Ok(ReviewSession::new(cards.as_ref().clone(), self.clock.now()))
    }

    /// Submit a rating for the current card and advance the session.
    ///
    /// The machine's in-flight guard means a second call while one is
    /// outstanding gets `SessionError::Busy` and produces no network call.
    /// On failure the session stays on the same card, flipped, ready for a
    /// manual retry; the already-sent request is never cancelled.
    ///
    /// # Errors
    ///
    /// Returns the machine's guard errors (`NotFlipped`, `Busy`,
    /// `Completed`) or `SessionError::Api` when the mutation fails.
    pub async fn submit(
        &self,
        session: &mut ReviewSession,
        rating: ReviewRating,
    ) -> Result<SubmitResult, SessionError> {
        let card_id = session.begin_submission()?;

        match self.api.submit_review(card_id, rating).await {
            Ok(ack) => {
                session.resolve_submission(SubmissionOutcome::Confirmed {
                    rating,
                    at: self.clock.now(),
                })?;

                // The server-side schedule moved; the cached due list no
                // longer reflects it.
                self.queries.cache().invalidate(Topic::DueCards);

                if session.is_complete() {
                    invalidate_progress(
                        self.queries.cache(),
                        InvalidateOptions {
                            include_today_plan: self.include_today_plan,
                        },
                    );
                }

                Ok(SubmitResult {
                    ack,
                    is_complete: session.is_complete(),
                })
            }
            Err(err) => {
                session.resolve_submission(SubmissionOutcome::Failed)?;
                Err(SessionError::Api(err))
            }
        }
    }
}
