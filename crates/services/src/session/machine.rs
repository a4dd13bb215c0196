use chrono::{DateTime, Utc};
use std::fmt;

use recall_core::model::{Card, CardId, ReviewRating};

use crate::error::SessionError;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Where a session is between two user inputs.
///
/// One tagged state instead of scattered booleans: rating while unflipped
/// or double-submitting are unrepresentable transitions, not runtime
/// accidents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewPhase {
    /// Showing a card; `flipped` tells which side.
    Ready { flipped: bool },
    /// A rating is on the wire; inputs are inert until it resolves.
    Submitting,
    /// Every card has been rated (or there were none). Terminal until an
    /// external reset builds a new session from a fresh fetch.
    Complete,
}

/// How an in-flight submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The server accepted the rating.
    Confirmed {
        rating: ReviewRating,
        at: DateTime<Utc>,
    },
    /// The call failed; the card stays current and flipped for a retry.
    Failed,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Pure per-session state machine for the review flow.
///
/// Owns the card list fetched once at session start, the position cursor,
/// and the counters. All transitions are synchronous; the async mutation
/// call happens between `begin_submission` and `resolve_submission`, which
/// is also what makes the in-flight guard airtight: while the phase is
/// `Submitting`, every other input is rejected or inert.
///
/// ```text
/// Ready { flipped } ── begin ──▶ Submitting ── confirmed ──▶ Ready { flipped: false } | Complete
///        ▲                           │
///        └──────── failed ───────────┘
/// ```
pub struct ReviewSession {
    cards: Vec<Card>,
    position: usize,
    reviewed: u32,
    correct: u32,
    phase: ReviewPhase,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl ReviewSession {
    /// Build a session over an already-fetched due list.
    ///
    /// An empty list is the "all caught up" case, not an error: the session
    /// starts complete with zero counters.
    #[must_use]
    pub fn new(cards: Vec<Card>, started_at: DateTime<Utc>) -> Self {
        let phase = if cards.is_empty() {
            ReviewPhase::Complete
        } else {
            ReviewPhase::Ready { flipped: false }
        };
        let completed_at = cards.is_empty().then_some(started_at);
        Self {
            cards,
            position: 0,
            reviewed: 0,
            correct: 0,
            phase,
            started_at,
            completed_at,
        }
    }

    #[must_use]
    pub fn phase(&self) -> ReviewPhase {
        self.phase
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.phase, ReviewPhase::Complete)
    }

    #[must_use]
    pub fn is_flipped(&self) -> bool {
        matches!(self.phase, ReviewPhase::Ready { flipped: true })
    }

    #[must_use]
    pub fn current_card(&self) -> Option<&Card> {
        if self.is_complete() {
            return None;
        }
        self.cards.get(self.position)
    }

    /// Zero-based position of the current card.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn reviewed(&self) -> u32 {
        self.reviewed
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Fraction of reviewed cards answered correctly, in `[0, 1]`.
    ///
    /// Defined as 0 before anything has been reviewed; never a division
    /// by zero.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.reviewed == 0 {
            return 0.0;
        }
        f64::from(self.correct) / f64::from(self.reviewed)
    }

    /// Toggle the flip state of the current card.
    ///
    /// A no-op while submitting or complete; flipping is never an error.
    pub fn flip(&mut self) {
        if let ReviewPhase::Ready { flipped } = self.phase {
            self.phase = ReviewPhase::Ready { flipped: !flipped };
        }
    }

    /// Claim the in-flight slot for a rating submission.
    ///
    /// Returns the id of the card being rated; the caller performs the
    /// network call and reports back via `resolve_submission`.
    ///
    /// # Errors
    ///
    /// - `SessionError::Completed` after the last card.
    /// - `SessionError::NotFlipped` before the answer has been revealed.
    /// - `SessionError::Busy` while another submission is in flight.
    pub fn begin_submission(&mut self) -> Result<CardId, SessionError> {
        match self.phase {
            ReviewPhase::Complete => Err(SessionError::Completed),
            ReviewPhase::Submitting => Err(SessionError::Busy),
            ReviewPhase::Ready { flipped: false } => Err(SessionError::NotFlipped),
            ReviewPhase::Ready { flipped: true } => {
                let card = self
                    .cards
                    .get(self.position)
                    .ok_or(SessionError::Completed)?;
                let id = card.id();
                self.phase = ReviewPhase::Submitting;
                Ok(id)
            }
        }
    }

    /// Apply the result of the in-flight submission.
    ///
    /// Counters and the cursor only move on a confirmed outcome, so a
    /// failed call leaves the session exactly where it was (flipped, same
    /// card) and the user retries by submitting again.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoSubmissionInFlight` when nothing was begun.
    pub fn resolve_submission(&mut self, outcome: SubmissionOutcome) -> Result<(), SessionError> {
        if self.phase != ReviewPhase::Submitting {
            return Err(SessionError::NoSubmissionInFlight);
        }

        match outcome {
            SubmissionOutcome::Failed => {
                self.phase = ReviewPhase::Ready { flipped: true };
            }
            SubmissionOutcome::Confirmed { rating, at } => {
                self.reviewed += 1;
                if rating.is_passing() {
                    self.correct += 1;
                }
                self.position += 1;
                if self.position >= self.cards.len() {
                    self.phase = ReviewPhase::Complete;
                    self.completed_at = Some(at);
                } else {
                    self.phase = ReviewPhase::Ready { flipped: false };
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ReviewSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewSession")
            .field("cards_len", &self.cards.len())
            .field("position", &self.position)
            .field("reviewed", &self.reviewed)
            .field("correct", &self.correct)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::model::CardId;
    use recall_core::time::fixed_now;

    fn build_card(id: u64) -> Card {
        Card::new(CardId::new(id), format!("Q{id}"), format!("A{id}"), None).unwrap()
    }

    fn session_with(count: u64) -> ReviewSession {
        let cards = (1..=count).map(build_card).collect();
        ReviewSession::new(cards, fixed_now())
    }

    fn confirmed(rating: ReviewRating) -> SubmissionOutcome {
        SubmissionOutcome::Confirmed {
            rating,
            at: fixed_now(),
        }
    }

    #[test]
    fn empty_list_starts_complete_with_zero_counters() {
        let session = session_with(0);
        assert!(session.is_complete());
        assert_eq!(session.reviewed(), 0);
        assert_eq!(session.correct(), 0);
        assert_eq!(session.accuracy(), 0.0);
        assert!(session.current_card().is_none());
    }

    #[test]
    fn rating_before_flip_is_rejected_without_state_change() {
        let mut session = session_with(2);
        let err = session.begin_submission().unwrap_err();
        assert!(matches!(err, SessionError::NotFlipped));
        assert_eq!(session.position(), 0);
        assert_eq!(session.reviewed(), 0);
        assert_eq!(session.phase(), ReviewPhase::Ready { flipped: false });
    }

    #[test]
    fn second_submission_while_in_flight_is_busy() {
        let mut session = session_with(2);
        session.flip();
        session.begin_submission().unwrap();

        let err = session.begin_submission().unwrap_err();
        assert!(matches!(err, SessionError::Busy));
        assert_eq!(session.phase(), ReviewPhase::Submitting);
    }

    #[test]
    fn flip_is_inert_while_submitting() {
        let mut session = session_with(1);
        session.flip();
        session.begin_submission().unwrap();
        session.flip();
        assert_eq!(session.phase(), ReviewPhase::Submitting);
    }

    #[test]
    fn flip_toggles_both_ways() {
        let mut session = session_with(1);
        assert!(!session.is_flipped());
        session.flip();
        assert!(session.is_flipped());
        session.flip();
        assert!(!session.is_flipped());
    }

    #[test]
    fn confirmed_submission_advances_and_resets_flip() {
        let mut session = session_with(2);
        session.flip();
        let id = session.begin_submission().unwrap();
        assert_eq!(id, CardId::new(1));

        session.resolve_submission(confirmed(ReviewRating::Good)).unwrap();
        assert_eq!(session.position(), 1);
        assert_eq!(session.reviewed(), 1);
        assert_eq!(session.correct(), 1);
        assert_eq!(session.phase(), ReviewPhase::Ready { flipped: false });
    }

    #[test]
    fn failed_submission_leaves_everything_for_retry() {
        let mut session = session_with(2);
        session.flip();
        session.begin_submission().unwrap();
        session.resolve_submission(SubmissionOutcome::Failed).unwrap();

        assert_eq!(session.position(), 0);
        assert_eq!(session.reviewed(), 0);
        assert_eq!(session.phase(), ReviewPhase::Ready { flipped: true });

        // Retry with the same rating succeeds and advances.
        session.begin_submission().unwrap();
        session.resolve_submission(confirmed(ReviewRating::Hard)).unwrap();
        assert_eq!(session.reviewed(), 1);
        assert_eq!(session.correct(), 1);
    }

    #[test]
    fn last_card_completes_the_session() {
        let mut session = session_with(2);
        session.flip();
        session.begin_submission().unwrap();
        session.resolve_submission(confirmed(ReviewRating::Good)).unwrap();

        session.flip();
        session.begin_submission().unwrap();
        session.resolve_submission(confirmed(ReviewRating::Again)).unwrap();

        assert!(session.is_complete());
        assert_eq!(session.reviewed(), 2);
        assert_eq!(session.correct(), 1);
        assert_eq!(session.completed_at(), Some(fixed_now()));
        assert!((session.accuracy() - 0.5).abs() < f64::EPSILON);

        let err = session.begin_submission().unwrap_err();
        assert!(matches!(err, SessionError::Completed));
    }

    #[test]
    fn counters_never_exceed_bounds() {
        let mut session = session_with(3);
        while !session.is_complete() {
            session.flip();
            session.begin_submission().unwrap();
            session.resolve_submission(confirmed(ReviewRating::Again)).unwrap();

            assert!(session.reviewed() as usize <= session.total_cards());
            assert!(session.correct() <= session.reviewed());
        }
        assert_eq!(session.correct(), 0);
        assert_eq!(session.accuracy(), 0.0);
    }

    #[test]
    fn resolve_without_begin_is_an_error() {
        let mut session = session_with(1);
        let err = session
            .resolve_submission(confirmed(ReviewRating::Good))
            .unwrap_err();
        assert!(matches!(err, SessionError::NoSubmissionInFlight));
    }
}
