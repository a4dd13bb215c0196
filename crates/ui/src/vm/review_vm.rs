use chrono::{DateTime, Utc};
use keyboard_types::{Code, Key};

use recall_core::model::ReviewRating;
use services::{ReviewPhase, ReviewSession, ReviewWorkflow, SessionError};

use crate::views::ViewError;

/// Cards requested per session.
const SESSION_LIMIT: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewIntent {
    Flip,
    Rate(ReviewRating),
    ToggleHelp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewOutcome {
    Continue,
    Completed,
    /// The input was rejected by a guard (double-submit, not flipped);
    /// nothing changed and nothing was sent.
    Ignored,
}

//
// ─── KEYBOARD MAPPING ──────────────────────────────────────────────────────────
//

/// Pure key → intent mapping for the review page.
///
/// `Space` flips, `1`/`2`/`3` rate Again/Hard/Good, `?` toggles the
/// shortcut legend. Digits are inert unless the answer is showing; every
/// session key is inert while a submission is in flight or after
/// completion. Routing keys (Escape, Tab) are handled by the view, not
/// here.
#[must_use]
pub fn intent_for_key(key: &Key, code: Code, phase: Option<ReviewPhase>) -> Option<ReviewIntent> {
    if let Key::Character(value) = key
        && value == "?"
    {
        return Some(ReviewIntent::ToggleHelp);
    }

    match phase {
        Some(ReviewPhase::Ready { flipped }) => {
            if code == Code::Space {
                return Some(ReviewIntent::Flip);
            }
            if !flipped {
                return None;
            }
            let Key::Character(value) = key else {
                return None;
            };
            match value.as_str() {
                "1" => Some(ReviewIntent::Rate(ReviewRating::Again)),
                "2" => Some(ReviewIntent::Rate(ReviewRating::Hard)),
                "3" => Some(ReviewIntent::Rate(ReviewRating::Good)),
                _ => None,
            }
        }
        Some(ReviewPhase::Submitting | ReviewPhase::Complete) | None => None,
    }
}

//
// ─── VIEW-MODEL ────────────────────────────────────────────────────────────────
//

pub struct ReviewVm {
    session: ReviewSession,
    help_open: bool,
    last_next_review: Option<DateTime<Utc>>,
}

impl ReviewVm {
    #[must_use]
    pub fn new(session: ReviewSession) -> Self {
        Self {
            session,
            help_open: false,
            last_next_review: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> ReviewPhase {
        self.session.phase()
    }

    #[must_use]
    pub fn help_open(&self) -> bool {
        self.help_open
    }

    pub fn toggle_help(&mut self) {
        self.help_open = !self.help_open;
    }

    pub fn flip(&mut self) {
        self.session.flip();
    }

    #[must_use]
    pub fn front_text(&self) -> Option<&str> {
        self.session.current_card().map(|card| card.front())
    }

    #[must_use]
    pub fn back_text(&self) -> Option<&str> {
        self.session.current_card().map(|card| card.back())
    }

    #[must_use]
    pub fn example_text(&self) -> Option<&str> {
        self.session.current_card().and_then(|card| card.example())
    }

    #[must_use]
    pub fn is_empty_session(&self) -> bool {
        self.session.total_cards() == 0
    }

    /// "3 / 12 Cards" style progress label.
    #[must_use]
    pub fn progress_label(&self) -> String {
        format!(
            "{} / {} Cards",
            self.session.reviewed(),
            self.session.total_cards()
        )
    }

    #[must_use]
    pub fn reviewed(&self) -> u32 {
        self.session.reviewed()
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.session.correct()
    }

    /// Accuracy as a whole percentage, 0 when nothing was reviewed.
    #[must_use]
    pub fn accuracy_pct(&self) -> u32 {
        (self.session.accuracy() * 100.0).round() as u32
    }

    /// Reschedule time from the most recent confirmed review, when the
    /// server reported one.
    #[must_use]
    pub fn last_next_review(&self) -> Option<DateTime<Utc>> {
        self.last_next_review
    }

    /// Submit a rating for the current card.
    ///
    /// Guard rejections (not flipped, already submitting, already
    /// complete) come back as `ReviewOutcome::Ignored` so double inputs
    /// are silently dropped rather than shown as failures.
    ///
    /// # Errors
    ///
    /// Returns `ViewError` when the mutation call fails; the session stays
    /// on the same card for a retry.
    pub async fn submit(
        &mut self,
        workflow: &ReviewWorkflow,
        rating: ReviewRating,
    ) -> Result<ReviewOutcome, ViewError> {
        match workflow.submit(&mut self.session, rating).await {
            Ok(result) => {
                self.last_next_review = result.ack.next_review_at;
                if result.is_complete {
                    Ok(ReviewOutcome::Completed)
                } else {
                    Ok(ReviewOutcome::Continue)
                }
            }
            Err(SessionError::Busy | SessionError::NotFlipped | SessionError::Completed) => {
                Ok(ReviewOutcome::Ignored)
            }
            Err(err) => Err(ViewError::from(&err)),
        }
    }
}

/// Start a session over the current due list.
///
/// # Errors
///
/// Returns `ViewError` when the due-card fetch fails.
pub async fn start_review(workflow: &ReviewWorkflow) -> Result<ReviewVm, ViewError> {
    let session = workflow
        .start(SESSION_LIMIT)
        .await
        .map_err(|err| ViewError::from(&err))?;
    Ok(ReviewVm::new(session))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    const PROMPT: Option<ReviewPhase> = Some(ReviewPhase::Ready { flipped: false });
    const ANSWER: Option<ReviewPhase> = Some(ReviewPhase::Ready { flipped: true });
    const SUBMITTING: Option<ReviewPhase> = Some(ReviewPhase::Submitting);
    const COMPLETE: Option<ReviewPhase> = Some(ReviewPhase::Complete);

    fn digit(value: &str) -> Key {
        Key::Character(value.into())
    }

    #[test]
    fn space_flips_in_both_ready_states() {
        let key = Key::Character(" ".into());
        assert_eq!(
            intent_for_key(&key, Code::Space, PROMPT),
            Some(ReviewIntent::Flip)
        );
        assert_eq!(
            intent_for_key(&key, Code::Space, ANSWER),
            Some(ReviewIntent::Flip)
        );
    }

    #[test]
    fn space_is_inert_while_submitting_or_complete() {
        let key = Key::Character(" ".into());
        assert_eq!(intent_for_key(&key, Code::Space, SUBMITTING), None);
        assert_eq!(intent_for_key(&key, Code::Space, COMPLETE), None);
        assert_eq!(intent_for_key(&key, Code::Space, None), None);
    }

    #[test]
    fn digits_rate_only_when_flipped() {
        assert_eq!(
            intent_for_key(&digit("1"), Code::Digit1, ANSWER),
            Some(ReviewIntent::Rate(ReviewRating::Again))
        );
        assert_eq!(
            intent_for_key(&digit("2"), Code::Digit2, ANSWER),
            Some(ReviewIntent::Rate(ReviewRating::Hard))
        );
        assert_eq!(
            intent_for_key(&digit("3"), Code::Digit3, ANSWER),
            Some(ReviewIntent::Rate(ReviewRating::Good))
        );

        assert_eq!(intent_for_key(&digit("1"), Code::Digit1, PROMPT), None);
        assert_eq!(intent_for_key(&digit("3"), Code::Digit3, SUBMITTING), None);
        assert_eq!(intent_for_key(&digit("2"), Code::Digit2, COMPLETE), None);
    }

    #[test]
    fn unmapped_digits_do_nothing() {
        assert_eq!(intent_for_key(&digit("4"), Code::Digit4, ANSWER), None);
        assert_eq!(intent_for_key(&digit("0"), Code::Digit0, ANSWER), None);
    }

    #[test]
    fn question_mark_always_toggles_help() {
        for phase in [PROMPT, ANSWER, SUBMITTING, COMPLETE, None] {
            assert_eq!(
                intent_for_key(&digit("?"), Code::Slash, phase),
                Some(ReviewIntent::ToggleHelp)
            );
        }
    }
}
