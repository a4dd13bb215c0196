use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use recall_core::model::{Card, CardError, CardId, ReviewAck};

//
// ─── WIRE SHAPES ───────────────────────────────────────────────────────────────
//
// Payloads are decoded into these structs and then validated into domain
// types. A payload that decodes but fails validation is still rejected;
// loose fields never leak past this module.
//

/// Wire shape for a flashcard.
#[derive(Debug, Clone, Deserialize)]
pub struct CardDto {
    pub id: u64,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub example: Option<String>,
}

impl CardDto {
    /// Validate the payload into a domain `Card`.
    ///
    /// # Errors
    ///
    /// Returns `CardError` when either side is blank.
    pub fn into_card(self) -> Result<Card, CardError> {
        Card::new(CardId::new(self.id), self.front, self.back, self.example)
    }
}

/// Body for `POST /flashcards/{id}/review`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReviewRequest {
    pub quality: u8,
}

/// Wire shape for the review acknowledgement.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewAckDto {
    pub card_id: u64,
    #[serde(default)]
    pub next_review_at: Option<DateTime<Utc>>,
}

impl ReviewAckDto {
    #[must_use]
    pub fn into_ack(self) -> ReviewAck {
        ReviewAck::new(CardId::new(self.card_id), self.next_review_at)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
