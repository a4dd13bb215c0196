use thiserror::Error;

use crate::model::ids::CardId;

//
// ─── CARD TYPES ────────────────────────────────────────────────────────────────
//

/// A flashcard as served by the remote API.
///
/// Immutable from the client's perspective: the server owns scheduling state
/// and content. Construction validates the payload so downstream code never
/// sees a card with blank sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    id: CardId,
    front: String,
    back: String,
    example: Option<String>,
}

impl Card {
    /// Builds a card from wire data, trimming whitespace.
    ///
    /// # Errors
    ///
    /// Returns `CardError` when the front or back is empty after trimming.
    pub fn new(
        id: CardId,
        front: impl Into<String>,
        back: impl Into<String>,
        example: Option<String>,
    ) -> Result<Self, CardError> {
        let front = front.into().trim().to_string();
        let back = back.into().trim().to_string();

        if front.is_empty() {
            return Err(CardError::EmptyFront { id });
        }
        if back.is_empty() {
            return Err(CardError::EmptyBack { id });
        }

        let example = example
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        Ok(Self {
            id,
            front,
            back,
            example,
        })
    }

    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    #[must_use]
    pub fn front(&self) -> &str {
        &self.front
    }

    #[must_use]
    pub fn back(&self) -> &str {
        &self.back
    }

    #[must_use]
    pub fn example(&self) -> Option<&str> {
        self.example.as_deref()
    }
}

//
// ─── CARD VALIDATION ERRORS ────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CardError {
    #[error("card {id} has an empty front")]
    EmptyFront { id: CardId },

    #[error("card {id} has an empty back")]
    EmptyBack { id: CardId },
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
