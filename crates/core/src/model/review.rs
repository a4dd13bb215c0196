use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::CardId;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur when mapping rating values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RatingError {
    #[error("invalid review quality value: {0}")]
    InvalidQuality(u8),
}

//
// ─── REVIEW RATING ────────────────────────────────────────────────────────────
//

/// Minimum SM-2 quality that counts as a correct recall.
pub const PASSING_QUALITY: u8 = 3;

/// Three-level difficulty rating exposed to the user.
///
/// The server runs SM-2 on a 0-5 quality scale; the client exposes three
/// levels and maps them to fixed qualities:
/// - `Again`: failed to recall → quality 0
/// - `Hard`: recalled with difficulty → quality 3
/// - `Good`: recalled comfortably → quality 5
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewRating {
    /// Failed to recall the answer. The card comes back soon.
    Again,
    /// Recalled with significant difficulty.
    Hard,
    /// Recalled comfortably.
    Good,
}

impl ReviewRating {
    /// Maps this rating to the SM-2 0-5 quality scale sent to the server.
    #[must_use]
    pub fn quality(self) -> u8 {
        match self {
            ReviewRating::Again => 0,
            ReviewRating::Hard => 3,
            ReviewRating::Good => 5,
        }
    }

    /// Converts one of the exposed quality values back to a rating.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::InvalidQuality` for any value outside the
    /// closed set {0, 3, 5}.
    pub fn from_quality(value: u8) -> Result<Self, RatingError> {
        match value {
            0 => Ok(Self::Again),
            3 => Ok(Self::Hard),
            5 => Ok(Self::Good),
            other => Err(RatingError::InvalidQuality(other)),
        }
    }

    /// Whether this rating counts toward the correct-answer tally.
    #[must_use]
    pub fn is_passing(self) -> bool {
        self.quality() >= PASSING_QUALITY
    }
}

//
// ─── REVIEW ACKNOWLEDGEMENT ───────────────────────────────────────────────────
//

/// Server acknowledgement for a submitted review.
///
/// The scheduler runs remotely; the client only learns when the card will
/// come due again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewAck {
    pub card_id: CardId,
    pub next_review_at: Option<DateTime<Utc>>,
}

impl ReviewAck {
    #[must_use]
    pub fn new(card_id: CardId, next_review_at: Option<DateTime<Utc>>) -> Self {
        Self {
            card_id,
            next_review_at,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_mapping_is_fixed() {
        assert_eq!(ReviewRating::Again.quality(), 0);
        assert_eq!(ReviewRating::Hard.quality(), 3);
        assert_eq!(ReviewRating::Good.quality(), 5);
    }

    #[test]
    fn from_quality_round_trips() {
        for rating in [ReviewRating::Again, ReviewRating::Hard, ReviewRating::Good] {
            assert_eq!(ReviewRating::from_quality(rating.quality()).unwrap(), rating);
        }
    }

    #[test]
    fn from_quality_rejects_values_outside_the_set() {
        for value in [1, 2, 4, 6, 255] {
            let err = ReviewRating::from_quality(value).unwrap_err();
            assert_eq!(err, RatingError::InvalidQuality(value));
        }
    }

    #[test]
    fn passing_threshold_is_three() {
        assert!(!ReviewRating::Again.is_passing());
        assert!(ReviewRating::Hard.is_passing());
        assert!(ReviewRating::Good.is_passing());
    }
}
