use async_trait::async_trait;

use recall_core::model::{
    ActivityItem, AggregateProgress, Card, CardId, HeatmapDay, PerformancePoint, ReviewAck,
    ReviewRating, SkillSlice, TodayPlan, UserStats,
};

use crate::error::ApiError;

/// Contract with the remote learning service.
///
/// Everything above this trait is transport-agnostic: the reqwest client and
/// the in-memory double implement the same surface, so services and the UI
/// never know which one they hold.
#[async_trait]
pub trait StudyApi: Send + Sync {
    /// Fetch the ordered list of cards currently due, capped at `limit`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport, status, or payload failures.
    async fn due_cards(&self, limit: usize) -> Result<Vec<Card>, ApiError>;

    /// Submit a quality rating for one card.
    ///
    /// The server applies SM-2 and reschedules; the ack carries the next
    /// review time. Once this call is sent it is never cancelled client-side.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport, status, or payload failures.
    async fn submit_review(
        &self,
        card_id: CardId,
        rating: ReviewRating,
    ) -> Result<ReviewAck, ApiError>;

    /// Headline profile numbers.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport, status, or payload failures.
    async fn user_stats(&self) -> Result<UserStats, ApiError>;

    /// Review counts per day for the activity heatmap.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport, status, or payload failures.
    async fn activity_heatmap(&self) -> Result<Vec<HeatmapDay>, ApiError>;

    /// Accuracy-over-time samples.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport, status, or payload failures.
    async fn performance_history(&self) -> Result<Vec<PerformancePoint>, ApiError>;

    /// Mastery per skill bucket.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport, status, or payload failures.
    async fn skill_breakdown(&self) -> Result<Vec<SkillSlice>, ApiError>;

    /// Most recent activity feed entries.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport, status, or payload failures.
    async fn recent_activities(&self) -> Result<Vec<ActivityItem>, ApiError>;

    /// Totals across all study modes.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport, status, or payload failures.
    async fn aggregate_progress(&self) -> Result<AggregateProgress, ApiError>;

    /// The server-curated plan for today.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport, status, or payload failures.
    async fn today_plan(&self) -> Result<TodayPlan, ApiError>;
}
