use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

//
// ─── DASHBOARD VALUE TYPES ─────────────────────────────────────────────────────
//
// Aggregates computed server-side and consumed read-only by the dashboard.
// Each struct doubles as the wire schema: a payload that does not fit is a
// decode error at the API boundary, never a half-populated value.
//

/// Headline numbers for the profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_reviews: u64,
    pub cards_learned: u64,
    pub streak_days: u32,
    pub minutes_studied: u64,
}

/// One day of the activity heatmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapDay {
    pub date: NaiveDate,
    pub reviews: u32,
}

/// One sample of the accuracy-over-time chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformancePoint {
    pub date: NaiveDate,
    pub accuracy_pct: f64,
}

/// Mastery of one topic/skill bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSlice {
    pub name: String,
    pub mastery_pct: f64,
}

/// A recent-activity feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityItem {
    pub label: String,
    pub occurred_at: DateTime<Utc>,
}

/// Totals across all decks and study modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateProgress {
    pub cards_total: u64,
    pub cards_mastered: u64,
    pub cards_learning: u64,
    pub reviews_total: u64,
}

/// The server-curated plan for today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayPlan {
    pub due_cards: u32,
    pub new_cards: u32,
    pub goal_minutes: u32,
    pub completed_minutes: u32,
}

impl TodayPlan {
    /// True once the daily goal has been met.
    #[must_use]
    pub fn goal_met(&self) -> bool {
        self.completed_minutes >= self.goal_minutes
    }
}
