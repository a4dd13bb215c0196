mod card;
mod ids;
mod progress;
mod review;

pub use card::{Card, CardError};
pub use ids::CardId;
pub use progress::{
    ActivityItem, AggregateProgress, HeatmapDay, PerformancePoint, SkillSlice, TodayPlan,
    UserStats,
};
pub use review::{RatingError, ReviewAck, ReviewRating, PASSING_QUALITY};
