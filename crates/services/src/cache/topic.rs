/// Logical cache key: one topic per remotely-owned resource.
///
/// Invalidation and de-duplication both key on the topic, so two reads of
/// the same topic always observe the same cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    DueCards,
    UserStats,
    ActivityHeatmap,
    PerformanceHistory,
    SkillBreakdown,
    RecentActivities,
    AggregateProgress,
    TodayPlan,
}

/// The aggregate-progress topics invalidated when a review session completes.
///
/// `TodayPlan` is deliberately not in this set; it is added per-session via
/// `InvalidateOptions`.
pub const PROGRESS_TOPICS: [Topic; 6] = [
    Topic::UserStats,
    Topic::ActivityHeatmap,
    Topic::PerformanceHistory,
    Topic::SkillBreakdown,
    Topic::RecentActivities,
    Topic::AggregateProgress,
];
