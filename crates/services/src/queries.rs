use std::sync::Arc;
use std::time::Duration;

use api::StudyApi;
use recall_core::model::{
    ActivityItem, AggregateProgress, Card, HeatmapDay, PerformancePoint, SkillSlice, TodayPlan,
    UserStats,
};

use crate::cache::{PollTask, QueryCache, QueryPolicy, Topic};
use crate::error::QueryError;

//
// ─── POLICIES ──────────────────────────────────────────────────────────────────
//

const DUE_CARDS: QueryPolicy = QueryPolicy::fresh_for(Duration::from_secs(30));
const USER_STATS: QueryPolicy = QueryPolicy::fresh_for(Duration::from_secs(60));
const HEATMAP: QueryPolicy = QueryPolicy::fresh_for(Duration::from_secs(120));
const PERFORMANCE: QueryPolicy = QueryPolicy::fresh_for(Duration::from_secs(120));
const SKILLS: QueryPolicy = QueryPolicy::fresh_for(Duration::from_secs(120));
const RECENT_ACTIVITIES: QueryPolicy =
    QueryPolicy::fresh_for(Duration::from_secs(30)).with_poll(Duration::from_secs(60));
const AGGREGATE: QueryPolicy = QueryPolicy::fresh_for(Duration::from_secs(60));
const TODAY_PLAN: QueryPolicy = QueryPolicy::fresh_for(Duration::from_secs(300));

//
// ─── TYPED READS ───────────────────────────────────────────────────────────────
//

/// Cache-aware read operations, one per resource identity.
///
/// Each method binds a topic to its fetch function and policy; repeated
/// calls while the value is fresh never touch the network.
#[derive(Clone)]
pub struct Queries {
    cache: Arc<QueryCache>,
    api: Arc<dyn StudyApi>,
}

impl Queries {
    #[must_use]
    pub fn new(cache: Arc<QueryCache>, api: Arc<dyn StudyApi>) -> Self {
        Self { cache, api }
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// The ordered due-card list, capped at `limit`.
    ///
    /// # Errors
    ///
    /// Returns `QueryError` when a led fetch fails.
    pub async fn due_cards(&self, limit: usize) -> Result<Arc<Vec<Card>>, QueryError> {
        let api = Arc::clone(&self.api);
        self.cache
            .get_or_fetch(Topic::DueCards, DUE_CARDS, move || {
                let api = Arc::clone(&api);
                async move { api.due_cards(limit).await }
            })
            .await
    }

    /// # Errors
    ///
    /// Returns `QueryError` when a led fetch fails.
    pub async fn user_stats(&self) -> Result<Arc<UserStats>, QueryError> {
        let api = Arc::clone(&self.api);
        self.cache
            .get_or_fetch(Topic::UserStats, USER_STATS, move || {
                let api = Arc::clone(&api);
                async move { api.user_stats().await }
            })
            .await
    }

    /// # Errors
    ///
    /// Returns `QueryError` when a led fetch fails.
    pub async fn activity_heatmap(&self) -> Result<Arc<Vec<HeatmapDay>>, QueryError> {
        let api = Arc::clone(&self.api);
        self.cache
            .get_or_fetch(Topic::ActivityHeatmap, HEATMAP, move || {
                let api = Arc::clone(&api);
                async move { api.activity_heatmap().await }
            })
            .await
    }

    /// # Errors
    ///
    /// Returns `QueryError` when a led fetch fails.
    pub async fn performance_history(&self) -> Result<Arc<Vec<PerformancePoint>>, QueryError> {
        let api = Arc::clone(&self.api);
        self.cache
            .get_or_fetch(Topic::PerformanceHistory, PERFORMANCE, move || {
                let api = Arc::clone(&api);
                async move { api.performance_history().await }
            })
            .await
    }

    /// # Errors
    ///
    /// Returns `QueryError` when a led fetch fails.
    pub async fn skill_breakdown(&self) -> Result<Arc<Vec<SkillSlice>>, QueryError> {
        let api = Arc::clone(&self.api);
        self.cache
            .get_or_fetch(Topic::SkillBreakdown, SKILLS, move || {
                let api = Arc::clone(&api);
                async move { api.skill_breakdown().await }
            })
            .await
    }

    /// # Errors
    ///
    /// Returns `QueryError` when a led fetch fails.
    pub async fn recent_activities(&self) -> Result<Arc<Vec<ActivityItem>>, QueryError> {
        let api = Arc::clone(&self.api);
        self.cache
            .get_or_fetch(Topic::RecentActivities, RECENT_ACTIVITIES, move || {
                let api = Arc::clone(&api);
                async move { api.recent_activities().await }
            })
            .await
    }

    /// # Errors
    ///
    /// Returns `QueryError` when a led fetch fails.
    pub async fn aggregate_progress(&self) -> Result<Arc<AggregateProgress>, QueryError> {
        let api = Arc::clone(&self.api);
        self.cache
            .get_or_fetch(Topic::AggregateProgress, AGGREGATE, move || {
                let api = Arc::clone(&api);
                async move { api.aggregate_progress().await }
            })
            .await
    }

    /// # Errors
    ///
    /// Returns `QueryError` when a led fetch fails.
    pub async fn today_plan(&self) -> Result<Arc<TodayPlan>, QueryError> {
        let api = Arc::clone(&self.api);
        self.cache
            .get_or_fetch(Topic::TodayPlan, TODAY_PLAN, move || {
                let api = Arc::clone(&api);
                async move { api.today_plan().await }
            })
            .await
    }

    /// Keep the recent-activity feed warm while the returned handle lives.
    ///
    /// The poll invalidates the topic and reads it again on each tick; the
    /// task dies with the handle, so polling stops on unmount.
    #[must_use]
    pub fn spawn_recent_activity_poll(&self) -> PollTask {
        let queries = self.clone();
        let period = RECENT_ACTIVITIES
            .refetch_interval
            .unwrap_or(Duration::from_secs(60));
        PollTask::spawn(period, move || {
            let queries = queries.clone();
            async move {
                queries.cache.invalidate(Topic::RecentActivities);
                let _ = queries.recent_activities().await;
            }
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
