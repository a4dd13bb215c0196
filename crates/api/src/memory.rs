use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use reqwest::StatusCode;

use recall_core::Clock;
use recall_core::model::{
    ActivityItem, AggregateProgress, Card, CardId, HeatmapDay, PerformancePoint, ReviewAck,
    ReviewRating, SkillSlice, TodayPlan, UserStats,
};

use crate::error::ApiError;
use crate::remote::StudyApi;

//
// ─── IN-MEMORY DOUBLE ──────────────────────────────────────────────────────────
//

/// In-memory `StudyApi` for tests and `--demo` runs.
///
/// Holds a due queue and aggregate numbers behind a mutex, counts calls per
/// endpoint, and supports one-shot failure injection so tests can exercise
/// the retry paths without a network.
#[derive(Clone)]
pub struct InMemoryApi {
    clock: Clock,
    state: Arc<Mutex<State>>,
    calls: Arc<CallCounters>,
}

struct State {
    due: Vec<Card>,
    reviews: Vec<(CardId, u8)>,
    activities: Vec<ActivityItem>,
    stats: UserStats,
    progress: AggregateProgress,
    plan: TodayPlan,
    fail_next_review: bool,
    fail_next_due_fetch: bool,
}

#[derive(Default)]
struct CallCounters {
    due_cards: AtomicUsize,
    submit_review: AtomicUsize,
    user_stats: AtomicUsize,
    recent_activities: AtomicUsize,
    aggregate_progress: AtomicUsize,
}

/// Snapshot of per-endpoint call counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub due_cards: usize,
    pub submit_review: usize,
    pub user_stats: usize,
    pub recent_activities: usize,
    pub aggregate_progress: usize,
}

impl InMemoryApi {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            state: Arc::new(Mutex::new(State {
                due: Vec::new(),
                reviews: Vec::new(),
                activities: Vec::new(),
                stats: UserStats {
                    total_reviews: 0,
                    cards_learned: 0,
                    streak_days: 0,
                    minutes_studied: 0,
                },
                progress: AggregateProgress {
                    cards_total: 0,
                    cards_mastered: 0,
                    cards_learning: 0,
                    reviews_total: 0,
                },
                plan: TodayPlan {
                    due_cards: 0,
                    new_cards: 0,
                    goal_minutes: 15,
                    completed_minutes: 0,
                },
                fail_next_review: false,
                fail_next_due_fetch: false,
            })),
            calls: Arc::new(CallCounters::default()),
        }
    }

    /// A small seeded deck, used by `--demo` mode.
    #[must_use]
    pub fn seeded(clock: Clock) -> Self {
        let api = Self::new(clock);
        let cards = [
            ("la mesa", "the table", Some("La mesa es grande.")),
            ("el gato", "the cat", Some("El gato duerme.")),
            ("correr", "to run", None),
            ("la ventana", "the window", None),
            ("hablar", "to speak", Some("Me gusta hablar contigo.")),
        ];
        for (index, (front, back, example)) in cards.into_iter().enumerate() {
            let card = Card::new(
                CardId::new(index as u64 + 1),
                front,
                back,
                example.map(str::to_string),
            );
            if let Ok(card) = card {
                api.push_due(card);
            }
        }
        api
    }

    pub fn push_due(&self, card: Card) {
        let mut state = self.lock();
        state.due.push(card);
        state.plan.due_cards = state.due.len() as u32;
    }

    /// Make the next `submit_review` call fail with a 500.
    pub fn fail_next_review(&self) {
        self.lock().fail_next_review = true;
    }

    /// Make the next `due_cards` call fail with a 500.
    pub fn fail_next_due_fetch(&self) {
        self.lock().fail_next_due_fetch = true;
    }

    /// Qualities submitted so far, in order.
    #[must_use]
    pub fn submitted_reviews(&self) -> Vec<(CardId, u8)> {
        self.lock().reviews.clone()
    }

    #[must_use]
    pub fn counts(&self) -> CallCounts {
        CallCounts {
            due_cards: self.calls.due_cards.load(Ordering::Relaxed),
            submit_review: self.calls.submit_review.load(Ordering::Relaxed),
            user_stats: self.calls.user_stats.load(Ordering::Relaxed),
            recent_activities: self.calls.recent_activities.load(Ordering::Relaxed),
            aggregate_progress: self.calls.aggregate_progress.load(Ordering::Relaxed),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock only happens after a panic in this process;
        // recover with the inner state rather than cascading.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl StudyApi for InMemoryApi {
    async fn due_cards(&self, limit: usize) -> Result<Vec<Card>, ApiError> {
        self.calls.due_cards.fetch_add(1, Ordering::Relaxed);
        let mut state = self.lock();
        if state.fail_next_due_fetch {
            state.fail_next_due_fetch = false;
            return Err(ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR));
        }
        Ok(state.due.iter().take(limit).cloned().collect())
    }

    async fn submit_review(
        &self,
        card_id: CardId,
        rating: ReviewRating,
    ) -> Result<ReviewAck, ApiError> {
        self.calls.submit_review.fetch_add(1, Ordering::Relaxed);
        let mut state = self.lock();
        if state.fail_next_review {
            state.fail_next_review = false;
            return Err(ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR));
        }

        let Some(index) = state.due.iter().position(|card| card.id() == card_id) else {
            return Err(ApiError::Status(StatusCode::NOT_FOUND));
        };
        state.due.remove(index);

        state.reviews.push((card_id, rating.quality()));
        state.stats.total_reviews += 1;
        state.progress.reviews_total += 1;
        state.plan.due_cards = state.due.len() as u32;
        state.activities.push(ActivityItem {
            label: format!("Reviewed card {card_id}"),
            occurred_at: self.clock.now(),
        });

        // Fixed offsets stand in for the server's SM-2 schedule.
        let delay = match rating {
            ReviewRating::Again => Duration::minutes(10),
            ReviewRating::Hard => Duration::days(1),
            ReviewRating::Good => Duration::days(3),
        };
        Ok(ReviewAck::new(card_id, Some(self.clock.now() + delay)))
    }

    async fn user_stats(&self) -> Result<UserStats, ApiError> {
        self.calls.user_stats.fetch_add(1, Ordering::Relaxed);
        Ok(self.lock().stats.clone())
    }

    async fn activity_heatmap(&self) -> Result<Vec<HeatmapDay>, ApiError> {
        let state = self.lock();
        let mut days: Vec<HeatmapDay> = Vec::new();
        for activity in &state.activities {
            let date = activity.occurred_at.date_naive();
            match days.iter_mut().find(|day| day.date == date) {
                Some(day) => day.reviews += 1,
                None => days.push(HeatmapDay { date, reviews: 1 }),
            }
        }
        Ok(days)
    }

    async fn performance_history(&self) -> Result<Vec<PerformancePoint>, ApiError> {
        Ok(Vec::new())
    }

    async fn skill_breakdown(&self) -> Result<Vec<SkillSlice>, ApiError> {
        Ok(Vec::new())
    }

    async fn recent_activities(&self) -> Result<Vec<ActivityItem>, ApiError> {
        self.calls.recent_activities.fetch_add(1, Ordering::Relaxed);
        let state = self.lock();
        let mut items = state.activities.clone();
        items.reverse();
        items.truncate(10);
        Ok(items)
    }

    async fn aggregate_progress(&self) -> Result<AggregateProgress, ApiError> {
        self.calls.aggregate_progress.fetch_add(1, Ordering::Relaxed);
        Ok(self.lock().progress.clone())
    }

    async fn today_plan(&self) -> Result<TodayPlan, ApiError> {
        Ok(self.lock().plan.clone())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
