use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use dioxus::prelude::*;
use dioxus_router::Link;

use recall_core::model::{
    ActivityItem, AggregateProgress, HeatmapDay, PerformancePoint, SkillSlice, TodayPlan, UserStats,
};
use services::Queries;

use crate::context::AppContext;
use crate::routes::{RequireSession, Route};
use crate::views::{ViewError, ViewState, view_state_from_resource};

/// How often the dashboard re-reads the recent-activity feed. The
/// background poll refetches on the same cadence, so a re-read normally
/// lands on the warm cache.
const ACTIVITY_REFRESH: Duration = Duration::from_secs(60);

#[component]
pub fn HomeView() -> Element {
    rsx! {
        RequireSession {
            Dashboard {}
        }
    }
}

fn use_query_resource<T, F, Fut>(queries: Arc<Queries>, fetch: F) -> Resource<Result<T, ViewError>>
where
    T: Clone + 'static,
    F: Fn(Arc<Queries>) -> Fut + Clone + 'static,
    Fut: Future<Output = Result<T, services::QueryError>> + 'static,
{
    use_resource(move || {
        let queries = Arc::clone(&queries);
        let fetch = fetch.clone();
        async move { fetch(queries).await.map_err(|err| ViewError::from(&err)) }
    })
}

#[component]
fn Dashboard() -> Element {
    let ctx = use_context::<AppContext>();
    let queries = ctx.queries();

    let stats = use_query_resource(queries.clone(), |queries| async move {
        queries.user_stats().await
    });
    let progress = use_query_resource(queries.clone(), |queries| async move {
        queries.aggregate_progress().await
    });
    let plan = use_query_resource(queries.clone(), |queries| async move {
        queries.today_plan().await
    });
    let heatmap = use_query_resource(queries.clone(), |queries| async move {
        queries.activity_heatmap().await
    });
    let performance = use_query_resource(queries.clone(), |queries| async move {
        queries.performance_history().await
    });
    let skills = use_query_resource(queries.clone(), |queries| async move {
        queries.skill_breakdown().await
    });
    let activities = use_query_resource(queries.clone(), |queries| async move {
        queries.recent_activities().await
    });

    // Keep the feed warm while the dashboard is mounted. The handle lives
    // in the scope and drops on unmount, which aborts the poll.
    let queries_for_poll = queries.clone();
    use_hook(move || Rc::new(queries_for_poll.spawn_recent_activity_poll()));

    // Re-render on the same cadence. Restarting the resource re-reads
    // through the cache the poll just refreshed; the future is cancelled
    // on unmount.
    use_future(move || {
        let mut activities = activities;
        async move {
            loop {
                tokio::time::sleep(ACTIVITY_REFRESH).await;
                activities.restart();
            }
        }
    });

    rsx! {
        div { class: "page home-page",
            header { class: "home-header",
                h2 { "Dashboard" }
                Link { class: "btn btn-primary", to: Route::Review {}, "Start Review" }
            }
            section { class: "home-grid",
                StatsPanel { state: view_state_from_resource(&stats) }
                PlanPanel { state: view_state_from_resource(&plan) }
                ProgressPanel { state: view_state_from_resource(&progress) }
                SkillsPanel { state: view_state_from_resource(&skills) }
                PerformancePanel { state: view_state_from_resource(&performance) }
                HeatmapPanel { state: view_state_from_resource(&heatmap) }
                ActivityPanel { state: view_state_from_resource(&activities) }
            }
        }
    }
}

#[component]
fn Panel(title: &'static str, children: Element) -> Element {
    rsx! {
        section { class: "panel",
            h3 { class: "panel__title", "{title}" }
            {children}
        }
    }
}

fn panel_fallback(state: &ViewState<impl Clone>) -> Option<Element> {
    match state {
        ViewState::Idle | ViewState::Loading => Some(rsx! {
            p { class: "muted", "Loading..." }
        }),
        ViewState::Error(err) => Some(rsx! {
            p { class: "error-banner", "{err.message()}" }
        }),
        ViewState::Ready(_) => None,
    }
}

#[component]
fn StatsPanel(state: ViewState<Arc<UserStats>>) -> Element {
    rsx! {
        Panel { title: "Your stats",
            if let Some(fallback) = panel_fallback(&state) {
                {fallback}
            } else if let ViewState::Ready(stats) = state {
                ul { class: "stat-list",
                    li { strong { "{stats.total_reviews}" } " reviews" }
                    li { strong { "{stats.cards_learned}" } " cards learned" }
                    li { strong { "{stats.streak_days}" } " day streak" }
                    li { strong { "{stats.minutes_studied}" } " minutes studied" }
                }
            }
        }
    }
}

#[component]
fn PlanPanel(state: ViewState<Arc<TodayPlan>>) -> Element {
    rsx! {
        Panel { title: "Today's plan",
            if let Some(fallback) = panel_fallback(&state) {
                {fallback}
            } else if let ViewState::Ready(plan) = state {
                ul { class: "stat-list",
                    li { strong { "{plan.due_cards}" } " cards due" }
                    li { strong { "{plan.new_cards}" } " new cards" }
                    li {
                        strong { "{plan.completed_minutes} / {plan.goal_minutes}" }
                        " minutes"
                    }
                }
                if plan.goal_met() {
                    p { class: "muted", "Daily goal met. Nice work." }
                }
            }
        }
    }
}

#[component]
fn ProgressPanel(state: ViewState<Arc<AggregateProgress>>) -> Element {
    rsx! {
        Panel { title: "Progress",
            if let Some(fallback) = panel_fallback(&state) {
                {fallback}
            } else if let ViewState::Ready(progress) = state {
                ul { class: "stat-list",
                    li { strong { "{progress.cards_mastered}" } " mastered" }
                    li { strong { "{progress.cards_learning}" } " learning" }
                    li { strong { "{progress.cards_total}" } " total cards" }
                    li { strong { "{progress.reviews_total}" } " total reviews" }
                }
            }
        }
    }
}

#[component]
fn SkillsPanel(state: ViewState<Arc<Vec<SkillSlice>>>) -> Element {
    rsx! {
        Panel { title: "Skills",
            if let Some(fallback) = panel_fallback(&state) {
                {fallback}
            } else if let ViewState::Ready(skills) = state {
                if skills.is_empty() {
                    p { class: "muted", "No skill data yet." }
                } else {
                    ul { class: "skill-list",
                        for skill in skills.iter() {
                            li { key: "{skill.name}",
                                span { "{skill.name}" }
                                span { class: "skill-pct", "{skill.mastery_pct}%" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn PerformancePanel(state: ViewState<Arc<Vec<PerformancePoint>>>) -> Element {
    rsx! {
        Panel { title: "Accuracy",
            if let Some(fallback) = panel_fallback(&state) {
                {fallback}
            } else if let ViewState::Ready(points) = state {
                if points.is_empty() {
                    p { class: "muted", "No reviews recorded yet." }
                } else {
                    ul { class: "trend-list",
                        for point in points.iter() {
                            li { key: "{point.date}",
                                span { "{point.date}" }
                                span { class: "trend-pct", "{point.accuracy_pct}%" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn HeatmapPanel(state: ViewState<Arc<Vec<HeatmapDay>>>) -> Element {
    rsx! {
        Panel { title: "Activity",
            if let Some(fallback) = panel_fallback(&state) {
                {fallback}
            } else if let ViewState::Ready(days) = state {
                if days.is_empty() {
                    p { class: "muted", "Nothing yet. Review some cards." }
                } else {
                    ul { class: "heatmap-list",
                        for day in days.iter() {
                            li { key: "{day.date}",
                                span { "{day.date}" }
                                span { class: "heatmap-count", "{day.reviews} reviews" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ActivityPanel(state: ViewState<Arc<Vec<ActivityItem>>>) -> Element {
    rsx! {
        Panel { title: "Recent activity",
            if let Some(fallback) = panel_fallback(&state) {
                {fallback}
            } else if let ViewState::Ready(items) = state {
                if items.is_empty() {
                    p { class: "muted", "No recent activity." }
                } else {
                    ul { class: "activity-list",
                        for (index, item) in items.iter().enumerate() {
                            li { key: "{index}",
                                span { "{item.label}" }
                                span { class: "activity-when",
                                    {item.occurred_at.format("%b %d, %H:%M").to_string()}
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
