use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use api::{ApiError, InMemoryApi};
use recall_core::model::{Card, CardId, ReviewRating};
use recall_core::time::{fixed_clock, fixed_now};
use services::{
    Clock, Queries, QueryCache, QueryPolicy, ReviewPhase, ReviewWorkflow, SessionError, Topic,
};

const LONG: QueryPolicy = QueryPolicy::fresh_for(Duration::from_secs(3600));

const PROGRESS_AND_PLAN: [Topic; 7] = [
    Topic::UserStats,
    Topic::ActivityHeatmap,
    Topic::PerformanceHistory,
    Topic::SkillBreakdown,
    Topic::RecentActivities,
    Topic::AggregateProgress,
    Topic::TodayPlan,
];

fn card(id: u64) -> Card {
    Card::new(CardId::new(id), format!("Q{id}"), format!("A{id}"), None).unwrap()
}

fn harness(cards: &[Card]) -> (InMemoryApi, Arc<QueryCache>, ReviewWorkflow) {
    let clock = fixed_clock();
    let api = InMemoryApi::new(clock);
    for card in cards {
        api.push_due(card.clone());
    }
    let cache = Arc::new(QueryCache::new(clock));
    let queries = Queries::new(Arc::clone(&cache), Arc::new(api.clone()));
    let workflow = ReviewWorkflow::new(clock, Arc::new(api.clone()), queries);
    (api, cache, workflow)
}

/// Populate a topic with a counting fetch so refetches are observable.
async fn prime(cache: &QueryCache, topic: Topic, calls: &Arc<AtomicUsize>) {
    let calls = Arc::clone(calls);
    cache
        .get_or_fetch(topic, LONG, move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok::<u8, ApiError>(0))
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn scenario_a_two_cards_good_then_again() {
    let (api, cache, workflow) = harness(&[card(1), card(2)]);
    let workflow = workflow.with_today_plan(true);

    let counters: Vec<Arc<AtomicUsize>> = PROGRESS_AND_PLAN
        .iter()
        .map(|_| Arc::new(AtomicUsize::new(0)))
        .collect();
    for (topic, calls) in PROGRESS_AND_PLAN.into_iter().zip(&counters) {
        prime(&cache, topic, calls).await;
    }

    let mut session = workflow.start(20).await.unwrap();
    assert_eq!(session.total_cards(), 2);

    session.flip();
    let result = workflow.submit(&mut session, ReviewRating::Good).await.unwrap();
    assert!(!result.is_complete);
    assert!(result.ack.next_review_at.is_some());
    assert_eq!(session.position(), 1);
    assert_eq!(session.reviewed(), 1);
    assert_eq!(session.correct(), 1);
    assert_eq!(session.phase(), ReviewPhase::Ready { flipped: false });

    session.flip();
    let result = workflow.submit(&mut session, ReviewRating::Again).await.unwrap();
    assert!(result.is_complete);
    assert_eq!(session.reviewed(), 2);
    assert_eq!(session.correct(), 1);
    // Completion accuracy includes the final card (no off-by-one).
    assert!((session.accuracy() - 0.5).abs() < f64::EPSILON);

    assert_eq!(
        api.submitted_reviews(),
        vec![(CardId::new(1), 5), (CardId::new(2), 0)]
    );

    // Every progress topic, plus the requested today-plan topic, was marked
    // stale by completion: each re-read leads exactly one refetch.
    for (topic, calls) in PROGRESS_AND_PLAN.into_iter().zip(&counters) {
        prime(&cache, topic, calls).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2, "topic {topic:?}");
    }
}

#[tokio::test]
async fn scenario_b_no_cards_due_is_not_an_error() {
    let (_api, _cache, workflow) = harness(&[]);

    let session = workflow.start(20).await.unwrap();
    assert!(session.is_complete());
    assert_eq!(session.reviewed(), 0);
    assert_eq!(session.correct(), 0);
    assert_eq!(session.accuracy(), 0.0);
    assert!(session.current_card().is_none());
}

#[tokio::test]
async fn scenario_c_failed_mutation_then_retry() {
    let (api, _cache, workflow) = harness(&[card(1), card(2)]);

    let mut session = workflow.start(20).await.unwrap();
    session.flip();

    api.fail_next_review();
    let err = workflow.submit(&mut session, ReviewRating::Good).await.unwrap_err();
    assert!(matches!(err, SessionError::Api(_)));

    // Nothing moved; the card is still flipped for a retry.
    assert_eq!(session.position(), 0);
    assert_eq!(session.reviewed(), 0);
    assert_eq!(session.phase(), ReviewPhase::Ready { flipped: true });

    let result = workflow.submit(&mut session, ReviewRating::Good).await.unwrap();
    assert!(!result.is_complete);
    assert_eq!(session.position(), 1);
    assert_eq!(session.reviewed(), 1);
    assert_eq!(api.counts().submit_review, 2);
}

#[tokio::test]
async fn failed_due_fetch_yields_no_partial_session() {
    let (api, _cache, workflow) = harness(&[card(1)]);

    api.fail_next_due_fetch();
    let err = workflow.start(20).await.unwrap_err();
    assert!(matches!(err, SessionError::Query(_)));

    // The next start refetches (the failed read cached nothing).
    let session = workflow.start(20).await.unwrap();
    assert_eq!(session.total_cards(), 1);
    assert_eq!(api.counts().due_cards, 2);
}

#[tokio::test]
async fn rating_without_flip_makes_no_network_call() {
    let (api, _cache, workflow) = harness(&[card(1)]);

    let mut session = workflow.start(20).await.unwrap();
    let err = workflow.submit(&mut session, ReviewRating::Good).await.unwrap_err();
    assert!(matches!(err, SessionError::NotFlipped));
    assert_eq!(api.counts().submit_review, 0);
}

#[tokio::test]
async fn confirmed_review_stales_the_due_list() {
    let (api, _cache, workflow) = harness(&[card(1), card(2)]);

    let mut session = workflow.start(20).await.unwrap();
    assert_eq!(api.counts().due_cards, 1);

    session.flip();
    workflow.submit(&mut session, ReviewRating::Good).await.unwrap();

    // A fresh session start right away must refetch the due list.
    let next = workflow.start(20).await.unwrap();
    assert_eq!(api.counts().due_cards, 2);
    assert_eq!(next.total_cards(), 1);
}

#[tokio::test]
async fn concurrent_due_reads_share_a_single_call() {
    let clock = Clock::fixed(fixed_now());
    let api = InMemoryApi::new(clock);
    api.push_due(card(1));
    let cache = Arc::new(QueryCache::new(clock));
    let queries = Queries::new(cache, Arc::new(api.clone()));

    let (a, b) = tokio::join!(queries.due_cards(20), queries.due_cards(20));
    assert_eq!(a.unwrap().len(), 1);
    assert_eq!(b.unwrap().len(), 1);
    assert_eq!(api.counts().due_cards, 1);
}
