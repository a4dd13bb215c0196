use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use api::ApiError;
use recall_core::Clock;

use crate::cache::topic::Topic;
use crate::error::QueryError;

//
// ─── POLICY ────────────────────────────────────────────────────────────────────
//

/// Per-resource read policy: how long a value stays fresh, and whether the
/// owning view keeps a background poll running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    pub stale_after: Duration,
    pub refetch_interval: Option<Duration>,
}

impl QueryPolicy {
    #[must_use]
    pub const fn fresh_for(stale_after: Duration) -> Self {
        Self {
            stale_after,
            refetch_interval: None,
        }
    }

    #[must_use]
    pub const fn with_poll(mut self, every: Duration) -> Self {
        self.refetch_interval = Some(every);
        self
    }
}

//
// ─── CACHE ─────────────────────────────────────────────────────────────────────
//

struct Stored {
    data: Arc<dyn Any + Send + Sync>,
    fetched_at: DateTime<Utc>,
    stale: bool,
}

#[derive(Default)]
struct Entry {
    value: Option<Stored>,
    inflight: Option<watch::Receiver<()>>,
}

enum Plan<T> {
    Hit(Arc<T>),
    Wait(watch::Receiver<()>),
    Lead(watch::Sender<()>),
}

/// Process-wide query cache, created once at app start and injected by
/// `Arc` wherever reads happen. One entry per `Topic`.
///
/// A read returns the cached value while it is fresh, otherwise triggers a
/// fetch; concurrent reads of the same topic while a fetch is in flight
/// share that single fetch. Invalidation marks an entry stale and lets the
/// next read refetch.
pub struct QueryCache {
    clock: Clock,
    entries: Mutex<HashMap<Topic, Entry>>,
}

impl QueryCache {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Mark a topic stale. Idempotent; a topic with no cached value is
    /// already as stale as it can get, so that case is a no-op.
    pub fn invalidate(&self, topic: Topic) {
        let mut entries = self.lock();
        if let Some(entry) = entries.get_mut(&topic)
            && let Some(stored) = entry.value.as_mut()
        {
            stored.stale = true;
        }
    }

    /// Read a topic through the cache.
    ///
    /// `fetch` runs at most once per call, and only when this caller ends
    /// up leading the fetch for the topic.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Api` when the led fetch fails, and
    /// `QueryError::TypeMismatch` when the topic was previously populated
    /// at a different type.
    pub async fn get_or_fetch<T, F, Fut>(
        &self,
        topic: Topic,
        policy: QueryPolicy,
        mut fetch: F,
    ) -> Result<Arc<T>, QueryError>
    where
        T: Send + Sync + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        loop {
            let plan = self.plan_read::<T>(topic, policy.stale_after)?;
            match plan {
                Plan::Hit(value) => return Ok(value),
                Plan::Wait(mut rx) => {
                    // Wakes when the leader finishes (send or sender drop);
                    // loop back to re-read the entry either way.
                    let _ = rx.changed().await;
                }
                Plan::Lead(tx) => {
                    let result = fetch().await;
                    let outcome = self.complete_fetch(topic, result);
                    let _ = tx.send(());
                    return outcome;
                }
            }
        }
    }

    fn plan_read<T>(&self, topic: Topic, stale_after: Duration) -> Result<Plan<T>, QueryError>
    where
        T: Send + Sync + 'static,
    {
        let now = self.clock.now();
        let mut entries = self.lock();
        let entry = entries.entry(topic).or_default();

        if let Some(stored) = &entry.value
            && is_fresh(stored, now, stale_after)
        {
            let data = Arc::clone(&stored.data);
            return data
                .downcast::<T>()
                .map(Plan::Hit)
                .map_err(|_| QueryError::TypeMismatch { topic });
        }

        if let Some(rx) = &entry.inflight {
            // A sender that went away without completing (cancelled leader)
            // leaves a closed receiver behind; reclaim leadership.
            if rx.has_changed().is_ok() {
                return Ok(Plan::Wait(rx.clone()));
            }
            entry.inflight = None;
        }

        let (tx, rx) = watch::channel(());
        entry.inflight = Some(rx);
        Ok(Plan::Lead(tx))
    }

    fn complete_fetch<T>(&self, topic: Topic, result: Result<T, ApiError>) -> Result<Arc<T>, QueryError>
    where
        T: Send + Sync + 'static,
    {
        let now = self.clock.now();
        let mut entries = self.lock();
        let entry = entries.entry(topic).or_default();
        entry.inflight = None;

        match result {
            Ok(value) => {
                let data = Arc::new(value);
                entry.value = Some(Stored {
                    data: Arc::clone(&data) as Arc<dyn Any + Send + Sync>,
                    fetched_at: now,
                    stale: false,
                });
                Ok(data)
            }
            // The entry keeps whatever stale value it had; the next read
            // will lead a fresh fetch.
            Err(err) => Err(QueryError::Api(err)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Topic, Entry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn is_fresh(stored: &Stored, now: DateTime<Utc>, stale_after: Duration) -> bool {
    if stored.stale {
        return false;
    }
    // A negative age (clock moved backwards) counts as fresh.
    (now - stored.fetched_at)
        .to_std()
        .map_or(true, |age| age < stale_after)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::time::fixed_clock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const LONG: QueryPolicy = QueryPolicy::fresh_for(Duration::from_secs(3600));
    const ALWAYS_STALE: QueryPolicy = QueryPolicy::fresh_for(Duration::ZERO);

    fn counted_fetch(calls: &Arc<AtomicUsize>) -> impl FnMut() -> std::future::Ready<Result<u32, ApiError>> + use<> {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(7))
        }
    }

    #[tokio::test]
    async fn fresh_value_is_served_without_refetch() {
        let cache = QueryCache::new(fixed_clock());
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache
            .get_or_fetch(Topic::UserStats, LONG, counted_fetch(&calls))
            .await
            .unwrap();
        let second = cache
            .get_or_fetch(Topic::UserStats, LONG, counted_fetch(&calls))
            .await
            .unwrap();

        assert_eq!(*first, 7);
        assert_eq!(*second, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_freshness_refetches_every_read() {
        let cache = QueryCache::new(fixed_clock());
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            cache
                .get_or_fetch(Topic::UserStats, ALWAYS_STALE, counted_fetch(&calls))
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn invalidation_triggers_exactly_one_refetch() {
        let cache = QueryCache::new(fixed_clock());
        let calls = Arc::new(AtomicUsize::new(0));

        cache
            .get_or_fetch(Topic::UserStats, LONG, counted_fetch(&calls))
            .await
            .unwrap();

        cache.invalidate(Topic::UserStats);
        cache.invalidate(Topic::UserStats); // idempotent

        cache
            .get_or_fetch(Topic::UserStats, LONG, counted_fetch(&calls))
            .await
            .unwrap();
        cache
            .get_or_fetch(Topic::UserStats, LONG, counted_fetch(&calls))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidating_an_absent_topic_is_a_no_op() {
        let cache = QueryCache::new(fixed_clock());
        cache.invalidate(Topic::TodayPlan);

        let calls = Arc::new(AtomicUsize::new(0));
        cache
            .get_or_fetch(Topic::TodayPlan, LONG, counted_fetch(&calls))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_fetch() {
        let cache = Arc::new(QueryCache::new(fixed_clock()));
        let calls = Arc::new(AtomicUsize::new(0));

        let slow_fetch = || {
            let calls = Arc::clone(&calls);
            move || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok::<u32, ApiError>(7)
                }
            }
        };

        let (a, b, c) = tokio::join!(
            cache.get_or_fetch(Topic::DueCards, LONG, slow_fetch()),
            cache.get_or_fetch(Topic::DueCards, LONG, slow_fetch()),
            cache.get_or_fetch(Topic::DueCards, LONG, slow_fetch()),
        );

        assert_eq!(*a.unwrap(), 7);
        assert_eq!(*b.unwrap(), 7);
        assert_eq!(*c.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_fetch_surfaces_and_next_read_retries() {
        let cache = QueryCache::new(fixed_clock());
        let calls = Arc::new(AtomicUsize::new(0));

        let failing = {
            let calls = Arc::clone(&calls);
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                std::future::ready(Err::<u32, ApiError>(ApiError::Unauthorized))
            }
        };

        let err = cache
            .get_or_fetch(Topic::UserStats, LONG, failing)
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::Api(ApiError::Unauthorized)));

        let value = cache
            .get_or_fetch(Topic::UserStats, LONG, counted_fetch(&calls))
            .await
            .unwrap();
        assert_eq!(*value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn reading_a_topic_at_the_wrong_type_is_an_error() {
        let cache = QueryCache::new(fixed_clock());
        let calls = Arc::new(AtomicUsize::new(0));

        cache
            .get_or_fetch(Topic::UserStats, LONG, counted_fetch(&calls))
            .await
            .unwrap();

        let err = cache
            .get_or_fetch(Topic::UserStats, LONG, || {
                std::future::ready(Ok::<String, ApiError>("nope".into()))
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            QueryError::TypeMismatch {
                topic: Topic::UserStats
            }
        ));
    }
}
