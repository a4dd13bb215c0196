use crate::cache::{PROGRESS_TOPICS, QueryCache, Topic};

/// Options for a progress invalidation sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvalidateOptions {
    /// Also invalidate the today-plan topic. Set when the session that just
    /// completed was started from the daily plan.
    pub include_today_plan: bool,
}

/// Mark every aggregate-progress topic stale so dashboards refetch.
///
/// Called after a mutation that changes server-side progress (a completed
/// review session). Idempotent: re-invalidating stale entries changes
/// nothing.
pub fn invalidate_progress(cache: &QueryCache, options: InvalidateOptions) {
    for topic in PROGRESS_TOPICS {
        cache.invalidate(topic);
    }
    if options.include_today_plan {
        cache.invalidate(Topic::TodayPlan);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::QueryPolicy;
    use api::ApiError;
    use recall_core::time::fixed_clock;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const LONG: QueryPolicy = QueryPolicy::fresh_for(Duration::from_secs(3600));

    async fn prime(cache: &QueryCache, topic: Topic, calls: &Arc<AtomicUsize>) {
        let calls = Arc::clone(calls);
        cache
            .get_or_fetch(topic, LONG, move || {
                calls.fetch_add(1, Ordering::SeqCst);
                std::future::ready(Ok::<u8, ApiError>(1))
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn sweep_marks_all_progress_topics_stale() {
        let cache = QueryCache::new(fixed_clock());
        let calls = Arc::new(AtomicUsize::new(0));

        for topic in PROGRESS_TOPICS {
            prime(&cache, topic, &calls).await;
        }
        prime(&cache, Topic::TodayPlan, &calls).await;
        assert_eq!(calls.load(Ordering::SeqCst), 7);

        invalidate_progress(&cache, InvalidateOptions::default());

        for topic in PROGRESS_TOPICS {
            prime(&cache, topic, &calls).await;
        }
        // Six refetches; today-plan was left fresh.
        prime(&cache, Topic::TodayPlan, &calls).await;
        assert_eq!(calls.load(Ordering::SeqCst), 13);
    }

    #[tokio::test]
    async fn sweep_can_include_today_plan() {
        let cache = QueryCache::new(fixed_clock());
        let calls = Arc::new(AtomicUsize::new(0));
        prime(&cache, Topic::TodayPlan, &calls).await;

        invalidate_progress(
            &cache,
            InvalidateOptions {
                include_today_plan: true,
            },
        );

        prime(&cache, Topic::TodayPlan, &calls).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
