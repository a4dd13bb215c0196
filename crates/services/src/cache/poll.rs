use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// A background refetch loop whose lifetime is tied to its owner.
///
/// Dropping the handle aborts the task, so a view that polls a topic stops
/// polling the moment it unmounts; no timers outlive navigation.
pub struct PollTask {
    handle: JoinHandle<()>,
}

impl PollTask {
    /// Run `job` once immediately and then on every tick of `period`.
    pub fn spawn<F, Fut>(period: Duration, mut job: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                job().await;
            }
        });
        Self { handle }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PollTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
