//! Scheduler engine: the periodic loop that drives the dispatcher.
//! Uses tokio::interval, so it sleeps between ticks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::dispatch::Dispatcher;

/// Owned handle to the running scheduler loop. Created once at startup,
/// shut down once at exit.
pub struct SchedulerHandle {
    shutdown: Arc<Notify>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop the loop and wait for the current tick to finish.
    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        if let Err(e) = self.join.await {
            tracing::warn!("⚠️ Scheduler task ended abnormally: {e}");
        }
        tracing::info!("⏰ Scheduler stopped");
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

/// Spawn the scheduler loop as a background tokio task.
///
/// The first tick fires immediately, so items that came due while the
/// process was down go out at startup.
pub fn spawn_scheduler(dispatcher: Arc<Dispatcher>, check_interval: Duration) -> SchedulerHandle {
    let shutdown = Arc::new(Notify::new());
    let stop = shutdown.clone();

    let join = tokio::spawn(async move {
        tracing::info!("⏰ Scheduler started (check every {}s)", check_interval.as_secs());

        let mut interval = tokio::time::interval(check_interval);
        // A slow tick delays the next one instead of bursting to catch up
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = stop.notified() => break,
                _ = interval.tick() => {
                    let d = dispatcher.clone();
                    // The store is synchronous SQLite
                    if let Err(e) = tokio::task::spawn_blocking(move || d.sweep_now()).await {
                        tracing::warn!("⚠️ Sweep task failed: {e}");
                    }
                }
            }
        }
    });

    SchedulerHandle { shutdown, join }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use dpdmark_core::models::{ItemStatus, SocialPost};
    use dpdmark_core::time;
    use dpdmark_db::MarketingDb;

    #[tokio::test]
    async fn test_first_tick_dispatches_and_shutdown_stops() {
        let db = Arc::new(MarketingDb::open_in_memory().unwrap());
        let post = SocialPost::new("X", "hello", time::now() - ChronoDuration::minutes(1));
        db.insert_social_post(&post).unwrap();

        let dispatcher = Arc::new(Dispatcher::new(db.clone(), 100));
        let handle = spawn_scheduler(dispatcher, Duration::from_secs(3600));

        let mut sent = false;
        for _ in 0..100 {
            if db.get_social_post(&post.id).unwrap().status == ItemStatus::Sent {
                sent = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(sent, "first tick should dispatch the due post");
        assert!(!handle.is_finished());

        handle.shutdown().await;
        assert_eq!(db.count_events().unwrap(), 1);
    }
}
