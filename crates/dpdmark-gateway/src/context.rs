//! Application context: server state plus the scheduler it owns.

use std::sync::Arc;
use std::time::Duration;

use dpdmark_core::config::MarketingConfig;
use dpdmark_db::MarketingDb;
use dpdmark_scheduler::{Dispatcher, SchedulerHandle, spawn_scheduler};

use crate::server::{AppState, serve};

/// Everything the process runs. The scheduler handle lives here from startup
/// until [`AppContext::shutdown`], never longer.
pub struct AppContext {
    pub state: AppState,
    scheduler: Option<SchedulerHandle>,
}

impl AppContext {
    /// Build the shared state and start the scheduler loop when enabled.
    /// Must be called inside a tokio runtime.
    pub fn start(config: MarketingConfig, db: Arc<MarketingDb>, dispatcher: Arc<Dispatcher>) -> Self {
        let scheduler = if config.scheduler.enabled {
            Some(spawn_scheduler(
                dispatcher.clone(),
                Duration::from_secs(config.scheduler.interval_secs),
            ))
        } else {
            tracing::info!("⏸️ Scheduler disabled by config");
            None
        };
        Self {
            state: AppState::new(config, db, dispatcher),
            scheduler,
        }
    }

    pub fn scheduler_running(&self) -> bool {
        self.scheduler.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Serve until Ctrl-C, then stop the scheduler.
    pub async fn run(self) -> anyhow::Result<()> {
        let served = serve(self.state.clone()).await;
        self.shutdown().await;
        served
    }

    pub async fn shutdown(self) {
        if let Some(handle) = self.scheduler {
            handle.shutdown().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(enabled: bool) -> (MarketingConfig, Arc<MarketingDb>, Arc<Dispatcher>) {
        let mut config = MarketingConfig::default();
        config.scheduler.enabled = enabled;
        config.scheduler.interval_secs = 3600;
        let db = Arc::new(MarketingDb::open_in_memory().unwrap());
        let dispatcher = Arc::new(Dispatcher::new(db.clone(), 100));
        (config, db, dispatcher)
    }

    #[tokio::test]
    async fn test_context_owns_and_stops_scheduler() {
        let (config, db, dispatcher) = parts(true);
        let ctx = AppContext::start(config, db, dispatcher);
        assert!(ctx.scheduler_running());
        tokio::time::timeout(Duration::from_secs(5), ctx.shutdown())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_disabled_scheduler_is_not_started() {
        let (config, db, dispatcher) = parts(false);
        let ctx = AppContext::start(config, db, dispatcher);
        assert!(!ctx.scheduler_running());
        ctx.shutdown().await;
    }
}
