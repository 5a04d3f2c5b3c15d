//! Metrics recorder. Appends visit and dispatch events.

use std::sync::Arc;

use dpdmark_core::error::Result;
use dpdmark_core::models::{Event, NewEvent};
use dpdmark_core::time;

use crate::store::CampaignStore;

/// Thin writer over the event log. No business logic beyond stamping the
/// timestamp when the caller left it empty.
#[derive(Clone)]
pub struct MetricsRecorder {
    store: Arc<dyn CampaignStore>,
}

impl MetricsRecorder {
    pub fn new(store: Arc<dyn CampaignStore>) -> Self {
        Self { store }
    }

    /// Append one event and return it as stored.
    pub fn record(&self, event: NewEvent) -> Result<Event> {
        let event = event.into_event(time::now());
        self.store.insert_event(&event)?;
        tracing::debug!(
            "📈 Event recorded: source={:?} medium={:?} campaign={:?}",
            event.source,
            event.medium,
            event.campaign
        );
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpdmark_db::MarketingDb;

    #[test]
    fn test_record_defaults_timestamp() {
        let db = Arc::new(MarketingDb::open_in_memory().unwrap());
        let recorder = MetricsRecorder::new(db.clone());

        let before = time::now();
        let event = recorder
            .record(NewEvent::new().source("linkedin").medium("social").campaign("AugLaunch"))
            .unwrap();
        assert!(event.timestamp >= before);
        assert_eq!(event.campaign.as_deref(), Some("AugLaunch"));
        assert_eq!(db.count_events().unwrap(), 1);
    }

    #[test]
    fn test_record_keeps_explicit_timestamp() {
        let db = Arc::new(MarketingDb::open_in_memory().unwrap());
        let recorder = MetricsRecorder::new(db.clone());

        let at = time::now() - chrono::Duration::days(3);
        let event = recorder.record(NewEvent::new().at(at)).unwrap();
        assert_eq!(event.timestamp, at);
    }
}
