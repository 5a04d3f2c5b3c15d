//! The slice of the store the scheduler and metrics recorder need.

use chrono::{DateTime, Utc};
use dpdmark_core::error::Result;
use dpdmark_core::models::{EmailCampaign, Event, SocialPost};
use dpdmark_db::MarketingDb;

/// Store operations used by [`crate::Dispatcher`] and [`crate::MetricsRecorder`].
///
/// `dispatch_*` must apply the status flip and the event append as one unit
/// and return `Ok(false)` when the item is no longer scheduled.
pub trait CampaignStore: Send + Sync {
    fn insert_event(&self, event: &Event) -> Result<()>;
    fn due_social_posts(&self, now: DateTime<Utc>) -> Result<Vec<SocialPost>>;
    fn due_email_campaigns(&self, now: DateTime<Utc>) -> Result<Vec<EmailCampaign>>;
    fn dispatch_social_post(&self, id: &str, now: DateTime<Utc>, event: &Event) -> Result<bool>;
    fn dispatch_email_campaign(&self, id: &str, now: DateTime<Utc>, event: &Event) -> Result<bool>;
}

impl CampaignStore for MarketingDb {
    fn insert_event(&self, event: &Event) -> Result<()> {
        MarketingDb::insert_event(self, event)
    }

    fn due_social_posts(&self, now: DateTime<Utc>) -> Result<Vec<SocialPost>> {
        MarketingDb::due_social_posts(self, now)
    }

    fn due_email_campaigns(&self, now: DateTime<Utc>) -> Result<Vec<EmailCampaign>> {
        MarketingDb::due_email_campaigns(self, now)
    }

    fn dispatch_social_post(&self, id: &str, now: DateTime<Utc>, event: &Event) -> Result<bool> {
        MarketingDb::dispatch_social_post(self, id, now, event)
    }

    fn dispatch_email_campaign(&self, id: &str, now: DateTime<Utc>, event: &Event) -> Result<bool> {
        MarketingDb::dispatch_email_campaign(self, id, now, event)
    }
}
