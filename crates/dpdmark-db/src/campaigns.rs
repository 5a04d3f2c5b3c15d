//! Schedulable items: social posts and email campaigns.

use chrono::{DateTime, Utc};
use dpdmark_core::error::{MarketingError, Result};
use dpdmark_core::models::{EmailCampaign, Event, ItemKind, ItemStatus, SocialPost};
use dpdmark_core::time::format_ts;
use rusqlite::params;

use crate::MarketingDb;
use crate::events::insert_event_on;
use crate::rows::{EMAIL_SELECT, SOCIAL_SELECT, row_to_email, row_to_social};

fn table_for(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Social => "social_posts",
        ItemKind::Email => "email_campaigns",
    }
}

impl MarketingDb {
    // ─── Social posts ──────────────────────────────────────

    pub fn insert_social_post(&self, post: &SocialPost) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO social_posts (id, channel, content, scheduled_at, status, sent_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                post.id,
                post.channel,
                post.content,
                format_ts(post.scheduled_at),
                post.status.as_str(),
                post.sent_at.map(format_ts),
            ],
        )
        .map_err(|e| MarketingError::storage("Insert social post", e))?;
        Ok(())
    }

    pub fn get_social_post(&self, id: &str) -> Result<SocialPost> {
        let conn = self.lock()?;
        conn.query_row(&format!("{SOCIAL_SELECT} WHERE id = ?1"), params![id], row_to_social)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    MarketingError::NotFound(format!("social post {id}"))
                }
                other => MarketingError::storage("Get social post", other),
            })
    }

    /// Most recent first by scheduled time.
    pub fn list_social_posts(&self, limit: usize) -> Result<Vec<SocialPost>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!("{SOCIAL_SELECT} ORDER BY scheduled_at DESC LIMIT ?1"))
            .map_err(|e| MarketingError::storage("Prepare", e))?;
        let posts = stmt
            .query_map(params![limit as i64], row_to_social)
            .map_err(|e| MarketingError::storage("Query social posts", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| MarketingError::storage("Read social post", e))?;
        Ok(posts)
    }

    /// Scheduled posts whose time has come.
    pub fn due_social_posts(&self, now: DateTime<Utc>) -> Result<Vec<SocialPost>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "{SOCIAL_SELECT} WHERE status = 'scheduled' AND scheduled_at <= ?1 ORDER BY scheduled_at"
            ))
            .map_err(|e| MarketingError::storage("Prepare", e))?;
        let posts = stmt
            .query_map(params![format_ts(now)], row_to_social)
            .map_err(|e| MarketingError::storage("Query due social posts", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| MarketingError::storage("Read social post", e))?;
        Ok(posts)
    }

    /// Promote a due post to sent and append its event, atomically.
    /// Returns `false` without writing when the post is not (or no longer) due.
    pub fn dispatch_social_post(&self, id: &str, now: DateTime<Utc>, event: &Event) -> Result<bool> {
        self.dispatch_item(ItemKind::Social, id, now, event)
    }

    // ─── Email campaigns ──────────────────────────────────────

    pub fn insert_email_campaign(&self, campaign: &EmailCampaign) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO email_campaigns (id, subject, body, to_list, scheduled_at, status, sent_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                campaign.id,
                campaign.subject,
                campaign.body,
                campaign.to_list,
                format_ts(campaign.scheduled_at),
                campaign.status.as_str(),
                campaign.sent_at.map(format_ts),
            ],
        )
        .map_err(|e| MarketingError::storage("Insert email campaign", e))?;
        Ok(())
    }

    pub fn get_email_campaign(&self, id: &str) -> Result<EmailCampaign> {
        let conn = self.lock()?;
        conn.query_row(&format!("{EMAIL_SELECT} WHERE id = ?1"), params![id], row_to_email)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    MarketingError::NotFound(format!("email campaign {id}"))
                }
                other => MarketingError::storage("Get email campaign", other),
            })
    }

    /// Most recent first by scheduled time.
    pub fn list_email_campaigns(&self, limit: usize) -> Result<Vec<EmailCampaign>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!("{EMAIL_SELECT} ORDER BY scheduled_at DESC LIMIT ?1"))
            .map_err(|e| MarketingError::storage("Prepare", e))?;
        let campaigns = stmt
            .query_map(params![limit as i64], row_to_email)
            .map_err(|e| MarketingError::storage("Query email campaigns", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| MarketingError::storage("Read email campaign", e))?;
        Ok(campaigns)
    }

    /// Scheduled campaigns whose time has come.
    pub fn due_email_campaigns(&self, now: DateTime<Utc>) -> Result<Vec<EmailCampaign>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "{EMAIL_SELECT} WHERE status = 'scheduled' AND scheduled_at <= ?1 ORDER BY scheduled_at"
            ))
            .map_err(|e| MarketingError::storage("Prepare", e))?;
        let campaigns = stmt
            .query_map(params![format_ts(now)], row_to_email)
            .map_err(|e| MarketingError::storage("Query due email campaigns", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| MarketingError::storage("Read email campaign", e))?;
        Ok(campaigns)
    }

    /// Promote a due campaign to sent and append its event, atomically.
    /// Returns `false` without writing when the campaign is not (or no longer) due.
    pub fn dispatch_email_campaign(&self, id: &str, now: DateTime<Utc>, event: &Event) -> Result<bool> {
        self.dispatch_item(ItemKind::Email, id, now, event)
    }

    // ─── Shared ──────────────────────────────────────

    /// Status flip and event append in one transaction. The flip only
    /// matches `scheduled` rows that are due, so a replay changes nothing.
    fn dispatch_item(&self, kind: ItemKind, id: &str, now: DateTime<Utc>, event: &Event) -> Result<bool> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| MarketingError::storage("Begin dispatch", e))?;

        let now_s = format_ts(now);
        let changed = tx
            .execute(
                &format!(
                    "UPDATE {} SET status = ?1, sent_at = ?2
                     WHERE id = ?3 AND status = ?4 AND scheduled_at <= ?2",
                    table_for(kind)
                ),
                params![
                    ItemStatus::Sent.as_str(),
                    now_s,
                    id,
                    ItemStatus::Scheduled.as_str(),
                ],
            )
            .map_err(|e| MarketingError::storage("Mark sent", e))?;

        if changed == 0 {
            // Dropping the transaction rolls it back
            return Ok(false);
        }

        insert_event_on(&tx, event).map_err(|e| MarketingError::storage("Insert dispatch event", e))?;
        tx.commit()
            .map_err(|e| MarketingError::storage("Commit dispatch", e))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use dpdmark_core::models::NewEvent;

    fn temp_db() -> MarketingDb {
        MarketingDb::open_in_memory().unwrap()
    }

    #[test]
    fn test_social_crud() {
        let db = temp_db();
        let now = dpdmark_core::time::now();
        let post = SocialPost::new("LinkedIn", "Launch day", now);
        db.insert_social_post(&post).unwrap();

        let loaded = db.get_social_post(&post.id).unwrap();
        assert_eq!(loaded, post);
        assert_eq!(db.list_social_posts(10).unwrap().len(), 1);
        assert!(matches!(
            db.get_social_post("missing"),
            Err(MarketingError::NotFound(_))
        ));
    }

    #[test]
    fn test_due_social_posts_filters_future_and_sent() {
        let db = temp_db();
        let now = dpdmark_core::time::now();
        let due = SocialPost::new("X", "due", now - Duration::minutes(1));
        let exact = SocialPost::new("X", "exact", now);
        let future = SocialPost::new("X", "future", now + Duration::minutes(1));
        let mut sent = SocialPost::new("X", "sent", now - Duration::hours(1));
        sent.status = ItemStatus::Sent;
        sent.sent_at = Some(now - Duration::minutes(30));
        for p in [&due, &exact, &future, &sent] {
            db.insert_social_post(p).unwrap();
        }

        let ids: Vec<_> = db.due_social_posts(now).unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![due.id, exact.id]);
    }

    #[test]
    fn test_dispatch_social_is_atomic_and_idempotent() {
        let db = temp_db();
        let now = dpdmark_core::time::now();
        let post = SocialPost::new("X", "hello", now - Duration::minutes(1));
        db.insert_social_post(&post).unwrap();

        let event = post.dispatch_event(now, 100).into_event(now);
        assert!(db.dispatch_social_post(&post.id, now, &event).unwrap());

        let loaded = db.get_social_post(&post.id).unwrap();
        assert_eq!(loaded.status, ItemStatus::Sent);
        assert_eq!(loaded.sent_at, Some(now));
        assert_eq!(db.count_events().unwrap(), 1);

        // Replay with a fresh event id: no transition, no event
        let again = post.dispatch_event(now, 100).into_event(now);
        assert!(!db.dispatch_social_post(&post.id, now, &again).unwrap());
        assert_eq!(db.count_events().unwrap(), 1);
    }

    #[test]
    fn test_dispatch_refuses_future_item() {
        let db = temp_db();
        let now = dpdmark_core::time::now();
        let post = SocialPost::new("X", "later", now + Duration::hours(1));
        db.insert_social_post(&post).unwrap();

        let event = NewEvent::new().medium("social").into_event(now);
        assert!(!db.dispatch_social_post(&post.id, now, &event).unwrap());
        assert_eq!(db.get_social_post(&post.id).unwrap().status, ItemStatus::Scheduled);
        assert_eq!(db.count_events().unwrap(), 0);
    }

    #[test]
    fn test_failed_event_rolls_back_status() {
        let db = temp_db();
        let now = dpdmark_core::time::now();
        let taken = NewEvent::new().into_event(now);
        db.insert_event(&taken).unwrap();

        let mail = EmailCampaign::new("Issue", "<p>body</p>", "a@b.c", now - Duration::minutes(1));
        db.insert_email_campaign(&mail).unwrap();

        // Same event id as an existing row: the append fails inside the transaction
        let err = db.dispatch_email_campaign(&mail.id, now, &taken).unwrap_err();
        assert!(matches!(err, MarketingError::Storage(_)));
        let loaded = db.get_email_campaign(&mail.id).unwrap();
        assert_eq!(loaded.status, ItemStatus::Scheduled);
        assert!(loaded.sent_at.is_none());
        assert_eq!(db.count_events().unwrap(), 1);
    }

    #[test]
    fn test_email_crud_and_due() {
        let db = temp_db();
        let now = dpdmark_core::time::now();
        let mail = EmailCampaign::new("Aug issue", "<p>Read</p>", "subscribers@dpd", now - Duration::seconds(5));
        db.insert_email_campaign(&mail).unwrap();

        assert_eq!(db.get_email_campaign(&mail.id).unwrap(), mail);
        assert_eq!(db.due_email_campaigns(now).unwrap().len(), 1);
        assert_eq!(db.list_email_campaigns(10).unwrap().len(), 1);

        let event = mail.dispatch_event(now, 100).into_event(now);
        assert!(db.dispatch_email_campaign(&mail.id, now, &event).unwrap());
        assert!(db.due_email_campaigns(now).unwrap().is_empty());
        assert_eq!(db.count_events_by_medium("email").unwrap(), 1);
    }
}
