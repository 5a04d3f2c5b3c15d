//! Row mappers, the only place that reads columns by position.

use chrono::{DateTime, Utc};
use dpdmark_core::models::{BlogPost, EmailCampaign, ItemStatus, SocialPost};
use dpdmark_core::time::parse_ts;
use rusqlite::Row;
use rusqlite::types::Type;

pub(crate) const SOCIAL_SELECT: &str =
    "SELECT id, channel, content, scheduled_at, status, sent_at FROM social_posts";

pub(crate) const EMAIL_SELECT: &str =
    "SELECT id, subject, body, to_list, scheduled_at, status, sent_at FROM email_campaigns";

pub(crate) const BLOG_SELECT: &str =
    "SELECT id, slug, title, body, created_at, updated_at FROM blog_posts";

fn conversion_error(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into())
}

fn ts_at(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_ts(&raw).ok_or_else(|| conversion_error(idx, format!("bad timestamp '{raw}'")))
}

fn opt_ts_at(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        Some(s) => parse_ts(&s)
            .map(Some)
            .ok_or_else(|| conversion_error(idx, format!("bad timestamp '{s}'"))),
        None => Ok(None),
    }
}

fn status_at(row: &Row, idx: usize) -> rusqlite::Result<ItemStatus> {
    let raw: String = row.get(idx)?;
    ItemStatus::parse(&raw).ok_or_else(|| conversion_error(idx, format!("bad status '{raw}'")))
}

pub(crate) fn row_to_social(row: &Row) -> rusqlite::Result<SocialPost> {
    Ok(SocialPost {
        id: row.get(0)?,
        channel: row.get(1)?,
        content: row.get(2)?,
        scheduled_at: ts_at(row, 3)?,
        status: status_at(row, 4)?,
        sent_at: opt_ts_at(row, 5)?,
    })
}

pub(crate) fn row_to_email(row: &Row) -> rusqlite::Result<EmailCampaign> {
    Ok(EmailCampaign {
        id: row.get(0)?,
        subject: row.get(1)?,
        body: row.get(2)?,
        to_list: row.get(3)?,
        scheduled_at: ts_at(row, 4)?,
        status: status_at(row, 5)?,
        sent_at: opt_ts_at(row, 6)?,
    })
}

pub(crate) fn row_to_blog(row: &Row) -> rusqlite::Result<BlogPost> {
    Ok(BlogPost {
        id: row.get(0)?,
        slug: row.get(1)?,
        title: row.get(2)?,
        body: row.get(3)?,
        created_at: ts_at(row, 4)?,
        updated_at: ts_at(row, 5)?,
    })
}
