//! Typed records for the four persisted collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text::truncate_chars;

/// Upper bound for any single event attribute.
pub const MAX_EVENT_FIELD_CHARS: usize = 1024;

/// One traffic hit or dispatch action. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub content: Option<String>,
    pub term: Option<String>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

/// Event under construction. Every field is optional; the timestamp
/// defaults to the moment the event is recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEvent {
    pub timestamp: Option<DateTime<Utc>>,
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub content: Option<String>,
    pub term: Option<String>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

/// Blank strings become `None`, long ones are capped.
fn clean(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(truncate_chars(trimmed, MAX_EVENT_FIELD_CHARS).to_string())
}

macro_rules! event_setter {
    ($($field:ident),* $(,)?) => {
        $(
            pub fn $field(mut self, value: impl Into<String>) -> Self {
                self.$field = clean(Some(value.into()));
                self
            }
        )*
    };
}

impl NewEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = Some(ts);
        self
    }

    event_setter!(source, medium, campaign, content, term, ip, user_agent, referrer);

    /// Build from optional values, e.g. query parameters or headers.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        source: Option<String>,
        medium: Option<String>,
        campaign: Option<String>,
        content: Option<String>,
        term: Option<String>,
        ip: Option<String>,
        user_agent: Option<String>,
        referrer: Option<String>,
    ) -> Self {
        Self {
            timestamp: None,
            source: clean(source),
            medium: clean(medium),
            campaign: clean(campaign),
            content: clean(content),
            term: clean(term),
            ip: clean(ip),
            user_agent: clean(user_agent),
            referrer: clean(referrer),
        }
    }

    /// Finalize with a fresh id; `now` fills a missing timestamp.
    pub fn into_event(self, now: DateTime<Utc>) -> Event {
        Event {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: self.timestamp.unwrap_or(now),
            source: self.source,
            medium: self.medium,
            campaign: self.campaign,
            content: self.content,
            term: self.term,
            ip: self.ip,
            user_agent: self.user_agent,
            referrer: self.referrer,
        }
    }
}

/// Lifecycle of a schedulable item. Only `Scheduled -> Sent` exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Scheduled,
    Sent,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Sent => "sent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(Self::Scheduled),
            "sent" => Some(Self::Sent),
            _ => None,
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two kinds of schedulable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Social,
    Email,
}

impl ItemKind {
    /// Medium tag written on the dispatch event.
    pub fn medium(&self) -> &'static str {
        match self {
            Self::Social => "social",
            Self::Email => "email",
        }
    }

    /// Campaign tag written on the dispatch event.
    pub fn campaign(&self) -> &'static str {
        match self {
            Self::Social => "scheduled_social",
            Self::Email => "scheduled_email",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialPost {
    pub id: String,
    pub channel: String,
    pub content: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: ItemStatus,
    pub sent_at: Option<DateTime<Utc>>,
}

impl SocialPost {
    pub fn new(channel: &str, content: &str, scheduled_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            channel: channel.to_string(),
            content: content.to_string(),
            scheduled_at,
            status: ItemStatus::Scheduled,
            sent_at: None,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == ItemStatus::Scheduled && self.scheduled_at <= now
    }

    /// Event recorded when this post is dispatched at `now`.
    pub fn dispatch_event(&self, now: DateTime<Utc>, preview_chars: usize) -> NewEvent {
        let kind = ItemKind::Social;
        NewEvent::new()
            .at(now)
            .source(self.channel.as_str())
            .medium(kind.medium())
            .campaign(kind.campaign())
            .content(truncate_chars(&self.content, preview_chars))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailCampaign {
    pub id: String,
    pub subject: String,
    pub body: String,
    /// Comma-separated addresses or a list name.
    pub to_list: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: ItemStatus,
    pub sent_at: Option<DateTime<Utc>>,
}

impl EmailCampaign {
    pub fn new(subject: &str, body: &str, to_list: &str, scheduled_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            to_list: to_list.to_string(),
            scheduled_at,
            status: ItemStatus::Scheduled,
            sent_at: None,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == ItemStatus::Scheduled && self.scheduled_at <= now
    }

    /// Event recorded when this campaign is dispatched at `now`.
    pub fn dispatch_event(&self, now: DateTime<Utc>, preview_chars: usize) -> NewEvent {
        let kind = ItemKind::Email;
        NewEvent::new()
            .at(now)
            .source("email")
            .medium(kind.medium())
            .campaign(kind.campaign())
            .content(truncate_chars(&self.subject, preview_chars))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogPost {
    pub fn new(slug: &str, title: &str, body: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            slug: slug.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
