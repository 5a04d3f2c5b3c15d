//! Content API: blog publishing and lookup, traffic summary, feeds.

use std::sync::Arc;

use chrono::NaiveDate;
use dpdmark_core::error::{MarketingError, Result};
use dpdmark_core::models::BlogPost;
use dpdmark_core::time;
use dpdmark_db::MarketingDb;
use serde::Deserialize;

use crate::feeds::{self, FeedSettings};
use crate::summary::{self, DailyCount};

/// Publish request body.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBlogPost {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl NewBlogPost {
    pub fn new(slug: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            body: body.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        let slug = self.slug.trim();
        if slug.is_empty() {
            return Err(MarketingError::InvalidInput("slug must not be empty".into()));
        }
        if slug.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(MarketingError::InvalidInput(format!(
                "slug '{slug}' must not contain whitespace or '/'"
            )));
        }
        if self.title.trim().is_empty() {
            return Err(MarketingError::InvalidInput("title must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct ContentApi {
    db: Arc<MarketingDb>,
}

impl ContentApi {
    pub fn new(db: Arc<MarketingDb>) -> Self {
        Self { db }
    }

    /// Create a post. A taken slug fails with `DuplicateSlug` and leaves the
    /// existing post untouched.
    pub fn publish(&self, input: &NewBlogPost) -> Result<BlogPost> {
        input.validate()?;
        let post = BlogPost::new(input.slug.trim(), input.title.trim(), &input.body, time::now());
        match self.db.insert_blog_post(&post) {
            Ok(()) => {
                tracing::info!("📝 Published '{}' at /blog/{}", post.title, post.slug);
                Ok(post)
            }
            Err(e @ MarketingError::DuplicateSlug(_)) => {
                tracing::debug!("Publish rejected: {e}");
                Err(e)
            }
            Err(e) => {
                tracing::error!("Publish '{}' failed: {e}", post.slug);
                Err(e)
            }
        }
    }

    pub fn get_post(&self, slug: &str) -> Result<BlogPost> {
        self.db.get_blog_post(slug)
    }

    /// Newest first.
    pub fn list_posts(&self, limit: Option<usize>) -> Result<Vec<BlogPost>> {
        self.db.list_blog_posts(limit)
    }

    /// One bucket per day for the `days` days ending on `today`.
    pub fn traffic_summary(&self, days: u32, today: NaiveDate) -> Result<Vec<DailyCount>> {
        let start = summary::window_start(days, today)?;
        let dates = self.db.event_dates_since(start)?;
        summary::bucket_counts(&dates, days, today)
    }

    pub fn sitemap(&self, base_url: &str) -> Result<String> {
        let posts = self.db.list_blog_posts(None)?;
        Ok(feeds::sitemap_xml(&posts, base_url))
    }

    pub fn rss(&self, settings: &FeedSettings) -> Result<String> {
        let posts = self.db.list_blog_posts(Some(settings.item_limit))?;
        Ok(feeds::rss_xml(&posts, settings))
    }
}
