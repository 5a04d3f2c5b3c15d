//! Blog posts.

use dpdmark_core::error::{MarketingError, Result};
use dpdmark_core::models::BlogPost;
use dpdmark_core::time::format_ts;
use rusqlite::{ErrorCode, params};

use crate::MarketingDb;
use crate::rows::{BLOG_SELECT, row_to_blog};

impl MarketingDb {
    /// Insert a new post. A taken slug fails with `DuplicateSlug` and writes nothing.
    pub fn insert_blog_post(&self, post: &BlogPost) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO blog_posts (id, slug, title, body, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                post.id,
                post.slug,
                post.title,
                post.body,
                format_ts(post.created_at),
                format_ts(post.updated_at),
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(ref err, ref msg)
                if err.code == ErrorCode::ConstraintViolation
                    && msg.as_deref().is_none_or(|m| m.contains("slug")) =>
            {
                MarketingError::DuplicateSlug(post.slug.clone())
            }
            other => MarketingError::storage("Insert blog post", other),
        })?;
        Ok(())
    }

    pub fn get_blog_post(&self, slug: &str) -> Result<BlogPost> {
        let conn = self.lock()?;
        conn.query_row(&format!("{BLOG_SELECT} WHERE slug = ?1"), params![slug], row_to_blog)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    MarketingError::NotFound(format!("blog post '{slug}'"))
                }
                other => MarketingError::storage("Get blog post", other),
            })
    }

    /// Posts by `updated_at` descending, optionally capped.
    pub fn list_blog_posts(&self, limit: Option<usize>) -> Result<Vec<BlogPost>> {
        let conn = self.lock()?;
        // LIMIT -1 means no limit in SQLite
        let limit = limit.map(|n| n as i64).unwrap_or(-1);
        let mut stmt = conn
            .prepare(&format!(
                "{BLOG_SELECT} ORDER BY updated_at DESC, created_at DESC, slug LIMIT ?1"
            ))
            .map_err(|e| MarketingError::storage("Prepare", e))?;
        let posts = stmt
            .query_map(params![limit], row_to_blog)
            .map_err(|e| MarketingError::storage("Query blog posts", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| MarketingError::storage("Read blog post", e))?;
        Ok(posts)
    }

    pub fn count_blog_posts(&self) -> Result<u64> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM blog_posts", [], |r| r.get::<_, i64>(0))
            .map(|n| n as u64)
            .map_err(|e| MarketingError::storage("Count blog posts", e))
    }
}
