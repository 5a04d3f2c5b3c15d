//! Sitemap and RSS 2.0 rendering.
//!
//! Both take posts already ordered by `updated_at` descending, as
//! [`dpdmark_db::MarketingDb::list_blog_posts`] returns them.

use dpdmark_core::config::{FeedConfig, ServerConfig};
use dpdmark_core::models::BlogPost;
use dpdmark_core::text::{cdata, escape_xml, truncate_chars};
use dpdmark_core::time::{format_ts, rfc2822};

/// Everything the RSS channel header and item bodies need.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    /// Public base URL, no trailing slash.
    pub base_url: String,
    pub title: String,
    pub description: String,
    pub item_limit: usize,
    pub description_chars: usize,
}

impl FeedSettings {
    pub fn from_config(server: &ServerConfig, feeds: &FeedConfig) -> Self {
        Self {
            base_url: server.base_url().to_string(),
            title: format!("{} Feed", server.site_title),
            description: "Latest content".into(),
            item_limit: feeds.rss_limit,
            description_chars: feeds.rss_description_chars,
        }
    }
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default(), &FeedConfig::default())
    }
}

/// Public URL of a post.
pub fn post_url(base_url: &str, slug: &str) -> String {
    format!("{}/blog/{}", base_url.trim_end_matches('/'), slug)
}

/// One `<url>` per post.
pub fn sitemap_xml(posts: &[BlogPost], base_url: &str) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">",
    );
    for post in posts {
        xml.push_str(&format!(
            "<url><loc>{}</loc><lastmod>{}</lastmod></url>",
            escape_xml(&post_url(base_url, &post.slug)),
            format_ts(post.updated_at),
        ));
    }
    xml.push_str("</urlset>");
    xml
}

/// Item description: hard cut at `max` characters, `...` when cut.
pub fn description_preview(body: &str, max: usize) -> String {
    let cut = truncate_chars(body, max);
    if cut.len() < body.len() {
        format!("{cut}...")
    } else {
        cut.to_string()
    }
}

/// RSS 2.0 channel with at most `settings.item_limit` items.
pub fn rss_xml(posts: &[BlogPost], settings: &FeedSettings) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <rss version=\"2.0\"><channel>\
         <title>{}</title><link>{}</link><description>{}</description>",
        escape_xml(&settings.title),
        escape_xml(&settings.base_url),
        escape_xml(&settings.description),
    );
    for post in posts.iter().take(settings.item_limit) {
        let link = escape_xml(&post_url(&settings.base_url, &post.slug));
        xml.push_str(&format!(
            "<item><title>{}</title><link>{link}</link><guid isPermaLink=\"true\">{link}</guid>\
             <pubDate>{}</pubDate><description>{}</description></item>",
            escape_xml(&post.title),
            rfc2822(post.created_at),
            cdata(&description_preview(&post.body, settings.description_chars)),
        ));
    }
    xml.push_str("</channel></rss>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn posts(n: usize) -> Vec<BlogPost> {
        let base = dpdmark_core::time::now();
        (0..n)
            .map(|i| {
                let at = base - Duration::minutes(i as i64);
                BlogPost::new(&format!("post-{i}"), &format!("Post {i}"), "body", at)
            })
            .collect()
    }

    #[test]
    fn test_sitemap_one_entry_per_post() {
        let all = posts(25);
        let xml = sitemap_xml(&all, "https://dpd.example/");
        assert_eq!(xml.matches("<url>").count(), 25);
        assert!(xml.contains("<loc>https://dpd.example/blog/post-0</loc>"));
        assert!(xml.starts_with("<?xml"));
        // Order follows the input (newest first)
        assert!(xml.find("post-0<").unwrap() < xml.find("post-1<").unwrap());
    }

    #[test]
    fn test_sitemap_empty() {
        let xml = sitemap_xml(&[], "http://localhost:8000");
        assert_eq!(xml.matches("<url>").count(), 0);
        assert!(xml.ends_with("</urlset>"));
    }

    #[test]
    fn test_rss_capped_at_limit() {
        let settings = FeedSettings::default();
        assert_eq!(rss_xml(&posts(30), &settings).matches("<item>").count(), 20);
        assert_eq!(rss_xml(&posts(3), &settings).matches("<item>").count(), 3);
    }

    #[test]
    fn test_rss_description_hard_cut() {
        let mut post = posts(1).remove(0);
        post.body = "a".repeat(450);
        let xml = rss_xml(&[post], &FeedSettings::default());
        let expected = format!("<![CDATA[{}...]]>", "a".repeat(400));
        assert!(xml.contains(&expected));
    }

    #[test]
    fn test_rss_short_body_not_marked() {
        assert_eq!(description_preview("short", 400), "short");
        assert_eq!(description_preview("abcdef", 3), "abc...");
    }

    #[test]
    fn test_rss_escapes_title() {
        let mut post = posts(1).remove(0);
        post.title = "Tips & <Tricks>".into();
        let xml = rss_xml(&[post], &FeedSettings::default());
        assert!(xml.contains("<title>Tips &amp; &lt;Tricks&gt;</title>"));
        assert!(xml.contains("<title>DPD Journals Feed</title>"));
    }
}
