//! # dpdmark content
//!
//! Blog publishing and lookup, the daily traffic summary, and the public
//! sitemap / RSS / article renderers. Everything here reads or writes
//! through [`dpdmark_db::MarketingDb`]; rendering functions are pure.

pub mod blog;
pub mod feeds;
pub mod pages;
pub mod summary;

pub use blog::{ContentApi, NewBlogPost};
pub use feeds::{FeedSettings, rss_xml, sitemap_xml};
pub use summary::{DailyCount, MAX_SUMMARY_DAYS};
