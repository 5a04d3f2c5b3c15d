//! Public article pages.

use dpdmark_core::models::BlogPost;
use dpdmark_core::text::{escape_xml, truncate_chars};
use dpdmark_core::time::format_ts;

const META_DESCRIPTION_CHARS: usize = 140;

const PAGE_STYLE: &str = "body{font-family:Inter,system-ui;max-width:800px;margin:40px auto;\
                          padding:0 16px;line-height:1.6} h1{line-height:1.25} \
                          .muted{color:#667;font-size:13px}";

/// Render a published post. The title is escaped; the body is stored
/// HTML and goes out as-is.
pub fn render_post_page(post: &BlogPost, site_title: &str) -> String {
    let title = escape_xml(&post.title);
    let description = escape_xml(truncate_chars(&post.title, META_DESCRIPTION_CHARS));
    format!(
        "<!doctype html><html><head>\
         <meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title} – {site}</title>\
         <meta name=\"description\" content=\"{description}\">\
         <link rel=\"alternate\" type=\"application/rss+xml\" title=\"RSS\" href=\"/rss.xml\">\
         <style>{PAGE_STYLE}</style>\
         </head><body><article>\
         <h1>{title}</h1>\
         <div class=\"muted\">Updated {updated}</div>\
         <div>{body}</div>\
         </article></body></html>",
        site = escape_xml(site_title),
        updated = format_ts(post.updated_at),
        body = post.body,
    )
}

pub fn render_not_found() -> String {
    "<!doctype html><html><head><meta charset=\"utf-8\"><title>Not found</title></head>\
     <body><h1>Not found</h1></body></html>"
        .to_string()
}
