//! API route handlers for the gateway.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{Extensions, HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use dpdmark_content::NewBlogPost;
use dpdmark_content::pages::{render_not_found, render_post_page};
use dpdmark_content::summary::DailyCount;
use dpdmark_core::error::MarketingError;
use dpdmark_core::models::{BlogPost, EmailCampaign, NewEvent, SocialPost};
use dpdmark_core::time::{self, format_ts, parse_client_datetime};
use dpdmark_scheduler::SweepReport;
use serde::Deserialize;

use crate::error::ApiError;
use crate::server::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// 1×1 transparent GIF served by `/track`.
pub static PIXEL_GIF: [u8; 43] = [
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xff, 0xff, 0xff, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3b,
];

const LIST_LIMIT: usize = 100;
const DEFAULT_SUMMARY_DAYS: u32 = 14;

/// Serve the dashboard HTML page.
pub async fn dashboard_page() -> Html<&'static str> {
    Html(crate::dashboard::dashboard_html())
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "dpdmark",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

// ── Tracking ────────────────────────────────────────────

#[derive(Debug, Default, PartialEq)]
pub struct TrackParams {
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_content: Option<String>,
    pub utm_term: Option<String>,
}

impl TrackParams {
    /// Last value wins for a repeated key; unknown keys are ignored.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "utm_source" => &mut params.utm_source,
                "utm_medium" => &mut params.utm_medium,
                "utm_campaign" => &mut params.utm_campaign,
                "utm_content" => &mut params.utm_content,
                "utm_term" => &mut params.utm_term,
                _ => continue,
            };
            *slot = Some(value);
        }
        params
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Peer address when served with connect info, else the first `X-Forwarded-For` hop.
fn client_ip(extensions: &Extensions, headers: &HeaderMap) -> Option<String> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .or_else(|| {
            header_str(headers, "x-forwarded-for")
                .and_then(|v| v.split(',').next().map(|s| s.trim().to_string()))
        })
}

/// Tracking pixel. Always answers with the GIF; an unreadable query string
/// counts as no parameters and a failed write is only logged.
pub async fn track(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    extensions: Extensions,
    headers: HeaderMap,
) -> Response {
    let params = match query {
        Ok(Query(pairs)) => TrackParams::from_pairs(pairs),
        Err(e) => {
            tracing::debug!("Ignoring unreadable tracking query: {e}");
            TrackParams::default()
        }
    };
    let referrer = header_str(&headers, "referer").or_else(|| header_str(&headers, "referrer"));
    let event = NewEvent::from_parts(
        params.utm_source,
        params.utm_medium,
        params.utm_campaign,
        params.utm_content,
        params.utm_term,
        client_ip(&extensions, &headers),
        header_str(&headers, "user-agent"),
        referrer,
    );
    if let Err(e) = state.metrics.record(event) {
        tracing::warn!("⚠️ Tracking hit not recorded: {e}");
    }

    (
        [
            (header::CONTENT_TYPE, "image/gif"),
            (header::CACHE_CONTROL, "no-store, max-age=0"),
        ],
        &PIXEL_GIF[..],
    )
        .into_response()
}

// ── Scheduling ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SocialScheduleRequest {
    pub channel: String,
    #[serde(default)]
    pub content: String,
    pub scheduled_at: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailScheduleRequest {
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub to_list: String,
    pub scheduled_at: String,
}

fn parse_schedule_time(raw: &str) -> Result<chrono::DateTime<chrono::Utc>, MarketingError> {
    parse_client_datetime(raw).ok_or_else(|| {
        MarketingError::InvalidInput(format!("scheduled_at '{raw}' is not a valid datetime"))
    })
}

fn require_non_blank(value: &str, field: &str) -> Result<(), MarketingError> {
    if value.trim().is_empty() {
        return Err(MarketingError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}

pub async fn schedule_social(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SocialScheduleRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    require_non_blank(&body.channel, "channel")?;
    let scheduled_at = parse_schedule_time(&body.scheduled_at)?;

    let post = SocialPost::new(body.channel.trim(), &body.content, scheduled_at);
    state.db.insert_social_post(&post)?;
    tracing::info!(
        "🗓️ Social post {} scheduled on {} for {}",
        post.id,
        post.channel,
        format_ts(scheduled_at)
    );

    Ok(Json(serde_json::json!({
        "ok": true,
        "id": post.id,
        "message": format!("Scheduled {} post for {}", post.channel, format_ts(scheduled_at)),
    })))
}

pub async fn schedule_email(
    State(state): State<Arc<AppState>>,
    Json(body): Json<EmailScheduleRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    require_non_blank(&body.subject, "subject")?;
    let scheduled_at = parse_schedule_time(&body.scheduled_at)?;

    let campaign = EmailCampaign::new(body.subject.trim(), &body.body, &body.to_list, scheduled_at);
    state.db.insert_email_campaign(&campaign)?;
    tracing::info!("🗓️ Email campaign {} scheduled for {}", campaign.id, format_ts(scheduled_at));

    Ok(Json(serde_json::json!({
        "ok": true,
        "id": campaign.id,
        "message": format!("Scheduled email for {}", format_ts(scheduled_at)),
    })))
}

pub async fn list_social(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<SocialPost>>> {
    Ok(Json(state.db.list_social_posts(LIST_LIMIT)?))
}

pub async fn list_email(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<EmailCampaign>>> {
    Ok(Json(state.db.list_email_campaigns(LIST_LIMIT)?))
}

/// Run one sweep now, off the async workers.
pub async fn run_scheduler(State(state): State<Arc<AppState>>) -> ApiResult<Json<SweepReport>> {
    let dispatcher = state.dispatcher.clone();
    let report = tokio::task::spawn_blocking(move || dispatcher.sweep_now())
        .await
        .map_err(|e| MarketingError::Storage(format!("sweep task failed: {e}")))?;
    Ok(Json(report))
}

// ── Blog & metrics ──────────────────────────────────────

pub async fn publish_blog(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewBlogPost>,
) -> ApiResult<Json<serde_json::Value>> {
    let post = state.content.publish(&body)?;
    Ok(Json(serde_json::json!({
        "ok": true,
        "message": format!("Published '{}'", post.title),
    })))
}

pub async fn list_blog(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<BlogPost>>> {
    Ok(Json(state.content.list_posts(Some(LIST_LIMIT))?))
}

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    pub days: Option<u32>,
}

pub async fn metrics_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SummaryParams>,
) -> ApiResult<Json<Vec<DailyCount>>> {
    let days = params.days.unwrap_or(DEFAULT_SUMMARY_DAYS);
    let today = time::now().date_naive();
    Ok(Json(state.content.traffic_summary(days, today)?))
}

pub async fn blog_page(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Response> {
    match state.content.get_post(&slug) {
        Ok(post) => {
            Ok(Html(render_post_page(&post, &state.config.server.site_title)).into_response())
        }
        Err(MarketingError::NotFound(_)) => {
            Ok((StatusCode::NOT_FOUND, Html(render_not_found())).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// ── SEO ─────────────────────────────────────────────────

pub async fn robots(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!(
            "User-agent: *\nAllow: /\nSitemap: {}/sitemap.xml\n",
            state.feed.base_url
        ),
    )
}

pub async fn sitemap(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let xml = state.content.sitemap(&state.feed.base_url)?;
    Ok(([(header::CONTENT_TYPE, "application/xml")], xml).into_response())
}

pub async fn rss(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let xml = state.content.rss(&state.feed)?;
    Ok(([(header::CONTENT_TYPE, "application/rss+xml")], xml).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_is_gif89a() {
        assert_eq!(&PIXEL_GIF[..6], b"GIF89a");
        assert_eq!(PIXEL_GIF.last(), Some(&0x3b));
    }

    #[test]
    fn test_track_params_last_value_wins() {
        let pairs = [
            ("utm_source", "a"),
            ("utm_medium", "social"),
            ("utm_source", "b"),
            ("ref", "ignored"),
        ]
        .map(|(k, v)| (k.to_string(), v.to_string()));
        let params = TrackParams::from_pairs(pairs);
        assert_eq!(params.utm_source.as_deref(), Some("b"));
        assert_eq!(params.utm_medium.as_deref(), Some("social"));
        assert!(params.utm_campaign.is_none());
        assert_eq!(TrackParams::from_pairs(Vec::new()), TrackParams::default());
    }

    #[test]
    fn test_client_ip_falls_back_to_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        assert_eq!(
            client_ip(&Extensions::new(), &headers).as_deref(),
            Some("203.0.113.7")
        );

        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 9000))));
        assert_eq!(client_ip(&extensions, &headers).as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn test_schedule_time_validation() {
        assert!(parse_schedule_time("2026-10-17T09:30:00Z").is_ok());
        assert!(matches!(
            parse_schedule_time("tomorrow"),
            Err(MarketingError::InvalidInput(_))
        ));
        assert!(require_non_blank("  ", "channel").is_err());
    }
}
