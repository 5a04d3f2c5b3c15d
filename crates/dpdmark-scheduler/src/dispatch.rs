//! Dispatcher: one sweep promotes every due item to `sent`.
//!
//! `now` is snapshotted once per sweep and used for the due query, for
//! `sent_at` and for the event timestamp. Each item is handled on its own:
//! a failure is logged and counted, and the sweep moves on. The store's
//! conditional flip makes re-processing an already-sent item a no-op.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use dpdmark_core::models::ItemKind;
use dpdmark_core::time;
use serde::Serialize;

use crate::store::CampaignStore;

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepReport {
    pub started_at: Option<DateTime<Utc>>,
    pub social_sent: usize,
    pub email_sent: usize,
    /// Items (or whole queries) that failed and stay scheduled.
    pub failures: usize,
    /// Another sweep was already running.
    pub skipped: bool,
}

impl SweepReport {
    pub fn total_sent(&self) -> usize {
        self.social_sent + self.email_sent
    }
}

/// Clears the single-flight flag when the sweep ends, even on panic.
struct SweepGuard<'a>(&'a AtomicBool);

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Dispatcher {
    store: Arc<dyn CampaignStore>,
    preview_chars: usize,
    running: AtomicBool,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn CampaignStore>, preview_chars: usize) -> Self {
        Self {
            store,
            preview_chars,
            running: AtomicBool::new(false),
        }
    }

    fn try_begin(&self) -> Option<SweepGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SweepGuard(&self.running))
    }

    /// Sweep with the current time.
    pub fn sweep_now(&self) -> SweepReport {
        self.sweep(time::now())
    }

    /// Promote everything due at `now`.
    pub fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        let Some(_guard) = self.try_begin() else {
            tracing::debug!("⏭️ Sweep already in progress, skipping");
            return SweepReport {
                skipped: true,
                ..SweepReport::default()
            };
        };

        let mut report = SweepReport {
            started_at: Some(now),
            ..SweepReport::default()
        };
        self.sweep_social(now, &mut report);
        self.sweep_email(now, &mut report);

        if report.total_sent() > 0 || report.failures > 0 {
            tracing::info!(
                "📤 Sweep done: {} social, {} email sent, {} failure(s)",
                report.social_sent,
                report.email_sent,
                report.failures
            );
        } else {
            tracing::debug!("Sweep done: nothing due");
        }
        report
    }

    fn sweep_social(&self, now: DateTime<Utc>, report: &mut SweepReport) {
        let due = match self.store.due_social_posts(now) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("⚠️ Failed to query due social posts: {e}");
                report.failures += 1;
                return;
            }
        };

        for post in due {
            let event = post.dispatch_event(now, self.preview_chars).into_event(now);
            match self.store.dispatch_social_post(&post.id, now, &event) {
                Ok(true) => {
                    tracing::info!("📣 Social post {} sent on {}", post.id, post.channel);
                    report.social_sent += 1;
                }
                Ok(false) => tracing::debug!("Social post {} already sent", post.id),
                Err(e) => {
                    tracing::warn!("⚠️ Dispatch failed for social post {}: {e}", post.id);
                    report.failures += 1;
                }
            }
        }
    }

    fn sweep_email(&self, now: DateTime<Utc>, report: &mut SweepReport) {
        let due = match self.store.due_email_campaigns(now) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("⚠️ Failed to query due email campaigns: {e}");
                report.failures += 1;
                return;
            }
        };

        for campaign in due {
            let event = campaign
                .dispatch_event(now, self.preview_chars)
                .into_event(now);
            match self.store.dispatch_email_campaign(&campaign.id, now, &event) {
                Ok(true) => {
                    tracing::info!(
                        "📧 Email campaign {} sent ({})",
                        campaign.id,
                        ItemKind::Email.campaign()
                    );
                    report.email_sent += 1;
                }
                Ok(false) => tracing::debug!("Email campaign {} already sent", campaign.id),
                Err(e) => {
                    tracing::warn!("⚠️ Dispatch failed for email campaign {}: {e}", campaign.id);
                    report.failures += 1;
                }
            }
        }
    }
}
