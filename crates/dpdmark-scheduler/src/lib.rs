//! # dpdmark scheduler
//!
//! Promotes due social posts and email campaigns to `sent` on a fixed
//! interval and mirrors every promotion into the event log.
//!
//! ## Architecture
//! ```text
//! SchedulerHandle (tokio interval, owned by the app context)
//!   └── every tick → Dispatcher::sweep(now)
//!         ├── due social posts   → mark sent + append event (one transaction)
//!         └── due email campaigns → mark sent + append event (one transaction)
//!
//! MetricsRecorder
//!   └── tracking hits → append event
//! ```
//!
//! No outbound delivery happens here; "sent" only records that the item's
//! time has passed and it was processed.

pub mod dispatch;
pub mod engine;
pub mod metrics;
pub mod store;

pub use dispatch::{Dispatcher, SweepReport};
pub use engine::{SchedulerHandle, spawn_scheduler};
pub use metrics::MetricsRecorder;
pub use store::CampaignStore;
