//! # dpdmark core
//!
//! Shared building blocks for the marketing backend: the typed data model,
//! configuration loading and the error taxonomy used by every other crate.
//!
//! ```text
//! dpdmark-core ── models, config, error
//!   ├── dpdmark-db         (SQLite store)
//!   ├── dpdmark-scheduler  (metrics recorder + dispatch loop)
//!   ├── dpdmark-content    (blog, traffic summary, feeds)
//!   └── dpdmark-gateway    (axum HTTP surface)
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod text;
pub mod time;

pub use config::MarketingConfig;
pub use error::{MarketingError, Result};
pub use models::{BlogPost, EmailCampaign, Event, ItemKind, ItemStatus, NewEvent, SocialPost};
