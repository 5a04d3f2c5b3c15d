//! # dpdmark gateway
//!
//! Axum router over the store, the metrics recorder, the dispatcher and the
//! content API. Handlers only parse, delegate and serialize.

pub mod context;
pub mod dashboard;
pub mod error;
pub mod routes;
pub mod server;

pub use context::AppContext;
pub use error::ApiError;
pub use server::{AppState, build_router, serve};
