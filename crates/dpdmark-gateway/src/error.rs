//! HTTP mapping of [`MarketingError`].

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dpdmark_core::error::MarketingError;

/// Handler error. Bodies always carry `{ok: false, message}`.
#[derive(Debug)]
pub struct ApiError(pub MarketingError);

impl From<MarketingError> for ApiError {
    fn from(err: MarketingError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            MarketingError::DuplicateSlug(_) => StatusCode::CONFLICT,
            MarketingError::NotFound(_) => StatusCode::NOT_FOUND,
            MarketingError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            MarketingError::Storage(_) | MarketingError::Config(_) | MarketingError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing text. Internal faults are not described.
    pub fn message(&self) -> String {
        match &self.0 {
            MarketingError::DuplicateSlug(_) => "Slug already exists".into(),
            MarketingError::NotFound(what) => format!("Not found: {what}"),
            MarketingError::InvalidInput(why) => why.clone(),
            _ => "Internal error".into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if !self.0.is_recoverable() {
            tracing::error!("❌ Request failed: {}", self.0);
        }
        let body = serde_json::json!({"ok": false, "message": self.message()});
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (MarketingError::DuplicateSlug("a".into()), StatusCode::CONFLICT),
            (MarketingError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (MarketingError::InvalidInput("bad".into()), StatusCode::BAD_REQUEST),
            (MarketingError::Storage("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }

    #[test]
    fn test_storage_detail_hidden() {
        let err = ApiError(MarketingError::Storage("/var/db locked".into()));
        assert_eq!(err.message(), "Internal error");
        assert_eq!(
            ApiError(MarketingError::DuplicateSlug("a".into())).message(),
            "Slug already exists"
        );
    }
}
