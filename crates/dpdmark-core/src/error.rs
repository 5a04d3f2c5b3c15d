//! Error taxonomy shared by the store, scheduler, content and gateway crates.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, MarketingError>;

#[derive(Debug, Error)]
pub enum MarketingError {
    /// A blog post with this slug already exists. The caller picks another slug.
    #[error("slug already exists: {0}")]
    DuplicateSlug(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Any fault of the backing store.
    #[error("storage failure: {0}")]
    Storage(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MarketingError {
    pub fn storage(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Storage(format!("{context}: {err}"))
    }

    /// Whether the caller can recover by changing its input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DuplicateSlug(_) | Self::NotFound(_) | Self::InvalidInput(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_helper_formats_context() {
        let err = MarketingError::storage("Insert event", "disk I/O error");
        assert_eq!(err.to_string(), "storage failure: Insert event: disk I/O error");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_duplicate_slug_is_recoverable() {
        let err = MarketingError::DuplicateSlug("hello".into());
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "slug already exists: hello");
    }
}
