use async_trait::async_trait;

use crate::domain::entities::extracted_metadata::ExtractedMetadata;
use crate::helper::error_chain_fmt;

/// Port to the link fetchers: one method per extraction path.
///
/// Each fetch performs a network round trip and a parse, and can fail with a
/// classified error carrying a human-readable cause. None of them silently
/// produce empty metadata.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch_video(&self, link: &str) -> Result<ExtractedMetadata, MediaFetcherError>;

    async fn fetch_social_post(&self, link: &str) -> Result<ExtractedMetadata, MediaFetcherError>;

    async fn fetch_website(&self, link: &str) -> Result<ExtractedMetadata, MediaFetcherError>;
}

#[derive(thiserror::Error)]
pub enum MediaFetcherError {
    #[error("Could not reach the linked page: {0}")]
    Unreachable(String),
    #[error("Unrecognized page structure: {0}")]
    UnexpectedStructure(String),
}

impl std::fmt::Debug for MediaFetcherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
