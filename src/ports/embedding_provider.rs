use async_trait::async_trait;

use crate::helper::error_chain_fmt;

/// Port to the external generative/embedding provider
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Maps a text into the provider's fixed-dimension vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingProviderError>;

    /// Requests an abstractive summary of `text`, bounded to roughly
    /// `max_chars` characters
    async fn summarize(
        &self,
        text: &str,
        max_chars: usize,
    ) -> Result<String, EmbeddingProviderError>;
}

#[derive(thiserror::Error)]
pub enum EmbeddingProviderError {
    #[error("Provider request failed: {0}")]
    RequestError(String),
    #[error("Unexpected provider response: {0}")]
    MalformedResponse(String),
}

impl std::fmt::Debug for EmbeddingProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
