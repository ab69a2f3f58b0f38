use std::sync::Arc;
use tracing::{error, warn};

use crate::helper::{error_chain_fmt, truncate_to_char_boundary};
use crate::ports::embedding_provider::{EmbeddingProvider, EmbeddingProviderError};

/// Dimensionality of the vectors returned by the provider
pub const VECTOR_DIMENSION: usize = 768;

/// Conservative limit, in bytes, of the text sent to the embedding endpoint
const MAX_EMBEDDING_SIZE: usize = 30_000;

/// Bound on the prefix handed to the summarizer for oversized inputs
const SUMMARY_INPUT_SIZE: usize = 25_000;

/// Length requested for the abstractive summary
const SUMMARY_MAX_CHARS: usize = 5_000;

/// Service turning arbitrary-length text into a fixed-dimension vector.
///
/// Inputs above [`MAX_EMBEDDING_SIZE`] are summarized before embedding; if the
/// summarizer fails the text is hard-truncated instead.
pub struct EmbeddingsService {
    provider: Arc<dyn EmbeddingProvider>,
}

impl EmbeddingsService {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    #[tracing::instrument(name = "Generate embedding", skip(self, text))]
    pub async fn get_embedding(&self, text: &str) -> Result<Vec<f32>, EmbeddingsServiceError> {
        let processed = if text.len() > MAX_EMBEDDING_SIZE {
            self.summarize_or_truncate(text).await
        } else {
            text.to_string()
        };

        let embedding = self.provider.embed(&processed).await?;

        // Tolerated here: the vector index is the one to reject a wrong size
        if embedding.len() != VECTOR_DIMENSION {
            warn!(
                dimension = embedding.len(),
                expected = VECTOR_DIMENSION,
                "Embedding dimension does not match the expected dimension"
            );
        }

        Ok(embedding)
    }

    async fn summarize_or_truncate(&self, text: &str) -> String {
        let prefix = truncate_to_char_boundary(text, SUMMARY_INPUT_SIZE);

        match self.provider.summarize(prefix, SUMMARY_MAX_CHARS).await {
            Ok(summary) => {
                if summary.len() > MAX_EMBEDDING_SIZE {
                    truncate_to_char_boundary(&summary, MAX_EMBEDDING_SIZE).to_string()
                } else {
                    summary
                }
            }
            Err(err) => {
                error!(
                    error = ?err,
                    "Summarization failed, falling back to hard truncation"
                );
                truncate_to_char_boundary(text, MAX_EMBEDDING_SIZE).to_string()
            }
        }
    }
}

#[derive(thiserror::Error)]
pub enum EmbeddingsServiceError {
    #[error("Embedding generation failed: {0}")]
    GenerationFailed(#[from] EmbeddingProviderError),
}

impl std::fmt::Debug for EmbeddingsServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
