use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::content_point::ContentPoint;
use crate::helper::error_chain_fmt;

/// Port to the external similarity-search index
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn upsert(&self, point: ContentPoint) -> Result<(), VectorIndexError>;

    async fn delete(&self, id: Uuid) -> Result<(), VectorIndexError>;
}

#[derive(thiserror::Error)]
pub enum VectorIndexError {
    #[error("Error from the vector index: {0}")]
    IndexError(String),
    /// The index rejected the vector because its size does not match the
    /// collection. Logged distinctly by callers, otherwise handled like any
    /// other index failure.
    #[error("Vector dimension mismatch: {0}")]
    DimensionMismatch(String),
}

impl std::fmt::Debug for VectorIndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
