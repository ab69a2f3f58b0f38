use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::content_item::ContentItem;
use crate::helper::error_chain_fmt;

/// Port to the durable content store
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn create(&self, item: &ContentItem) -> Result<(), ContentRepositoryError>;

    async fn find_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<ContentItem>, ContentRepositoryError>;

    /// Delete-by-filter semantics: removing a missing item, or an item owned
    /// by someone else, is not an error and is indistinguishable from a
    /// real deletion.
    async fn delete_by_id_and_owner(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<(), ContentRepositoryError>;
}

#[derive(thiserror::Error)]
pub enum ContentRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid stored record: {0}")]
    MappingError(String),
}

impl std::fmt::Debug for ContentRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
