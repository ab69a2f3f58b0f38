use tracing::{error, info};
use uuid::Uuid;

use crate::domain::entities::content_item::{ContentItem, ContentType};
use crate::domain::entities::content_point::ContentPoint;
use crate::domain::services::embeddings_service::EmbeddingsService;
use crate::domain::services::media_extractor::{
    ContentSource, MediaExtractor, MediaExtractorError,
};
use crate::helper::error_chain_fmt;
use crate::ports::content_repository::{ContentRepository, ContentRepositoryError};
use crate::ports::vector_index::{VectorIndex, VectorIndexError};

#[derive(Debug)]
pub struct IngestContentCommand {
    pub owner_id: Uuid,
    pub link: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Fate of the best-effort embedding/indexing tail of the pipeline.
///
/// `Degraded` never changes the user-visible outcome: once the item is
/// persisted, the ingestion is a success.
#[derive(Debug, PartialEq)]
pub enum IndexingOutcome {
    Indexed,
    Degraded(String),
}

#[derive(Debug)]
pub struct IngestOutcome {
    pub item: ContentItem,
    pub indexing: IndexingOutcome,
}

/// Runs one ingestion: classify, extract, persist, embed, index.
///
/// The first two stages short-circuit: an extraction error leaves no trace,
/// a persistence error leaves no vector work. Everything after a successful
/// store write is advisory.
#[tracing::instrument(
    name = "Ingest content",
    skip(media_extractor, content_repository, embeddings_service, vector_index),
    fields(owner_id = %command.owner_id)
)]
pub async fn ingest_content(
    media_extractor: &MediaExtractor,
    content_repository: &dyn ContentRepository,
    embeddings_service: &EmbeddingsService,
    vector_index: &dyn VectorIndex,
    command: IngestContentCommand,
) -> Result<IngestOutcome, IngestContentError> {
    let source = ContentSource::classify(
        command.link.as_deref(),
        command.title.as_deref(),
        command.content.as_deref(),
    );

    let metadata = media_extractor.extract(&source).await?;

    // The caller-supplied title wins over the extracted one
    let title = match command.title {
        Some(title) if !title.is_empty() => title,
        _ => metadata.title,
    };

    let item = ContentItem::builder()
        .user_id(command.owner_id)
        .title(title)
        .content_type(ContentType::from_link(command.link.as_deref()))
        .link(command.link)
        .content(metadata.content)
        .image_url(metadata.thumbnail)
        .build();

    content_repository.create(&item).await?;
    info!(content_id = %item.id, "Persisted content item");

    // From here on the item is durable and the call is a success, whatever
    // happens to the vector work
    let indexing = embed_and_index(&item, embeddings_service, vector_index).await;

    Ok(IngestOutcome { item, indexing })
}

async fn embed_and_index(
    item: &ContentItem,
    embeddings_service: &EmbeddingsService,
    vector_index: &dyn VectorIndex,
) -> IndexingOutcome {
    let timestamp = item.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let text_for_embedding = format!(
        "Title: {}\nDate: {}\nContent: {}",
        item.title, timestamp, item.content
    );

    let vector = match embeddings_service.get_embedding(&text_for_embedding).await {
        Ok(vector) => vector,
        Err(err) => {
            error!(
                error = ?err,
                content_id = %item.id,
                "Embedding generation failed, content kept without a vector"
            );
            return IndexingOutcome::Degraded(err.to_string());
        }
    };

    let point = ContentPoint::from_item(item, vector, timestamp);

    match vector_index.upsert(point).await {
        Ok(()) => {
            info!(content_id = %item.id, "Successfully added vector to the index");
            IndexingOutcome::Indexed
        }
        Err(err @ VectorIndexError::DimensionMismatch(_)) => {
            error!(
                error = ?err,
                content_id = %item.id,
                "Dimension mismatch detected while indexing, content kept without a vector"
            );
            IndexingOutcome::Degraded(err.to_string())
        }
        Err(err) => {
            error!(
                error = ?err,
                content_id = %item.id,
                "Vector index error, content kept without a vector"
            );
            IndexingOutcome::Degraded(err.to_string())
        }
    }
}

#[derive(thiserror::Error)]
pub enum IngestContentError {
    #[error("Could not process the provided link: {0}")]
    ExtractionError(#[from] MediaExtractorError),
    #[error("Failed to save content to database: {0}")]
    PersistenceError(#[from] ContentRepositoryError),
}

impl std::fmt::Debug for IngestContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
