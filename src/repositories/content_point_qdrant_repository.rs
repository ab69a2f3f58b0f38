use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::{
    prelude::QdrantClient,
    qdrant::{
        self, points_selector::PointsSelectorOneOf, vectors_config::Config, CreateCollection,
        Distance, PointStruct, PointsIdsList, PointsSelector, VectorParams, VectorsConfig,
    },
};
use tracing::info;
use uuid::Uuid;

use crate::domain::entities::content_point::{ContentPoint, ContentPointPayload};
use crate::helper::error_chain_fmt;
use crate::ports::vector_index::{VectorIndex, VectorIndexError};

/// Repository for content vectors (ContentPoint) persisted in Qdrant
pub struct ContentPointQdrantRepository {
    client: QdrantClient,
    collection_name: String,
}

impl ContentPointQdrantRepository {
    #[tracing::instrument(
        name = "Initializing Qdrant and the associated collection",
        skip(client)
    )]
    pub async fn try_new(
        client: QdrantClient,
        collection_name: &str,
        collection_distance: &str,
        collection_vector_size: u64,
    ) -> Result<Self, ContentPointQdrantRepositoryError> {
        let collection_distance = Distance::from_str_name(collection_distance).ok_or(
            ContentPointQdrantRepositoryError::QdrantConfigurationError(
                "Invalid Qdrant distance from configuration".into(),
            ),
        )?;

        // Not idempotent: tolerates the collection already existing
        match client
            .create_collection(&CreateCollection {
                collection_name: collection_name.to_string(),
                vectors_config: Some(VectorsConfig {
                    config: Some(Config::Params(VectorParams {
                        size: collection_vector_size,
                        distance: collection_distance as i32,
                        ..Default::default()
                    })),
                }),
                ..Default::default()
            })
            .await
        {
            Ok(_) => (),
            Err(error) => {
                // Qdrant client only returns anyhow errors for now
                if !error.to_string().contains("already exists") {
                    return Err(ContentPointQdrantRepositoryError::QdrantError(
                        error.to_string(),
                    ));
                }
            }
        };

        Ok(Self {
            client,
            collection_name: collection_name.to_string(),
        })
    }
}

#[async_trait]
impl VectorIndex for ContentPointQdrantRepository {
    #[tracing::instrument(name = "Saving content point to Qdrant", skip(self, point), fields(content_id = %point.id))]
    async fn upsert(&self, point: ContentPoint) -> Result<(), VectorIndexError> {
        self.client
            .upsert_points(&self.collection_name, vec![PointStruct::from(point)], None)
            .await
            .map_err(classify_qdrant_error)?;

        info!("Saved content point");
        Ok(())
    }

    #[tracing::instrument(name = "Deleting content point from Qdrant", skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), VectorIndexError> {
        let selector = PointsSelector {
            points_selector_one_of: Some(PointsSelectorOneOf::Points(PointsIdsList {
                ids: vec![id.to_string().into()],
            })),
        };

        self.client
            .delete_points(&self.collection_name, &selector, None)
            .await
            .map_err(classify_qdrant_error)?;

        Ok(())
    }
}

/// Splits out the "vector dimension does not match the collection" rejection
/// so callers can log it distinctly
fn classify_qdrant_error(error: anyhow::Error) -> VectorIndexError {
    let message = error.to_string();
    if message.to_lowercase().contains("dimension") {
        VectorIndexError::DimensionMismatch(message)
    } else {
        VectorIndexError::IndexError(message)
    }
}

#[derive(thiserror::Error)]
pub enum ContentPointQdrantRepositoryError {
    #[error("Error from Qdrant: {0}")]
    QdrantError(String),

    #[error("Error from Qdrant config: {0}")]
    QdrantConfigurationError(String),
}

impl std::fmt::Debug for ContentPointQdrantRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<ContentPoint> for PointStruct {
    fn from(content_point: ContentPoint) -> Self {
        Self {
            id: Some(content_point.id.to_string().into()),
            vectors: Some(content_point.vector.into()),
            payload: content_point.payload.into(),
        }
    }
}

impl From<ContentPointPayload> for HashMap<String, qdrant::Value> {
    fn from(payload: ContentPointPayload) -> Self {
        HashMap::from([
            ("user_id".into(), qdrant::Value::from(payload.user_id)),
            ("title".into(), qdrant::Value::from(payload.title)),
            (
                "content_type".into(),
                qdrant::Value::from(payload.content_type),
            ),
            ("timestamp".into(), qdrant::Value::from(payload.timestamp)),
            ("snippet".into(), qdrant::Value::from(payload.snippet)),
            ("image_url".into(), qdrant::Value::from(payload.image_url)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_errors_are_classified_distinctly() {
        let error = anyhow::anyhow!("Wrong input: Vector dimension error: expected dim: 768, got 3");
        assert!(matches!(
            classify_qdrant_error(error),
            VectorIndexError::DimensionMismatch(_)
        ));

        let error = anyhow::anyhow!("connection refused");
        assert!(matches!(
            classify_qdrant_error(error),
            VectorIndexError::IndexError(_)
        ));
    }

    #[test]
    fn payload_projection_keeps_all_display_fields() {
        let payload = ContentPointPayload {
            user_id: "u".to_string(),
            title: "t".to_string(),
            content_type: "Note".to_string(),
            timestamp: "now".to_string(),
            snippet: "s".to_string(),
            image_url: "".to_string(),
        };

        let map: HashMap<String, qdrant::Value> = payload.into();

        for key in [
            "user_id",
            "title",
            "content_type",
            "timestamp",
            "snippet",
            "image_url",
        ] {
            assert!(map.contains_key(key), "missing payload key {}", key);
        }
    }
}
