use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::content_item::ContentItem;

pub type Embeddings = Vec<f32>;

/// Number of characters of content kept in the index payload for result display
const SNIPPET_MAX_CHARS: usize = 100;

/// Disposable projection of a [`ContentItem`] into the vector index.
///
/// Shares the item's id (1:1 by convention, not enforced by the stores).
#[derive(Debug, Deserialize, Serialize)]
pub struct ContentPoint {
    pub id: Uuid,
    pub vector: Embeddings,
    pub payload: ContentPointPayload,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ContentPointPayload {
    pub user_id: String,
    pub title: String,
    pub content_type: String,
    pub timestamp: String,
    pub snippet: String,
    pub image_url: String,
}

impl ContentPoint {
    /// Projects a persisted item and its embedding into an index point
    pub fn from_item(item: &ContentItem, vector: Embeddings, timestamp: String) -> Self {
        Self {
            id: item.id,
            vector,
            payload: ContentPointPayload {
                user_id: item.user_id.to_string(),
                title: item.title.clone(),
                content_type: item.content_type.as_str().to_string(),
                timestamp,
                snippet: item.content.chars().take(SNIPPET_MAX_CHARS).collect(),
                image_url: item.image_url.clone().unwrap_or_default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::content_item::ContentType;

    #[test]
    fn snippet_is_capped_at_100_characters() {
        let item = ContentItem::builder()
            .user_id(Uuid::new_v4())
            .title("long".to_string())
            .content_type(ContentType::Note)
            .content("x".repeat(500))
            .build();

        let point = ContentPoint::from_item(&item, vec![0.0; 4], "now".to_string());

        assert_eq!(point.payload.snippet.chars().count(), 100);
        assert_eq!(point.id, item.id);
    }

    #[test]
    fn missing_image_is_projected_as_an_empty_string() {
        let item = ContentItem::builder()
            .user_id(Uuid::new_v4())
            .title("t".to_string())
            .content_type(ContentType::Note)
            .content("c".to_string())
            .build();

        let point = ContentPoint::from_item(&item, vec![], "now".to_string());

        assert_eq!(point.payload.image_url, "");
        assert_eq!(point.payload.content_type, "Note");
    }
}
