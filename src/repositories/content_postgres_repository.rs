use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::content_item::{ContentItem, ContentType};
use crate::ports::content_repository::{ContentRepository, ContentRepositoryError};

/// Repository for content items persisted in Postgres
pub struct ContentPostgresRepository {
    pool: PgPool,
}

impl ContentPostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ContentItemRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    content_type: String,
    link: Option<String>,
    content: String,
    image_url: Option<String>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ContentItemRow> for ContentItem {
    type Error = ContentRepositoryError;

    fn try_from(row: ContentItemRow) -> Result<Self, Self::Error> {
        let content_type: ContentType = row
            .content_type
            .parse()
            .map_err(ContentRepositoryError::MappingError)?;

        Ok(ContentItem {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            content_type,
            link: row.link,
            content: row.content,
            image_url: row.image_url,
            tags: row.tags,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl ContentRepository for ContentPostgresRepository {
    #[tracing::instrument(name = "Saving new content item in database", skip(self, item), fields(content_id = %item.id))]
    async fn create(&self, item: &ContentItem) -> Result<(), ContentRepositoryError> {
        sqlx::query(
            r#"
    INSERT INTO content_items (id, user_id, title, content_type, link, content, image_url, tags, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(item.id)
        .bind(item.user_id)
        .bind(&item.title)
        .bind(item.content_type.as_str())
        .bind(&item.link)
        .bind(&item.content)
        .bind(&item.image_url)
        .bind(&item.tags)
        .bind(item.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| ContentRepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    #[tracing::instrument(name = "Fetching content items from database", skip(self))]
    async fn find_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<ContentItem>, ContentRepositoryError> {
        let rows: Vec<ContentItemRow> = sqlx::query_as(
            r#"
    SELECT id, user_id, title, content_type, link, content, image_url, tags, created_at
    FROM content_items
    WHERE user_id = $1
    ORDER BY created_at ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ContentRepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(ContentItem::try_from).collect()
    }

    // Not distinguishing a deletion from a not-found: a filter matching no row
    // is a successful no-op
    #[tracing::instrument(name = "Deleting content item from database", skip(self))]
    async fn delete_by_id_and_owner(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<(), ContentRepositoryError> {
        sqlx::query(
            r#"
    DELETE FROM content_items
    WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| ContentRepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
