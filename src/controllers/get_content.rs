use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::entities::content_item::ContentItem;
use crate::helper::error_chain_fmt;
use crate::middlewares::jwt_authentication::UserIdFromToken;
use crate::ports::content_repository::{ContentRepository, ContentRepositoryError};

/// Wire representation of one captured item
#[derive(Debug, serde::Serialize)]
pub struct ContentItemResponseData {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub content: String,
    pub link: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<ContentItem> for ContentItemResponseData {
    fn from(item: ContentItem) -> Self {
        Self {
            id: item.id.to_string(),
            title: item.title,
            content_type: item.content_type.as_str().to_string(),
            content: item.content,
            link: item.link,
            image_url: item.image_url,
            user_id: item.user_id.to_string(),
            created_at: item.created_at,
        }
    }
}

/// Synthetic record shown to owners with an empty library. Never stored.
fn welcome_placeholder(user_id: &UserIdFromToken) -> ContentItemResponseData {
    ContentItemResponseData {
        id: "default-1".to_string(),
        title: "Welcome to your knowledge base!".to_string(),
        content_type: "Note".to_string(),
        content: "This is your default content. Start capturing links and notes to build your library."
            .to_string(),
        link: None,
        image_url: None,
        user_id: user_id.0.to_string(),
        created_at: Utc::now(),
    }
}

/// Lists every captured item of the authenticated user, oldest first
#[tracing::instrument(
    name = "Get content",
    skip(content_repository),
    fields(user_id = %user_id.0)
)]
pub async fn get_content(
    user_id: web::ReqData<UserIdFromToken>,
    content_repository: web::Data<dyn ContentRepository>,
) -> Result<HttpResponse, GetContentError> {
    let items = content_repository.find_by_owner(user_id.0).await?;

    let content: Vec<ContentItemResponseData> = if items.is_empty() {
        vec![welcome_placeholder(&user_id)]
    } else {
        items.into_iter().map(ContentItemResponseData::from).collect()
    };

    Ok(HttpResponse::Ok().json(json!({ "content": content })))
}

#[derive(thiserror::Error)]
pub enum GetContentError {
    #[error("Internal server error")]
    RepositoryError(#[from] ContentRepositoryError),
}

impl std::fmt::Debug for GetContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for GetContentError {
    fn status_code(&self) -> StatusCode {
        match self {
            GetContentError::RepositoryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[tracing::instrument(name = "Response error from get_content controller", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use uuid::Uuid;

    use crate::controllers::test_helpers::{test_app, TestContext};
    use crate::domain::entities::content_item::{ContentItem, ContentType};
    use crate::use_cases::ingest_content::test_doubles::{
        InMemoryContentRepository, RecordingVectorIndex, StubEmbeddingProvider, StubFetcher,
    };

    fn seeded_item(user_id: Uuid) -> ContentItem {
        ContentItem::builder()
            .user_id(user_id)
            .title("an article".to_string())
            .content_type(ContentType::Url)
            .link(Some("https://blog.example.com/post".to_string()))
            .content("article body".to_string())
            .image_url(Some("https://img.example/og.png".to_string()))
            .build()
    }

    #[tokio::test]
    async fn it_returns_the_owner_items_with_their_wire_fields() {
        let ctx = TestContext::new();
        let item = seeded_item(ctx.user_id);
        ctx.repository.items.lock().unwrap().push(item.clone());
        let app = test::init_service(test_app(&ctx)).await;

        let request = test::TestRequest::get()
            .uri("/content")
            .insert_header(ctx.bearer())
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(response).await;
        let content = body["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["_id"], item.id.to_string());
        assert_eq!(content[0]["title"], "an article");
        assert_eq!(content[0]["type"], "Url");
        assert_eq!(content[0]["content"], "article body");
        assert_eq!(content[0]["link"], "https://blog.example.com/post");
        assert_eq!(content[0]["imageUrl"], "https://img.example/og.png");
        assert_eq!(content[0]["userId"], ctx.user_id.to_string());
        assert!(content[0]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn on_an_empty_library_it_returns_the_welcome_placeholder() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;

        let request = test::TestRequest::get()
            .uri("/content")
            .insert_header(ctx.bearer())
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(response).await;
        let content = body["content"].as_array().unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["_id"], "default-1");
        assert_eq!(content[0]["type"], "Note");
        // Nothing was written to the store to produce it
        assert!(ctx.repository.items.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn it_does_not_return_items_of_other_owners() {
        let ctx = TestContext::new();
        ctx.repository
            .items
            .lock()
            .unwrap()
            .push(seeded_item(Uuid::new_v4()));
        let app = test::init_service(test_app(&ctx)).await;

        let request = test::TestRequest::get()
            .uri("/content")
            .insert_header(ctx.bearer())
            .to_request();
        let response = test::call_service(&app, request).await;

        let body: serde_json::Value = test::read_body_json(response).await;
        let content = body["content"].as_array().unwrap();
        // Only the placeholder comes back
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["_id"], "default-1");
    }

    #[tokio::test]
    async fn on_store_failure_it_responds_500() {
        let ctx = TestContext::with_doubles(
            InMemoryContentRepository::failing(),
            RecordingVectorIndex::new(),
            StubFetcher {
                fail_fetches: false,
            },
            StubEmbeddingProvider::new(),
        );
        let app = test::init_service(test_app(&ctx)).await;

        let request = test::TestRequest::get()
            .uri("/content")
            .insert_header(ctx.bearer())
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["error"], "Internal server error");
    }
}
