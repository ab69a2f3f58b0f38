use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde_json::json;
use tracing::{info, warn};

use crate::domain::services::embeddings_service::EmbeddingsService;
use crate::domain::services::media_extractor::MediaExtractor;
use crate::helper::error_chain_fmt;
use crate::middlewares::jwt_authentication::UserIdFromToken;
use crate::ports::content_repository::ContentRepository;
use crate::ports::vector_index::VectorIndex;
use crate::use_cases::ingest_content::{
    ingest_content, IndexingOutcome, IngestContentCommand, IngestContentError,
};

#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct AddContentBodyData {
    pub link: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Captures a link or a note for the authenticated user.
///
/// A 200 means the item is durably stored; whether its vector made it to the
/// index is not reflected in the status code.
#[tracing::instrument(
    name = "Add content",
    skip(media_extractor, content_repository, embeddings_service, vector_index, body),
    fields(user_id = %user_id.0, link = ?body.link)
)]
pub async fn add_content(
    user_id: web::ReqData<UserIdFromToken>,
    media_extractor: web::Data<MediaExtractor>,
    content_repository: web::Data<dyn ContentRepository>,
    embeddings_service: web::Data<EmbeddingsService>,
    vector_index: web::Data<dyn VectorIndex>,
    body: web::Json<AddContentBodyData>,
) -> Result<HttpResponse, AddContentError> {
    let body = body.into_inner();

    let outcome = ingest_content(
        media_extractor.get_ref(),
        content_repository.get_ref(),
        embeddings_service.get_ref(),
        vector_index.get_ref(),
        IngestContentCommand {
            owner_id: user_id.0,
            link: body.link,
            title: body.title,
            content: body.content,
        },
    )
    .await?;

    match &outcome.indexing {
        IndexingOutcome::Indexed => {
            info!(content_id = %outcome.item.id, "Successfully added content")
        }
        IndexingOutcome::Degraded(reason) => warn!(
            content_id = %outcome.item.id,
            reason,
            "Content stored but not indexed"
        ),
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Content added successfully",
        "contentId": outcome.item.id,
        "imageUrl": outcome.item.image_url,
    })))
}

#[derive(thiserror::Error)]
pub enum AddContentError {
    #[error(transparent)]
    IngestError(#[from] IngestContentError),
}

impl std::fmt::Debug for AddContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for AddContentError {
    fn status_code(&self) -> StatusCode {
        match self {
            AddContentError::IngestError(IngestContentError::ExtractionError(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AddContentError::IngestError(IngestContentError::PersistenceError(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    #[tracing::instrument(name = "Response error from add_content controller", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}
