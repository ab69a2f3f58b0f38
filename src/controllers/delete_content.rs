use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::helper::error_chain_fmt;
use crate::middlewares::jwt_authentication::UserIdFromToken;
use crate::ports::content_repository::{ContentRepository, ContentRepositoryError};
use crate::ports::vector_index::VectorIndex;

/// Deletes one captured item of the authenticated user.
///
/// Deleting a missing or foreign item is indistinguishable from a real
/// deletion. A failed index cleanup leaves a stale vector behind and is
/// logged only.
#[tracing::instrument(
    name = "Delete content",
    skip(content_repository, vector_index),
    fields(user_id = %user_id.0)
)]
pub async fn delete_content(
    user_id: web::ReqData<UserIdFromToken>,
    content_repository: web::Data<dyn ContentRepository>,
    vector_index: web::Data<dyn VectorIndex>,
    path: web::Path<String>,
) -> Result<HttpResponse, DeleteContentError> {
    let content_id = Uuid::parse_str(&path.into_inner())
        .map_err(|_| DeleteContentError::InvalidContentId)?;

    content_repository
        .delete_by_id_and_owner(content_id, user_id.0)
        .await?;

    if let Err(index_error) = vector_index.delete(content_id).await {
        error!(
            error = ?index_error,
            %content_id,
            "Failed to delete vector from the index, a stale vector remains"
        );
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Content deleted successfully" })))
}

#[derive(thiserror::Error)]
pub enum DeleteContentError {
    #[error("Invalid or missing content ID")]
    InvalidContentId,
    #[error("Error deleting content: {0}")]
    RepositoryError(#[from] ContentRepositoryError),
}

impl std::fmt::Debug for DeleteContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for DeleteContentError {
    fn status_code(&self) -> StatusCode {
        match self {
            DeleteContentError::InvalidContentId => StatusCode::BAD_REQUEST,
            DeleteContentError::RepositoryError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[tracing::instrument(name = "Response error from delete_content controller", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }
}
