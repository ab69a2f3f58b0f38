use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::helper::error_chain_fmt;

/// Repository to handle JWT tokens
///
/// Used in the authentication middleware; `create_token` is the narrow
/// `authenticate -> token` capability kept for tests and operators.
#[derive(Clone)]
pub struct JwtAuthenticationRepository {
    secret: Secret<String>,
    expire_in_s: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject
    pub sub: String,

    /// Issued At
    pub iat: usize,

    /// Expires At
    pub exp: usize,
}

impl JwtAuthenticationRepository {
    pub fn new(secret: Secret<String>, expire_in_s: i64) -> Self {
        Self {
            secret,
            expire_in_s,
        }
    }

    /// Creates a new JWT token
    #[tracing::instrument(name = "Create JWT token", skip(self))]
    pub fn create_token(&self, user_id: &str) -> Result<String, JwtAuthenticationRepositoryError> {
        if user_id.is_empty() {
            return Err(JwtAuthenticationRepositoryError::InvalidData(
                "Missing user id".to_string(),
            ));
        }

        let now = Utc::now();
        let iat = now.timestamp() as usize;
        let exp = (now + Duration::seconds(self.expire_in_s)).timestamp() as usize;
        let claims = TokenClaims {
            sub: user_id.to_string(),
            exp,
            iat,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(JwtAuthenticationRepositoryError::EncodingError)
    }

    /// Decodes a JWT token, returning the user id it was issued for
    #[tracing::instrument(name = "Decode JWT token", skip(self, token))]
    pub fn decode_token(&self, token: &str) -> Result<String, JwtAuthenticationRepositoryError> {
        decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims.sub)
        .map_err(JwtAuthenticationRepositoryError::DecodingError)
    }
}

#[derive(thiserror::Error)]
pub enum JwtAuthenticationRepositoryError {
    #[error("Invalid JWT token while decoding: {0}")]
    DecodingError(jsonwebtoken::errors::Error),
    #[error("Error while encoding JWT token: {0}")]
    EncodingError(jsonwebtoken::errors::Error),
    #[error("Invalid data to create JWT token: {0}")]
    InvalidData(String),
}

impl std::fmt::Debug for JwtAuthenticationRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for JwtAuthenticationRepositoryError {
    fn status_code(&self) -> StatusCode {
        match self {
            JwtAuthenticationRepositoryError::InvalidData(_)
            | JwtAuthenticationRepositoryError::EncodingError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            JwtAuthenticationRepositoryError::DecodingError(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_valid_token_it_should_create_and_decode_correctly() {
        let user_id = "user123";
        let secret = Secret::new("my-secret-key".to_string());
        let auth_repo = JwtAuthenticationRepository::new(secret, 60);

        let token = auth_repo.create_token(user_id).unwrap();
        let decoded_user_id = auth_repo.decode_token(&token).unwrap();

        assert_eq!(decoded_user_id, user_id);
    }

    #[test]
    fn on_empty_user_id_token_create_should_fail() {
        let secret = Secret::new("my-secret-key".to_string());
        let auth_repo = JwtAuthenticationRepository::new(secret, 60);

        let result = auth_repo.create_token("");

        assert!(matches!(
            result,
            Err(JwtAuthenticationRepositoryError::InvalidData(_))
        ))
    }

    #[test]
    fn on_invalid_token_decode_should_fail() {
        let secret = Secret::new("my-secret-key".to_string());
        let auth_repo = JwtAuthenticationRepository::new(secret, 60);

        let result = auth_repo.decode_token("invalid-token");

        assert!(matches!(
            result,
            Err(JwtAuthenticationRepositoryError::DecodingError(_))
        ));
    }

    #[test]
    fn on_expired_token_decode_should_fail() {
        let secret = Secret::new("my-secret-key".to_string());
        let auth_repo = JwtAuthenticationRepository::new(secret, -60);

        let expired_token = auth_repo.create_token("user123").unwrap();
        let result = auth_repo.decode_token(&expired_token);

        assert!(matches!(
            result,
            Err(JwtAuthenticationRepositoryError::DecodingError(_))
        ));
    }
}
