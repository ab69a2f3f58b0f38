use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::configuration::EmbeddingSettings;
use crate::ports::embedding_provider::{EmbeddingProvider, EmbeddingProviderError};

/// Client for a Gemini-style generative REST API, covering the two narrow
/// capabilities the pipeline needs: `embedContent` and `generateContent`
/// (used for summarization).
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Secret<String>,
    embedding_model: String,
    summarization_model: String,
}

impl GeminiClient {
    pub fn try_new(settings: &EmbeddingSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            embedding_model: settings.embedding_model.clone(),
            summarization_model: settings.summarization_model.clone(),
        })
    }

    async fn post_json<Request: Serialize, Response: for<'de> Deserialize<'de>>(
        &self,
        model: &str,
        operation: &str,
        request: &Request,
    ) -> Result<Response, EmbeddingProviderError> {
        let url = format!("{}/v1beta/models/{}:{}", self.base_url, model, operation);

        debug!(model, operation, "Sending request to the generative API");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(request)
            .send()
            .await
            .map_err(|e| EmbeddingProviderError::RequestError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingProviderError::RequestError(format!(
                "{}:{} returned status {}: {}",
                model, operation, status, body
            )));
        }

        response
            .json::<Response>()
            .await
            .map_err(|e| EmbeddingProviderError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    #[tracing::instrument(name = "Request embedding from provider", skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingProviderError> {
        let request = EmbedContentRequest {
            model: format!("models/{}", self.embedding_model),
            content: Content::from_text(text),
        };

        let response: EmbedContentResponse = self
            .post_json(&self.embedding_model, "embedContent", &request)
            .await?;

        let embedding = response.embedding.ok_or_else(|| {
            EmbeddingProviderError::MalformedResponse(
                "response carried no embedding field".to_string(),
            )
        })?;

        if embedding.values.is_empty() {
            return Err(EmbeddingProviderError::MalformedResponse(
                "response carried an empty embedding".to_string(),
            ));
        }

        Ok(embedding.values)
    }

    #[tracing::instrument(name = "Request summary from provider", skip(self, text))]
    async fn summarize(
        &self,
        text: &str,
        max_chars: usize,
    ) -> Result<String, EmbeddingProviderError> {
        let prompt = format!(
            "Create a concise summary (under {} characters) that captures the essential \
             meaning and key concepts of this text. Focus on the most important ideas only: {}",
            max_chars, text
        );

        let request = GenerateContentRequest {
            contents: vec![Content::from_text(&prompt)],
        };

        let response: GenerateContentResponse = self
            .post_json(&self.summarization_model, "generateContent", &request)
            .await?;

        response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| {
                EmbeddingProviderError::MalformedResponse(
                    "response carried no summary candidate".to_string(),
                )
            })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

impl Content {
    fn from_text(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest {
    model: String,
    content: Content,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: Option<EmbeddingValues>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}
