use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::info;

use crate::domain::entities::extracted_metadata::ExtractedMetadata;
use crate::helper::error_chain_fmt;
use crate::ports::media_fetcher::{MediaFetcher, MediaFetcherError};

static VIDEO_LINK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)youtube\.com|youtu\.be").expect("Invalid video link pattern"));

static SOCIAL_LINK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)twitter\.com|x\.com").expect("Invalid social link pattern"));

/// Classified origin of one ingestion request.
///
/// Classification happens once, before any network call; each variant maps to
/// exactly one extraction path.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentSource {
    Video { link: String },
    SocialPost { link: String },
    Website { link: String },
    Note { title: String, content: String },
}

impl ContentSource {
    /// Classifies the raw input, first match wins:
    /// video-hosting pattern, then short-post pattern, then any other link,
    /// then note.
    pub fn classify(link: Option<&str>, title: Option<&str>, content: Option<&str>) -> Self {
        match link {
            Some(link) if VIDEO_LINK_PATTERN.is_match(link) => ContentSource::Video {
                link: link.to_string(),
            },
            Some(link) if SOCIAL_LINK_PATTERN.is_match(link) => ContentSource::SocialPost {
                link: link.to_string(),
            },
            Some(link) => ContentSource::Website {
                link: link.to_string(),
            },
            None => ContentSource::Note {
                title: title.unwrap_or_default().to_string(),
                content: content.unwrap_or_default().to_string(),
            },
        }
    }
}

/// Service producing normalized `{title, content, thumbnail}` metadata from a
/// classified source.
pub struct MediaExtractor {
    fetcher: Arc<dyn MediaFetcher>,
}

impl MediaExtractor {
    pub fn new(fetcher: Arc<dyn MediaFetcher>) -> Self {
        Self { fetcher }
    }

    /// Runs the extraction path selected by the classification.
    ///
    /// The note path cannot fail: it echoes the supplied title/content with no
    /// thumbnail. The link paths propagate fetch/parse failures.
    #[tracing::instrument(name = "Extracting content metadata", skip(self))]
    pub async fn extract(
        &self,
        source: &ContentSource,
    ) -> Result<ExtractedMetadata, MediaExtractorError> {
        let metadata = match source {
            ContentSource::Video { link } => self.fetcher.fetch_video(link).await?,
            ContentSource::SocialPost { link } => self.fetcher.fetch_social_post(link).await?,
            ContentSource::Website { link } => self.fetcher.fetch_website(link).await?,
            ContentSource::Note { title, content } => ExtractedMetadata {
                title: title.clone(),
                content: content.clone(),
                thumbnail: None,
            },
        };

        info!(title = metadata.title, "Extracted content metadata");
        Ok(metadata)
    }
}

#[derive(thiserror::Error)]
pub enum MediaExtractorError {
    #[error(transparent)]
    FetchError(#[from] MediaFetcherError),
}

impl std::fmt::Debug for MediaExtractorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
