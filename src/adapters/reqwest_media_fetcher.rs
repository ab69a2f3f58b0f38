use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::configuration::MediaSettings;
use crate::domain::entities::extracted_metadata::ExtractedMetadata;
use crate::ports::media_fetcher::{MediaFetcher, MediaFetcherError};

/// Upper bound on the article text collected from a web page
const WEBSITE_CONTENT_MAX_BYTES: usize = 20_000;

/// Link fetchers backed by plain HTTP calls:
/// oEmbed endpoints for video and social links, HTML scraping for the rest.
pub struct ReqwestMediaFetcher {
    client: reqwest::Client,
    video_oembed_url: String,
    social_oembed_url: String,
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: Option<String>,
    author_name: Option<String>,
    thumbnail_url: Option<String>,
    html: Option<String>,
}

impl ReqwestMediaFetcher {
    pub fn try_new(settings: &MediaSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            video_oembed_url: settings.video_oembed_url.clone(),
            social_oembed_url: settings.social_oembed_url.clone(),
        })
    }

    async fn fetch_oembed(
        &self,
        endpoint: &str,
        link: &str,
    ) -> Result<OEmbedResponse, MediaFetcherError> {
        debug!(endpoint, link, "Fetching oEmbed metadata");

        let response = self
            .client
            .get(endpoint)
            .query(&[("url", link), ("format", "json")])
            .send()
            .await
            .map_err(|e| MediaFetcherError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaFetcherError::Unreachable(format!(
                "oEmbed endpoint returned status {} for {}",
                status, link
            )));
        }

        response
            .json::<OEmbedResponse>()
            .await
            .map_err(|e| MediaFetcherError::UnexpectedStructure(e.to_string()))
    }
}

#[async_trait]
impl MediaFetcher for ReqwestMediaFetcher {
    #[tracing::instrument(name = "Fetching video metadata", skip(self))]
    async fn fetch_video(&self, link: &str) -> Result<ExtractedMetadata, MediaFetcherError> {
        let oembed = self.fetch_oembed(&self.video_oembed_url, link).await?;

        let title = oembed.title.filter(|t| !t.is_empty()).ok_or_else(|| {
            MediaFetcherError::UnexpectedStructure(
                "video oEmbed response carried no title".to_string(),
            )
        })?;

        let content = match &oembed.author_name {
            Some(author) => format!("{} (video by {})", title, author),
            None => title.clone(),
        };

        Ok(ExtractedMetadata {
            title,
            content,
            thumbnail: oembed.thumbnail_url,
        })
    }

    #[tracing::instrument(name = "Fetching social post metadata", skip(self))]
    async fn fetch_social_post(&self, link: &str) -> Result<ExtractedMetadata, MediaFetcherError> {
        let oembed = self.fetch_oembed(&self.social_oembed_url, link).await?;

        let html = oembed.html.filter(|h| !h.is_empty()).ok_or_else(|| {
            MediaFetcherError::UnexpectedStructure(
                "social oEmbed response carried no post body".to_string(),
            )
        })?;

        let content = fragment_text(&html);
        let title = match &oembed.author_name {
            Some(author) => format!("Post by {}", author),
            None => "Social post".to_string(),
        };

        Ok(ExtractedMetadata {
            title,
            content,
            thumbnail: None,
        })
    }

    #[tracing::instrument(name = "Fetching website content", skip(self))]
    async fn fetch_website(&self, link: &str) -> Result<ExtractedMetadata, MediaFetcherError> {
        let response = self
            .client
            .get(link)
            .send()
            .await
            .map_err(|e| MediaFetcherError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaFetcherError::Unreachable(format!(
                "{} returned status {}",
                link, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MediaFetcherError::Unreachable(e.to_string()))?;

        parse_website_document(&body)
    }
}

/// Extracts `{title, content, thumbnail}` from an HTML document.
///
/// Kept synchronous: `scraper`'s parsed documents are not `Send`, so they must
/// not live across await points.
fn parse_website_document(body: &str) -> Result<ExtractedMetadata, MediaFetcherError> {
    let document = Html::parse_document(body);

    let title = meta_content(&document, "og:title")
        .or_else(|| {
            let selector = Selector::parse("title").expect("Invalid title selector");
            document
                .select(&selector)
                .next()
                .map(|node| node.text().collect::<String>().trim().to_string())
        })
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            MediaFetcherError::UnexpectedStructure("no title found in the page".to_string())
        })?;

    let paragraph_selector = Selector::parse("p").expect("Invalid paragraph selector");
    let mut content = String::new();
    for paragraph in document.select(&paragraph_selector) {
        let text = paragraph.text().collect::<String>();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if content.len() + text.len() > WEBSITE_CONTENT_MAX_BYTES {
            break;
        }
        if !content.is_empty() {
            content.push_str("\n\n");
        }
        content.push_str(text);
    }

    // Pages without paragraph text still yield a non-empty body
    if content.is_empty() {
        content = meta_content(&document, "og:description").unwrap_or_else(|| title.clone());
    }

    let thumbnail = meta_content(&document, "og:image");

    Ok(ExtractedMetadata {
        title,
        content,
        thumbnail,
    })
}

fn meta_content(document: &Html, property: &str) -> Option<String> {
    let selector = Selector::parse(&format!(r#"meta[property="{}"]"#, property))
        .expect("Invalid meta selector");
    document
        .select(&selector)
        .next()
        .and_then(|node| node.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}

/// Collapses an HTML fragment (ex: an embedded post) into plain text
fn fragment_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_ok};
    use httpmock::prelude::*;
    use serde_json::json;

    fn fetcher_for(server: &MockServer) -> ReqwestMediaFetcher {
        ReqwestMediaFetcher::try_new(&MediaSettings {
            timeout_seconds: 5,
            user_agent: "test-agent".to_string(),
            video_oembed_url: format!("{}/video_oembed", server.base_url()),
            social_oembed_url: format!("{}/social_oembed", server.base_url()),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn website_extraction_returns_title_paragraphs_and_thumbnail() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/article");
                then.status(200).body(
                    r#"<html><head>
                        <title>An article</title>
                        <meta property="og:image" content="https://img.example/cover.png" />
                      </head>
                      <body><p>First paragraph.</p><p>Second paragraph.</p></body></html>"#,
                );
            })
            .await;

        let fetcher = fetcher_for(&server);
        let metadata =
            assert_ok!(fetcher.fetch_website(&server.url("/article")).await);

        assert_eq!(metadata.title, "An article");
        assert_eq!(metadata.content, "First paragraph.\n\nSecond paragraph.");
        assert_eq!(
            metadata.thumbnail.as_deref(),
            Some("https://img.example/cover.png")
        );
    }

    #[tokio::test]
    async fn website_og_title_wins_over_the_title_tag() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/page");
                then.status(200).body(
                    r#"<html><head>
                        <title>Raw title</title>
                        <meta property="og:title" content="Canonical title" />
                      </head><body><p>Body.</p></body></html>"#,
                );
            })
            .await;

        let fetcher = fetcher_for(&server);
        let metadata = assert_ok!(fetcher.fetch_website(&server.url("/page")).await);

        assert_eq!(metadata.title, "Canonical title");
    }

    #[tokio::test]
    async fn website_without_a_title_is_an_unexpected_structure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/untitled");
                then.status(200)
                    .body("<html><body><p>Only a body.</p></body></html>");
            })
            .await;

        let fetcher = fetcher_for(&server);
        let result = fetcher.fetch_website(&server.url("/untitled")).await;

        assert_err!(&result);
        assert!(matches!(
            result,
            Err(MediaFetcherError::UnexpectedStructure(_))
        ));
    }

    #[tokio::test]
    async fn website_error_status_is_unreachable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/gone");
                then.status(404);
            })
            .await;

        let fetcher = fetcher_for(&server);
        let result = fetcher.fetch_website(&server.url("/gone")).await;

        assert!(matches!(result, Err(MediaFetcherError::Unreachable(_))));
    }

    #[tokio::test]
    async fn video_extraction_uses_the_oembed_endpoint() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/video_oembed")
                    .query_param("url", "https://youtu.be/abc")
                    .query_param("format", "json");
                then.status(200).json_body(json!({
                    "title": "A talk",
                    "author_name": "Some channel",
                    "thumbnail_url": "https://img.example/thumb.jpg"
                }));
            })
            .await;

        let fetcher = fetcher_for(&server);
        let metadata = assert_ok!(fetcher.fetch_video("https://youtu.be/abc").await);

        mock.assert_async().await;
        assert_eq!(metadata.title, "A talk");
        assert_eq!(metadata.content, "A talk (video by Some channel)");
        assert_eq!(
            metadata.thumbnail.as_deref(),
            Some("https://img.example/thumb.jpg")
        );
    }

    #[tokio::test]
    async fn social_post_markup_is_stripped_to_plain_text() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/social_oembed");
                then.status(200).json_body(json!({
                    "author_name": "someone",
                    "html": "<blockquote><p>Hello <b>world</b></p></blockquote>"
                }));
            })
            .await;

        let fetcher = fetcher_for(&server);
        let metadata = assert_ok!(
            fetcher
                .fetch_social_post("https://x.com/someone/status/1")
                .await
        );

        assert_eq!(metadata.title, "Post by someone");
        assert_eq!(metadata.content, "Hello world");
        assert!(metadata.thumbnail.is_none());
    }

    #[tokio::test]
    async fn social_post_without_a_body_is_an_unexpected_structure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/social_oembed");
                then.status(200).json_body(json!({ "author_name": "someone" }));
            })
            .await;

        let fetcher = fetcher_for(&server);
        let result = fetcher
            .fetch_social_post("https://x.com/someone/status/1")
            .await;

        assert!(matches!(
            result,
            Err(MediaFetcherError::UnexpectedStructure(_))
        ));
    }
}
