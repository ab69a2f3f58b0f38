use chrono::{DateTime, Utc};
use std::str::FromStr;
use typed_builder::TypedBuilder;
use uuid::Uuid;

/// Kind of a captured item: `Url` iff the item was created from a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentType {
    Url,
    Note,
}

impl ContentType {
    /// Derives the type from the presence of a link, the only invariant
    /// binding the two fields together.
    pub fn from_link(link: Option<&str>) -> Self {
        if link.is_some() {
            ContentType::Url
        } else {
            ContentType::Note
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Url => "Url",
            ContentType::Note => "Note",
        }
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Url" => Ok(ContentType::Url),
            "Note" => Ok(ContentType::Note),
            _ => Err(format!("Invalid ContentType: {}", s)),
        }
    }
}

/// Durable record of one ingested note or link
#[derive(Debug, Clone, TypedBuilder)]
pub struct ContentItem {
    #[builder(default=Uuid::new_v4())]
    pub id: Uuid,

    pub user_id: Uuid,

    /// Caller-supplied title, or the extracted one when the caller gave none
    pub title: String,

    pub content_type: ContentType,

    /// Original source link, `None` for notes
    #[builder(default)]
    pub link: Option<String>,

    /// Normalized textual body: transcript, article text or note body.
    /// Never null, possibly empty.
    pub content: String,

    /// Thumbnail reference, only for link-derived content
    #[builder(default)]
    pub image_url: Option<String>,

    /// Empty at creation, extension point for later labeling
    #[builder(default)]
    pub tags: Vec<String>,

    #[builder(default=Utc::now())]
    pub created_at: DateTime<Utc>,
}
