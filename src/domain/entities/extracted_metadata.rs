use serde::{Deserialize, Serialize};

/// Normalized metadata produced by one of the extraction paths
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExtractedMetadata {
    pub title: String,
    pub content: String,
    /// `None` unless a thumbnail was actually found
    pub thumbnail: Option<String>,
}
