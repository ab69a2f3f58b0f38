pub mod content_item;
pub mod content_point;
pub mod extracted_metadata;
