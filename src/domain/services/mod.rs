pub mod embeddings_service;
pub mod media_extractor;
