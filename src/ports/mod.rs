pub mod content_repository;
pub mod embedding_provider;
pub mod media_fetcher;
pub mod vector_index;
