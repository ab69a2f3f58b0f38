pub mod content_point_qdrant_repository;
pub mod content_postgres_repository;
pub mod jwt_authentication_repository;
