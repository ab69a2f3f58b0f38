pub mod add_content;
pub mod delete_content;
pub mod get_content;
pub mod health_check;

pub use add_content::add_content;
pub use delete_content::delete_content;
pub use get_content::get_content;
pub use health_check::health_check;

#[cfg(test)]
pub(crate) mod test_helpers {
    use std::sync::Arc;

    use actix_web::{
        body::BoxBody,
        dev::{ServiceFactory, ServiceRequest, ServiceResponse},
        web, App,
    };
    use secrecy::Secret;
    use uuid::Uuid;

    use crate::domain::services::embeddings_service::EmbeddingsService;
    use crate::domain::services::media_extractor::MediaExtractor;
    use crate::middlewares::jwt_authentication::RequireAuth;
    use crate::ports::content_repository::ContentRepository;
    use crate::ports::media_fetcher::MediaFetcher;
    use crate::ports::vector_index::VectorIndex;
    use crate::ports::embedding_provider::EmbeddingProvider;
    use crate::repositories::jwt_authentication_repository::JwtAuthenticationRepository;
    use crate::use_cases::ingest_content::test_doubles::{
        InMemoryContentRepository, RecordingVectorIndex, StubEmbeddingProvider, StubFetcher,
    };

    /// Everything a controller test needs: doubles it can observe, and a
    /// valid bearer token for `user_id`
    pub(crate) struct TestContext {
        pub repository: Arc<InMemoryContentRepository>,
        pub index: Arc<RecordingVectorIndex>,
        pub user_id: Uuid,
        pub token: String,
        extractor: web::Data<MediaExtractor>,
        embeddings: web::Data<EmbeddingsService>,
        auth: web::Data<JwtAuthenticationRepository>,
    }

    impl TestContext {
        pub(crate) fn new() -> Self {
            Self::with_doubles(
                InMemoryContentRepository::new(),
                RecordingVectorIndex::new(),
                StubFetcher {
                    fail_fetches: false,
                },
                StubEmbeddingProvider::new(),
            )
        }

        pub(crate) fn with_doubles(
            repository: InMemoryContentRepository,
            index: RecordingVectorIndex,
            fetcher: StubFetcher,
            provider: StubEmbeddingProvider,
        ) -> Self {
            let auth_repository = JwtAuthenticationRepository::new(
                Secret::new("test-only-jwt-secret".to_string()),
                3600,
            );
            let user_id = Uuid::new_v4();
            let token = auth_repository
                .create_token(&user_id.to_string())
                .expect("Failed to create a token for tests");

            let fetcher: Arc<dyn MediaFetcher> = Arc::new(fetcher);
            let provider: Arc<dyn EmbeddingProvider> = Arc::new(provider);

            Self {
                repository: Arc::new(repository),
                index: Arc::new(index),
                user_id,
                token,
                extractor: web::Data::new(MediaExtractor::new(fetcher)),
                embeddings: web::Data::new(EmbeddingsService::new(provider)),
                auth: web::Data::new(auth_repository),
            }
        }

        pub(crate) fn bearer(&self) -> (&'static str, String) {
            ("Authorization", format!("Bearer {}", self.token))
        }
    }

    /// Same routing and injection shape as the real application
    pub(crate) fn test_app(
        ctx: &TestContext,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<BoxBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let repository: Arc<dyn ContentRepository> = ctx.repository.clone();
        let index: Arc<dyn VectorIndex> = ctx.index.clone();

        App::new()
            .route("/health_check", web::get().to(super::health_check))
            .service(
                web::scope("/content")
                    .wrap(RequireAuth::new(ctx.auth.clone()))
                    .route("", web::post().to(super::add_content))
                    .route("", web::get().to(super::get_content))
                    .route("/{content_id}", web::delete().to(super::delete_content)),
            )
            .app_data(web::Data::from(repository))
            .app_data(web::Data::from(index))
            .app_data(ctx.extractor.clone())
            .app_data(ctx.embeddings.clone())
            .app_data(ctx.auth.clone())
    }
}
