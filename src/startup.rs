use actix_web::{
    dev::Server,
    web::{self, Data},
    App, HttpServer,
};
use qdrant_client::prelude::{QdrantClient, QdrantClientConfig};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{net::TcpListener, sync::Arc};
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::{
    adapters::{gemini_client::GeminiClient, reqwest_media_fetcher::ReqwestMediaFetcher},
    configuration::{DatabaseSettings, QdrantSettings, Settings},
    controllers::{add_content, delete_content, get_content, health_check},
    domain::services::{embeddings_service::EmbeddingsService, media_extractor::MediaExtractor},
    middlewares::jwt_authentication::RequireAuth,
    ports::{content_repository::ContentRepository, vector_index::VectorIndex},
    repositories::{
        content_point_qdrant_repository::{
            ContentPointQdrantRepository, ContentPointQdrantRepositoryError,
        },
        content_postgres_repository::ContentPostgresRepository,
        jwt_authentication_repository::JwtAuthenticationRepository,
    },
};

/// Holds the newly built server, and some useful properties
pub struct Application {
    server: Server,
    port: u16,
}

#[derive(thiserror::Error, Debug)]
pub enum ApplicationBuildError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    QdrantRepositoryError(#[from] ContentPointQdrantRepositoryError),
    #[error("Qdrant client error: {0}")]
    QdrantClientError(String),
    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

impl Application {
    /// # Parameters
    /// - nb_workers: number of actix-web workers
    ///   if `None`, the number of available physical CPUs is used as the worker count.
    #[tracing::instrument(name = "Building application", skip(settings))]
    pub async fn build(
        settings: Settings,
        nb_workers: Option<usize>,
    ) -> Result<Self, ApplicationBuildError> {
        let connection_pool = get_connection_pool(&settings.database);

        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr().unwrap().port();

        let qdrant_client = get_qdrant_client(&settings.qdrant)?;
        let vector_index: Arc<dyn VectorIndex> = Arc::new(
            ContentPointQdrantRepository::try_new(
                qdrant_client,
                &settings.qdrant.collection,
                &settings.qdrant.collection_distance,
                settings.qdrant.collection_vector_size,
            )
            .await?,
        );

        let content_repository: Arc<dyn ContentRepository> =
            Arc::new(ContentPostgresRepository::new(connection_pool));

        let gemini_client = GeminiClient::try_new(&settings.embedding)?;
        let embeddings_service = EmbeddingsService::new(Arc::new(gemini_client));

        let media_fetcher = ReqwestMediaFetcher::try_new(&settings.media)?;
        let media_extractor = MediaExtractor::new(Arc::new(media_fetcher));

        let auth_repository = JwtAuthenticationRepository::new(
            settings.auth.jwt_secret.clone(),
            settings.auth.jwt_expire_in_s,
        );

        let server = run(
            listener,
            nb_workers,
            content_repository,
            vector_index,
            media_extractor,
            embeddings_service,
            auth_repository,
        )?;

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// This function only returns when the application is stopped
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        info!("Running server ...");
        self.server.await
    }
}

/// listener: the consumer binds their own port
///
/// TracingLogger middleware: helps collecting telemetry data.
/// It generates a unique identifier for each incoming request: `request_id`.
///
/// # Parameters
/// - nb_workers: number of actix-web workers
///   if `None`, the number of available physical CPUs is used as the worker count.
pub fn run(
    listener: TcpListener,
    nb_workers: Option<usize>,
    content_repository: Arc<dyn ContentRepository>,
    vector_index: Arc<dyn VectorIndex>,
    media_extractor: MediaExtractor,
    embeddings_service: EmbeddingsService,
    auth_repository: JwtAuthenticationRepository,
) -> Result<Server, std::io::Error> {
    // Wraps repositories and services in a `actix_web::Data` (`Arc`) to be able
    // to register them and access them from handlers.
    // They are shared among all threads.
    let content_repository = Data::from(content_repository);
    let vector_index = Data::from(vector_index);
    let media_extractor = Data::new(media_extractor);
    let embeddings_service = Data::new(embeddings_service);
    let auth_repository = Data::new(auth_repository);

    // `move` to capture variables from the surrounding environment
    let server = HttpServer::new(move || {
        info!("Starting actix-web worker");

        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/content")
                    .wrap(RequireAuth::new(auth_repository.clone()))
                    .route("", web::post().to(add_content))
                    .route("", web::get().to(get_content))
                    .route("/{content_id}", web::delete().to(delete_content)),
            )
            .app_data(content_repository.clone())
            .app_data(vector_index.clone())
            .app_data(media_extractor.clone())
            .app_data(embeddings_service.clone())
            .app_data(auth_repository.clone())
    })
    .listen(listener)?;

    // If no workers were set, use the actix-web settings (number of workers = number of physical CPUs)
    if let Some(nb_workers) = nb_workers {
        return Ok(server.workers(nb_workers).run());
    }

    // No await
    Ok(server.run())
}

pub fn get_connection_pool(settings: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(settings.with_db())
}

/// Set up a client to Qdrant
pub fn get_qdrant_client(config: &QdrantSettings) -> Result<QdrantClient, ApplicationBuildError> {
    let qdrant_config = QdrantClientConfig::from_url(&config.get_grpc_base_url());
    QdrantClient::new(Some(qdrant_config))
        .map_err(|e| ApplicationBuildError::QdrantClientError(e.to_string()))
}
