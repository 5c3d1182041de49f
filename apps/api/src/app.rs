use crate::{
    config::Config,
    error::{ApiError, Result},
    handlers::{json_config, query_config, GenerationGate},
    routes::api_routes,
    services::{
        BookCatalog, GeminiClient, GoogleBooksClient, JobPoller, JsonFileStore, LibraryService,
        PromptSynthesizer, ReplicateClient, SoundtrackService,
    },
};
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{info, warn};
use reqwest::Client;
use std::net::TcpListener;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct Application {
    port: u16,
    host: String,
    config: Config,
}

impl Application {
    /// Create a new application instance
    pub fn new(config: &Config) -> Self {
        Self {
            port: config.port,
            host: config.host.clone(),
            config: config.clone(),
        }
    }

    /// Build and run the server
    pub async fn run(&self) -> Result<()> {
        let bind_address = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&bind_address)?;
        info!("Starting server at http://{}", bind_address);

        self.run_with_listener(listener).await
    }

    /// Run the server with a specific TCP listener
    /// This is useful for testing where we want to use a random port
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        let http = Client::builder()
            .timeout(self.config.request_timeout())
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| ApiError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        if self.config.gemini_api_key.is_none() {
            warn!("APP_GEMINI_API_KEY is not set, soundtrack generation will fail");
        }
        if self.config.replicate_api_token.is_none() {
            warn!("APP_REPLICATE_API_TOKEN is not set, soundtrack generation will fail");
        }

        let gemini = GeminiClient::new(
            http.clone(),
            self.config.gemini_api_key.clone(),
            &self.config.gemini_base_url,
            &self.config.gemini_model,
        );
        let replicate = ReplicateClient::new(
            http.clone(),
            self.config.replicate_api_token.clone(),
            &self.config.replicate_base_url,
        );
        let soundtrack = web::Data::new(SoundtrackService::new(
            PromptSynthesizer::new(Arc::new(gemini)),
            JobPoller::new(Arc::new(replicate), self.config.poll_settings()),
        ));

        let catalog: Arc<dyn BookCatalog> = Arc::new(GoogleBooksClient::new(
            http,
            &self.config.google_books_base_url,
        ));
        let catalog = web::Data::from(catalog);

        let store = JsonFileStore::open(&self.config.data_dir).await?;
        info!("Library data stored in {}", self.config.data_dir.display());
        let library = web::Data::new(LibraryService::new(Arc::new(store)));

        // Cancelled on Ctrl-C so in-flight polling loops stop with the server.
        let shutdown = CancellationToken::new();
        let gate = web::Data::new(GenerationGate::new(
            self.config.max_concurrent_generations,
            shutdown.clone(),
        ));

        let signal_token = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested, cancelling in-flight generations");
                signal_token.cancel();
            }
        });

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header();

            App::new()
                .wrap(cors)
                .wrap(Logger::default())
                .app_data(json_config())
                .app_data(query_config())
                .app_data(soundtrack.clone())
                .app_data(catalog.clone())
                .app_data(library.clone())
                .app_data(gate.clone())
                .service(api_routes())
        })
        .listen(listener)?
        .run()
        .await?;

        shutdown.cancel();
        Ok(())
    }
}
