mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod middleware;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use config::Config;
use db::{db::DBClient, MarketStore};
use dotenv::dotenv;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::EnvFilter;

use service::{
    audit_service::AuditService,
    chat_link::ChatLinkage,
    completion_service::CompletionService,
    hooks::PostCommitHooks,
    interaction_service::InteractionTracker,
    job_service::JobService,
    notification_service::NotificationService,
    offer_service::OfferService,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<dyn MarketStore>,
    // Services
    pub job_service: Arc<JobService>,
    pub offer_service: Arc<OfferService>,
    pub completion_service: Arc<CompletionService>,
    pub interaction_tracker: Arc<InteractionTracker>,
}

impl AppState {
    pub fn new(db_client: Arc<dyn MarketStore>, config: Config) -> Self {
        let interaction_tracker = InteractionTracker::new(db_client.clone());
        let hooks = Arc::new(PostCommitHooks::new(
            interaction_tracker.clone(),
            ChatLinkage::new(db_client.clone()),
            NotificationService::new(db_client.clone()),
        ));
        let audit_service = Arc::new(AuditService::new());

        let job_service = Arc::new(JobService::new(
            db_client.clone(),
            interaction_tracker.clone(),
            hooks.clone(),
            audit_service.clone(),
        ));
        let offer_service = Arc::new(OfferService::new(
            db_client.clone(),
            hooks.clone(),
            audit_service.clone(),
        ));
        let completion_service = Arc::new(CompletionService::new(
            db_client.clone(),
            hooks,
            audit_service,
        ));

        Self {
            env: config,
            db_client,
            job_service,
            offer_service,
            completion_service,
            interaction_tracker: Arc::new(interaction_tracker),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenv().ok();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("Connection to the database is successful");
            pool
        }
        Err(err) => {
            tracing::error!("Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::error!("Failed to run database migrations: {:?}", err);
        std::process::exit(1);
    }

    let allowed_origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE]);

    let db_client: Arc<dyn MarketStore> = Arc::new(DBClient::new(pool));
    let app_state = Arc::new(AppState::new(db_client, config.clone()));

    let app = create_router(app_state).layer(cors);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("Failed to bind port {}: {:?}", config.port, err);
            std::process::exit(1);
        }
    };

    tracing::info!("Server is running on http://localhost:{}", config.port);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("Server error: {:?}", err);
    }
}
