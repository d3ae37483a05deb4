//! mindforge-api - HTTP API server for the MindForge backend

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use mindforge_api::{auth::JwtKeys, services::TokenCache, AppState, Config};
use mindforge_core::defaults;
use mindforge_db::{log_pool_metrics, Database, FilesystemBackend, PoolConfig};
use mindforge_inference::{AnythingLlmClient, ConversationStore, OllamaBackend};

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, daily rotation)
    //   LOG_ANSI    - "true"/"false" override ANSI colors
    //   RUST_LOG    - env filter (default: "mindforge_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mindforge_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("mindforge-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = Config::from_env();

    info!("Connecting to database...");
    let db = Database::connect_with_config(
        &config.database_url,
        PoolConfig::default().max_connections(config.db_max_connections),
    )
    .await?;
    info!("Database connected");

    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");
    log_pool_metrics(db.pool());

    let metrics_pool = db.pool().clone();
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(Duration::from_secs(defaults::POOL_METRICS_INTERVAL_SECS));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            log_pool_metrics(&metrics_pool);
        }
    });

    let storage = FilesystemBackend::new(&config.file_storage_path, &config.public_file_base_url);
    storage.validate().await.map_err(anyhow::Error::msg)?;
    info!(
        path = %config.file_storage_path,
        public_url = %config.public_file_base_url,
        "File storage ready"
    );

    let workspace = Arc::new(AnythingLlmClient::from_env()?);
    let generator = Arc::new(OllamaBackend::from_env()?);

    let tokens = TokenCache::connect(
        config.redis_enabled,
        &config.redis_url,
        config.token_cache_ttl_secs,
    )
    .await;
    info!(connected = tokens.is_connected().await, "Token cache ready");
    let jwt = JwtKeys::new(&config.jwt_secret, config.jwt_expires_in_secs);

    let conversations = Arc::new(ConversationStore::new(defaults::CONVERSATION_MAX_MESSAGES));
    let idle = Duration::from_secs(defaults::CONVERSATION_IDLE_SECS);
    conversations.clone().spawn_eviction(idle, idle);

    let state = AppState::new(
        db,
        workspace,
        generator,
        Arc::new(storage),
        jwt,
        tokens,
        conversations,
    );

    let app = mindforge_api::router(state)
        // Stored blobs are public; mounted outside the auth layer.
        .nest_service("/files", ServeDir::new(&config.file_storage_path))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.cors_origins()))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(Duration::from_secs(defaults::CORS_MAX_AGE_SECS)),
        )
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
